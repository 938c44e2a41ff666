use std::sync::Arc;

use anyhow::bail;
use colored::Colorize;
use huddle_collection::{
    EventService, GroupSimService, HistoryService, ListOptions, MediaService, ProfileService,
};
use huddle_store::{BlobStore, FileBlobStore, FileStoreConfig};
use huddle_types::{Clock, Event, MediaItem, MemberRole, Role, SystemClock};
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(command: Command, config: &CliConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    match command {
        Command::Event(args) => cmd_event(args.action, store),
        Command::Profile(args) => cmd_profile(args.action, store),
        Command::History(args) => cmd_history(args.action, store),
        Command::Media(args) => cmd_media(args.action, store),
        Command::Group(args) => cmd_group(args.action, store),
    }
}

fn open_store(config: &CliConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let store = FileBlobStore::with_config(
        &config.data_dir,
        FileStoreConfig {
            lock_timeout: config.lock_timeout(),
            ..FileStoreConfig::default()
        },
    )?;
    debug!(root = %store.root().display(), "opened file store");
    Ok(Arc::new(store))
}

fn print_event(event: &Event) {
    println!("{}  {}", event.chat_room_id.yellow().bold(), event.title.bold());
    println!(
        "  {} → {}",
        event.start_time.to_rfc3339(),
        event.end_time.to_rfc3339()
    );
    if event.show_creator {
        println!("  Creator: {}", event.creator_id.cyan());
    }
    println!("  Capacity: {}  Fee: {}", event.capacity, event.fee);
    if !event.description.is_empty() {
        println!("  {}", event.description);
    }
}

fn cmd_event(action: EventAction, store: Arc<dyn BlobStore>) -> anyhow::Result<()> {
    let events = EventService::new(store)?;
    match action {
        EventAction::Create {
            room,
            creator,
            title,
            start,
            end,
            fee,
            capacity,
            description,
            hide_creator,
        } => {
            let event = events.create(Event {
                chat_room_id: room,
                creator_id: creator,
                title,
                start_time: start,
                end_time: end,
                fee,
                capacity,
                description,
                show_creator: !hide_creator,
            })?;
            println!("{} Event scheduled", "✓".green().bold());
            print_event(&event);
        }
        EventAction::Get { room } => print_event(&events.get(&room)?),
        EventAction::List {
            creator,
            start,
            end,
            limit,
        } => {
            let options = ListOptions {
                creator_id: creator,
                start,
                end,
                limit,
            };
            let list = events.list(&options)?;
            if list.is_empty() {
                println!("No events.");
            }
            for event in &list {
                println!(
                    "{}  {}  {}",
                    event.start_time.to_rfc3339().dimmed(),
                    event.chat_room_id.yellow(),
                    event.title
                );
            }
        }
        EventAction::Update {
            room,
            description,
            actor,
        } => {
            ensure_creator(&events, &room, &actor)?;
            let event = events.update_description(&room, description)?;
            println!("{} Description updated", "✓".green().bold());
            print_event(&event);
        }
        EventAction::Remove { room, actor } => {
            ensure_creator(&events, &room, &actor)?;
            let event = events.remove(&room)?;
            println!("{} Cancelled {}", "✓".green().bold(), event.title.bold());
        }
    }
    Ok(())
}

/// Only the creator may change or cancel an event.
fn ensure_creator(events: &EventService, room: &str, actor: &str) -> anyhow::Result<()> {
    let event = events.get(room)?;
    if !event.is_created_by(actor) {
        bail!("{actor} did not create the event in {room}");
    }
    Ok(())
}

fn cmd_profile(action: ProfileAction, store: Arc<dyn BlobStore>) -> anyhow::Result<()> {
    let profiles = ProfileService::new(store)?;
    match action {
        ProfileAction::Create {
            user,
            name,
            timezone,
        } => {
            let profile = profiles.create(&user, &name, timezone)?;
            println!(
                "{} Profile created for {}",
                "✓".green().bold(),
                profile.user_id.cyan()
            );
        }
        ProfileAction::Get { user } => {
            let profile = profiles.get(&user)?;
            println!("{}  {}", profile.user_id.cyan().bold(), profile.display_name);
            if let Some(tz) = &profile.timezone {
                println!("  Timezone: {tz}");
            }
            if !profile.notes.is_empty() {
                println!("  Notes: {}", profile.notes);
            }
        }
        ProfileAction::Notes { user, notes } => {
            profiles.update_notes(&user, notes)?;
            println!("{} Notes updated", "✓".green().bold());
        }
        ProfileAction::Remove { user } => {
            profiles.remove(&user)?;
            println!("{} Removed {}", "✓".green().bold(), user.cyan());
        }
        ProfileAction::List => {
            for profile in profiles.list(&ListOptions::all())? {
                println!("{}  {}", profile.user_id.cyan(), profile.display_name);
            }
        }
    }
    Ok(())
}

fn cmd_history(action: HistoryAction, store: Arc<dyn BlobStore>) -> anyhow::Result<()> {
    let history = HistoryService::new(store);
    match action {
        HistoryAction::Append {
            room,
            content,
            author,
            role,
        } => {
            let entry = history.append(&room, &author, role, content)?;
            println!("{} {}", "✓".green().bold(), entry.id.dimmed());
        }
        HistoryAction::Show { room, limit } => {
            for entry in history.recent(&room, limit)? {
                let who = match entry.role {
                    Role::User => entry.author_id.cyan(),
                    Role::Assistant => entry.author_id.green(),
                    Role::System => entry.author_id.magenta(),
                };
                println!(
                    "{} {}: {}",
                    entry.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    who,
                    entry.content
                );
            }
        }
        HistoryAction::Clear { room } => {
            let removed = history.clear(&room)?;
            println!("{} Cleared {} messages", "✓".green().bold(), removed);
        }
    }
    Ok(())
}

fn cmd_media(action: MediaAction, store: Arc<dyn BlobStore>) -> anyhow::Result<()> {
    let media = MediaService::new(store)?;
    match action {
        MediaAction::Add {
            room,
            uploader,
            file,
            content_type,
            size,
            storage_ref,
            caption,
        } => {
            let item = media.register(MediaItem {
                media_id: String::new(),
                chat_room_id: room,
                uploader_id: uploader,
                file_name: file,
                content_type,
                size_bytes: size,
                storage_ref,
                caption,
                uploaded_at: SystemClock.now(),
            })?;
            println!("{} Registered {}", "✓".green().bold(), item.media_id.yellow());
        }
        MediaAction::Get { id } => {
            let item = media.get(&id)?;
            println!("{}  {}", item.media_id.yellow().bold(), item.file_name.bold());
            println!("  {} ({} bytes)", item.content_type, item.size_bytes);
            println!("  Room: {}  Uploader: {}", item.chat_room_id, item.uploader_id.cyan());
            println!("  Stored at: {}", item.storage_ref);
            if !item.caption.is_empty() {
                println!("  {}", item.caption);
            }
        }
        MediaAction::Caption { id, caption } => {
            media.update_caption(&id, caption)?;
            println!("{} Caption updated", "✓".green().bold());
        }
        MediaAction::Remove { id } => {
            media.remove(&id)?;
            println!("{} Removed {}", "✓".green().bold(), id.yellow());
        }
        MediaAction::List { room, uploader } => {
            let items = match (room, uploader) {
                (Some(room), None) => media.list_for_room(&room)?,
                (room, uploader) => {
                    let mut options = ListOptions::all();
                    if let Some(uploader) = uploader {
                        options = options.created_by(uploader);
                    }
                    let mut items = media.list(&options)?;
                    if let Some(room) = room {
                        items.retain(|i| i.chat_room_id == room);
                    }
                    items
                }
            };
            for item in items {
                let marker = if item.is_image() { "img" } else { "file" };
                println!("{}  {:>4}  {}", item.media_id.yellow(), marker.dimmed(), item.file_name);
            }
        }
    }
    Ok(())
}

fn cmd_group(action: GroupAction, store: Arc<dyn BlobStore>) -> anyhow::Result<()> {
    let groups = GroupSimService::new(store)?;
    match action {
        GroupAction::Join {
            room,
            user,
            nickname,
            admin,
        } => {
            let role = if admin { MemberRole::Admin } else { MemberRole::Member };
            let member = groups.join(&room, &user, &nickname, role)?;
            println!(
                "{} {} joined {} as {}",
                "✓".green().bold(),
                member.nickname.bold(),
                member.chat_room_id.yellow(),
                member.role
            );
        }
        GroupAction::Leave { room, user } => {
            groups.leave(&room, &user)?;
            println!("{} {} left {}", "✓".green().bold(), user.cyan(), room.yellow());
        }
        GroupAction::Members { room } => {
            for member in groups.members(&room)? {
                println!("{}  {}  {}", member.user_id.cyan(), member.nickname, member.role.to_string().dimmed());
            }
        }
        GroupAction::Rename {
            room,
            user,
            nickname,
        } => {
            groups.rename(&room, &user, nickname)?;
            println!("{} Nickname updated", "✓".green().bold());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_in(dir: &tempfile::TempDir) -> CliConfig {
        CliConfig {
            data_dir: dir.path().join("data"),
            ..CliConfig::default()
        }
    }

    fn run(config: &CliConfig, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["huddle"];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?.command, config)
    }

    #[test]
    fn event_lifecycle_with_creator_check() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        run(&config, &[
            "event", "create", "--room", "g1", "--creator", "u1", "--title", "Picnic",
            "--start", "2999-01-01T10:00:00Z", "--end", "2999-01-01T12:00:00Z",
            "--capacity", "10",
        ])
        .unwrap();
        assert!(dir.path().join("data/events.jsonl").exists());

        let err = run(&config, &["event", "update", "g1", "hijacked", "--as", "u2"]).unwrap_err();
        assert!(err.to_string().contains("did not create"));
        run(&config, &["event", "update", "g1", "bring snacks", "--as", "u1"]).unwrap();

        let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::open(&config.data_dir).unwrap());
        let events = EventService::new(store).unwrap();
        assert_eq!(events.get("g1").unwrap().description, "bring snacks");

        assert!(run(&config, &["event", "remove", "g1", "--as", "u2"]).is_err());
        run(&config, &["event", "remove", "g1", "--as", "u1"]).unwrap();
        assert!(events.get("g1").unwrap_err().is_not_found());
    }

    #[test]
    fn past_event_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let err = run(&config, &[
            "event", "create", "--room", "g1", "--creator", "u1", "--title", "Old",
            "--start", "2000-01-01T10:00:00Z", "--end", "2000-01-01T12:00:00Z",
            "--capacity", "10",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("not in the future"));
    }

    #[test]
    fn history_and_group_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        run(&config, &["history", "append", "C1", "hello", "--author", "U1"]).unwrap();
        run(&config, &["history", "show", "C1"]).unwrap();
        run(&config, &["history", "clear", "C1"]).unwrap();

        run(&config, &["group", "join", "C1", "U1", "Aiko", "--admin"]).unwrap();
        assert!(run(&config, &["group", "join", "C1", "U1", "Aiko"]).is_err());
        run(&config, &["group", "rename", "C1", "U1", "Ai"]).unwrap();
        run(&config, &["group", "leave", "C1", "U1"]).unwrap();
        assert!(run(&config, &["group", "leave", "C1", "U1"]).is_err());
    }

    #[test]
    fn profile_and_media_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        run(&config, &["profile", "create", "U1", "Aiko", "--timezone", "Asia/Tokyo"]).unwrap();
        run(&config, &["profile", "notes", "U1", "likes hiking"]).unwrap();
        run(&config, &["profile", "get", "U1"]).unwrap();
        assert!(run(&config, &["profile", "get", "U9"]).is_err());

        run(&config, &[
            "media", "add", "--room", "C1", "--uploader", "U1", "--file", "cat.png",
            "--content-type", "image/png", "--storage-ref", "bucket/cat.png",
        ])
        .unwrap();
        run(&config, &["media", "list", "--room", "C1"]).unwrap();
    }
}
