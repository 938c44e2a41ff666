use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use huddle_types::{parse_timestamp, Role, Timestamp};

#[derive(Parser)]
#[command(
    name = "huddle",
    about = "Huddle: inspect and edit the group-chat assistant's collections",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file (default: ./huddle.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the collection blobs (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Scheduled events, one per chat room
    Event(EventArgs),
    /// User profiles
    Profile(ProfileArgs),
    /// Per-room conversation history
    History(HistoryArgs),
    /// Uploaded media index
    Media(MediaArgs),
    /// Simulated group membership
    Group(GroupArgs),
}

#[derive(Args)]
pub struct EventArgs {
    #[command(subcommand)]
    pub action: EventAction,
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Schedule an event in a chat room
    Create {
        #[arg(long)]
        room: String,
        #[arg(long)]
        creator: String,
        #[arg(long)]
        title: String,
        /// RFC 3339 start, e.g. 2026-11-02T19:00:00+09:00
        #[arg(long, value_parser = parse_timestamp)]
        start: Timestamp,
        #[arg(long, value_parser = parse_timestamp)]
        end: Timestamp,
        #[arg(long, default_value = "")]
        fee: String,
        #[arg(long)]
        capacity: u32,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        hide_creator: bool,
    },
    /// Show the event of a chat room
    Get { room: String },
    /// List events
    List {
        #[arg(long)]
        creator: Option<String>,
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<Timestamp>,
        #[arg(long, value_parser = parse_timestamp)]
        end: Option<Timestamp>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Change an event's description (creator only)
    Update {
        room: String,
        description: String,
        #[arg(long = "as")]
        actor: String,
    },
    /// Cancel an event (creator only)
    Remove {
        room: String,
        #[arg(long = "as")]
        actor: String,
    },
}

#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Create {
        user: String,
        name: String,
        #[arg(long)]
        timezone: Option<String>,
    },
    Get { user: String },
    /// Replace the notes kept for a user
    Notes { user: String, notes: String },
    Remove { user: String },
    List,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    Append {
        room: String,
        content: String,
        #[arg(long)]
        author: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// Show the most recent messages of a room
    Show {
        room: String,
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    Clear { room: String },
}

#[derive(Args)]
pub struct MediaArgs {
    #[command(subcommand)]
    pub action: MediaAction,
}

#[derive(Subcommand)]
pub enum MediaAction {
    Add {
        #[arg(long)]
        room: String,
        #[arg(long)]
        uploader: String,
        #[arg(long)]
        file: String,
        #[arg(long)]
        content_type: String,
        #[arg(long, default_value = "0")]
        size: u64,
        #[arg(long)]
        storage_ref: String,
        #[arg(long, default_value = "")]
        caption: String,
    },
    Get { id: String },
    Caption { id: String, caption: String },
    Remove { id: String },
    List {
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        uploader: Option<String>,
    },
}

#[derive(Args)]
pub struct GroupArgs {
    #[command(subcommand)]
    pub action: GroupAction,
}

#[derive(Subcommand)]
pub enum GroupAction {
    Join {
        room: String,
        user: String,
        nickname: String,
        #[arg(long)]
        admin: bool,
    },
    Leave { room: String, user: String },
    Members { room: String },
    Rename { room: String, user: String, nickname: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_create() {
        let cli = Cli::try_parse_from([
            "huddle", "event", "create",
            "--room", "g1", "--creator", "u1", "--title", "Picnic",
            "--start", "2026-11-02T10:00:00+09:00",
            "--end", "2026-11-02T13:00:00+09:00",
            "--capacity", "50",
        ])
        .unwrap();
        match cli.command {
            Command::Event(EventArgs {
                action: EventAction::Create { room, capacity, start, hide_creator, .. },
            }) => {
                assert_eq!(room, "g1");
                assert_eq!(capacity, 50);
                assert_eq!(start.to_rfc3339(), "2026-11-02T10:00:00+09:00");
                assert!(!hide_creator);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn parse_event_create_rejects_bad_time() {
        let res = Cli::try_parse_from([
            "huddle", "event", "create",
            "--room", "g1", "--creator", "u1", "--title", "x",
            "--start", "tomorrow", "--end", "2026-11-02T13:00:00+09:00",
            "--capacity", "5",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn parse_event_list_end_only() {
        let cli = Cli::try_parse_from([
            "huddle", "event", "list", "--end", "2026-12-01T00:00:00Z", "-n", "3",
        ])
        .unwrap();
        if let Command::Event(EventArgs { action: EventAction::List { start, end, limit, .. } }) = cli.command {
            assert!(start.is_none());
            assert!(end.is_some());
            assert_eq!(limit, Some(3));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_event_update_requires_actor() {
        assert!(Cli::try_parse_from(["huddle", "event", "update", "g1", "new text"]).is_err());
        let cli = Cli::try_parse_from(["huddle", "event", "update", "g1", "new text", "--as", "u1"]).unwrap();
        if let Command::Event(EventArgs { action: EventAction::Update { actor, description, .. } }) = cli.command {
            assert_eq!(actor, "u1");
            assert_eq!(description, "new text");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_history_role() {
        let cli = Cli::try_parse_from([
            "huddle", "history", "append", "C1", "hi", "--author", "bot", "--role", "assistant",
        ])
        .unwrap();
        if let Command::History(HistoryArgs { action: HistoryAction::Append { role, .. } }) = cli.command {
            assert_eq!(role, Role::Assistant);
        } else {
            panic!("wrong command");
        }
        assert!(Cli::try_parse_from([
            "huddle", "history", "append", "C1", "hi", "--author", "bot", "--role", "robot",
        ])
        .is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "huddle", "--data-dir", "/tmp/h", "-v", "profile", "list",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/h")));
        assert!(matches!(cli.command, Command::Profile(ProfileArgs { action: ProfileAction::List })));
    }

    #[test]
    fn parse_group_join_admin() {
        let cli = Cli::try_parse_from(["huddle", "group", "join", "C1", "U1", "Aiko", "--admin"]).unwrap();
        if let Command::Group(GroupArgs { action: GroupAction::Join { admin, nickname, .. } }) = cli.command {
            assert!(admin);
            assert_eq!(nickname, "Aiko");
        } else {
            panic!("wrong command");
        }
    }
}
