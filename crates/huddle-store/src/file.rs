//! Local filesystem blob store.
//!
//! Each key maps to one file under the store root. The file starts with a
//! single JSON header line followed by the raw payload:
//!
//! ```text
//! {"generation":3,"content_type":"application/x-ndjson","len":118,"digest":"<blake3 hex>"}\n
//! <payload bytes>
//! ```
//!
//! The generation is an explicit counter kept in the header rather than the
//! file's modification time, so two writes inside the same clock tick still
//! produce distinct generations. The digest catches torn or hand-edited
//! files on read.
//!
//! Writers are serialized by an in-process mutex and, across processes, by
//! an exclusive `flock` on a sibling `<file>.lock`. The new content is
//! written to `<file>.tmp` and renamed over the target, so readers observe
//! either the old blob or the new one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::keys::validate_blob_key;
use crate::traits::BlobStore;
use crate::types::{Generation, Versioned};

/// How long to sleep between attempts to take a busy lock file.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Configuration for [`FileBlobStore`].
#[derive(Clone, Debug)]
pub struct FileStoreConfig {
    /// Maximum time to wait for another process's lock file (default: 2s).
    pub lock_timeout: Duration,
    /// `fsync` the temp file before renaming it into place (default: true).
    pub sync_on_write: bool,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(2),
            sync_on_write: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct BlobHeader {
    generation: Generation,
    content_type: String,
    len: u64,
    digest: String,
}

/// Exclusive advisory lock on one key, held through a `<file>.lock` sibling.
///
/// The lock is an OS `flock`, so the kernel drops it when the holder exits,
/// including on a crash. The lock file itself is left in place.
struct LockFile {
    file: File,
}

impl LockFile {
    fn acquire(path: &Path, key: &str, timeout: Duration) -> StoreResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;
        let deadline = Instant::now() + timeout;
        loop {
            match try_lock_exclusive(&file) {
                Ok(()) => return Ok(Self { file }),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    if Instant::now() >= deadline {
                        warn!(key, lock = %path.display(), "lock still held after timeout");
                        return Err(StoreError::LockTimeout {
                            key: key.to_string(),
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(StoreError::Io(e)),
            }
        }
    }
}

#[cfg(unix)]
fn try_lock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

// Without flock only the in-process mutex serializes writers.
#[cfg(not(unix))]
fn try_lock_exclusive(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
impl Drop for LockFile {
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;

        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
    }
}

/// Blob store backed by files in a local directory.
///
/// Meant for the CLI and local harnesses. Several `FileBlobStore` values
/// (or processes) may share one root directory.
pub struct FileBlobStore {
    root: PathBuf,
    config: FileStoreConfig,
    write_lock: Mutex<()>,
}

impl FileBlobStore {
    /// Open (or create) a store rooted at `root` with default configuration.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_config(root, FileStoreConfig::default())
    }

    /// Open (or create) a store rooted at `root`.
    pub fn with_config(root: impl Into<PathBuf>, config: FileStoreConfig) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            config,
            write_lock: Mutex::new(()),
        })
    }

    /// The directory holding this store's files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    fn sidecar(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn read_path(&self, key: &str, path: &Path) -> StoreResult<Versioned> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Versioned::absent()),
            Err(e) => return Err(StoreError::Io(e)),
        };
        let versioned = decode_file(key, &raw).inspect_err(|e| {
            warn!(key, error = %e, "corrupt blob file");
        })?;
        debug!(key, generation = %versioned.generation, len = versioned.bytes_or_empty().len(), "blob read");
        Ok(versioned)
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> StoreResult<Versioned> {
        validate_blob_key(key)?;
        self.read_path(key, &self.blob_path(key))
    }

    fn write(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
        expected: Generation,
    ) -> StoreResult<Generation> {
        validate_blob_key(key)?;
        let path = self.blob_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let _local = self
            .write_lock
            .lock()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        let _lock = LockFile::acquire(
            &Self::sidecar(&path, ".lock"),
            key,
            self.config.lock_timeout,
        )?;

        let current = self.read_path(key, &path)?.generation;
        if expected.is_absent() && !current.is_absent() {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        if current != expected {
            return Err(StoreError::GenerationMismatch {
                key: key.to_string(),
                expected,
                actual: current,
            });
        }

        let generation = current
            .checked_next()
            .ok_or_else(|| StoreError::generation_exhausted(key))?;
        let header = BlobHeader {
            generation,
            content_type: content_type.to_string(),
            len: bytes.len() as u64,
            digest: blake3::hash(bytes).to_hex().to_string(),
        };
        let header_line = serde_json::to_vec(&header)
            .map_err(|e| StoreError::Backend(format!("encode header: {e}")))?;

        let tmp_path = Self::sidecar(&path, ".tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&header_line)?;
            tmp.write_all(b"\n")?;
            tmp.write_all(bytes)?;
            if self.config.sync_on_write {
                tmp.sync_all()?;
            }
        }
        fs::rename(&tmp_path, &path)?;

        debug!(key, %generation, len = bytes.len(), "blob written");
        Ok(generation)
    }
}

impl std::fmt::Debug for FileBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBlobStore")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

fn corrupt(key: &str, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn decode_file(key: &str, raw: &[u8]) -> StoreResult<Versioned> {
    let split = raw
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| corrupt(key, "missing header line"))?;
    let header: BlobHeader = serde_json::from_slice(&raw[..split])
        .map_err(|e| corrupt(key, format!("bad header: {e}")))?;
    let payload = &raw[split + 1..];

    if payload.len() as u64 != header.len {
        return Err(corrupt(
            key,
            format!("length {} does not match header {}", payload.len(), header.len),
        ));
    }
    let digest = blake3::hash(payload);
    let expected = hex::decode(&header.digest)
        .map_err(|e| corrupt(key, format!("bad digest encoding: {e}")))?;
    if digest.as_bytes()[..] != expected[..] {
        return Err(corrupt(key, "payload digest mismatch"));
    }
    if header.generation.is_absent() {
        return Err(corrupt(key, "stored generation is zero"));
    }

    Ok(Versioned {
        bytes: Some(payload.to_vec()),
        content_type: Some(header.content_type),
        generation: header.generation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract;

    fn temp_store() -> (tempfile::TempDir, FileBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(dir.path().join("blobs")).unwrap();
        (dir, store)
    }

    // -----------------------------------------------------------------------
    // CAS contract
    // -----------------------------------------------------------------------

    #[test]
    fn satisfies_cas_contract() {
        let (_dir, store) = temp_store();
        contract::check_all(&store);
    }

    // -----------------------------------------------------------------------
    // On-disk format
    // -----------------------------------------------------------------------

    #[test]
    fn file_has_header_then_payload() {
        let (_dir, store) = temp_store();
        store
            .write("events.jsonl", "application/x-ndjson", b"{\"a\":1}", Generation::ABSENT)
            .unwrap();

        let raw = fs::read(store.root().join("events.jsonl")).unwrap();
        let text = String::from_utf8(raw).unwrap();
        let (header, payload) = text.split_once('\n').unwrap();
        assert!(header.starts_with("{\"generation\":1,"));
        assert_eq!(payload, "{\"a\":1}");
    }

    #[test]
    fn nested_keys_create_directories() {
        let (_dir, store) = temp_store();
        store
            .write("history/C1.jsonl", "t", b"x", Generation::ABSENT)
            .unwrap();
        assert!(store.root().join("history").is_dir());
        assert_eq!(
            store.read("history/C1.jsonl").unwrap().bytes.as_deref(),
            Some(&b"x"[..])
        );
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (_dir, store) = temp_store();
        let g = store.write("k", "t", b"1", Generation::ABSENT).unwrap();
        store.write("k", "t", b"2", g).unwrap();
        let _ = store.write("k", "t", b"3", g);

        let mut names: Vec<String> = fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["k".to_string(), "k.lock".to_string()]);
    }

    // -----------------------------------------------------------------------
    // Integrity
    // -----------------------------------------------------------------------

    #[test]
    fn tampered_payload_is_corrupt() {
        let (_dir, store) = temp_store();
        store.write("k", "t", b"hello", Generation::ABSENT).unwrap();

        let path = store.root().join("k");
        let mut raw = fs::read(&path).unwrap();
        let last = raw.len() - 1;
        raw[last] = b'X';
        fs::write(&path, raw).unwrap();

        assert!(matches!(store.read("k"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn missing_header_is_corrupt() {
        let (_dir, store) = temp_store();
        fs::write(store.root().join("k"), b"no header here").unwrap();
        assert!(matches!(store.read("k"), Err(StoreError::Corrupt { .. })));
    }

    #[test]
    fn exhausted_generation_is_corrupt_not_wrapped() {
        let (_dir, store) = temp_store();
        let payload = b"last";
        let header = BlobHeader {
            generation: Generation::new(u64::MAX),
            content_type: "t".into(),
            len: payload.len() as u64,
            digest: blake3::hash(payload).to_hex().to_string(),
        };
        let mut raw = serde_json::to_vec(&header).unwrap();
        raw.push(b'\n');
        raw.extend_from_slice(payload);
        fs::write(store.root().join("k"), raw).unwrap();

        let current = store.read("k").unwrap().generation;
        let err = store.write("k", "t", b"next", current).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(store.read("k").unwrap().bytes.as_deref(), Some(&payload[..]));
    }

    #[test]
    fn corrupt_blob_blocks_writes() {
        let (_dir, store) = temp_store();
        fs::write(store.root().join("k"), b"garbage").unwrap();
        let err = store.write("k", "t", b"x", Generation::new(1)).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    // -----------------------------------------------------------------------
    // Locking
    // -----------------------------------------------------------------------

    fn short_timeout_store(dir: &Path) -> FileBlobStore {
        let config = FileStoreConfig {
            lock_timeout: Duration::from_millis(30),
            sync_on_write: false,
        };
        FileBlobStore::with_config(dir, config).unwrap()
    }

    #[test]
    fn leftover_lock_file_does_not_block_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = short_timeout_store(dir.path());
        // A writer that died mid-write leaves its lock file but not its flock.
        fs::write(dir.path().join("k.lock"), b"").unwrap();

        let g = store.write("k", "t", b"x", Generation::ABSENT).unwrap();
        assert_eq!(g, Generation::new(1));
    }

    #[cfg(unix)]
    #[test]
    fn held_lock_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = short_timeout_store(dir.path());
        let held = LockFile::acquire(&dir.path().join("k.lock"), "k", Duration::ZERO).unwrap();

        let err = store.write("k", "t", b"x", Generation::ABSENT).unwrap_err();
        assert!(matches!(err, StoreError::LockTimeout { .. }));
        assert!(store.read("k").unwrap().is_absent());

        drop(held);
        store.write("k", "t", b"x", Generation::ABSENT).unwrap();
    }

    #[test]
    fn two_instances_share_a_root() {
        let dir = tempfile::tempdir().unwrap();
        let a = FileBlobStore::open(dir.path()).unwrap();
        let b = FileBlobStore::open(dir.path()).unwrap();

        let g = a.write("shared", "t", b"from a", Generation::ABSENT).unwrap();
        assert_eq!(b.read("shared").unwrap().generation, g);

        let g2 = b.write("shared", "t", b"from b", g).unwrap();
        let err = a.write("shared", "t", b"stale", g).unwrap_err();
        assert!(err.is_precondition_failure());
        assert_eq!(a.read("shared").unwrap().generation, g2);
    }
}
