//! Blob key validation.
//!
//! Keys double as relative file paths in [`FileBlobStore`](crate::FileBlobStore),
//! so the same rules apply to every backend:
//! - Must be non-empty
//! - Must not contain whitespace, `\`, `:`, `*`, `?`
//! - Must not start or end with `/`, or contain `//`
//! - Components between slashes must not start with `.` (this also rules out `..`)
//! - Must not end with `.lock` or `.tmp` (reserved by the file backend)

use crate::error::{StoreError, StoreResult};

/// Characters that are forbidden anywhere in a key.
const FORBIDDEN_CHARS: &[char] = &['\\', ':', '*', '?'];

/// Suffixes the file backend uses for its own sidecar files.
const RESERVED_SUFFIXES: &[&str] = &[".lock", ".tmp"];

fn invalid(key: &str, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Validate a blob key, returning `Ok(())` if it is usable by every backend.
///
/// # Examples
///
/// ```
/// use huddle_store::keys::validate_blob_key;
///
/// assert!(validate_blob_key("events.jsonl").is_ok());
/// assert!(validate_blob_key("history/C123.jsonl").is_ok());
/// assert!(validate_blob_key("").is_err());
/// assert!(validate_blob_key("../etc/passwd").is_err());
/// ```
pub fn validate_blob_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(invalid(key, "key must not be empty"));
    }

    if key.chars().any(char::is_whitespace) {
        return Err(invalid(key, "must not contain whitespace"));
    }

    for ch in FORBIDDEN_CHARS {
        if key.contains(*ch) {
            return Err(invalid(key, format!("contains forbidden character: {ch:?}")));
        }
    }

    if key.starts_with('/') || key.ends_with('/') {
        return Err(invalid(key, "must not start or end with '/'"));
    }

    if key.contains("//") {
        return Err(invalid(key, "must not contain consecutive slashes '//'"));
    }

    for component in key.split('/') {
        if component.starts_with('.') {
            return Err(invalid(
                key,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }

    for suffix in RESERVED_SUFFIXES {
        if key.ends_with(suffix) {
            return Err(invalid(key, format!("must not end with {suffix:?}")));
        }
    }

    Ok(())
}
