//! Line-delimited JSON framing for whole collections.
//!
//! A collection is stored as one blob: one JSON object per line, lines
//! joined with `\n`, no trailing newline. An empty collection is zero bytes.
//! Records serialize their fields in declaration order, so re-encoding a
//! decoded blob reproduces it byte for byte.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// MIME type recorded alongside collection blobs.
pub const CONTENT_TYPE: &str = "application/x-ndjson";

/// Errors from encoding or decoding a collection.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A line is not a valid record. `line` is 1-based.
    #[error("line {line}: {reason}")]
    Decode { line: usize, reason: String },

    /// A record could not be serialized.
    #[error("record {index}: {reason}")]
    Encode { index: usize, reason: String },
}

/// Encode `records` as newline-joined JSON objects.
pub fn encode<T: Serialize>(records: &[T]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if index > 0 {
            out.push(b'\n');
        }
        serde_json::to_writer(&mut out, record).map_err(|e| CodecError::Encode {
            index,
            reason: e.to_string(),
        })?;
    }
    Ok(out)
}

/// Decode a collection blob.
///
/// Blank lines (including a trailing newline) are skipped. The first line
/// that fails to parse aborts the whole decode.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, CodecError> {
    let mut records = Vec::new();
    for (idx, line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let record = serde_json::from_slice(line).map_err(|e| CodecError::Decode {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
