//! Generation numbers and versioned reads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque version marker attached to a stored blob.
///
/// Only equality is part of the contract. [`Generation::ABSENT`] (0) stands
/// for "no such blob" both in reads and as a create precondition.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    /// The generation of a blob that does not exist.
    pub const ABSENT: Generation = Generation(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Returns `true` for [`Generation::ABSENT`].
    pub const fn is_absent(self) -> bool {
        self.0 == 0
    }

    /// The generation that follows this one, or `None` once the counter
    /// is exhausted.
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Generation({})", self.0)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// The result of reading a key: the current bytes and their generation.
///
/// An absent key reads as `bytes: None` with [`Generation::ABSENT`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Versioned {
    pub bytes: Option<Vec<u8>>,
    pub content_type: Option<String>,
    pub generation: Generation,
}

impl Versioned {
    /// A read of a key that does not exist.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Returns `true` if the key did not exist.
    pub fn is_absent(&self) -> bool {
        self.generation.is_absent()
    }

    /// The stored bytes, or an empty slice for an absent key.
    pub fn bytes_or_empty(&self) -> &[u8] {
        self.bytes.as_deref().unwrap_or_default()
    }
}
