use std::fmt;
use std::fs::Metadata;
use std::time::{SystemTime, UNIX_EPOCH};

use bincode::{Decode, Encode};

use crate::ext::{ModeStringExt, SystemTimeExt};

/// SHA-256 digest of a regular file's contents.
pub type ContentHash = [u8; 32];

/// Last-modification time, stored as seconds and nanoseconds since the unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct ModifiedTime {
    seconds: i64,
    nanos: u32,
}

impl ModifiedTime {
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }
}

impl From<SystemTime> for ModifiedTime {
    fn from(time: SystemTime) -> Self {
        let (seconds, nanos) = time.to_unix_parts();
        Self::new(seconds, nanos)
    }
}

impl fmt::Display for ModifiedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match jiff::Timestamp::new(self.seconds, self.nanos as i32) {
            Ok(timestamp) => write!(f, "{timestamp}"),
            Err(_) => write!(f, "{}.{:09}s", self.seconds, self.nanos),
        }
    }
}

/// Captured state of one filesystem entry.
///
/// `children` is `Some` only for directories and keeps the order in which
/// the directory listing returned its entries. `hash` is `Some` only for
/// regular files.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Node {
    pub name: String,
    pub size: u64,
    pub mode: String,
    pub mtime: ModifiedTime,
    pub children: Option<Vec<Node>>,
    pub hash: Option<ContentHash>,
}

impl Node {
    /// Builds a childless, hashless node from an entry's own metadata.
    pub fn leaf(name: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            name: name.into(),
            size: metadata.len(),
            mode: metadata.mode_string(),
            // Platforms without mtime support are rendered as the epoch
            mtime: metadata.modified().unwrap_or(UNIX_EPOCH).into(),
            children: None,
            hash: None,
        }
    }

    pub fn directory(name: impl Into<String>, metadata: &Metadata, children: Vec<Node>) -> Self {
        Self {
            children: Some(children),
            ..Self::leaf(name, metadata)
        }
    }

    /// True if this is a directory with at least one entry.
    pub fn has_children(&self) -> bool {
        self.children.as_ref().is_some_and(|children| !children.is_empty())
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn hash_hex(&self) -> String {
        self.hash.map(hex::encode).unwrap_or_default()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (size {}, mode {}, mtime {}, hash {})",
            self.name,
            self.size,
            self.mode,
            self.mtime,
            self.hash_hex()
        )
    }
}
