//! File identifier generation for NoteDesk
//!
//! Every document in the workspace is addressed by an opaque, globally
//! unique id. Ids are generated once at record creation and never change,
//! even across renames and moves; they are what the durable index and the
//! session views key on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque unique identifier for a workspace file.
///
/// Wraps a v4 UUID. Serializes as its hyphenated string form, which is
/// also the key format used in the durable index snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    /// Generate a fresh, globally unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(FileId::generate()));
        }
    }

    #[test]
    fn test_display_parse_roundtrip() {
        let id = FileId::generate();
        let parsed: FileId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<FileId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = FileId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let back: FileId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
