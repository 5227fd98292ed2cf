// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Kind of a remote path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(EntryKind::File),
            "directory" => Ok(EntryKind::Directory),
            other => Err(format!("Unknown entry kind: {}", other)),
        }
    }
}

/// Snapshot of one path as reported by `stat` or `list`.
///
/// Entries carry no ownership: they are plain values describing the remote
/// state at the moment of the call that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Absolute remote path
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Length in bytes (0 for directories)
    pub size: u64,
    pub replication: u16,
    pub block_size: u64,
    pub owner: String,
    pub group: String,
    /// Permission bits, e.g. `0o755`
    pub permissions: u16,
    /// Seconds since the Unix epoch
    pub last_modified: i64,
    /// Seconds since the Unix epoch
    pub last_accessed: i64,
}

impl DirectoryEntry {
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Final path component, or `/` for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        crate::path::basename(&self.path).unwrap_or("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, kind: EntryKind) -> DirectoryEntry {
        DirectoryEntry {
            path: path.to_string(),
            kind,
            size: 3,
            replication: 1,
            block_size: 128 * 1024 * 1024,
            owner: "hdfs".to_string(),
            group: "supergroup".to_string(),
            permissions: 0o644,
            last_modified: 1_700_000_000,
            last_accessed: 1_700_000_000,
        }
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        assert_eq!("file".parse::<EntryKind>(), Ok(EntryKind::File));
        assert_eq!("directory".parse::<EntryKind>(), Ok(EntryKind::Directory));
        assert!("symlink".parse::<EntryKind>().is_err());
        assert_eq!(EntryKind::Directory.to_string(), "directory");
    }

    #[test]
    fn test_entry_serializes_kind_as_type() {
        let json = serde_json::to_value(entry("/x/f1", EntryKind::File)).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["path"], "/x/f1");
        assert_eq!(json["permissions"], 0o644);
    }

    #[test]
    fn test_name() {
        assert_eq!(entry("/x/y", EntryKind::Directory).name(), "y");
        assert_eq!(entry("/", EntryKind::Directory).name(), "/");
        assert!(entry("/x/y", EntryKind::Directory).is_dir());
        assert!(entry("/x/f", EntryKind::File).is_file());
    }
}
