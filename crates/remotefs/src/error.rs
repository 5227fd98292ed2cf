// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::handle::FileHandle;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the I/O engine and its backends.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected to {host}:{port}: {message}")]
    Connection {
        host: String,
        port: u16,
        message: String,
    },

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Entry already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Directory not empty: {}", .0.display())]
    NotEmpty(PathBuf),

    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Invalid file handle: {0}")]
    InvalidHandle(FileHandle),

    #[error("Handle {handle} was opened without {mode} access")]
    AccessMode { handle: FileHandle, mode: &'static str },

    #[error("Short write on handle {handle}: {written} of {expected} bytes")]
    ShortWrite {
        handle: FileHandle,
        expected: usize,
        written: usize,
    },

    #[error("Writer is already closed")]
    WriterClosed,

    #[error("rm {}: {violation}", .path.display())]
    Policy {
        path: PathBuf,
        violation: PolicyViolation,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons the guarded remover refuses a request.
///
/// These are reported before anything destructive reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("refuses relative path")]
    RelativePath,

    #[error("refuses root or first-level folder")]
    RootOrFirstLevel,

    #[error("does not exist")]
    DoesNotExist,

    #[error("directory not empty")]
    DirectoryNotEmpty,

    #[error("not a directory")]
    NotADirectory,
}

impl Error {
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotFound(path.into())
    }

    pub fn not_a_file<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotAFile(path.into())
    }

    pub fn not_a_directory<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotADirectory(path.into())
    }

    pub fn already_exists<P: Into<PathBuf>>(path: P) -> Self {
        Error::AlreadyExists(path.into())
    }

    pub fn not_empty<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotEmpty(path.into())
    }

    pub fn invalid_path<P: Into<PathBuf>>(path: P) -> Self {
        Error::InvalidPath(path.into())
    }

    pub fn policy<P: Into<PathBuf>>(path: P, violation: PolicyViolation) -> Self {
        Error::Policy {
            path: path.into(),
            violation,
        }
    }

    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::Backend(message.into())
    }

    /// The remove policy rejection carried by this error, if any.
    #[must_use]
    pub fn policy_violation(&self) -> Option<PolicyViolation> {
        match self {
            Error::Policy { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}
