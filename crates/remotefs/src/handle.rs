// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::entry::DirectoryEntry;
use crate::error::Result;
use crate::flags::OpenFlags;
use async_trait::async_trait;
use bytes::Bytes;

/// Opaque identifier for an open remote file.
///
/// A handle belongs to the reader or writer that opened it and becomes
/// invalid once `close` completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle(u64);

impl FileHandle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fh#{}", self.0)
    }
}

/// The native client boundary consumed by the engine.
///
/// Implementations wrap a distributed filesystem client (or a stand-in such
/// as [`MemoryBackend`](crate::MemoryBackend)). Each call completes exactly
/// once; none of them streams partial results.
#[async_trait]
pub trait HandleInterface: Send + Sync {
    async fn connect(&self, host: &str, port: u16) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;

    async fn stat(&self, path: &str) -> Result<DirectoryEntry>;
    async fn exists(&self, path: &str) -> Result<bool>;

    async fn open(&self, path: &str, flags: OpenFlags) -> Result<FileHandle>;
    async fn close(&self, handle: FileHandle) -> Result<()>;

    /// Positional read of up to `max_len` bytes. An empty result means end
    /// of file.
    async fn read(&self, handle: FileHandle, offset: u64, max_len: usize) -> Result<Bytes>;

    /// Append `data` at the handle's position, returning the bytes accepted.
    async fn write(&self, handle: FileHandle, data: Bytes) -> Result<usize>;

    /// Entries directly inside `path`.
    async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>>;

    /// Create `path` and any missing parents.
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Delete `path`. A non-empty directory requires `recursive`.
    async fn rm(&self, path: &str, recursive: bool) -> Result<()>;
}
