// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! [`HandleInterface`] over a directory of the host filesystem.
//!
//! The configured root maps to remote `/`. Remote paths never escape the
//! root: `..` components are rejected, and so is any path whose deepest
//! existing component resolves outside the root through a symlink.

use crate::entry::{DirectoryEntry, EntryKind};
use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::handle::{FileHandle, HandleInterface};
use crate::path;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use diagnostics::log_debug;
use std::collections::HashMap;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

struct HostFile {
    file: Mutex<File>,
    flags: OpenFlags,
}

/// Host filesystem backend rooted at one directory.
pub struct HostmountBackend {
    root: PathBuf,
    connected: AtomicBool,
    handles: Mutex<HashMap<FileHandle, Arc<HostFile>>>,
    next_handle: AtomicU64,
}

impl HostmountBackend {
    /// Create a backend rooted at `root`, which must be an existing directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let canonical = root.canonicalize().map_err(|e| {
            Error::Config(format!("hostmount root '{}' cannot be resolved: {}", root.display(), e))
        })?;
        if !canonical.is_dir() {
            return Err(Error::Config(format!(
                "hostmount root '{}' is not a directory",
                canonical.display()
            )));
        }
        Ok(Self {
            root: canonical,
            connected: AtomicBool::new(false),
            handles: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn require_connection(&self) -> Result<()> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(Error::Connection {
                host: "hostmount".to_string(),
                port: 0,
                message: "connect has not been called".to_string(),
            });
        }
        Ok(())
    }

    /// Map an absolute remote path onto the host, returning both forms.
    fn resolve(&self, p: &str) -> Result<(String, PathBuf)> {
        if !path::is_absolute(p) {
            return Err(Error::invalid_path(p));
        }
        let mut host = self.root.clone();
        for segment in path::segments(p) {
            if segment == "." || segment == ".." {
                return Err(Error::invalid_path(p));
            }
            host.push(segment);
        }
        self.confine(p, &host)?;
        Ok((path::normalize(p), host))
    }

    /// Refuse `host` when its deepest existing ancestor resolves outside
    /// the root. A dangling symlink on the way counts as an escape.
    fn confine(&self, p: &str, host: &Path) -> Result<()> {
        for ancestor in host.ancestors() {
            match std::fs::canonicalize(ancestor) {
                Ok(real) if real.starts_with(&self.root) => return Ok(()),
                Ok(_) => break,
                Err(_) if std::fs::symlink_metadata(ancestor).is_ok() => break,
                Err(_) => continue,
            }
        }
        Err(Error::invalid_path(p))
    }

    async fn handle(&self, handle: FileHandle) -> Result<Arc<HostFile>> {
        self.handles
            .lock()
            .await
            .get(&handle)
            .cloned()
            .ok_or(Error::InvalidHandle(handle))
    }
}

fn io_error(remote: &str, e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::NotFound => Error::not_found(remote),
        ErrorKind::AlreadyExists => Error::already_exists(remote),
        ErrorKind::DirectoryNotEmpty => Error::not_empty(remote),
        ErrorKind::NotADirectory => Error::not_a_directory(remote),
        ErrorKind::IsADirectory => Error::not_a_file(remote),
        _ => Error::Io(e),
    }
}

fn epoch_seconds(time: std::io::Result<SystemTime>) -> i64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(unix)]
fn ownership(metadata: &std::fs::Metadata) -> (String, String, u16) {
    use std::os::unix::fs::MetadataExt;
    (
        metadata.uid().to_string(),
        metadata.gid().to_string(),
        (metadata.mode() & 0o777) as u16,
    )
}

#[cfg(not(unix))]
fn ownership(metadata: &std::fs::Metadata) -> (String, String, u16) {
    let mode = if metadata.permissions().readonly() { 0o444 } else { 0o644 };
    (String::new(), String::new(), mode)
}

fn to_entry(remote: String, metadata: &std::fs::Metadata) -> DirectoryEntry {
    let kind = if metadata.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };
    let (owner, group, permissions) = ownership(metadata);
    DirectoryEntry {
        path: remote,
        kind,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        replication: 1,
        block_size: 0,
        owner,
        group,
        permissions,
        last_modified: epoch_seconds(metadata.modified()),
        last_accessed: epoch_seconds(metadata.accessed()),
    }
}

#[async_trait]
impl HandleInterface for HostmountBackend {
    async fn connect(&self, _host: &str, _port: u16) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(Error::Connection {
                host: "hostmount".to_string(),
                port: 0,
                message: format!("{} is no longer a directory", self.root.display()),
            });
        }
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn stat(&self, p: &str) -> Result<DirectoryEntry> {
        self.require_connection()?;
        let (remote, host) = self.resolve(p)?;
        let metadata = tokio::fs::metadata(&host)
            .await
            .map_err(|e| io_error(&remote, e))?;
        Ok(to_entry(remote, &metadata))
    }

    async fn exists(&self, p: &str) -> Result<bool> {
        self.require_connection()?;
        let (_, host) = self.resolve(p)?;
        Ok(tokio::fs::try_exists(&host).await?)
    }

    async fn open(&self, p: &str, flags: OpenFlags) -> Result<FileHandle> {
        self.require_connection()?;
        let (remote, host) = self.resolve(p)?;
        if let Ok(metadata) = tokio::fs::metadata(&host).await {
            if metadata.is_dir() {
                return Err(Error::not_a_file(&remote));
            }
        }

        let writable = flags.is_writable();
        let file = OpenOptions::new()
            .read(flags.is_readable())
            .write(writable)
            .append(writable && flags.contains(OpenFlags::APPEND))
            .create(writable && flags.contains(OpenFlags::CREAT))
            .truncate(flags.truncates())
            .open(&host)
            .await
            .map_err(|e| io_error(&remote, e))?;

        let handle = FileHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        _ = self.handles.lock().await.insert(
            handle,
            Arc::new(HostFile {
                file: Mutex::new(file),
                flags,
            }),
        );
        let fh = handle.id();
        log_debug!("Opened {remote} as fh#{fh}", remote: &remote, fh: fh);
        Ok(handle)
    }

    async fn close(&self, handle: FileHandle) -> Result<()> {
        let open = self
            .handles
            .lock()
            .await
            .remove(&handle)
            .ok_or(Error::InvalidHandle(handle))?;
        let mut file = open.file.lock().await;
        if open.flags.is_writable() {
            file.flush().await?;
        }
        Ok(())
    }

    async fn read(&self, handle: FileHandle, offset: u64, max_len: usize) -> Result<Bytes> {
        let open = self.handle(handle).await?;
        if !open.flags.is_readable() {
            return Err(Error::AccessMode { handle, mode: "read" });
        }
        let mut file = open.file.lock().await;
        _ = file.seek(SeekFrom::Start(offset)).await?;
        let mut buf = BytesMut::with_capacity(max_len);
        let mut limited = (&mut *file).take(max_len as u64);
        while limited.read_buf(&mut buf).await? > 0 {}
        Ok(buf.freeze())
    }

    async fn write(&self, handle: FileHandle, data: Bytes) -> Result<usize> {
        let open = self.handle(handle).await?;
        if !open.flags.is_writable() {
            return Err(Error::AccessMode { handle, mode: "write" });
        }
        let mut file = open.file.lock().await;
        file.write_all(&data).await?;
        Ok(data.len())
    }

    async fn list(&self, p: &str) -> Result<Vec<DirectoryEntry>> {
        self.require_connection()?;
        let (remote, host) = self.resolve(p)?;
        let metadata = tokio::fs::metadata(&host)
            .await
            .map_err(|e| io_error(&remote, e))?;
        if !metadata.is_dir() {
            return Err(Error::not_a_directory(&remote));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&host).await?;
        while let Some(child) = dir.next_entry().await? {
            let name = child.file_name().to_string_lossy().into_owned();
            let metadata = child.metadata().await?;
            entries.push(to_entry(path::join(&remote, &name), &metadata));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn mkdir(&self, p: &str) -> Result<()> {
        self.require_connection()?;
        let (remote, host) = self.resolve(p)?;
        tokio::fs::create_dir_all(&host)
            .await
            .map_err(|e| io_error(&remote, e))
    }

    async fn rm(&self, p: &str, recursive: bool) -> Result<()> {
        self.require_connection()?;
        let (remote, host) = self.resolve(p)?;
        let metadata = tokio::fs::symlink_metadata(&host)
            .await
            .map_err(|e| io_error(&remote, e))?;

        if !metadata.is_dir() {
            return tokio::fs::remove_file(&host)
                .await
                .map_err(|e| io_error(&remote, e));
        }

        if host == self.root {
            // The mount point itself stays; only its contents go.
            let mut dir = tokio::fs::read_dir(&host).await?;
            if !recursive && dir.next_entry().await?.is_some() {
                return Err(Error::not_empty(&remote));
            }
            let mut dir = tokio::fs::read_dir(&host).await?;
            while let Some(child) = dir.next_entry().await? {
                if child.file_type().await?.is_dir() {
                    tokio::fs::remove_dir_all(child.path()).await?;
                } else {
                    tokio::fs::remove_file(child.path()).await?;
                }
            }
            return Ok(());
        }

        let removed = if recursive {
            tokio::fs::remove_dir_all(&host).await
        } else {
            tokio::fs::remove_dir(&host).await
        };
        removed.map_err(|e| io_error(&remote, e))
    }
}
