// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory [`HandleInterface`] implementation.
//!
//! Used by the test suites and as a reference for backend authors. It keeps
//! the whole namespace in a `BTreeMap` keyed by normalized absolute path and
//! enforces the same handle rules a native client would: operations require
//! a connection, handles are single-use, and writable opens without
//! `APPEND` start from an empty file.

use crate::entry::{DirectoryEntry, EntryKind};
use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::handle::{FileHandle, HandleInterface};
use crate::path;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const DEFAULT_REPLICATION: u16 = 3;
const DEFAULT_BLOCK_SIZE: u64 = 128 * 1024 * 1024;
const OWNER: &str = "remotefs";
const GROUP: &str = "supergroup";

#[derive(Debug, Clone)]
enum MemoryNode {
    File { content: Vec<u8>, modified: i64 },
    Directory { modified: i64 },
}

#[derive(Debug, Clone)]
struct OpenFile {
    path: String,
    flags: OpenFlags,
}

#[derive(Debug)]
struct State {
    connected: Option<(String, u16)>,
    nodes: BTreeMap<String, MemoryNode>,
    handles: HashMap<FileHandle, OpenFile>,
    next_handle: u64,
}

impl Default for State {
    fn default() -> Self {
        Self {
            connected: None,
            nodes: BTreeMap::from([("/".to_string(), MemoryNode::Directory { modified: now() })]),
            handles: HashMap::new(),
            next_handle: 1,
        }
    }
}

/// Namespace and handle table held entirely in memory.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn absolute(p: &str) -> Result<String> {
    if !path::is_absolute(p) {
        return Err(Error::invalid_path(p));
    }
    Ok(path::normalize(p))
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every read and write by `latency`, so that callers observe
    /// genuinely outstanding requests.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Seed a file, creating parent directories. Works without a connection.
    pub async fn create_file(&self, p: &str, content: impl AsRef<[u8]>) -> Result<()> {
        let p = absolute(p)?;
        let mut state = self.state.lock().await;
        if let Some(parent) = path::parent(&p) {
            state.mkdir_all(&parent)?;
        }
        if let Some(MemoryNode::Directory { .. }) = state.nodes.get(&p) {
            return Err(Error::not_a_file(&p));
        }
        _ = state.nodes.insert(
            p,
            MemoryNode::File {
                content: content.as_ref().to_vec(),
                modified: now(),
            },
        );
        Ok(())
    }

    /// Seed a directory and its parents. Works without a connection.
    pub async fn create_dir(&self, p: &str) -> Result<()> {
        let p = absolute(p)?;
        self.state.lock().await.mkdir_all(&p)
    }

    /// Current content of a file, if it exists.
    pub async fn content(&self, p: &str) -> Option<Vec<u8>> {
        let p = path::normalize(p);
        match self.state.lock().await.nodes.get(&p) {
            Some(MemoryNode::File { content, .. }) => Some(content.clone()),
            _ => None,
        }
    }

    /// Number of handles not yet closed.
    pub async fn open_handles(&self) -> usize {
        self.state.lock().await.handles.len()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.lock().await.connected.is_some()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl State {
    fn require_connection(&self) -> Result<()> {
        if self.connected.is_none() {
            return Err(Error::Connection {
                host: String::new(),
                port: 0,
                message: "connect has not been called".to_string(),
            });
        }
        Ok(())
    }

    fn mkdir_all(&mut self, p: &str) -> Result<()> {
        let mut current = String::new();
        for segment in path::segments(p) {
            current.push('/');
            current.push_str(segment);
            match self.nodes.get(&current) {
                Some(MemoryNode::Directory { .. }) => {}
                Some(MemoryNode::File { .. }) => return Err(Error::not_a_directory(&current)),
                None => {
                    _ = self
                        .nodes
                        .insert(current.clone(), MemoryNode::Directory { modified: now() });
                }
            }
        }
        Ok(())
    }

    fn entry(&self, p: &str) -> Result<DirectoryEntry> {
        let node = self.nodes.get(p).ok_or_else(|| Error::not_found(p))?;
        let (kind, size, permissions, modified) = match node {
            MemoryNode::File { content, modified } => {
                (EntryKind::File, content.len() as u64, 0o644, *modified)
            }
            MemoryNode::Directory { modified } => (EntryKind::Directory, 0, 0o755, *modified),
        };
        Ok(DirectoryEntry {
            path: p.to_string(),
            kind,
            size,
            replication: if kind == EntryKind::File { DEFAULT_REPLICATION } else { 0 },
            block_size: if kind == EntryKind::File { DEFAULT_BLOCK_SIZE } else { 0 },
            owner: OWNER.to_string(),
            group: GROUP.to_string(),
            permissions,
            last_modified: modified,
            last_accessed: modified,
        })
    }

    fn children(&self, dir: &str) -> Vec<String> {
        let prefix = if dir == "/" { "/".to_string() } else { format!("{}/", dir) };
        self.nodes
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter(|(k, _)| k.len() > prefix.len() && !k[prefix.len()..].contains('/'))
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn open_file(&self, handle: FileHandle) -> Result<OpenFile> {
        self.handles
            .get(&handle)
            .cloned()
            .ok_or(Error::InvalidHandle(handle))
    }
}

#[async_trait]
impl HandleInterface for MemoryBackend {
    async fn connect(&self, host: &str, port: u16) -> Result<()> {
        self.state.lock().await.connected = Some((host.to_string(), port));
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().await.connected = None;
        Ok(())
    }

    async fn stat(&self, p: &str) -> Result<DirectoryEntry> {
        let p = absolute(p)?;
        let state = self.state.lock().await;
        state.require_connection()?;
        state.entry(&p)
    }

    async fn exists(&self, p: &str) -> Result<bool> {
        let state = self.state.lock().await;
        state.require_connection()?;
        Ok(state.nodes.contains_key(&path::normalize(p)))
    }

    async fn open(&self, p: &str, flags: OpenFlags) -> Result<FileHandle> {
        let p = absolute(p)?;
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.require_connection()?;

        match state.nodes.get_mut(&p) {
            Some(MemoryNode::Directory { .. }) => return Err(Error::not_a_file(&p)),
            Some(MemoryNode::File { content, modified }) => {
                if flags.truncates() {
                    content.clear();
                    *modified = now();
                }
            }
            None => {
                if !flags.is_writable() || !flags.contains(OpenFlags::CREAT) {
                    return Err(Error::not_found(&p));
                }
                let parent = path::parent(&p).unwrap_or_else(|| "/".to_string());
                match state.nodes.get(&parent) {
                    Some(MemoryNode::Directory { .. }) => {}
                    Some(MemoryNode::File { .. }) => return Err(Error::not_a_directory(&parent)),
                    None => return Err(Error::not_found(&parent)),
                }
                _ = state.nodes.insert(
                    p.clone(),
                    MemoryNode::File {
                        content: Vec::new(),
                        modified: now(),
                    },
                );
            }
        }

        let handle = FileHandle::new(state.next_handle);
        state.next_handle += 1;
        _ = state.handles.insert(handle, OpenFile { path: p, flags });
        Ok(handle)
    }

    async fn close(&self, handle: FileHandle) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .handles
            .remove(&handle)
            .map(|_| ())
            .ok_or(Error::InvalidHandle(handle))
    }

    async fn read(&self, handle: FileHandle, offset: u64, max_len: usize) -> Result<Bytes> {
        self.delay().await;
        let state = self.state.lock().await;
        let open = state.open_file(handle)?;
        if !open.flags.is_readable() {
            return Err(Error::AccessMode { handle, mode: "read" });
        }
        match state.nodes.get(&open.path) {
            Some(MemoryNode::File { content, .. }) => {
                let start = usize::try_from(offset).unwrap_or(usize::MAX).min(content.len());
                let end = start.saturating_add(max_len).min(content.len());
                Ok(Bytes::copy_from_slice(&content[start..end]))
            }
            _ => Err(Error::not_found(&open.path)),
        }
    }

    async fn write(&self, handle: FileHandle, data: Bytes) -> Result<usize> {
        self.delay().await;
        let mut state = self.state.lock().await;
        let open = state.open_file(handle)?;
        if !open.flags.is_writable() {
            return Err(Error::AccessMode { handle, mode: "write" });
        }
        match state.nodes.get_mut(&open.path) {
            Some(MemoryNode::File { content, modified }) => {
                content.extend_from_slice(&data);
                *modified = now();
                Ok(data.len())
            }
            _ => Err(Error::not_found(&open.path)),
        }
    }

    async fn list(&self, p: &str) -> Result<Vec<DirectoryEntry>> {
        let p = absolute(p)?;
        let state = self.state.lock().await;
        state.require_connection()?;
        match state.nodes.get(&p) {
            Some(MemoryNode::Directory { .. }) => {}
            Some(MemoryNode::File { .. }) => return Err(Error::not_a_directory(&p)),
            None => return Err(Error::not_found(&p)),
        }
        state
            .children(&p)
            .iter()
            .map(|child| state.entry(child))
            .collect()
    }

    async fn mkdir(&self, p: &str) -> Result<()> {
        let p = absolute(p)?;
        let mut state = self.state.lock().await;
        state.require_connection()?;
        state.mkdir_all(&p)
    }

    async fn rm(&self, p: &str, recursive: bool) -> Result<()> {
        let p = absolute(p)?;
        let mut state = self.state.lock().await;
        state.require_connection()?;
        match state.nodes.get(&p) {
            None => return Err(Error::not_found(&p)),
            Some(MemoryNode::Directory { .. }) => {
                if !recursive && !state.children(&p).is_empty() {
                    return Err(Error::not_empty(&p));
                }
            }
            Some(MemoryNode::File { .. }) => {}
        }

        let prefix = if p == "/" { "/".to_string() } else { format!("{}/", p) };
        state.nodes.retain(|k, _| !k.starts_with(&prefix));
        if p != "/" {
            _ = state.nodes.remove(&p);
        }
        Ok(())
    }
}
