// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! A [`HandleInterface`] wrapper that counts calls and injects failures.

use crate::entry::DirectoryEntry;
use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::handle::{FileHandle, HandleInterface};
use crate::memory::MemoryBackend;
use crate::path;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Number of calls seen per operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub connect: usize,
    pub disconnect: usize,
    pub stat: usize,
    pub exists: usize,
    pub open: usize,
    pub close: usize,
    pub read: usize,
    pub write: usize,
    pub list: usize,
    pub mkdir: usize,
    pub rm: usize,
}

#[derive(Debug, Default)]
struct Recording {
    calls: CallCounts,
    /// Payload of every write, in issue order.
    writes: Vec<Bytes>,
    /// Paths passed to `rm`, with the recursive flag.
    removed: Vec<(String, bool)>,
    in_flight: HashMap<FileHandle, usize>,
    max_in_flight: usize,
    failing_lists: HashSet<String>,
    fail_reads_after: Option<usize>,
    short_writes: bool,
    fail_close: bool,
}

#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    recording: Arc<Mutex<Recording>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            inner: MemoryBackend::new().with_latency(latency),
            recording: Arc::default(),
        }
    }

    /// The wrapped backend, for seeding and inspecting content.
    pub fn memory(&self) -> &MemoryBackend {
        &self.inner
    }

    fn record(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.recording.lock().unwrap()
    }

    pub fn calls(&self) -> CallCounts {
        self.record().calls
    }

    pub fn writes(&self) -> Vec<Bytes> {
        self.record().writes.clone()
    }

    pub fn removed(&self) -> Vec<(String, bool)> {
        self.record().removed.clone()
    }

    /// Largest number of writes ever outstanding on a single handle.
    pub fn max_writes_in_flight(&self) -> usize {
        self.record().max_in_flight
    }

    /// Make `list` of `p` fail with a backend error.
    pub fn fail_list(&self, p: &str) {
        _ = self.record().failing_lists.insert(path::normalize(p));
    }

    /// Let `successful` reads through, then fail every read.
    pub fn fail_reads_after(&self, successful: usize) {
        self.record().fail_reads_after = Some(successful);
    }

    /// Report one byte fewer than requested on every write.
    pub fn short_writes(&self) {
        self.record().short_writes = true;
    }

    /// Close the handle, then report failure.
    pub fn fail_close(&self) {
        self.record().fail_close = true;
    }
}

#[async_trait]
impl HandleInterface for RecordingBackend {
    async fn connect(&self, host: &str, port: u16) -> Result<()> {
        self.record().calls.connect += 1;
        self.inner.connect(host, port).await
    }

    async fn disconnect(&self) -> Result<()> {
        self.record().calls.disconnect += 1;
        self.inner.disconnect().await
    }

    async fn stat(&self, p: &str) -> Result<DirectoryEntry> {
        self.record().calls.stat += 1;
        self.inner.stat(p).await
    }

    async fn exists(&self, p: &str) -> Result<bool> {
        self.record().calls.exists += 1;
        self.inner.exists(p).await
    }

    async fn open(&self, p: &str, flags: OpenFlags) -> Result<FileHandle> {
        self.record().calls.open += 1;
        self.inner.open(p, flags).await
    }

    async fn close(&self, handle: FileHandle) -> Result<()> {
        let fail = {
            let mut record = self.record();
            record.calls.close += 1;
            record.fail_close
        };
        self.inner.close(handle).await?;
        if fail {
            return Err(Error::backend("injected close failure"));
        }
        Ok(())
    }

    async fn read(&self, handle: FileHandle, offset: u64, max_len: usize) -> Result<Bytes> {
        let fail = {
            let mut record = self.record();
            record.calls.read += 1;
            matches!(record.fail_reads_after, Some(n) if record.calls.read > n)
        };
        if fail {
            return Err(Error::backend("injected read failure"));
        }
        self.inner.read(handle, offset, max_len).await
    }

    async fn write(&self, handle: FileHandle, data: Bytes) -> Result<usize> {
        let short = {
            let mut record = self.record();
            record.calls.write += 1;
            record.writes.push(data.clone());
            let outstanding = record.in_flight.entry(handle).or_default();
            *outstanding += 1;
            let outstanding = *outstanding;
            record.max_in_flight = record.max_in_flight.max(outstanding);
            record.short_writes
        };
        let len = data.len();
        let result = self.inner.write(handle, data).await;
        if let Some(outstanding) = self.record().in_flight.get_mut(&handle) {
            *outstanding -= 1;
        }
        match result {
            Ok(n) if short => Ok(n.min(len.saturating_sub(1))),
            other => other,
        }
    }

    async fn list(&self, p: &str) -> Result<Vec<DirectoryEntry>> {
        let fail = {
            let mut record = self.record();
            record.calls.list += 1;
            record.failing_lists.contains(&path::normalize(p))
        };
        if fail {
            return Err(Error::backend(format!("injected list failure for {p}")));
        }
        self.inner.list(p).await
    }

    async fn mkdir(&self, p: &str) -> Result<()> {
        self.record().calls.mkdir += 1;
        self.inner.mkdir(p).await
    }

    async fn rm(&self, p: &str, recursive: bool) -> Result<()> {
        {
            let mut record = self.record();
            record.calls.rm += 1;
            record.removed.push((p.to_string(), recursive));
        }
        self.inner.rm(p, recursive).await
    }
}
