// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pull-driven streaming reads.
//!
//! A [`StreamReader`] turns one path into the event sequence
//! `Open`, `Data`*, `End`. Nothing happens until the consumer asks for the
//! next event, and each request issues at most one backend call, so there is
//! never more than one read outstanding per reader.

use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::handle::{FileHandle, HandleInterface};
use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use diagnostics::{log_debug, log_warn};
use futures::Stream;
use std::sync::Arc;

/// Lifecycle events of a [`StreamReader`].
#[derive(Debug)]
pub enum ReaderEvent {
    /// The file was opened; data follows.
    Open(FileHandle),
    /// The next chunk, in file order.
    Data(Bytes),
    /// Terminal event. `Some` carries the failure that ended the stream.
    End(Option<Error>),
}

enum ReadState {
    Opening,
    Reading { handle: FileHandle },
    /// A short chunk was delivered; only the close remains.
    Draining { handle: FileHandle },
    Done,
}

/// Sequential reader over one remote file.
///
/// Forward-only and not restartable: once `End` has been returned,
/// [`next_event`](Self::next_event) yields `None`.
pub struct StreamReader {
    backend: Arc<dyn HandleInterface>,
    path: String,
    buffer_size: usize,
    offset: u64,
    state: ReadState,
}

impl StreamReader {
    pub(crate) fn new(backend: Arc<dyn HandleInterface>, path: &str, buffer_size: usize) -> Self {
        Self {
            backend,
            path: path.to_string(),
            buffer_size: buffer_size.max(1),
            offset: 0,
            state: ReadState::Opening,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bytes delivered so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Advance the state machine by one step.
    pub async fn next_event(&mut self) -> Option<ReaderEvent> {
        match std::mem::replace(&mut self.state, ReadState::Done) {
            ReadState::Done => None,
            ReadState::Opening => Some(self.open().await),
            ReadState::Reading { handle } => Some(self.read_chunk(handle).await),
            ReadState::Draining { handle } => Some(self.finish(handle, None).await),
        }
    }

    async fn open(&mut self) -> ReaderEvent {
        match self.backend.open(&self.path, OpenFlags::RDONLY).await {
            Ok(handle) => {
                let path = &self.path;
                let fh = handle.id();
                log_debug!("Opened {path} for reading as {fh}", path: path, fh: fh);
                self.state = ReadState::Reading { handle };
                ReaderEvent::Open(handle)
            }
            Err(e) => ReaderEvent::End(Some(e)),
        }
    }

    async fn read_chunk(&mut self, handle: FileHandle) -> ReaderEvent {
        match self.backend.read(handle, self.offset, self.buffer_size).await {
            Ok(chunk) if chunk.is_empty() => self.finish(handle, None).await,
            Ok(chunk) => {
                self.offset += chunk.len() as u64;
                self.state = if chunk.len() < self.buffer_size {
                    ReadState::Draining { handle }
                } else {
                    ReadState::Reading { handle }
                };
                ReaderEvent::Data(chunk)
            }
            Err(e) => self.finish(handle, Some(e)).await,
        }
    }

    /// Close the handle, then report the terminal event.
    async fn finish(&mut self, handle: FileHandle, failure: Option<Error>) -> ReaderEvent {
        self.state = ReadState::Done;
        let close = match &failure {
            // The handle is already gone; closing it again cannot succeed.
            Some(Error::InvalidHandle(_)) => Ok(()),
            _ => self.backend.close(handle).await,
        };
        let path = &self.path;
        let bytes = self.offset;
        log_debug!("Finished reading {path} after {bytes} bytes", path: path, bytes: bytes);
        match (failure, close) {
            (Some(e), Ok(())) => ReaderEvent::End(Some(e)),
            (Some(e), Err(close_err)) => {
                let error = close_err.to_string();
                log_warn!("Close after failed read of {path} also failed: {error}", path: path, error: error);
                ReaderEvent::End(Some(e))
            }
            (None, Err(close_err)) => ReaderEvent::End(Some(close_err)),
            (None, Ok(())) => ReaderEvent::End(None),
        }
    }

    /// Stop early, closing the handle if it is open. A reader that already
    /// delivered `End` (or never opened) has nothing to close.
    pub async fn close(mut self) -> Result<()> {
        let handle = match std::mem::replace(&mut self.state, ReadState::Done) {
            ReadState::Reading { handle } | ReadState::Draining { handle } => handle,
            ReadState::Opening | ReadState::Done => return Ok(()),
        };
        let path = &self.path;
        let bytes = self.offset;
        log_debug!("Closing {path} early after {bytes} bytes", path: path, bytes: bytes);
        self.backend.close(handle).await
    }

    /// Adapt the reader into a stream of chunks. The `Open` event is
    /// swallowed and a failing `End` becomes the stream's final `Err`.
    pub fn into_chunks(mut self) -> impl Stream<Item = Result<Bytes>> + Send {
        try_stream! {
            while let Some(event) = self.next_event().await {
                match event {
                    ReaderEvent::Open(_) => {}
                    ReaderEvent::Data(chunk) => yield chunk,
                    ReaderEvent::End(Some(e)) => Err::<(), Error>(e)?,
                    ReaderEvent::End(None) => break,
                }
            }
        }
    }

    /// Drain the whole file into memory.
    pub async fn read_to_end(mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(event) = self.next_event().await {
            match event {
                ReaderEvent::Open(_) => {}
                ReaderEvent::Data(chunk) => buffer.extend_from_slice(&chunk),
                ReaderEvent::End(Some(e)) => return Err(e),
                ReaderEvent::End(None) => break,
            }
        }
        Ok(buffer.freeze())
    }
}

/// Dropping a reader that still holds an open handle closes it on the
/// current runtime.
impl Drop for StreamReader {
    fn drop(&mut self) {
        let handle = match std::mem::replace(&mut self.state, ReadState::Done) {
            ReadState::Reading { handle } | ReadState::Draining { handle } => handle,
            ReadState::Opening | ReadState::Done => return,
        };
        let path = self.path.clone();
        let fh = handle.id();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let backend = self.backend.clone();
                _ = runtime.spawn(async move {
                    if let Err(e) = backend.close(handle).await {
                        let error = e.to_string();
                        log_warn!("Close of dropped reader for {path} failed: {error}", path: &path, error: error);
                    }
                });
            }
            Err(_) => {
                log_warn!("Reader for {path} dropped outside a runtime; fh#{fh} stays open", path: &path, fh: fh);
            }
        }
    }
}
