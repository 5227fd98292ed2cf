// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Coalescing streaming writes.
//!
//! Producers call [`StreamWriter::write`] whenever they like, including
//! before the remote open has completed. The bytes land in a pending buffer
//! owned by a driver task. The driver keeps at most one backend `write` in
//! flight: whenever it is idle and bytes are pending, the entire buffer is
//! snapshotted into a single call. Bytes that arrive during a flush wait for
//! the next one, so flush order always equals append order.
//!
//! The handle is closed only after an `end` request has been seen, nothing
//! is pending and nothing is in flight.

use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::handle::{FileHandle, HandleInterface};
use bytes::{Bytes, BytesMut};
use diagnostics::{log_debug, log_warn};
use futures::FutureExt;
use futures::future::{BoxFuture, OptionFuture};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Lifecycle events of a [`StreamWriter`].
#[derive(Debug)]
pub enum WriterEvent {
    /// The remote file is open; buffered bytes start flowing.
    Open(FileHandle),
    /// One flush completed with this many bytes.
    Write(usize),
    /// Terminal event, after the handle is closed (or was never opened).
    Close(Option<Error>),
}

#[derive(Debug)]
enum WriterCommand {
    Data(Bytes),
    End,
}

/// Cloneable producer side of a [`StreamWriter`].
#[derive(Debug, Clone)]
pub struct WriteSink {
    commands: mpsc::UnboundedSender<WriterCommand>,
}

impl WriteSink {
    /// Queue bytes for the remote file. Never waits for a flush.
    ///
    /// Empty input is a no-op. Fails once the writer has ended or closed.
    pub fn write(&self, data: impl Into<Bytes>) -> Result<()> {
        let data = data.into();
        if data.is_empty() {
            return Ok(());
        }
        self.commands
            .send(WriterCommand::Data(data))
            .map_err(|_| Error::WriterClosed)
    }

    /// Request the close. Pending bytes are flushed first.
    pub fn end(&self) {
        // A closed channel means the driver already finished.
        _ = self.commands.send(WriterCommand::End);
    }
}

/// Writer for one remote file.
///
/// Dropping every producer without calling `end` still flushes and closes.
pub struct StreamWriter {
    path: String,
    sink: WriteSink,
    events: mpsc::UnboundedReceiver<WriterEvent>,
}

impl StreamWriter {
    /// Start the driver task. Must be called within a tokio runtime.
    pub(crate) fn spawn(backend: Arc<dyn HandleInterface>, path: &str, flags: OpenFlags) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let driver = WriteDriver {
            backend,
            path: path.to_string(),
            commands: command_rx,
            events: event_tx,
        };
        _ = tokio::spawn(driver.run(flags));
        Self {
            path: path.to_string(),
            sink: WriteSink {
                commands: command_tx,
            },
            events: event_rx,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn write(&self, data: impl Into<Bytes>) -> Result<()> {
        self.sink.write(data)
    }

    pub fn end(&self) {
        self.sink.end();
    }

    #[must_use]
    pub fn sink(&self) -> WriteSink {
        self.sink.clone()
    }

    /// Next lifecycle event; `None` after `Close` has been delivered.
    pub async fn next_event(&mut self) -> Option<WriterEvent> {
        self.events.recv().await
    }

    /// End the writer and wait for the close, returning the bytes flushed.
    pub async fn finish(mut self) -> Result<u64> {
        self.end();
        let mut total = 0u64;
        while let Some(event) = self.next_event().await {
            match event {
                WriterEvent::Open(_) => {}
                WriterEvent::Write(n) => total += n as u64,
                WriterEvent::Close(Some(e)) => return Err(e),
                WriterEvent::Close(None) => return Ok(total),
            }
        }
        Err(Error::WriterClosed)
    }
}

/// Pending bytes and close intent of one writer.
#[derive(Default)]
struct WriteBuffer {
    pending: BytesMut,
    close_requested: bool,
}

impl WriteBuffer {
    fn append(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
    }

    /// Take everything pending as one snapshot, leaving the buffer empty.
    fn take(&mut self) -> Option<Bytes> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.split().freeze())
        }
    }
}

type Flush = BoxFuture<'static, (usize, Result<usize>)>;

struct WriteDriver {
    backend: Arc<dyn HandleInterface>,
    path: String,
    commands: mpsc::UnboundedReceiver<WriterCommand>,
    events: mpsc::UnboundedSender<WriterEvent>,
}

impl WriteDriver {
    fn emit(&self, event: WriterEvent) {
        // The consumer may have dropped the writer; the file is still closed.
        _ = self.events.send(event);
    }

    async fn run(mut self, flags: OpenFlags) {
        if !flags.is_writable() {
            self.commands.close();
            let bits = flags.bits();
            self.emit(WriterEvent::Close(Some(Error::Config(format!(
                "open flags {:#06x} do not grant write access",
                bits
            )))));
            return;
        }

        let handle = match self.backend.open(&self.path, flags).await {
            Ok(handle) => handle,
            Err(e) => {
                self.commands.close();
                self.emit(WriterEvent::Close(Some(e)));
                return;
            }
        };
        let path = &self.path;
        let fh = handle.id();
        log_debug!("Opened {path} for writing as {fh}", path: path, fh: fh);
        self.emit(WriterEvent::Open(handle));

        let failure = self.pump(handle).await;
        self.commands.close();

        let close = self.backend.close(handle).await;
        let path = &self.path;
        let outcome = match (failure, close) {
            (Some(e), Ok(())) => Some(e),
            (Some(e), Err(close_err)) => {
                let error = close_err.to_string();
                log_warn!("Close after failed write to {path} also failed: {error}", path: path, error: error);
                Some(e)
            }
            (None, Err(close_err)) => Some(close_err),
            (None, Ok(())) => None,
        };
        log_debug!("Closed {path}", path: path);
        self.emit(WriterEvent::Close(outcome));
    }

    /// Move bytes from producers to the handle until the writer ends or a
    /// flush fails. Returns the failure, if any.
    async fn pump(&mut self, handle: FileHandle) -> Option<Error> {
        let mut buffer = WriteBuffer::default();
        let mut in_flight: Option<Flush> = None;

        loop {
            if in_flight.is_none() {
                match buffer.take() {
                    Some(snapshot) => in_flight = Some(self.flush(handle, snapshot)),
                    None if buffer.close_requested => return None,
                    None => {}
                }
            }

            tokio::select! {
                Some((expected, result)) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    match result {
                        Ok(written) => {
                            self.emit(WriterEvent::Write(written));
                            if written != expected {
                                return Some(Error::ShortWrite { handle, expected, written });
                            }
                        }
                        Err(e) => return Some(e),
                    }
                }
                command = self.commands.recv(), if !buffer.close_requested => {
                    match command {
                        Some(WriterCommand::Data(data)) => buffer.append(&data),
                        // Every producer dropped counts as an end request.
                        Some(WriterCommand::End) | None => {
                            buffer.close_requested = true;
                            self.commands.close();
                        }
                    }
                }
                else => return None,
            }
        }
    }

    fn flush(&self, handle: FileHandle, snapshot: Bytes) -> Flush {
        let backend = self.backend.clone();
        let expected = snapshot.len();
        let path = &self.path;
        log_debug!("Flushing {expected} bytes to {path}", expected: expected, path: path);
        async move { (expected, backend.write(handle, snapshot).await) }.boxed()
    }
}
