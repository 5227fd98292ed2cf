// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Streaming I/O over a handle-based remote filesystem client.
//!
//! A [`HandleInterface`] implementation supplies single-shot operations
//! (open, positional read, write, close, list, ...). On top of it this crate
//! provides pull-driven [`StreamReader`]s, coalescing [`StreamWriter`]s with a
//! single write in flight, recursive listing, guarded deletes and copies
//! between remote and local files, all reachable from a [`Client`].

mod client;
mod config;
mod copy;
mod entry;
mod error;
mod flags;
mod handle;
mod hostmount;
mod lister;
mod memory;
pub mod path;
mod reader;
mod remover;
mod session;
mod writer;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use client::Client;
pub use config::{
    ClientConfig, DEFAULT_BUFFER_SIZE, DEFAULT_LOCAL_CHUNK_SIZE, HOST_ENV, Options, PORT_ENV,
};
pub use copy::{from_local, to_local};
pub use entry::{DirectoryEntry, EntryKind};
pub use error::{Error, PolicyViolation, Result};
pub use flags::OpenFlags;
pub use handle::{FileHandle, HandleInterface};
pub use hostmount::HostmountBackend;
pub use lister::{ListFailure, Listing, list};
pub use memory::MemoryBackend;
pub use reader::{ReaderEvent, StreamReader};
pub use remover::{DeletionRequest, remove, remove_dir};
pub use session::Session;
pub use writer::{StreamWriter, WriteSink, WriterEvent};
