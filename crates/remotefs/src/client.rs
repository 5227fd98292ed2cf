// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::{ClientConfig, Options};
use crate::copy;
use crate::entry::DirectoryEntry;
use crate::error::Result;
use crate::flags::OpenFlags;
use crate::handle::HandleInterface;
use crate::lister::{self, Listing};
use crate::reader::StreamReader;
use crate::remover::{self, DeletionRequest};
use crate::session::Session;
use crate::writer::StreamWriter;
use std::path::Path;
use std::sync::Arc;

/// Entry point to the engine: one session over one backend.
///
/// Every operation first ensures the session is connected. That call is a
/// no-op once connected, so callers may also connect explicitly up front.
pub struct Client {
    backend: Arc<dyn HandleInterface>,
    session: Session,
    config: ClientConfig,
}

impl Client {
    pub fn new(backend: Arc<dyn HandleInterface>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            backend,
            session: Session::new(config.host.clone(), config.port),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn connect(&self) -> Result<()> {
        self.session.connect(self.backend.as_ref()).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.session.disconnect(self.backend.as_ref()).await
    }

    pub async fn stat(&self, path: &str) -> Result<DirectoryEntry> {
        self.connect().await?;
        self.backend.stat(path).await
    }

    pub async fn exists(&self, path: &str) -> Result<bool> {
        self.connect().await?;
        self.backend.exists(path).await
    }

    /// Stream the file at `path`. The remote open happens on the first
    /// [`StreamReader::next_event`].
    pub async fn read(&self, path: &str, options: Options) -> Result<StreamReader> {
        self.connect().await?;
        let buffer_size = options.buffer_size_or(self.config.buffer_size);
        Ok(StreamReader::new(self.backend.clone(), path, buffer_size))
    }

    /// Open `path` for writing with `flags` (see [`OpenFlags::for_write`]).
    pub async fn write(&self, path: &str, flags: OpenFlags) -> Result<StreamWriter> {
        self.connect().await?;
        Ok(StreamWriter::spawn(self.backend.clone(), path, flags))
    }

    pub async fn append(&self, path: &str) -> Result<StreamWriter> {
        self.write(path, OpenFlags::for_append()).await
    }

    /// Entries under `path`. Subtrees that fail during a recursive walk are
    /// skipped; use [`list_report`](Self::list_report) to see them.
    pub async fn list(&self, path: &str, options: Options) -> Result<Vec<DirectoryEntry>> {
        Ok(self.list_report(path, options).await?.entries)
    }

    pub async fn list_report(&self, path: &str, options: Options) -> Result<Listing> {
        self.connect().await?;
        lister::list(self.backend.as_ref(), path, options.recursive).await
    }

    pub async fn mkdir(&self, path: &str) -> Result<()> {
        self.connect().await?;
        self.backend.mkdir(path).await
    }

    pub async fn rm(&self, path: &str, options: Options) -> Result<()> {
        self.connect().await?;
        remover::remove(self.backend.as_ref(), &DeletionRequest::new(path, &options)).await
    }

    pub async fn rmdir(&self, path: &str, options: Options) -> Result<()> {
        self.connect().await?;
        remover::remove_dir(self.backend.as_ref(), &DeletionRequest::new(path, &options)).await
    }

    /// Copy the remote `src` into the local file `dst`, returning bytes copied.
    pub async fn copy_to_local_path(&self, src: &str, dst: &Path, options: Options) -> Result<u64> {
        let reader = self.read(src, options).await?;
        copy::to_local(reader, dst).await
    }

    /// Copy the local file `src` to the remote `dst`, returning bytes written.
    pub async fn copy_from_local_path(&self, src: &Path, dst: &str, options: Options) -> Result<u64> {
        let writer = self.write(dst, OpenFlags::for_write()).await?;
        let chunk_size = options.buffer_size_or(self.config.local_chunk_size);
        copy::from_local(writer, src, chunk_size).await
    }
}
