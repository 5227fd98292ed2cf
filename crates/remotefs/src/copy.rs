// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pipelines between the local filesystem and remote streams.

use crate::error::{Error, Result};
use crate::reader::{ReaderEvent, StreamReader};
use crate::writer::{StreamWriter, WriterEvent};
use bytes::BytesMut;
use diagnostics::{log_debug, log_info, log_warn};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Drain `reader` into a new local file at `dst`.
///
/// The local file is created before the first remote read is issued.
pub async fn to_local(mut reader: StreamReader, dst: &Path) -> Result<u64> {
    let mut local = tokio::fs::File::create(dst).await?;
    let dst_display = dst.display().to_string();
    log_debug!("Local destination {dst} ready", dst: &dst_display);

    let mut copied = 0u64;
    let mut failure = None;
    while let Some(event) = reader.next_event().await {
        match event {
            ReaderEvent::Open(_) => {}
            ReaderEvent::Data(chunk) => {
                if let Err(e) = local.write_all(&chunk).await {
                    failure = Some(Error::Io(e));
                    break;
                }
                copied += chunk.len() as u64;
            }
            ReaderEvent::End(end) => {
                failure = end;
                break;
            }
        }
    }

    if let Some(e) = failure {
        // After a local write failure the remote handle is still open.
        if let Err(close_err) = reader.close().await {
            let error = close_err.to_string();
            log_warn!("Close after failed copy to {dst} also failed: {error}", dst: &dst_display, error: error);
        }
        return Err(e);
    }

    local.flush().await?;
    local.sync_all().await?;
    let src = reader.path();
    log_info!("Copied {copied} bytes from {src} to {dst}", copied: copied, src: src, dst: &dst_display);
    Ok(copied)
}

/// Feed the local file at `src` into `writer`, returning bytes flushed.
///
/// The local file is opened only after the remote open succeeded.
pub async fn from_local(mut writer: StreamWriter, src: &Path, chunk_size: usize) -> Result<u64> {
    match writer.next_event().await {
        Some(WriterEvent::Open(_)) => {}
        Some(WriterEvent::Close(Some(e))) => return Err(e),
        _ => return Err(Error::WriterClosed),
    }

    let feed = feed_local(&writer, src, chunk_size.max(1)).await;
    writer.end();

    let mut written = 0u64;
    let mut outcome = None;
    while let Some(event) = writer.next_event().await {
        match event {
            WriterEvent::Open(_) => {}
            WriterEvent::Write(n) => written += n as u64,
            WriterEvent::Close(close) => {
                outcome = Some(close);
                break;
            }
        }
    }

    match (feed, outcome) {
        // The driver stops accepting bytes when a flush fails; its close
        // outcome carries the cause.
        (Err(Error::WriterClosed), Some(Some(e))) => Err(e),
        (Err(e), _) => Err(e),
        (Ok(()), Some(Some(e))) => Err(e),
        (Ok(()), Some(None)) => {
            let dst = writer.path();
            let src_display = src.display().to_string();
            log_info!("Copied {written} bytes from {src} to {dst}", written: written, src: &src_display, dst: dst);
            Ok(written)
        }
        (Ok(()), None) => Err(Error::WriterClosed),
    }
}

async fn feed_local(writer: &StreamWriter, src: &Path, chunk_size: usize) -> Result<()> {
    let mut local = tokio::fs::File::open(src).await?;
    loop {
        let mut chunk = BytesMut::with_capacity(chunk_size);
        let n = (&mut local).take(chunk_size as u64).read_buf(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        writer.write(chunk.freeze())?;
    }
}
