// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use futures::TryStreamExt;
use remotefs::Options;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::common::RfsContext;

/// Stream a remote file to `out`, returning the byte count.
pub async fn cat_command<W>(ctx: &RfsContext, path: &str, out: &mut W) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let client = ctx.create_client()?;
    let reader = client.read(path, Options::default()).await?;
    let mut chunks = std::pin::pin!(reader.into_chunks());

    let mut total = 0u64;
    while let Some(chunk) = chunks.try_next().await? {
        out.write_all(&chunk)
            .await
            .context("Failed to write output")?;
        total += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(total)
}
