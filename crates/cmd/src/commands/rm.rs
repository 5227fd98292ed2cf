// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use remotefs::Options;

use crate::common::RfsContext;

pub async fn rm_command(ctx: &RfsContext, path: &str, recursive: bool, force: bool) -> Result<()> {
    let client = ctx.create_client()?;
    let options = Options {
        recursive,
        force,
        ..Options::default()
    };
    client.rm(path, options).await?;
    Ok(())
}

pub async fn rmdir_command(ctx: &RfsContext, path: &str) -> Result<()> {
    let client = ctx.create_client()?;
    client.rmdir(path, Options::default()).await?;
    Ok(())
}
