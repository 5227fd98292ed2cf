// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use diagnostics::{log_debug, log_info};

use crate::common::RfsContext;

pub async fn mkdir_command(ctx: &RfsContext, path: &str) -> Result<()> {
    log_debug!("Creating directory: {path}", path: path);
    let client = ctx.create_client()?;
    client.mkdir(path).await?;
    log_info!("Directory created successfully: {path}", path: path);
    Ok(())
}
