// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;

use crate::common::{RfsContext, format_entry};

/// Print one entry, as JSON when `json` is set.
pub async fn stat_command(
    ctx: &RfsContext,
    path: &str,
    json: bool,
    mut output: impl FnMut(String),
) -> Result<()> {
    let client = ctx.create_client()?;
    let entry = client.stat(path).await?;
    if json {
        output(serde_json::to_string_pretty(&entry)?);
    } else {
        output(format_entry(&entry, true));
    }
    Ok(())
}
