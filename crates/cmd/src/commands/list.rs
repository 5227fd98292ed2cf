// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Result, bail};
use diagnostics::log_warn;
use remotefs::Options;

use crate::common::{RfsContext, format_entry};

pub async fn list_command(
    ctx: &RfsContext,
    path: &str,
    recursive: bool,
    long: bool,
    mut output: impl FnMut(String),
) -> Result<()> {
    let client = ctx.create_client()?;
    let options = Options {
        recursive,
        ..Options::default()
    };
    let mut listing = client.list_report(path, options).await?;

    // Sort results by path for consistent output
    listing.entries.sort_by(|a, b| a.path.cmp(&b.path));
    for entry in &listing.entries {
        output(format_entry(entry, long));
    }

    if !listing.is_complete() {
        for failure in &listing.failures {
            let error = failure.error.to_string();
            log_warn!("Could not list {path}: {error}", path: &failure.path, error: error);
        }
        let skipped: Vec<_> = listing.failures.iter().map(|f| f.path.as_str()).collect();
        bail!("Listing of {} is incomplete; skipped {}", path, skipped.join(", "));
    }
    Ok(())
}
