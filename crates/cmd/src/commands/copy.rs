// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use remotefs::{Options, path};

use crate::common::RfsContext;

/// Upload `local` to `remote`. A remote directory (or a path ending in
/// `/`) receives the file under its local name.
pub async fn put_command(
    ctx: &RfsContext,
    local: &Path,
    remote: &str,
    buffer_size: Option<usize>,
) -> Result<u64> {
    let client = ctx.create_client()?;
    let into_dir = remote.ends_with('/')
        || (client.exists(remote).await? && client.stat(remote).await?.is_dir());
    let target = if into_dir {
        let name = local
            .file_name()
            .ok_or_else(|| anyhow!("{} has no file name", local.display()))?;
        path::join(remote, &name.to_string_lossy())
    } else {
        remote.to_string()
    };
    let options = Options {
        buffer_size,
        ..Options::default()
    };
    Ok(client.copy_from_local_path(local, &target, options).await?)
}

/// Download `remote` to `local`. A local directory receives the file
/// under its remote name.
pub async fn get_command(
    ctx: &RfsContext,
    remote: &str,
    local: &Path,
    buffer_size: Option<usize>,
) -> Result<u64> {
    let client = ctx.create_client()?;
    let target: PathBuf = if local.is_dir() {
        let name =
            path::basename(remote).ok_or_else(|| anyhow!("{} has no file name", remote))?;
        local.join(name)
    } else {
        local.to_path_buf()
    };
    let options = Options {
        buffer_size,
        ..Options::default()
    };
    Ok(client.copy_to_local_path(remote, &target, options).await?)
}
