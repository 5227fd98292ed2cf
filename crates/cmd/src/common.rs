// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use diagnostics::log_debug;
use remotefs::{Client, ClientConfig, DirectoryEntry, EntryKind, HostmountBackend};

/// Environment variable naming the hostmount root when neither `--root`
/// nor the config file provides one.
pub const ROOT_ENV: &str = "REMOTEFS_ROOT";

/// Where a command finds its configuration and backend root.
#[derive(Debug, Clone, Default)]
pub struct RfsContext {
    pub root: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
}

impl RfsContext {
    #[must_use]
    pub fn new(root: Option<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self { root, config_path }
    }

    /// Config file if one was named, otherwise defaults with environment
    /// overrides.
    pub fn load_config(&self) -> Result<ClientConfig> {
        match &self.config_path {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(ClientConfig::default().with_env_overrides()?),
        }
    }

    /// Root precedence: `--root`, then the config file, then `REMOTEFS_ROOT`.
    pub fn resolve_root(&self, config: &ClientConfig) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        if let Some(root) = &config.root {
            return Ok(root.clone());
        }
        env::var(ROOT_ENV).map(PathBuf::from).map_err(|_| {
            anyhow!("No root directory: pass --root, set root in the config file, or set {ROOT_ENV}")
        })
    }

    pub fn create_client(&self) -> Result<Client> {
        let config = self.load_config()?;
        let root = self.resolve_root(&config)?;
        let root_display = root.display().to_string();
        log_debug!("Mounting {root}", root: &root_display);
        let backend = HostmountBackend::new(&root)
            .with_context(|| format!("Cannot mount {}", root.display()))?;
        Ok(Client::new(Arc::new(backend), config)?)
    }
}

/// Helper function to format file sizes
#[must_use]
pub fn format_file_size(size: u64) -> String {
    if size >= 1024 * 1024 {
        format!("{:.1}MB", size as f64 / (1024.0 * 1024.0))
    } else if size >= 1024 {
        format!("{:.1}KB", size as f64 / 1024.0)
    } else {
        format!("{}B", size)
    }
}

/// `rwxr-xr-x` style rendering of the low nine permission bits.
#[must_use]
pub fn format_permissions(kind: EntryKind, mode: u16) -> String {
    let mut out = String::with_capacity(10);
    out.push(if kind == EntryKind::Directory { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

fn format_time(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// One `ls` line. The long form adds permissions, ownership and mtime.
#[must_use]
pub fn format_entry(entry: &DirectoryEntry, long: bool) -> String {
    if !long {
        return entry.path.clone();
    }
    let size = if entry.is_dir() {
        "-".to_string()
    } else {
        format_file_size(entry.size)
    };
    format!(
        "{} {:>8} {:>8} {:>8} {} {}",
        format_permissions(entry.kind, entry.permissions),
        entry.owner,
        entry.group,
        size,
        format_time(entry.last_modified),
        entry.path
    )
}
