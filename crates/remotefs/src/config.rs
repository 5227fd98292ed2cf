// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Client configuration and per-call options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read chunk bound used when a call does not specify one (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Size of local reads feeding `copy_from_local_path` (64 KiB).
pub const DEFAULT_LOCAL_CHUNK_SIZE: usize = 64 * 1024;

pub const HOST_ENV: &str = "REMOTEFS_HOST";
pub const PORT_ENV: &str = "REMOTEFS_PORT";

fn default_host() -> String {
    "default".to_string()
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_local_chunk_size() -> usize {
    DEFAULT_LOCAL_CHUNK_SIZE
}

/// Settings shared by every operation of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Namenode host; `"default"` selects the backend's configured default
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default)]
    pub port: u16,

    /// Upper bound on a single remote read
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Size of each local read when uploading
    #[serde(default = "default_local_chunk_size")]
    pub local_chunk_size: usize,

    /// Host directory served by the hostmount backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
            local_chunk_size: DEFAULT_LOCAL_CHUNK_SIZE,
            root: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config = Self::from_yaml(&content)?;
        config.with_env_overrides()
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: ClientConfig = serde_yaml_ng::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse YAML configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `REMOTEFS_HOST` and `REMOTEFS_PORT` on top of this configuration.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(host) = std::env::var(HOST_ENV) {
            self.host = host;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            self.port = port
                .parse()
                .map_err(|_| Error::Config(format!("{} is not a port: {}", PORT_ENV, port)))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(Error::Config("host cannot be empty".to_string()));
        }
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be greater than 0".to_string()));
        }
        if self.local_chunk_size == 0 {
            return Err(Error::Config(
                "local_chunk_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Options recognized by individual operations.
///
/// Every field defaults to the most conservative behavior: no recursion, no
/// forcing, and the client's configured buffer size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// `list`: descend into subdirectories. `rm`: delete non-empty directories.
    pub recursive: bool,
    /// `rm`: skip the path-shape and emptiness guards.
    pub force: bool,
    /// `read` and copies: bound on a single remote read.
    pub buffer_size: Option<usize>,
}

impl Options {
    #[must_use]
    pub fn recursive() -> Self {
        Self {
            recursive: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = Some(buffer_size);
        self
    }

    pub(crate) fn buffer_size_or(&self, default: usize) -> usize {
        self.buffer_size.filter(|&n| n > 0).unwrap_or(default)
    }
}
