// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use crate::handle::HandleInterface;
use diagnostics::{log_debug, log_info};
use tokio::sync::Mutex;

/// Connection state of one client.
///
/// `connect` is idempotent: the backend is contacted only while the session
/// is disconnected. The flag is guarded by an async mutex so that concurrent
/// first operations still connect exactly once.
pub struct Session {
    host: String,
    port: u16,
    connected: Mutex<bool>,
}

impl Session {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connected: Mutex::new(false),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn is_connected(&self) -> bool {
        *self.connected.lock().await
    }

    /// Connect through `backend` unless already connected.
    pub async fn connect(&self, backend: &dyn HandleInterface) -> Result<()> {
        let mut connected = self.connected.lock().await;
        if *connected {
            return Ok(());
        }
        let host = &self.host;
        let port = self.port;
        backend.connect(host, port).await?;
        *connected = true;
        log_info!("Connected to {host}:{port}", host: host, port: port);
        Ok(())
    }

    pub async fn disconnect(&self, backend: &dyn HandleInterface) -> Result<()> {
        let mut connected = self.connected.lock().await;
        if !*connected {
            log_debug!("Disconnect on an idle session is a no-op");
            return Ok(());
        }
        backend.disconnect().await?;
        *connected = false;
        let host = &self.host;
        log_info!("Disconnected from {host}", host: host);
        Ok(())
    }
}
