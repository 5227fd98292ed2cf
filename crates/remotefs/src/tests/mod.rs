// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

mod client_tests;
mod lister_tests;
mod remover_tests;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::testing::RecordingBackend;
use std::sync::Arc;

/// A client over a fresh recording backend, plus the backend for seeding.
fn recording_client() -> (Arc<RecordingBackend>, Client) {
    client_over(RecordingBackend::new())
}

fn client_over(backend: RecordingBackend) -> (Arc<RecordingBackend>, Client) {
    let backend = Arc::new(backend);
    let client = Client::new(backend.clone(), ClientConfig::new("namenode", 8020))
        .expect("default config is valid");
    (backend, client)
}
