// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::recording_client;
use crate::client::Client;
use crate::config::{ClientConfig, Options};
use crate::entry::EntryKind;
use crate::error::Error;
use crate::testing::RecordingBackend;
use std::sync::Arc;

#[tokio::test]
async fn test_first_operation_connects_once() {
    let (backend, client) = recording_client();
    backend.memory().create_file("/a/f", b"x").await.unwrap();

    assert!(client.exists("/a/f").await.unwrap());
    assert_eq!(client.stat("/a/f").await.unwrap().size, 1);
    assert_eq!(backend.calls().connect, 1);
    assert!(client.session().is_connected().await);
    assert!(backend.memory().is_connected().await);
}

#[tokio::test]
async fn test_concurrent_first_operations_connect_once() {
    let (backend, client) = recording_client();
    backend.memory().create_dir("/a").await.unwrap();

    let (stat, exists, list) = tokio::join!(
        client.stat("/a"),
        client.exists("/a"),
        client.list("/a", Options::default())
    );
    assert!(stat.unwrap().is_dir());
    assert!(exists.unwrap());
    assert!(list.unwrap().is_empty());
    assert_eq!(backend.calls().connect, 1);
}

#[tokio::test]
async fn test_disconnect_then_reconnect() {
    let (backend, client) = recording_client();
    client.connect().await.unwrap();
    client.connect().await.unwrap();
    client.disconnect().await.unwrap();
    assert!(!backend.memory().is_connected().await);

    client.mkdir("/a/b").await.unwrap();
    assert_eq!(backend.calls().connect, 2);
    assert_eq!(backend.calls().disconnect, 1);
}

#[tokio::test]
async fn test_mkdir_and_stat() {
    let (_backend, client) = recording_client();
    client.mkdir("/p/q/r").await.unwrap();

    let entry = client.stat("/p/q").await.unwrap();
    assert_eq!(entry.kind, EntryKind::Directory);
    assert_eq!(entry.name(), "q");
    assert!(matches!(client.stat("/p/z").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_configured_buffer_size_is_the_default() {
    let backend = Arc::new(RecordingBackend::new());
    backend.memory().create_file("/f", vec![1u8; 10]).await.unwrap();
    let config = ClientConfig {
        buffer_size: 4,
        ..ClientConfig::default()
    };
    let client = Client::new(backend.clone(), config).unwrap();

    let content = client
        .read("/f", Options::default())
        .await
        .unwrap()
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(content.len(), 10);
    assert_eq!(backend.calls().read, 3);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ClientConfig {
        buffer_size: 0,
        ..ClientConfig::default()
    };
    let result = Client::new(Arc::new(RecordingBackend::new()), config);
    assert!(matches!(result, Err(Error::Config(_))));
}
