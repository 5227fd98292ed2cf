// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::recording_client;
use crate::config::Options;
use crate::entry::DirectoryEntry;
use crate::error::Error;
use crate::testing::RecordingBackend;

async fn seed_x(backend: &RecordingBackend) {
    let memory = backend.memory();
    memory.create_file("/x/f1", b"1").await.unwrap();
    memory.create_file("/x/f2", b"22").await.unwrap();
    memory.create_file("/x/y/f3", b"333").await.unwrap();
}

fn sorted_paths(entries: &[DirectoryEntry]) -> Vec<String> {
    let mut paths: Vec<_> = entries.iter().map(|e| e.path.clone()).collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_single_level_listing() {
    let (backend, client) = recording_client();
    seed_x(&backend).await;

    let entries = client.list("/x", Options::default()).await.unwrap();
    assert_eq!(sorted_paths(&entries), vec!["/x/f1", "/x/f2", "/x/y"]);
    assert_eq!(backend.calls().list, 1);
}

#[tokio::test]
async fn test_recursive_listing_aggregates_subtrees() {
    let (backend, client) = recording_client();
    seed_x(&backend).await;

    let listing = client.list_report("/x", Options::recursive()).await.unwrap();
    assert!(listing.is_complete());
    assert_eq!(
        sorted_paths(&listing.entries),
        vec!["/x/f1", "/x/f2", "/x/y", "/x/y/f3"]
    );
    let f3 = listing
        .entries
        .iter()
        .find(|e| e.path == "/x/y/f3")
        .unwrap();
    assert_eq!(f3.size, 3);
    assert!(f3.is_file());
    assert_eq!(backend.calls().list, 2);
}

#[tokio::test]
async fn test_every_directory_listed_once() {
    let (backend, client) = recording_client();
    let memory = backend.memory();
    for dir in ["/t/a/b/c", "/t/a/d", "/t/e"] {
        memory.create_dir(dir).await.unwrap();
    }
    memory.create_file("/t/a/b/c/leaf", b"x").await.unwrap();

    let entries = client.list("/t", Options::recursive()).await.unwrap();
    // a, b, c, leaf, d, e
    assert_eq!(entries.len(), 6);
    // /t, /t/a, /t/a/b, /t/a/b/c, /t/a/d, /t/e
    assert_eq!(backend.calls().list, 6);
}

#[tokio::test]
async fn test_nested_failure_keeps_partial_results() {
    let (backend, client) = recording_client();
    seed_x(&backend).await;
    backend.fail_list("/x/y");

    let listing = client.list_report("/x", Options::recursive()).await.unwrap();
    assert_eq!(sorted_paths(&listing.entries), vec!["/x/f1", "/x/f2", "/x/y"]);
    assert_eq!(listing.failures.len(), 1);
    assert_eq!(listing.failures[0].path, "/x/y");
    assert!(matches!(listing.failures[0].error, Error::Backend(_)));

    let entries = client.list("/x", Options::recursive()).await.unwrap();
    assert_eq!(entries.len(), 3);
}

#[tokio::test]
async fn test_top_level_failure_is_an_error() {
    let (backend, client) = recording_client();
    seed_x(&backend).await;
    backend.fail_list("/x");

    assert!(matches!(
        client.list("/x", Options::recursive()).await,
        Err(Error::Backend(_))
    ));
    assert!(matches!(
        client.list("/x/f1", Options::default()).await,
        Err(Error::NotADirectory(_))
    ));
}
