// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use super::recording_client;
use crate::config::Options;
use crate::error::{Error, PolicyViolation};
use crate::testing::RecordingBackend;

async fn seed(backend: &RecordingBackend) {
    let memory = backend.memory();
    memory.create_file("/a/b/f", b"x").await.unwrap();
    memory.create_dir("/a/empty").await.unwrap();
    memory.create_file("/a/file", b"y").await.unwrap();
}

fn violation(result: crate::error::Result<()>) -> PolicyViolation {
    match result {
        Err(e) => e
            .policy_violation()
            .unwrap_or_else(|| panic!("expected a policy violation, got {}", e)),
        Ok(()) => panic!("expected a policy violation, got success"),
    }
}

#[tokio::test]
async fn test_shape_guards_run_before_any_backend_call() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    for (path, expected) in [
        ("/", PolicyViolation::RootOrFirstLevel),
        ("/a", PolicyViolation::RootOrFirstLevel),
        ("a/b", PolicyViolation::RelativePath),
    ] {
        assert_eq!(violation(client.rm(path, Options::recursive()).await), expected);
    }
    assert_eq!(backend.calls().exists, 0);
    assert_eq!(backend.calls().rm, 0);
    assert!(backend.memory().content("/a/file").await.is_some());
}

#[tokio::test]
async fn test_missing_target() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    assert_eq!(
        violation(client.rm("/a/missing", Options::default()).await),
        PolicyViolation::DoesNotExist
    );
    let err = client.rm("/a/missing", Options::default()).await.unwrap_err();
    assert_eq!(err.to_string(), "rm /a/missing: does not exist");
}

#[tokio::test]
async fn test_non_empty_directory_needs_recursive() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    assert_eq!(
        violation(client.rm("/a/b", Options::default()).await),
        PolicyViolation::DirectoryNotEmpty
    );
    assert_eq!(backend.calls().rm, 0);

    client.rm("/a/b", Options::recursive()).await.unwrap();
    assert_eq!(backend.removed(), vec![("/a/b".to_string(), true)]);
    assert!(!client.exists("/a/b/f").await.unwrap());
}

#[tokio::test]
async fn test_empty_directory_and_file() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    client.rm("/a/empty", Options::default()).await.unwrap();
    client.rm("/a/file", Options::default()).await.unwrap();
    assert_eq!(
        backend.removed(),
        vec![
            ("/a/empty".to_string(), false),
            ("/a/file".to_string(), false)
        ]
    );
    // Only the directory needed an emptiness check.
    assert_eq!(backend.calls().list, 1);
}

#[tokio::test]
async fn test_force_skips_guards() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    client.rm("/a", Options::forced()).await.unwrap();
    assert_eq!(backend.removed(), vec![("/a".to_string(), true)]);
    assert!(!client.exists("/a").await.unwrap());
    assert_eq!(backend.calls().list, 0);
}

#[tokio::test]
async fn test_rmdir_refuses_files() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    assert_eq!(
        violation(client.rmdir("/a/file", Options::recursive()).await),
        PolicyViolation::NotADirectory
    );
    assert_eq!(
        violation(client.rmdir("/a/nothing", Options::default()).await),
        PolicyViolation::DoesNotExist
    );
    assert_eq!(backend.calls().rm, 0);

    client.rmdir("/a/empty", Options::default()).await.unwrap();
    assert_eq!(backend.removed(), vec![("/a/empty".to_string(), false)]);
}

#[tokio::test]
async fn test_backend_errors_are_not_policy_errors() {
    let (backend, client) = recording_client();
    seed(&backend).await;
    backend.fail_list("/a/b");

    let err = client.rm("/a/b", Options::default()).await.unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert!(err.policy_violation().is_none());
}

#[tokio::test]
async fn test_forced_relative_path_reaches_backend() {
    let (backend, client) = recording_client();
    seed(&backend).await;

    let result = client.rm("a/b", Options::forced()).await;
    assert_eq!(violation(result), PolicyViolation::DoesNotExist);
    assert_eq!(backend.calls().exists, 1);
    assert!(backend.removed().is_empty());
}
