// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Single-level and recursive directory listing.

use crate::entry::DirectoryEntry;
use crate::error::{Error, Result};
use crate::handle::HandleInterface;
use diagnostics::{log_debug, log_warn};
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};

/// A subtree that could not be listed during a recursive walk.
#[derive(Debug)]
pub struct ListFailure {
    pub path: String,
    pub error: Error,
}

/// Result of a listing: every entry gathered plus the subtrees that failed.
///
/// Entries inside a failed subtree are absent, but the failed directory's
/// own entry (reported by its parent) is kept.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<DirectoryEntry>,
    pub failures: Vec<ListFailure>,
}

impl Listing {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn merge(&mut self, other: Listing) {
        self.entries.extend(other.entries);
        self.failures.extend(other.failures);
    }
}

/// List `path`, descending into subdirectories when `recursive` is set.
///
/// Subdirectories are listed concurrently on the calling task; results
/// arrive in completion order, so sibling order is unspecified. Only a
/// failure of the top-level listing is returned as `Err`.
pub async fn list(backend: &dyn HandleInterface, path: &str, recursive: bool) -> Result<Listing> {
    if !recursive {
        let entries = backend.list(path).await?;
        return Ok(Listing {
            entries,
            failures: Vec::new(),
        });
    }
    expand(backend, path.to_string()).await
}

fn expand<'a>(backend: &'a dyn HandleInterface, path: String) -> BoxFuture<'a, Result<Listing>> {
    async move {
        let entries = backend.list(&path).await?;
        let mut pending: FuturesUnordered<_> = entries
            .iter()
            .filter(|entry| entry.is_dir())
            .map(|entry| {
                let sub = entry.path.clone();
                async move {
                    let result = expand(backend, sub.clone()).await;
                    (sub, result)
                }
            })
            .collect();

        let fanout = pending.len();
        log_debug!("Listing {path}: {fanout} subdirectories to expand", path: &path, fanout: fanout);

        let mut listing = Listing {
            entries,
            failures: Vec::new(),
        };
        while let Some((sub, result)) = pending.next().await {
            match result {
                Ok(nested) => listing.merge(nested),
                Err(error) => {
                    let message = error.to_string();
                    log_warn!("Skipping subtree {sub}: {message}", sub: &sub, message: message);
                    listing.failures.push(ListFailure { path: sub, error });
                }
            }
        }
        Ok(listing)
    }
    .boxed()
}
