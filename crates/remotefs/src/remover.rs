// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Guarded deletes.
//!
//! Removal defaults to the narrowest possible scope. Without `force`, only
//! absolute paths at least two levels below the root are accepted, and a
//! directory is removed only when it is empty unless `recursive` is given.

use crate::config::Options;
use crate::error::{Error, PolicyViolation, Result};
use crate::handle::HandleInterface;
use crate::path;
use diagnostics::{log_debug, log_info};

/// A validated-before-use description of one delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub path: String,
    pub recursive: bool,
    pub force: bool,
}

impl DeletionRequest {
    #[must_use]
    pub fn new(path: &str, options: &Options) -> Self {
        Self {
            path: path.to_string(),
            recursive: options.recursive,
            force: options.force,
        }
    }

    /// Path-shape checks that need no backend call.
    pub fn check_shape(&self) -> std::result::Result<(), PolicyViolation> {
        if self.force {
            return Ok(());
        }
        if !path::is_absolute(&self.path) {
            return Err(PolicyViolation::RelativePath);
        }
        if path::depth(&self.path) < 2 {
            return Err(PolicyViolation::RootOrFirstLevel);
        }
        Ok(())
    }

    /// Whether a directory target must be proven empty before deletion.
    #[must_use]
    pub fn requires_empty_directory(&self) -> bool {
        !self.recursive && !self.force
    }

    fn reject(&self, violation: PolicyViolation) -> Error {
        let path = &self.path;
        let reason = violation.to_string();
        log_info!("Refusing to remove {path}: {reason}", path: path, reason: reason);
        Error::policy(&self.path, violation)
    }
}

/// Run the policy for `request` and delete when every check passes.
pub async fn remove(backend: &dyn HandleInterface, request: &DeletionRequest) -> Result<()> {
    request
        .check_shape()
        .map_err(|violation| request.reject(violation))?;

    if !backend.exists(&request.path).await? {
        return Err(request.reject(PolicyViolation::DoesNotExist));
    }

    if request.requires_empty_directory() {
        let target = backend.stat(&request.path).await?;
        if target.is_dir() && !backend.list(&request.path).await?.is_empty() {
            return Err(request.reject(PolicyViolation::DirectoryNotEmpty));
        }
    }

    let path = &request.path;
    let recursive = request.recursive || request.force;
    log_debug!("Removing {path} (recursive: {recursive})", path: path, recursive: recursive);
    backend.rm(&request.path, recursive).await
}

/// `remove` restricted to directories.
pub async fn remove_dir(backend: &dyn HandleInterface, request: &DeletionRequest) -> Result<()> {
    let target = match backend.stat(&request.path).await {
        Ok(target) => target,
        Err(Error::NotFound(_)) => return Err(request.reject(PolicyViolation::DoesNotExist)),
        Err(e) => return Err(e),
    };
    if !target.is_dir() {
        return Err(request.reject(PolicyViolation::NotADirectory));
    }
    remove(backend, request).await
}
