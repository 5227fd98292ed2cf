// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! String helpers for remote paths.
//!
//! Remote paths are `/`-separated strings independent of the host platform,
//! so these helpers deliberately avoid `std::path`.

/// Collapse repeated separators and drop a trailing separator.
///
/// A leading `/` is preserved; relative paths stay relative.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let joined = segments(path).collect::<Vec<_>>().join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}

/// Non-empty components of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Number of components below the root (`/` is 0, `/a` is 1).
pub fn depth(path: &str) -> usize {
    segments(path).count()
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Final component of a path, if it has one.
pub fn basename(path: &str) -> Option<&str> {
    segments(path).last()
}

/// Parent of an absolute path; `None` for the root and relative single names.
pub fn parent(path: &str) -> Option<String> {
    let normalized = normalize(path);
    if normalized == "/" || normalized.is_empty() {
        return None;
    }
    match normalized.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(idx) => Some(normalized[..idx].to_string()),
        None => None,
    }
}

/// Join a child name onto a directory path.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}
