// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Open mode flags understood by every [`HandleInterface`](crate::HandleInterface).

use bitflags::bitflags;

bitflags! {
    /// Bitwise open mode. Read-only is the empty set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const RDONLY = 0x0000;
        const WRONLY = 0x0001;
        const RDWR = 0x0002;
        const APPEND = 0x0008;
        const CREAT = 0x0200;
        const TRUNC = 0x0400;
    }
}

impl OpenFlags {
    /// Mode used by `Client::write`: replace the file, creating it if needed.
    #[must_use]
    pub fn for_write() -> Self {
        OpenFlags::WRONLY | OpenFlags::CREAT
    }

    /// Mode used by `Client::append`.
    #[must_use]
    pub fn for_append() -> Self {
        OpenFlags::WRONLY | OpenFlags::APPEND | OpenFlags::CREAT
    }

    #[must_use]
    pub fn is_readable(self) -> bool {
        !self.contains(OpenFlags::WRONLY) || self.contains(OpenFlags::RDWR)
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        self.intersects(OpenFlags::WRONLY | OpenFlags::RDWR)
    }

    /// Existing content is discarded on open.
    ///
    /// Remote filesystems of this family cannot rewrite in place, so a
    /// writable open without `APPEND` always starts from an empty file.
    #[must_use]
    pub fn truncates(self) -> bool {
        self.is_writable() && (self.contains(OpenFlags::TRUNC) || !self.contains(OpenFlags::APPEND))
    }
}
