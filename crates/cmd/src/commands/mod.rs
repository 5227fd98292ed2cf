// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod cat;
pub mod copy;
pub mod list;
pub mod mkdir;
pub mod rm;
pub mod stat;

pub use cat::cat_command;
pub use copy::{get_command, put_command};
pub use list::list_command;
pub use mkdir::mkdir_command;
pub use rm::{rm_command, rmdir_command};
pub use stat::stat_command;
