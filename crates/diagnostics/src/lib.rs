// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the remotefs workspace.
//!
//! Every crate logs through the macros exported here so that one
//! environment variable controls output for the library and the CLI alike.
//!
//! Usage:
//! - `REMOTEFS_LOG=off` (default) - no logs
//! - `REMOTEFS_LOG=info` - session, copy and remove outcomes
//! - `REMOTEFS_LOG=debug` - per-handle open/close and flush sizes

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "REMOTEFS_LOG";

static INIT: Once = Once::new();

/// Verbosity selected through [`LOG_ENV`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a level name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    fn min_level(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

/// Initialize diagnostics based on the `REMOTEFS_LOG` environment variable.
///
/// Safe to call multiple times; only the first call has an effect.
pub fn init_diagnostics() {
    let requested = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    let level = match LogLevel::parse(&requested) {
        Some(level) => level,
        None => {
            // Bootstrap warning, logging is not configured yet
            eprintln!("Warning: Unknown {LOG_ENV} value '{requested}', using 'info'");
            LogLevel::Info
        }
    };
    init_with_level(level);
}

/// Initialize diagnostics at an explicit level, ignoring the environment.
pub fn init_with_level(level: LogLevel) {
    INIT.call_once(|| {
        let Some(min) = level.min_level() else {
            return;
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        // The runtime must outlive every emitting task.
        std::mem::forget(rt);
    });
}

/// Log basic operations (connects, copies, removals).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (handle lifecycle, flush sizes, read offsets).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable problems (skipped subtrees, close failures).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that end an operation.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
        init_with_level(LogLevel::Debug);
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::parse("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse(""), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse(" warn "), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");

        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }
}
