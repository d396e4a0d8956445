//! Tracing compatibility layer for structured logging.
//!
//! This module provides one logging interface whether or not the `tracing-integration`
//! feature is enabled:
//!
//! - **With feature enabled**: re-exports from the `tracing` crate.
//! - **Without feature**: no-op macros that compile to nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use retcheck::tracing_compat::{debug, warn};
//!
//! debug!(obligation = %id, "obligation registered");
//! warn!("container dropped without a check");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, info, trace, warn, Level};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op info-level logging macro.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    pub use crate::{debug, info, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;

/// Log level stand-in when tracing is disabled.
#[cfg(not(feature = "tracing-integration"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Trace level.
    TRACE,
    /// Debug level.
    DEBUG,
    /// Info level.
    INFO,
    /// Warn level.
    WARN,
    /// Error level.
    ERROR,
}
