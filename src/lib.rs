//! Retcheck: checked result containers for Rust.
//!
//! # Overview
//!
//! A result container holds either a value or a non-empty list of problems, never both.
//! Problems are expected outcomes that flow through containers as data; misuse of the API
//! is a bug and panics. Every container also carries an *obligation*: the expectation that
//! somebody learns its problem state before it is dropped. A monitor notices containers
//! that are dropped unchecked.
//!
//! # Core Guarantees
//!
//! - **No empty problem containers**: constructing one fails fast
//! - **Ordered problems**: joins are left to right, duplicates kept, absent entries skipped
//! - **Explicit discharge rules**: each operation's obligation effect is fixed and documented
//! - **At most one leak report** per container, and never a panic from reporting
//! - **Zero tracking cost** with the no-op monitor or the simple factory
//!
//! # Module Structure
//!
//! - [`problem`]: the problem trait, concrete problems, and problem lists
//! - [`ret`]: the containers ([`RetVal`], [`RetNullable`], [`RetVoid`], [`WarningVal`])
//! - [`obligation`]: obligation handles and monitors (no-op, tracing, recording)
//! - [`factory`]: container factories and process-wide factory selection
//! - [`config`]: configuration profiles and environment loading
//! - [`error`]: programmer-misuse errors
//! - [`tracing_compat`]: logging facade
//!
//! # Example
//!
//! ```
//! use retcheck::problem::LocalizedProblem;
//! use retcheck::RetVal;
//!
//! fn positive(n: i64) -> RetVal<i64> {
//!     if n > 0 {
//!         RetVal::ok(n)
//!     } else {
//!         RetVal::from_problem(LocalizedProblem::new("must be positive"))
//!     }
//! }
//!
//! let doubled = positive(21).map(|n| n * 2);
//! if doubled.is_ok() {
//!     assert_eq!(doubled.result(), &42);
//! }
//!
//! let rejected = positive(-1);
//! assert_eq!(rejected.any_problems().messages(), vec!["must be positive"]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]

pub mod config;
pub mod error;
pub mod factory;
pub mod obligation;
pub mod problem;
pub mod ret;
pub mod tracing_compat;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenient access to core types
pub use config::{ConfigError, ConfigLoader, FactoryKind, MonitorKind, Profile, RetConfig};
pub use error::UsageError;
pub use factory::{FactoryGuard, RetFactory};
pub use obligation::{
    LeakReport, LeakReporter, LoggingReporter, MonitorStats, NoopMonitor, Obligation,
    ObligationId, ObligationMonitor, ObligationRecord, RecordingMonitor, TracingMonitor,
};
pub use problem::{
    join_problem_messages, join_problem_sets, join_problems, FileProblem, LocalizedProblem,
    Problem, ProblemList, ProblemRef, UnhandledErrorProblem,
};
pub use ret::{
    join_ret_problems, NoValue, Nullable, ProblemContainer, Required, Ret, RetNullable, RetVal,
    RetVoid, Shape, WarningVal,
};
