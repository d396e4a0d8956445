//! Problems: immutable facts describing what prevented a computation from succeeding.
//!
//! A [`Problem`] is opaque beyond its message. Containers never inspect a problem; they
//! only carry it, order it, and hand it back. Problems are shared through [`ProblemRef`]
//! so that forwarding a problem set between containers never copies the problems themselves.
//!
//! # Example
//!
//! ```
//! use retcheck::problem::{LocalizedProblem, Problem};
//!
//! let problem = LocalizedProblem::new("port must be positive").shared();
//! assert_eq!(problem.message(), "port must be positive");
//! ```

mod kinds;
pub mod list;

pub use kinds::{FileProblem, LocalizedProblem, UnhandledErrorProblem};
pub use list::{
    enforce_has_problems, join_problem_messages, join_problem_sets, join_problems, ProblemList,
};

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an immutable problem.
pub type ProblemRef = Arc<dyn Problem>;

/// One thing that went wrong.
///
/// Implementations must be immutable: a problem is created once by its producer and then
/// only read. The message is the whole public surface; formatting, localisation, and
/// severity are the producer's business.
pub trait Problem: fmt::Debug + Send + Sync + 'static {
    /// Human-readable description of the problem.
    fn message(&self) -> Cow<'_, str>;

    /// Where the problem came from, when the producer knows (a file path, a field name).
    fn origin(&self) -> Option<&str> {
        None
    }

    /// Moves the problem behind a shared handle.
    fn shared(self) -> ProblemRef
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

impl fmt::Display for dyn Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
