//! Error types for programmer misuse.
//!
//! Problems are data and never show up here. A [`UsageError`] means the caller broke a
//! documented precondition: asking an Ok container for its problems, unwrapping a
//! Problem container, building a Problem container out of nothing. The panicking API
//! raises these through [`UsageError::raise`]; the `try_*` twins return them.

use std::fmt;

/// A documented precondition was violated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum UsageError {
    /// A value was requested from a container that holds problems.
    #[error("contains problems")]
    ContainsProblems,
    /// Problems were requested from a container that holds a value.
    #[error("contains no problems")]
    NoProblems,
    /// A Problem container was requested with no problems to put in it.
    #[error("no problems defined")]
    NoProblemsDefined,
    /// A required value was absent.
    #[error("value must not be absent")]
    AbsentValue,
}

impl UsageError {
    /// Returns true for faults caused by reading the wrong branch of a container.
    #[must_use]
    pub const fn is_wrong_branch(self) -> bool {
        matches!(self, Self::ContainsProblems | Self::NoProblems)
    }

    /// Panics with this error, reported at the caller's location.
    #[cold]
    #[track_caller]
    pub(crate) fn raise(self, shape: &'static str) -> ! {
        panic!("{}", Fault { shape, error: self })
    }
}

struct Fault {
    shape: &'static str,
    error: UsageError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.shape, self.error)
    }
}
