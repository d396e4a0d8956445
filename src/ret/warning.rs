//! A value that always exists, with non-fatal warnings attached.

use super::{join_ret_problems, ProblemContainer};
use crate::error::UsageError;
use crate::problem::{join_problem_messages, ProblemList, ProblemRef};
use std::fmt;

/// A value plus warnings.
///
/// Warnings never block the value, so there is no obligation to observe them and the
/// container is untracked. It still reports its warnings as problems through
/// [`ProblemContainer`], which lets it join other containers' problem sets.
#[derive(Clone)]
pub struct WarningVal<T> {
    value: T,
    warnings: ProblemList,
}

impl<T> WarningVal<T> {
    /// A value without warnings.
    pub fn new(value: T) -> Self {
        Self::with_warnings(value, ProblemList::empty())
    }

    /// A value with `warnings`.
    pub fn with_warnings(value: T, warnings: ProblemList) -> Self {
        Self { value, warnings }
    }

    /// A value with the problems of other containers as warnings.
    ///
    /// The sources are read with [`ProblemContainer::join_problems_with`].
    pub fn from_containers<'a, I>(value: T, containers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a dyn ProblemContainer>>,
    {
        Self::with_warnings(value, join_ret_problems(containers))
    }

    /// The value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consumes the container, returning the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The warnings, possibly empty.
    pub fn warnings(&self) -> &ProblemList {
        &self.warnings
    }
}

impl<T> ProblemContainer for WarningVal<T> {
    fn is_ok(&self) -> bool {
        self.warnings.is_empty()
    }

    fn is_problem(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn any_problems(&self) -> &ProblemList {
        &self.warnings
    }

    #[track_caller]
    fn valid_problems(&self) -> &ProblemList {
        if self.warnings.is_empty() {
            UsageError::NoProblems.raise("WarningVal");
        }
        &self.warnings
    }

    fn debug_problems(&self, separator: &str) -> String {
        join_problem_messages(separator, &self.warnings)
    }

    fn join_problems_with(&self, accumulator: &mut Vec<ProblemRef>) {
        accumulator.extend(self.warnings.iter().cloned());
    }
}

impl<T: fmt::Debug> fmt::Debug for WarningVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WarningVal")
            .field("value", &self.value)
            .field("warnings", &self.warnings)
            .finish()
    }
}
