//! The read side shared by every container: state queries and problem access.

use crate::problem::{join_problems, ProblemList, ProblemRef};

/// Anything that can report a problem state.
///
/// The obligation effect of each method on tracked containers:
///
/// | Method | On Ok | On Problem |
/// |---|---|---|
/// | [`is_ok`](Self::is_ok), [`is_problem`](Self::is_problem), [`has_problems`](Self::has_problems) | discharge | none |
/// | [`any_problems`](Self::any_problems) | none | discharge |
/// | [`valid_problems`](Self::valid_problems) | discharge, then panic | discharge |
/// | [`join_problems_with`](Self::join_problems_with) | discharge | discharge |
/// | [`debug_problems`](Self::debug_problems) | none | none |
pub trait ProblemContainer {
    /// True when the container holds a value rather than problems.
    fn is_ok(&self) -> bool;

    /// True when the container holds problems.
    fn is_problem(&self) -> bool;

    /// Same as [`ProblemContainer::is_problem`].
    fn has_problems(&self) -> bool {
        self.is_problem()
    }

    /// The problems, or the canonical empty list when Ok.
    fn any_problems(&self) -> &ProblemList;

    /// The problems. Panics when the container is Ok.
    fn valid_problems(&self) -> &ProblemList;

    /// Problem messages joined with `separator`; empty when Ok.
    fn debug_problems(&self, separator: &str) -> String;

    /// Appends this container's problems to `accumulator`.
    fn join_problems_with(&self, accumulator: &mut Vec<ProblemRef>);
}

/// Concatenates the problems of several containers, left to right.
///
/// Accepts `&dyn ProblemContainer` or `Option<&dyn ProblemContainer>` items; absent
/// containers are skipped. Every joined container is read through
/// [`ProblemContainer::join_problems_with`] and is therefore discharged.
pub fn join_ret_problems<'a, I>(containers: I) -> ProblemList
where
    I: IntoIterator,
    I::Item: Into<Option<&'a dyn ProblemContainer>>,
{
    let mut joined = Vec::new();
    for container in containers
        .into_iter()
        .filter_map(Into::<Option<&'a dyn ProblemContainer>>::into)
    {
        container.join_problems_with(&mut joined);
    }
    join_problems(joined)
}
