//! Result containers: a value or a non-empty list of problems, never both.
//!
//! [`Ret<T, S>`] is one tagged type parameterised by a [`Shape`] marker:
//!
//! | Alias | Shape | Ok holds |
//! |---|---|---|
//! | [`RetVal<T>`] | [`Required`] | `T` |
//! | [`RetNullable<T>`] | [`Nullable`] | `Option<T>` |
//! | [`RetVoid`] | [`NoValue`] | nothing |
//!
//! Every container owns one [`Obligation`]. Reading the value never counts as checking
//! the container; learning its problem state does. The exact effect of each operation is
//! listed on [`ProblemContainer`] and on the individual combinators.
//!
//! # Example
//!
//! ```
//! use retcheck::problem::LocalizedProblem;
//! use retcheck::{RetVal, RetVoid};
//!
//! fn parse_port(raw: &str) -> RetVal<u16> {
//!     match raw.parse::<u16>() {
//!         Ok(port) => RetVal::ok(port),
//!         Err(_) => RetVal::from_problem(LocalizedProblem::new(format!("bad port: {raw}"))),
//!     }
//! }
//!
//! let port = parse_port("8080").map(|p| p + 1);
//! assert!(port.is_ok());
//! assert_eq!(port.result(), &8081);
//!
//! let bad: RetVoid = parse_port("http").forward_void_problems();
//! assert_eq!(bad.debug_problems(", "), "bad port: http");
//! assert!(!bad.any_problems().is_empty());
//! ```

mod container;
mod nullable;
mod val;
mod void;
mod warning;

pub use container::{join_ret_problems, ProblemContainer};
pub use warning::WarningVal;

use crate::error::UsageError;
use crate::factory::RetFactory;
use crate::obligation::Obligation;
use crate::problem::{
    enforce_has_problems, join_problem_messages, join_problem_sets, join_problems, Problem,
    ProblemList, ProblemRef,
};
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;

// ============================================================================
// Shapes
// ============================================================================

mod sealed {
    pub trait Sealed {}
}

/// Marker describing what an Ok container carries.
pub trait Shape: sealed::Sealed + 'static {
    /// Storage of the Ok value for element type `T`.
    type Slot<T>;
    /// Name used in diagnostics and panic messages.
    const NAME: &'static str;
}

/// Ok carries a value that is always present.
#[derive(Debug)]
pub enum Required {}

/// Ok carries a value that may be absent.
#[derive(Debug)]
pub enum Nullable {}

/// Ok carries nothing.
#[derive(Debug)]
pub enum NoValue {}

impl sealed::Sealed for Required {}
impl sealed::Sealed for Nullable {}
impl sealed::Sealed for NoValue {}

impl Shape for Required {
    type Slot<T> = T;
    const NAME: &'static str = "RetVal";
}

impl Shape for Nullable {
    type Slot<T> = Option<T>;
    const NAME: &'static str = "RetNullable";
}

impl Shape for NoValue {
    type Slot<T> = ();
    const NAME: &'static str = "RetVoid";
}

// ============================================================================
// Ret
// ============================================================================

pub(crate) enum State<V> {
    Ok(V),
    Problem(ProblemList),
}

/// A value or problems, carrying an observation obligation.
#[must_use = "a container's problem state must be checked before it is dropped"]
pub struct Ret<T, S: Shape = Required> {
    state: State<S::Slot<T>>,
    obligation: Obligation,
    _shape: PhantomData<fn() -> (T, S)>,
}

/// A container whose Ok value is always present.
pub type RetVal<T> = Ret<T, Required>;
/// A container whose Ok value may be absent.
pub type RetNullable<T> = Ret<T, Nullable>;
/// A container with no value.
pub type RetVoid = Ret<(), NoValue>;

/// Issues an obligation from the current factory.
fn current_obligation(
    shape: &'static str,
    problems: &ProblemList,
    location: &'static Location<'static>,
) -> Obligation {
    RetFactory::current().obligation(shape, problems, location)
}

/// Re-tags a problem set as another shape, forwarding the obligation.
fn retag<U, S2: Shape>(
    problems: ProblemList,
    obligation: Obligation,
    location: &'static Location<'static>,
) -> Ret<U, S2> {
    let obligation = obligation.forward(S2::NAME, &problems, location);
    Ret::assemble(State::Problem(problems), obligation)
}

/// A fresh Ok container registered with `source`'s monitor.
fn derived_ok<U, S2: Shape>(
    source: &Obligation,
    value: S2::Slot<U>,
    location: &'static Location<'static>,
) -> Ret<U, S2> {
    let obligation = source.derive(S2::NAME, ProblemList::empty_ref(), location);
    Ret::assemble(State::Ok(value), obligation)
}

/// A fresh Problem container registered with `source`'s monitor.
fn derived_problem<U, S2: Shape>(
    source: &Obligation,
    problems: ProblemList,
    location: &'static Location<'static>,
) -> Ret<U, S2> {
    let obligation = source.derive(S2::NAME, &problems, location);
    Ret::assemble(State::Problem(problems), obligation)
}

impl<T, S: Shape> Ret<T, S> {
    pub(crate) fn assemble(state: State<S::Slot<T>>, obligation: Obligation) -> Self {
        Self {
            state,
            obligation,
            _shape: PhantomData,
        }
    }

    pub(crate) fn ok_with(value: S::Slot<T>, obligation: Obligation) -> Self {
        Self::assemble(State::Ok(value), obligation)
    }

    #[track_caller]
    pub(crate) fn problems_with(
        problems: ProblemList,
        factory: &RetFactory,
        location: &'static Location<'static>,
    ) -> Self {
        match enforce_has_problems(problems) {
            Ok(problems) => {
                let obligation = factory.obligation(S::NAME, &problems, location);
                Self::assemble(State::Problem(problems), obligation)
            }
            Err(err) => err.raise(S::NAME),
        }
    }

    #[track_caller]
    fn ok_current(value: S::Slot<T>) -> Self {
        let obligation = current_obligation(S::NAME, ProblemList::empty_ref(), Location::caller());
        Self::ok_with(value, obligation)
    }

    fn into_parts(self) -> (State<S::Slot<T>>, Obligation) {
        (self.state, self.obligation)
    }

    // ------------------------------------------------------------------------
    // Problem constructors
    // ------------------------------------------------------------------------

    /// A Problem container holding one problem.
    #[track_caller]
    pub fn from_problem(problem: impl Problem) -> Self {
        Self::from_problem_list(ProblemList::of(problem))
    }

    /// A Problem container from individual problems; absent entries are skipped.
    ///
    /// Panics when no problem remains.
    #[track_caller]
    pub fn from_problems<I>(problems: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<ProblemRef>>,
    {
        Self::from_problem_list(join_problems(problems))
    }

    /// A Problem container from whole problem lists; absent lists are skipped.
    ///
    /// Panics when the lists hold no problem between them.
    #[track_caller]
    pub fn from_problem_sets<'a, I>(sets: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a ProblemList>>,
    {
        Self::from_problem_list(join_problem_sets(sets))
    }

    /// A Problem container holding the problems of other containers.
    ///
    /// Each source is read with [`ProblemContainer::join_problems_with`], which discharges
    /// it. Panics when none of them has problems.
    #[track_caller]
    pub fn from_containers<'a, I>(containers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a dyn ProblemContainer>>,
    {
        Self::from_problem_list(join_ret_problems(containers))
    }

    /// A Problem container holding `problems`. Panics when the list is empty.
    #[track_caller]
    pub fn from_problem_list(problems: ProblemList) -> Self {
        let location = Location::caller();
        Self::problems_with(problems, &RetFactory::current(), location)
    }

    /// Non-panicking [`Ret::from_problem_list`].
    #[track_caller]
    pub fn try_from_problem_list(problems: ProblemList) -> Result<Self, UsageError> {
        let location = Location::caller();
        let problems = enforce_has_problems(problems)?;
        let obligation = current_obligation(S::NAME, &problems, location);
        Ok(Self::assemble(State::Problem(problems), obligation))
    }

    // ------------------------------------------------------------------------
    // Problem state
    // ------------------------------------------------------------------------

    /// True when Ok. Discharges on Ok.
    pub fn is_ok(&self) -> bool {
        match &self.state {
            State::Ok(_) => {
                self.obligation.discharge();
                true
            }
            State::Problem(_) => false,
        }
    }

    /// True when holding problems. Discharges on Ok.
    pub fn is_problem(&self) -> bool {
        !self.is_ok()
    }

    /// Same as [`Ret::is_problem`].
    pub fn has_problems(&self) -> bool {
        self.is_problem()
    }

    /// The problems, or the canonical empty list. Discharges on Problem.
    pub fn any_problems(&self) -> &ProblemList {
        match &self.state {
            State::Ok(_) => ProblemList::empty_ref(),
            State::Problem(problems) => {
                self.obligation.discharge();
                problems
            }
        }
    }

    /// The problems. Always discharges; panics when Ok.
    #[track_caller]
    pub fn valid_problems(&self) -> &ProblemList {
        self.obligation.discharge();
        match &self.state {
            State::Ok(_) => UsageError::NoProblems.raise(S::NAME),
            State::Problem(problems) => problems,
        }
    }

    /// Problem messages joined with `separator`. No obligation effect.
    #[must_use]
    pub fn debug_problems(&self, separator: &str) -> String {
        match &self.state {
            State::Ok(_) => String::new(),
            State::Problem(problems) => join_problem_messages(separator, problems),
        }
    }

    /// Appends the problems to `accumulator`. Always discharges.
    pub fn join_problems_with(&self, accumulator: &mut Vec<ProblemRef>) {
        self.obligation.discharge();
        if let State::Problem(problems) = &self.state {
            accumulator.extend(problems.iter().cloned());
        }
    }

    /// The container's obligation handle.
    pub fn obligation(&self) -> &Obligation {
        &self.obligation
    }

    // ------------------------------------------------------------------------
    // Forwarding
    // ------------------------------------------------------------------------

    /// Re-tags the problems as a [`RetVal`].
    ///
    /// Only valid on Problem containers: the source obligation is handed to the result.
    /// On Ok the source is discharged and the call panics, since the value would be lost.
    #[track_caller]
    pub fn forward_problems<V>(self) -> RetVal<V> {
        self.forward_as::<V, Required>(Location::caller())
    }

    /// Re-tags the problems as a [`RetNullable`]. See [`Ret::forward_problems`].
    #[track_caller]
    pub fn forward_nullable_problems<V>(self) -> RetNullable<V> {
        self.forward_as::<V, Nullable>(Location::caller())
    }

    /// Re-tags the problems as a [`RetVoid`]. See [`Ret::forward_problems`].
    #[track_caller]
    pub fn forward_void_problems(self) -> RetVoid {
        self.forward_as::<(), NoValue>(Location::caller())
    }

    #[track_caller]
    fn forward_as<V, S2: Shape>(self, location: &'static Location<'static>) -> Ret<V, S2> {
        match self.into_parts() {
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
            (State::Ok(_), obligation) => {
                obligation.discharge();
                UsageError::NoProblems.raise(S::NAME)
            }
        }
    }

    /// Replaces an Ok container with the problems a validation checker reported.
    ///
    /// The checker's container is discharged by `valid_problems`; the receiver is
    /// discharged and the returned container starts pending.
    fn into_validation_failure(
        self,
        checker: &dyn ProblemContainer,
        location: &'static Location<'static>,
    ) -> Self {
        let problems = checker.valid_problems().clone();
        let (_, obligation) = self.into_parts();
        let replacement = derived_problem(&obligation, problems, location);
        obligation.discharge();
        replacement
    }
}

impl<T, S: Shape> ProblemContainer for Ret<T, S> {
    fn is_ok(&self) -> bool {
        Ret::is_ok(self)
    }

    fn is_problem(&self) -> bool {
        Ret::is_problem(self)
    }

    fn any_problems(&self) -> &ProblemList {
        Ret::any_problems(self)
    }

    #[track_caller]
    fn valid_problems(&self) -> &ProblemList {
        Ret::valid_problems(self)
    }

    fn debug_problems(&self, separator: &str) -> String {
        Ret::debug_problems(self, separator)
    }

    fn join_problems_with(&self, accumulator: &mut Vec<ProblemRef>) {
        Ret::join_problems_with(self, accumulator);
    }
}

/// Keeps a checker's container only when it reports problems.
///
/// An Ok checker container is discharged by `has_problems` and dropped.
fn checker_problems<C: ProblemContainer>(found: Option<C>) -> Option<C> {
    found.filter(ProblemContainer::has_problems)
}

impl<T, S: Shape> fmt::Debug for Ret<T, S>
where
    S::Slot<T>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(S::NAME);
        match &self.state {
            State::Ok(value) => out.field("value", value),
            State::Problem(problems) => out.field("problems", problems),
        };
        out.field("obligation", &self.obligation).finish()
    }
}

impl<T, S: Shape> fmt::Display for Ret<T, S>
where
    S::Slot<T>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Ok(value) => write!(f, "{}(value: {value:?})", S::NAME),
            State::Problem(problems) => write!(
                f,
                "{}({} problem(s): {})",
                S::NAME,
                problems.len(),
                join_problem_messages("; ", problems)
            ),
        }
    }
}
