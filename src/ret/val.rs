//! [`RetVal`]: containers whose Ok value is always present.

use super::{
    checker_problems, derived_ok, retag, NoValue, Nullable, ProblemContainer, Required, Ret,
    RetNullable, RetVal, RetVoid, Shape, State,
};
use crate::error::UsageError;
use crate::problem::ProblemList;
use std::panic::Location;

impl<T> Ret<T, Required> {
    /// An Ok container.
    #[track_caller]
    pub fn ok(value: T) -> Self {
        Self::ok_current(value)
    }

    /// An Ok container from a value that must be present. Panics on `None`.
    #[track_caller]
    pub fn ok_nonnull(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::ok_current(value),
            None => UsageError::AbsentValue.raise(Required::NAME),
        }
    }

    // ------------------------------------------------------------------------
    // Value access (never discharges)
    // ------------------------------------------------------------------------

    /// The value when Ok, else `None`.
    #[must_use]
    pub fn get_value(&self) -> Option<&T> {
        match &self.state {
            State::Ok(value) => Some(value),
            State::Problem(_) => None,
        }
    }

    /// Same as [`Ret::get_value`].
    #[must_use]
    pub fn as_optional(&self) -> Option<&T> {
        self.get_value()
    }

    /// The value as an option. Discharges and panics when holding problems.
    #[track_caller]
    pub fn require_optional(&self) -> Option<&T> {
        Some(self.result())
    }

    /// The value. Discharges and panics when holding problems.
    #[track_caller]
    pub fn result(&self) -> &T {
        match self.try_result() {
            Ok(value) => value,
            Err(err) => err.raise(Required::NAME),
        }
    }

    /// The value, or [`UsageError::ContainsProblems`] (discharging the container).
    pub fn try_result(&self) -> Result<&T, UsageError> {
        match &self.state {
            State::Ok(value) => Ok(value),
            State::Problem(_) => {
                self.obligation.discharge();
                Err(UsageError::ContainsProblems)
            }
        }
    }

    /// Consumes the container, returning the value.
    ///
    /// Like [`Ret::result`] this is not a check: an Ok container whose state was never
    /// queried is still reported when it goes away. Panics when holding problems.
    #[track_caller]
    pub fn into_result(self) -> T {
        let (state, obligation) = self.into_parts();
        match state {
            State::Ok(value) => value,
            State::Problem(_) => {
                obligation.discharge();
                UsageError::ContainsProblems.raise(Required::NAME)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Combinators
    // ------------------------------------------------------------------------

    /// Reinterprets the container as a [`RetNullable`]. The obligation moves along.
    #[track_caller]
    pub fn as_nullable(self) -> RetNullable<T> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                let problems = ProblemList::empty_ref();
                Ret::ok_with(Some(value), obligation.forward(Nullable::NAME, problems, location))
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Checks the value; returns the receiver unless the checker reports problems.
    ///
    /// The checker runs only when Ok. If it returns a container with problems, the
    /// receiver is discharged and a new Problem container holding the checker's problems
    /// is returned. Otherwise the very same container comes back, obligation untouched.
    #[track_caller]
    pub fn then_validate<C, F>(self, checker: F) -> Self
    where
        C: ProblemContainer,
        F: FnOnce(&T) -> Option<C>,
    {
        let location = Location::caller();
        let found = match &self.state {
            State::Ok(value) => checker_problems(checker(value)),
            State::Problem(_) => None,
        };
        match found {
            Some(found) => self.into_validation_failure(&found, location),
            None => self,
        }
    }

    /// Chains a computation that may fail. Discharges the receiver when Ok.
    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce(T) -> RetVal<R>) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Transforms the value. Discharges the receiver when Ok; the result starts pending.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                derived_ok::<R, Required>(&obligation, f(value), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Chains a computation producing a possibly-absent value.
    #[track_caller]
    pub fn then_nullable<R>(self, f: impl FnOnce(T) -> RetNullable<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Transforms the value into a possibly-absent one.
    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce(T) -> Option<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                derived_ok::<R, Nullable>(&obligation, f(value), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Runs a side effect on the value and passes the container on.
    #[track_caller]
    pub fn then_run(self, f: impl FnOnce(&T)) -> Self {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                f(&value);
                let obligation =
                    obligation.forward(Required::NAME, ProblemList::empty_ref(), location);
                Self::ok_with(value, obligation)
            }
            (state, obligation) => Self::assemble(state, obligation),
        }
    }

    /// Chains a computation with no value. Discharges the receiver when Ok.
    #[track_caller]
    pub fn then_void(self, f: impl FnOnce(T) -> RetVoid) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Same as [`Ret::then_void`].
    #[track_caller]
    pub fn produce_void(self, f: impl FnOnce(T) -> RetVoid) -> RetVoid {
        self.then_void(f)
    }

    /// Hands the value to `f` and keeps only the problem state.
    ///
    /// Consuming the value is not a check; the obligation moves to the returned container.
    #[track_caller]
    pub fn consume(self, f: impl FnOnce(T)) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                f(value);
                let problems = ProblemList::empty_ref();
                Ret::ok_with((), obligation.forward(NoValue::NAME, problems, location))
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }
}
