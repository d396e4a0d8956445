//! [`RetNullable`]: containers whose Ok value may be absent.

use super::{
    checker_problems, derived_ok, derived_problem, retag, NoValue, Nullable, ProblemContainer,
    Required, Ret, RetNullable, RetVal, RetVoid, Shape, State,
};
use crate::error::UsageError;
use crate::obligation::Obligation;
use crate::problem::{Problem, ProblemList};
use std::panic::Location;

impl<T> Ret<T, Nullable> {
    /// An Ok container; the value may be absent.
    #[track_caller]
    pub fn ok(value: Option<T>) -> Self {
        Self::ok_current(value)
    }

    /// An Ok container holding a present value.
    #[track_caller]
    pub fn ok_some(value: T) -> Self {
        Self::ok_current(Some(value))
    }

    // ------------------------------------------------------------------------
    // Value access (never discharges)
    // ------------------------------------------------------------------------

    /// The value when Ok and present, else `None`.
    #[must_use]
    pub fn get_value(&self) -> Option<&T> {
        match &self.state {
            State::Ok(value) => value.as_ref(),
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
        self.result()
    }

    /// The possibly-absent value. Discharges and panics when holding problems.
    #[track_caller]
    pub fn result(&self) -> Option<&T> {
        match self.try_result() {
            Ok(value) => value,
            Err(err) => err.raise(Nullable::NAME),
        }
    }

    /// The possibly-absent value, or [`UsageError::ContainsProblems`] (discharging).
    pub fn try_result(&self) -> Result<Option<&T>, UsageError> {
        match &self.state {
            State::Ok(value) => Ok(value.as_ref()),
            State::Problem(_) => {
                self.obligation.discharge();
                Err(UsageError::ContainsProblems)
            }
        }
    }

    /// Consumes the container, returning the possibly-absent value.
    ///
    /// Not a check, like [`Ret::result`]. Panics when holding problems.
    #[track_caller]
    pub fn into_result(self) -> Option<T> {
        let (state, obligation) = self.into_parts();
        match state {
            State::Ok(value) => value,
            State::Problem(_) => {
                obligation.discharge();
                UsageError::ContainsProblems.raise(Nullable::NAME)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Combinators
    // ------------------------------------------------------------------------

    /// Checks the value; returns the receiver unless the checker reports problems.
    ///
    /// Same rules as the [`RetVal`] version; the checker sees the possibly-absent value.
    #[track_caller]
    pub fn then_validate<C, F>(self, checker: F) -> Self
    where
        C: ProblemContainer,
        F: FnOnce(Option<&T>) -> Option<C>,
    {
        let location = Location::caller();
        let found = match &self.state {
            State::Ok(value) => checker_problems(checker(value.as_ref())),
            State::Problem(_) => None,
        };
        match found {
            Some(found) => self.into_validation_failure(&found, location),
            None => self,
        }
    }

    /// Chains a computation that may fail. Discharges the receiver when Ok.
    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce(Option<T>) -> RetVal<R>) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Transforms the possibly-absent value into a present one.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce(Option<T>) -> R) -> RetVal<R> {
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
    pub fn then_nullable<R>(self, f: impl FnOnce(Option<T>) -> RetNullable<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Transforms the possibly-absent value into another possibly-absent one.
    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce(Option<T>) -> Option<R>) -> RetNullable<R> {
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
    pub fn then_run(self, f: impl FnOnce(Option<&T>)) -> Self {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                f(value.as_ref());
                let obligation =
                    obligation.forward(Nullable::NAME, ProblemList::empty_ref(), location);
                Self::ok_with(value, obligation)
            }
            (state, obligation) => Self::assemble(state, obligation),
        }
    }

    /// Chains a computation with no value. Discharges the receiver when Ok.
    #[track_caller]
    pub fn then_void(self, f: impl FnOnce(Option<T>) -> RetVoid) -> RetVoid {
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
    pub fn produce_void(self, f: impl FnOnce(Option<T>) -> RetVoid) -> RetVoid {
        self.then_void(f)
    }

    /// Hands the value to `f` and keeps only the problem state. Not a check.
    #[track_caller]
    pub fn consume(self, f: impl FnOnce(Option<T>)) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                f(value);
                void_forward(obligation, location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    // ------------------------------------------------------------------------
    // Absence handling
    // ------------------------------------------------------------------------

    /// Turns an absent value into `problem`.
    ///
    /// A present value moves into a [`RetVal`] with the obligation. An absent one
    /// discharges the receiver and yields a pending Problem container.
    #[track_caller]
    pub fn require_nonnull(self, problem: impl Problem) -> RetVal<T> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(Some(value)), obligation) => {
                let obligation =
                    obligation.forward(Required::NAME, ProblemList::empty_ref(), location);
                Ret::ok_with(value, obligation)
            }
            (State::Ok(None), obligation) => {
                obligation.discharge();
                derived_problem(&obligation, ProblemList::of(problem), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Substitutes `default` for an absent value.
    #[track_caller]
    pub fn default_as(self, default: T) -> RetVal<T> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(Some(value)), obligation) => {
                let obligation =
                    obligation.forward(Required::NAME, ProblemList::empty_ref(), location);
                Ret::ok_with(value, obligation)
            }
            (State::Ok(None), obligation) => {
                obligation.discharge();
                derived_ok::<T, Required>(&obligation, default, location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Maps a present value with `f`, or substitutes `default`. Discharges when Ok.
    #[track_caller]
    pub fn default_or_map<R>(self, default: R, f: impl FnOnce(T) -> R) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                obligation.discharge();
                derived_ok::<R, Required>(&obligation, value.map_or(default, f), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Maps a present value; an absent value stays absent without calling `f`.
    #[track_caller]
    pub fn null_or_map<R>(self, f: impl FnOnce(T) -> Option<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(Some(value)), obligation) => {
                obligation.discharge();
                derived_ok::<R, Nullable>(&obligation, f(value), location)
            }
            (State::Ok(None), obligation) => {
                let obligation =
                    obligation.forward(Nullable::NAME, ProblemList::empty_ref(), location);
                Ret::ok_with(None, obligation)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Chains a present value; an absent value stays absent without calling `f`.
    #[track_caller]
    pub fn null_or_then_nullable<R>(
        self,
        f: impl FnOnce(T) -> RetNullable<R>,
    ) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(Some(value)), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Ok(None), obligation) => {
                let obligation =
                    obligation.forward(Nullable::NAME, ProblemList::empty_ref(), location);
                Ret::ok_with(None, obligation)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Hands a present value to `f`. Not a check.
    #[track_caller]
    pub fn consume_if_nonnull(self, f: impl FnOnce(T)) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(value), obligation) => {
                if let Some(value) = value {
                    f(value);
                }
                void_forward(obligation, location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Chains a present value into a no-value computation.
    ///
    /// Discharges the receiver only when `f` runs.
    #[track_caller]
    pub fn produce_void_if_nonnull(self, f: impl FnOnce(T) -> RetVoid) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(Some(value)), obligation) => {
                obligation.discharge();
                f(value)
            }
            (State::Ok(None), obligation) => void_forward(obligation, location),
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }
}

fn void_forward(obligation: Obligation, location: &'static Location<'static>) -> RetVoid {
    let obligation = obligation.forward(NoValue::NAME, ProblemList::empty_ref(), location);
    Ret::ok_with((), obligation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LocalizedProblem;
    use crate::test_utils::{pending_set, recording_factory};
    use std::collections::BTreeSet;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn problem(message: &str) -> RetNullable<i32> {
        RetNullable::from_problem(LocalizedProblem::new(message))
    }

    #[test]
    fn absent_value_is_ok() {
        init_test("absent_value_is_ok");
        let val = RetNullable::<i32>::ok(None);
        assert_eq!(val.get_value(), None);
        assert_eq!(val.result(), None);
        assert_eq!(val.require_optional(), None);
        assert!(val.is_ok());
        assert!(val.any_problems().is_empty());
        assert_eq!(RetNullable::ok_some(4).into_result(), Some(4));
        crate::test_complete!("absent_value_is_ok");
    }

    #[test]
    #[should_panic(expected = "RetNullable: contains problems")]
    fn result_on_problem_panics() {
        let val = problem("x");
        let _ = val.result();
    }

    #[test]
    fn require_nonnull_paths() {
        init_test("require_nonnull_paths");
        let (recorder, _guard) = recording_factory();

        crate::test_section!("present");
        let present = RetNullable::ok_some(1);
        let present_id = present.obligation().id();
        let required = present.require_nonnull(LocalizedProblem::new("missing"));
        assert_eq!(required.obligation().id(), present_id);
        assert_eq!(required.result(), &1);
        assert!(required.is_ok());

        crate::test_section!("absent");
        let absent = RetNullable::<i32>::ok(None);
        let absent_id = absent.obligation().id().expect("tracked");
        let failed = absent.require_nonnull(LocalizedProblem::new("missing"));
        let failed_id = failed.obligation().id().expect("tracked");
        assert!(recorder.find(absent_id).expect("record").is_discharged());
        assert_eq!(pending_set(&recorder), BTreeSet::from([failed_id]));
        assert_eq!(failed.valid_problems().messages(), vec!["missing"]);
        crate::test_complete!("require_nonnull_paths");
    }

    #[test]
    fn defaults_fill_absent_values() {
        init_test("defaults_fill_absent_values");
        assert_eq!(RetNullable::ok(None).default_as(9).result(), &9);
        assert_eq!(RetNullable::ok_some(1).default_as(9).result(), &1);
        assert_eq!(RetNullable::ok(None).default_or_map(0, |v: i32| v * 2).result(), &0);
        assert_eq!(RetNullable::ok_some(4).default_or_map(0, |v| v * 2).result(), &8);
        let bad = problem("x").default_as(1);
        assert_eq!(bad.any_problems().messages(), vec!["x"]);
        crate::test_complete!("defaults_fill_absent_values");
    }

    #[test]
    fn null_or_variants_skip_absent_values() {
        init_test("null_or_variants_skip_absent_values");
        let mut calls = 0;
        let absent = RetNullable::<i32>::ok(None).null_or_map(|v| {
            calls += 1;
            Some(v + 1)
        });
        assert_eq!(absent.get_value(), None);
        assert!(absent.is_ok());
        let present = RetNullable::ok_some(1).null_or_map(|v| Some(v + 1));
        assert_eq!(present.get_value(), Some(&2));
        assert!(present.is_ok());

        let chained =
            RetNullable::ok_some(2).null_or_then_nullable(|v| RetNullable::ok_some(v * 3));
        assert_eq!(chained.get_value(), Some(&6));
        assert!(chained.is_ok());
        let skipped = RetNullable::<i32>::ok(None).null_or_then_nullable(|_| {
            calls += 1;
            RetNullable::<i32>::ok(None)
        });
        assert!(skipped.is_ok());
        assert_eq!(calls, 0);
        crate::test_complete!("null_or_variants_skip_absent_values");
    }

    #[test]
    fn void_producers_respect_absence() {
        init_test("void_producers_respect_absence");
        let mut seen = Vec::new();
        let consumed = RetNullable::ok_some(5).consume_if_nonnull(|v| seen.push(v));
        assert!(consumed.is_ok());
        let skipped = RetNullable::<i32>::ok(None).consume_if_nonnull(|v| seen.push(v));
        assert!(skipped.is_ok());
        assert_eq!(seen, vec![5]);

        let produced = RetNullable::ok_some(5).produce_void_if_nonnull(|v| {
            RetVoid::from_problem(LocalizedProblem::new(v.to_string()))
        });
        assert_eq!(produced.valid_problems().messages(), vec!["5"]);
        let untouched = RetNullable::<i32>::ok(None)
            .produce_void_if_nonnull(|_| unreachable!("absent value"));
        assert!(untouched.is_ok());
        crate::test_complete!("void_producers_respect_absence");
    }

    #[test]
    fn combinators_see_option() {
        init_test("combinators_see_option");
        let mapped = RetNullable::ok_some(2).map(|v| v.unwrap_or_default() + 1);
        assert_eq!(mapped.result(), &3);
        let nulled = RetNullable::ok_some(2).map_nullable(|v| v.filter(|n| *n > 5));
        assert_eq!(nulled.get_value(), None);
        assert!(nulled.is_ok());
        let chained = RetNullable::<i32>::ok(None).then(|v| RetVal::ok(v.is_none()));
        assert_eq!(chained.result(), &true);
        let nested = RetNullable::ok_some(1).then_nullable(|v| RetNullable::ok(v.map(|n| n + 1)));
        assert_eq!(nested.get_value(), Some(&2));
        assert!(nested.is_ok());
        let voided = RetNullable::ok_some(1).produce_void(|_| RetVoid::ok());
        assert!(voided.is_ok());
        let mut ran = false;
        let run = RetNullable::<i32>::ok(None).then_run(|v| ran = v.is_none());
        assert!(run.is_ok());
        assert!(ran);
        let consumed = RetNullable::ok_some(1).consume(drop);
        assert!(consumed.is_ok());
        assert!(mapped.is_ok());
        assert!(chained.is_ok());
        crate::test_complete!("combinators_see_option");
    }

    #[test]
    fn then_validate_sees_absence() {
        init_test("then_validate_sees_absence");
        let val = RetNullable::<i32>::ok(None).then_validate(|v| {
            v.is_none()
                .then(|| RetVoid::from_problem(LocalizedProblem::new("required")))
        });
        assert_eq!(val.valid_problems().messages(), vec!["required"]);
        crate::test_complete!("then_validate_sees_absence");
    }

    #[test]
    fn problem_forwarding_keeps_messages() {
        init_test("problem_forwarding_keeps_messages");
        let forwarded: RetVal<String> = problem("a").forward_problems();
        let again: RetNullable<u8> = forwarded.forward_nullable_problems();
        assert_eq!(again.valid_problems().messages(), vec!["a"]);
        crate::test_complete!("problem_forwarding_keeps_messages");
    }
}
