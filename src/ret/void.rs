//! [`RetVoid`]: containers that only carry a problem state.

use super::{
    derived_ok, derived_problem, retag, NoValue, Nullable, Required, Ret, RetNullable, RetVal,
    RetVoid, Shape, State,
};
use crate::factory::RetFactory;
use crate::problem::{join_problem_sets, ProblemList};
use std::panic::Location;

impl Ret<(), NoValue> {
    /// An Ok container.
    #[track_caller]
    pub fn ok() -> Self {
        Self::ok_current(())
    }

    /// Ok when `problems` is empty, otherwise a Problem container holding them.
    #[track_caller]
    pub fn ok_or_problems(problems: ProblemList) -> Self {
        let location = Location::caller();
        let factory = RetFactory::current();
        if problems.is_empty() {
            let obligation = factory.obligation(NoValue::NAME, ProblemList::empty_ref(), location);
            Self::ok_with((), obligation)
        } else {
            Self::problems_with(problems, &factory, location)
        }
    }

    // ------------------------------------------------------------------------
    // Combinators
    // ------------------------------------------------------------------------

    /// Chains a computation that may fail. Discharges the receiver when Ok.
    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce() -> RetVal<R>) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                obligation.discharge();
                f()
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Produces a value when Ok. Discharges the receiver when Ok.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce() -> R) -> RetVal<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                obligation.discharge();
                derived_ok::<R, Required>(&obligation, f(), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Chains a computation producing a possibly-absent value.
    #[track_caller]
    pub fn then_nullable<R>(self, f: impl FnOnce() -> RetNullable<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                obligation.discharge();
                f()
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Produces a possibly-absent value when Ok.
    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce() -> Option<R>) -> RetNullable<R> {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                obligation.discharge();
                derived_ok::<R, Nullable>(&obligation, f(), location)
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Chains another no-value computation.
    #[track_caller]
    pub fn then_void(self, f: impl FnOnce() -> RetVoid) -> RetVoid {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                obligation.discharge();
                f()
            }
            (State::Problem(problems), obligation) => retag(problems, obligation, location),
        }
    }

    /// Same as [`Ret::then_void`].
    #[track_caller]
    pub fn produce_void(self, f: impl FnOnce() -> RetVoid) -> RetVoid {
        self.then_void(f)
    }

    /// Runs a side effect when Ok and passes the container on.
    #[track_caller]
    pub fn then_run(self, f: impl FnOnce()) -> Self {
        let location = Location::caller();
        match self.into_parts() {
            (State::Ok(()), obligation) => {
                f();
                let obligation =
                    obligation.forward(NoValue::NAME, ProblemList::empty_ref(), location);
                Self::ok_with((), obligation)
            }
            (state, obligation) => Self::assemble(state, obligation),
        }
    }

    // ------------------------------------------------------------------------
    // Accumulation
    // ------------------------------------------------------------------------

    /// Always runs `supplier` and merges problems from both sides.
    ///
    /// When the receiver is Ok the supplier's container is returned as is. Otherwise the
    /// result is a Problem container with the receiver's problems first, then the
    /// supplier's; a supplied value is lost. The receiver is always discharged.
    #[track_caller]
    pub fn with<R>(self, supplier: impl FnOnce() -> RetVal<R>) -> RetVal<R> {
        let location = Location::caller();
        let supplied = supplier();
        self.merge_into(supplied, location)
    }

    /// Like [`Ret::with`] for a supplier of plain values.
    #[track_caller]
    pub fn with_value<R>(self, supplier: impl FnOnce() -> R) -> RetVal<R> {
        let location = Location::caller();
        let supplied = derived_ok::<R, Required>(&self.obligation, supplier(), location);
        self.merge_into(supplied, location)
    }

    /// Like [`Ret::with`] for a supplier of possibly-absent containers.
    #[track_caller]
    pub fn with_nullable<R>(self, supplier: impl FnOnce() -> RetNullable<R>) -> RetNullable<R> {
        let location = Location::caller();
        let supplied = supplier();
        self.merge_into(supplied, location)
    }

    /// Like [`Ret::with`] for a supplier of possibly-absent values.
    #[track_caller]
    pub fn with_nullable_value<R>(self, supplier: impl FnOnce() -> Option<R>) -> RetNullable<R> {
        let location = Location::caller();
        let supplied = derived_ok::<R, Nullable>(&self.obligation, supplier(), location);
        self.merge_into(supplied, location)
    }

    /// Like [`Ret::with`] for a supplier of no-value containers.
    #[track_caller]
    pub fn with_void(self, supplier: impl FnOnce() -> RetVoid) -> RetVoid {
        let location = Location::caller();
        let supplied = supplier();
        self.merge_into(supplied, location)
    }

    fn merge_into<U, S2: Shape>(
        self,
        supplied: Ret<U, S2>,
        location: &'static Location<'static>,
    ) -> Ret<U, S2> {
        let (state, obligation) = self.into_parts();
        obligation.discharge();
        match state {
            State::Ok(()) => supplied,
            State::Problem(problems) => {
                // Reading the supplied container discharges it either way.
                let joined = if supplied.has_problems() {
                    join_problem_sets([&problems, supplied.valid_problems()])
                } else {
                    problems
                };
                derived_problem(&obligation, joined, location)
            }
        }
    }
}
