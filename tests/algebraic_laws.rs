//! Algebraic law property tests for retcheck containers.
//!
//! # Laws Tested
//!
//! ## Container State Laws
//! - exactly one of is_ok / is_problem holds
//! - any_problems is non-empty iff the container holds problems
//! - problem constructors preserve order and multiplicity
//!
//! ## Join Laws
//! - join_problem_sets is associative and preserves order
//! - empty sets are identities; an all-empty join is the canonical empty list
//!
//! ## Combinator Laws
//! - map composition: map(f).map(g) == map(g . f)
//! - then left identity: ok(v).then(f) == f(v)
//! - short circuit: combinators on Problem never run and keep the problems

#[macro_use]
mod common;

use common::*;
use proptest::prelude::*;
use retcheck::{
    join_problem_sets, LocalizedProblem, Problem, ProblemList, ProblemRef, RetNullable, RetVal,
    RetVoid,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_message() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn arb_messages(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_message(), 0..=max)
}

fn list_of(messages: &[String]) -> ProblemList {
    messages
        .iter()
        .map(|m| LocalizedProblem::new(m.as_str()).shared())
        .collect()
}

/// Either an Ok value or a non-empty problem set.
fn arb_ret() -> impl Strategy<Value = Result<i64, Vec<String>>> {
    prop_oneof![
        any::<i64>().prop_map(Ok),
        prop::collection::vec(arb_message(), 1..=4).prop_map(Err),
    ]
}

fn build(case: &Result<i64, Vec<String>>) -> RetVal<i64> {
    match case {
        Ok(value) => RetVal::ok(*value),
        Err(messages) => RetVal::from_problem_list(list_of(messages)),
    }
}

// ============================================================================
// Container State Laws
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(256))]

    #[test]
    fn exactly_one_state_holds(case in arb_ret()) {
        init_test_logging();
        let val = build(&case);
        let ok = val.is_ok();
        let problem = val.is_problem();
        prop_assert!(ok != problem);
        prop_assert_eq!(ok, case.is_ok());
        prop_assert_eq!(!val.any_problems().is_empty(), problem);
    }

    #[test]
    fn problem_constructor_preserves_order(
        messages in prop::collection::vec(arb_message(), 1..=6)
    ) {
        let refs: Vec<ProblemRef> = messages
            .iter()
            .map(|m| LocalizedProblem::new(m.as_str()).shared())
            .collect();
        let val = RetVoid::from_problems(refs);
        prop_assert_eq!(val.valid_problems().messages(), messages);
    }

    #[test]
    fn absent_entries_are_skipped(
        messages in prop::collection::vec(prop::option::of(arb_message()), 1..=6)
    ) {
        prop_assume!(messages.iter().any(Option::is_some));
        let items: Vec<Option<ProblemRef>> = messages
            .iter()
            .map(|m| m.as_ref().map(|m| LocalizedProblem::new(m.as_str()).shared()))
            .collect();
        let expected: Vec<String> = messages.into_iter().flatten().collect();
        let val = RetNullable::<u8>::from_problems(items);
        prop_assert_eq!(val.valid_problems().messages(), expected);
    }
}

// ============================================================================
// Join Laws
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(256))]

    #[test]
    fn join_is_associative(a in arb_messages(3), b in arb_messages(3), c in arb_messages(3)) {
        let (a, b, c) = (list_of(&a), list_of(&b), list_of(&c));
        let left = join_problem_sets([&join_problem_sets([&a, &b]), &c]);
        let right = join_problem_sets([&a, &join_problem_sets([&b, &c])]);
        prop_assert_eq!(&left, &right);
        let flat: Vec<String> = a.messages().into_iter()
            .chain(b.messages())
            .chain(c.messages())
            .collect();
        prop_assert_eq!(left.messages(), flat);
    }

    #[test]
    fn empty_sets_are_identities(a in arb_messages(4)) {
        let a = list_of(&a);
        let empty = ProblemList::empty();
        let joined = join_problem_sets([&empty, &a, &empty]);
        prop_assert_eq!(&joined, &a);
        if a.is_empty() {
            prop_assert!(ProblemList::ptr_eq(&joined, &ProblemList::empty()));
        }
    }
}

// ============================================================================
// Combinator Laws
// ============================================================================

proptest! {
    #![proptest_config(test_proptest_config(256))]

    #[test]
    fn map_composition(case in arb_ret()) {
        let f = |v: i64| v.wrapping_mul(3);
        let g = |v: i64| v.wrapping_sub(7);
        let stepwise = build(&case).map(f).map(g);
        let fused = build(&case).map(|v| g(f(v)));
        prop_assert_eq!(stepwise.get_value(), fused.get_value());
        prop_assert_eq!(stepwise.any_problems(), fused.any_problems());
        prop_assert_eq!(stepwise.is_ok(), fused.is_ok());
    }

    #[test]
    fn then_left_identity(value in any::<i64>()) {
        let f = |v: i64| {
            if v % 2 == 0 {
                RetVal::ok(v / 2)
            } else {
                RetVal::from_problem(LocalizedProblem::new("odd"))
            }
        };
        let chained = RetVal::ok(value).then(f);
        let direct = f(value);
        prop_assert_eq!(chained.get_value(), direct.get_value());
        prop_assert_eq!(chained.any_problems(), direct.any_problems());
        prop_assert_eq!(chained.is_ok(), direct.is_ok());
    }

    #[test]
    fn problems_short_circuit(messages in prop::collection::vec(arb_message(), 1..=4)) {
        let expected = messages.clone();
        let out = RetVal::<i64>::from_problem_list(list_of(&messages))
            .map(|_| -> i64 { unreachable!("map on problem") })
            .then_nullable(|_| -> RetNullable<u8> { unreachable!("then on problem") })
            .consume(|_| unreachable!("consume on problem"));
        prop_assert_eq!(out.valid_problems().messages(), expected);
    }
}
