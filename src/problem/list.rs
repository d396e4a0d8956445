//! Ordered, immutable, absent-free problem sequences and the joins that build them.
//!
//! Every join concatenates strictly left to right, keeps duplicates, and drops absent
//! entries (`None` items) without complaint. A join that ends up with nothing returns
//! the canonical empty list, so "no problems" never allocates after the first use.

use super::{Problem, ProblemRef};
use crate::error::UsageError;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

static EMPTY: OnceLock<ProblemList> = OnceLock::new();

/// An immutable, ordered list of problems.
///
/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct ProblemList {
    items: Arc<[ProblemRef]>,
}

impl ProblemList {
    /// Returns the canonical empty list.
    ///
    /// All empty lists produced by this crate share the same storage, observable through
    /// [`ProblemList::ptr_eq`].
    #[must_use]
    pub fn empty() -> Self {
        Self::empty_ref().clone()
    }

    /// Borrowed form of [`ProblemList::empty`].
    #[must_use]
    pub fn empty_ref() -> &'static Self {
        EMPTY.get_or_init(|| Self {
            items: Arc::from(Vec::new()),
        })
    }

    /// A list holding exactly one problem.
    #[must_use]
    pub fn single(problem: ProblemRef) -> Self {
        Self {
            items: Arc::from(vec![problem]),
        }
    }

    /// A list holding exactly one problem, moved behind a shared handle.
    #[must_use]
    pub fn of(problem: impl Problem) -> Self {
        Self::single(problem.shared())
    }

    pub(crate) fn from_vec(items: Vec<ProblemRef>) -> Self {
        if items.is_empty() {
            Self::empty()
        } else {
            Self {
                items: Arc::from(items),
            }
        }
    }

    /// Returns true when both lists share storage.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.items, &b.items)
    }

    /// The problems as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ProblemRef] {
        &self.items
    }

    /// Every problem's message, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|p| p.message().into_owned()).collect()
    }

    /// Joins the messages with `separator`.
    #[must_use]
    pub fn join_messages(&self, separator: &str) -> String {
        join_problem_messages(separator, self)
    }
}

impl Default for ProblemList {
    fn default() -> Self {
        Self::empty()
    }
}

impl Deref for ProblemList {
    type Target = [ProblemRef];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'a> IntoIterator for &'a ProblemList {
    type Item = &'a ProblemRef;
    type IntoIter = std::slice::Iter<'a, ProblemRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<ProblemRef> for ProblemList {
    fn from_iter<I: IntoIterator<Item = ProblemRef>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl From<Vec<ProblemRef>> for ProblemList {
    fn from(items: Vec<ProblemRef>) -> Self {
        Self::from_vec(items)
    }
}

/// Lists compare equal when their messages match pairwise.
impl PartialEq for ProblemList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b) || a.message() == b.message())
    }
}

impl Eq for ProblemList {}

impl fmt::Debug for ProblemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.items.iter().map(|p| p.message()))
            .finish()
    }
}

impl fmt::Display for ProblemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_problem_messages("; ", self))
    }
}

// ============================================================================
// Joins
// ============================================================================

/// Concatenates individual problems, dropping absent entries.
///
/// Accepts either `ProblemRef` or `Option<ProblemRef>` items.
pub fn join_problems<I>(problems: I) -> ProblemList
where
    I: IntoIterator,
    I::Item: Into<Option<ProblemRef>>,
{
    problems
        .into_iter()
        .filter_map(Into::<Option<ProblemRef>>::into)
        .collect()
}

/// Concatenates whole problem lists, dropping absent lists.
///
/// Accepts either `&ProblemList` or `Option<&ProblemList>` items. When exactly one
/// non-empty list contributes, its storage is shared instead of copied.
pub fn join_problem_sets<'a, I>(sets: I) -> ProblemList
where
    I: IntoIterator,
    I::Item: Into<Option<&'a ProblemList>>,
{
    let mut only: Option<&'a ProblemList> = None;
    let mut joined: Vec<ProblemRef> = Vec::new();
    let mut contributors = 0usize;
    for set in sets
        .into_iter()
        .filter_map(Into::<Option<&'a ProblemList>>::into)
    {
        if set.is_empty() {
            continue;
        }
        contributors += 1;
        if contributors == 1 {
            only = Some(set);
        }
        joined.extend(set.iter().cloned());
    }
    match (contributors, only) {
        (1, Some(set)) => set.clone(),
        _ => ProblemList::from_vec(joined),
    }
}

/// Joins every problem's message with `separator`.
#[must_use]
pub fn join_problem_messages(separator: &str, problems: &ProblemList) -> String {
    let mut out = String::new();
    for (idx, problem) in problems.iter().enumerate() {
        if idx > 0 {
            out.push_str(separator);
        }
        out.push_str(&problem.message());
    }
    out
}

/// Checks that a list can back a Problem-state container.
pub fn enforce_has_problems(problems: ProblemList) -> Result<ProblemList, UsageError> {
    if problems.is_empty() {
        Err(UsageError::NoProblemsDefined)
    } else {
        Ok(problems)
    }
}
