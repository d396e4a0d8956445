//! Observation obligations: the promise that a container's problem state gets looked at.
//!
//! Every container holds one [`Obligation`]. It starts out pending and is discharged by
//! the operations that tell the caller the truth about the container's state. When a
//! pending obligation is dropped, the monitor that issued it hears about it exactly once.
//!
//! # Leak detection by drop
//!
//! Rust is affine: values may be dropped silently. The handle approximates "must be
//! inspected" the same way a drop bomb approximates linearity:
//!
//! 1. The container is `#[must_use]`, so ignoring it outright is a compiler warning.
//! 2. Dropping a pending, tracked handle calls [`ObligationMonitor::on_leak`].
//!    Reporting happens at the drop point, synchronously, on the dropping thread.
//! 3. Discharge only ever moves a flag forward, so concurrent or repeated discharges
//!    are harmless.
//!
//! Untracked handles (no-op monitor, simple factory) carry no allocation at all.
//!
//! # Identity reuse
//!
//! Combinators that produce an equivalent container may hand the same handle on
//! ([`Obligation::forward`]). That is only done when the issuing monitor does not ask for
//! per-step tracing; otherwise the source is discharged and a fresh handle is registered
//! at the call site that produced the new container.

pub mod leak;
pub mod monitor;
pub mod recording;

pub use leak::{LeakReport, LeakReporter, LoggingReporter, MonitorStats, TracingMonitor};
pub use monitor::{NoopMonitor, ObligationMonitor};
pub use recording::RecordingMonitor;

use crate::problem::ProblemList;
use crate::tracing_compat::trace;
use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_OBLIGATION_ID: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// ObligationId
// ============================================================================

/// Process-unique identifier of a tracked obligation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObligationId(u64);

impl ObligationId {
    fn next() -> Self {
        Self(NEXT_OBLIGATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObligationId({})", self.0)
    }
}

impl fmt::Display for ObligationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

// ============================================================================
// ObligationRecord
// ============================================================================

/// What a monitor knows about one registered obligation.
pub struct ObligationRecord {
    id: ObligationId,
    shape: Mutex<&'static str>,
    location: &'static Location<'static>,
    problems: ProblemList,
    discharges: AtomicU32,
    leaked: AtomicBool,
}

impl ObligationRecord {
    fn new(
        shape: &'static str,
        problems: &ProblemList,
        location: &'static Location<'static>,
    ) -> Self {
        Self {
            id: ObligationId::next(),
            shape: Mutex::new(shape),
            location,
            problems: problems.clone(),
            discharges: AtomicU32::new(0),
            leaked: AtomicBool::new(false),
        }
    }

    /// The obligation's identifier.
    #[must_use]
    pub fn id(&self) -> ObligationId {
        self.id
    }

    /// Name of the container shape that currently owns the obligation.
    ///
    /// A handle forwarded unchanged to another shape takes that shape's name.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        *self.shape.lock()
    }

    /// Source location where the container was created.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Problems the container held at creation (empty for Ok containers).
    #[must_use]
    pub fn problems(&self) -> &ProblemList {
        &self.problems
    }

    /// Whether the container holds problems.
    #[must_use]
    pub fn is_problem(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Whether the obligation has been discharged at least once.
    #[must_use]
    pub fn is_discharged(&self) -> bool {
        self.discharges.load(Ordering::Acquire) > 0
    }

    /// How many times discharge was requested.
    #[must_use]
    pub fn discharge_count(&self) -> u32 {
        self.discharges.load(Ordering::Acquire)
    }

    /// Whether the owning container was dropped while still pending.
    #[must_use]
    pub fn is_leaked(&self) -> bool {
        self.leaked.load(Ordering::Acquire)
    }

    /// One-line description used in leak reports.
    #[must_use]
    pub fn describe(&self) -> String {
        let shape = self.shape();
        if self.problems.is_empty() {
            format!("{shape}(ok)")
        } else {
            format!(
                "{shape}({} problem(s): {})",
                self.problems.len(),
                self.problems.join_messages("; ")
            )
        }
    }

    fn retag(&self, shape: &'static str) {
        *self.shape.lock() = shape;
    }

    /// Returns true on the first discharge only.
    fn mark_discharged(&self) -> bool {
        self.discharges.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Returns true on the first leak only.
    fn mark_leaked(&self) -> bool {
        !self.leaked.swap(true, Ordering::AcqRel)
    }
}

impl fmt::Debug for ObligationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObligationRecord")
            .field("id", &self.id)
            .field("shape", &self.shape())
            .field("location", &format_args!("{}", self.location))
            .field("problems", &self.problems)
            .field("discharges", &self.discharge_count())
            .field("leaked", &self.is_leaked())
            .finish()
    }
}

// ============================================================================
// Obligation
// ============================================================================

struct Tracked {
    record: Arc<ObligationRecord>,
    monitor: Arc<dyn ObligationMonitor>,
}

/// The per-container obligation handle.
///
/// Dropping a tracked handle that was never discharged reports a leak to its monitor.
#[must_use = "an obligation is reported as leaked when dropped before discharge"]
pub struct Obligation {
    tracked: Option<Tracked>,
}

impl Obligation {
    /// A handle that tracks nothing.
    pub const fn untracked() -> Self {
        Self { tracked: None }
    }

    /// Registers a new obligation with `monitor`.
    ///
    /// Monitors that do not track hand back an untracked handle without allocating.
    pub fn register(
        monitor: &Arc<dyn ObligationMonitor>,
        shape: &'static str,
        problems: &ProblemList,
        location: &'static Location<'static>,
    ) -> Self {
        if !monitor.tracks() {
            return Self::untracked();
        }
        let record = Arc::new(ObligationRecord::new(shape, problems, location));
        trace!(
            obligation = %record.id(),
            shape,
            location = %location,
            monitor = monitor.name(),
            "obligation registered"
        );
        monitor.on_register(&record);
        Self {
            tracked: Some(Tracked {
                record,
                monitor: Arc::clone(monitor),
            }),
        }
    }

    /// Identifier of the tracked obligation, if any.
    #[must_use]
    pub fn id(&self) -> Option<ObligationId> {
        self.tracked.as_ref().map(|t| t.record.id())
    }

    /// Whether a monitor is tracking this handle.
    #[must_use]
    pub fn is_tracked(&self) -> bool {
        self.tracked.is_some()
    }

    /// Whether the handle is tracked and still waiting for discharge.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.tracked
            .as_ref()
            .is_some_and(|t| !t.record.is_discharged())
    }

    /// The monitor's record for this handle.
    #[must_use]
    pub fn record(&self) -> Option<&Arc<ObligationRecord>> {
        self.tracked.as_ref().map(|t| &t.record)
    }

    /// Marks the obligation as fulfilled. Idempotent.
    pub fn discharge(&self) {
        if let Some(tracked) = &self.tracked {
            if tracked.record.mark_discharged() {
                tracked.monitor.on_discharge(&tracked.record);
            }
        }
    }

    /// Whether forwarding may hand this very handle to the next container.
    #[must_use]
    pub fn reuses_identity(&self) -> bool {
        self.tracked
            .as_ref()
            .map_or(true, |t| !t.monitor.is_trace_enabled())
    }

    /// Registers a sibling obligation with the same monitor.
    pub(crate) fn derive(
        &self,
        shape: &'static str,
        problems: &ProblemList,
        location: &'static Location<'static>,
    ) -> Self {
        match &self.tracked {
            None => Self::untracked(),
            Some(tracked) => Self::register(&tracked.monitor, shape, problems, location),
        }
    }

    /// Hands the obligation to an equivalent container.
    ///
    /// Either this handle moves on unchanged, or it is discharged and replaced by a fresh
    /// pending one (see [`Obligation::reuses_identity`]).
    pub(crate) fn forward(
        self,
        shape: &'static str,
        problems: &ProblemList,
        location: &'static Location<'static>,
    ) -> Self {
        if self.reuses_identity() {
            if let Some(tracked) = &self.tracked {
                trace!(obligation = %tracked.record.id(), shape, "obligation forwarded");
                tracked.record.retag(shape);
            }
            return self;
        }
        let next = self.derive(shape, problems, location);
        self.discharge();
        next
    }
}

impl Drop for Obligation {
    fn drop(&mut self) {
        let Some(tracked) = self.tracked.take() else {
            return;
        };
        if !tracked.record.is_discharged() && tracked.record.mark_leaked() {
            tracked.monitor.on_leak(&tracked.record);
        }
    }
}

impl fmt::Debug for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tracked {
            None => f.write_str("Obligation(untracked)"),
            Some(tracked) => {
                let state = if tracked.record.is_discharged() {
                    "discharged"
                } else {
                    "pending"
                };
                write!(f, "Obligation({}, {state})", tracked.record.id())
            }
        }
    }
}
