//! Leak reporting: the tracing monitor and its reporters.
//!
//! [`TracingMonitor`] tracks every container and turns each undischarged drop into a
//! [`LeakReport`] handed to a [`LeakReporter`]. The default reporter writes one warning
//! line through `tracing`; tests and applications can install their own sink.
//!
//! ```
//! use retcheck::obligation::{LeakReport, TracingMonitor};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let monitor = TracingMonitor::with_reporter("checks", move |report: &LeakReport| {
//!     sink.lock().unwrap().push(report.to_string());
//! });
//! assert_eq!(monitor.stats().leaked, 0);
//! ```

use super::{ObligationId, ObligationMonitor, ObligationRecord};
use crate::tracing_compat::{debug, warn};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default monitor name, used in every report line.
pub const DEFAULT_MONITOR_NAME: &str = "problem state";

// ============================================================================
// LeakReport
// ============================================================================

/// Description of one container that was dropped without being checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakReport {
    /// Name of the reporting monitor.
    pub monitor: String,
    /// Obligation identifier.
    pub obligation: ObligationId,
    /// Shape of the container that was dropped.
    pub shape: &'static str,
    /// `file:line:column` where the obligation was registered. A handle forwarded
    /// unchanged keeps the location of its first container.
    pub location: String,
    /// Number of problems the container held.
    pub problem_count: usize,
    /// Description of the container.
    pub description: String,
}

impl LeakReport {
    /// Builds a report from a monitor record.
    #[must_use]
    pub fn from_record(monitor: &str, record: &ObligationRecord) -> Self {
        Self {
            monitor: monitor.to_owned(),
            obligation: record.id(),
            shape: record.shape(),
            location: record.location().to_string(),
            problem_count: record.problems().len(),
            description: record.describe(),
        }
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: did not check {} [{}]; created at {}",
            self.monitor, self.description, self.obligation, self.location
        )
    }
}

// ============================================================================
// Reporters
// ============================================================================

/// Sink for leak reports.
pub trait LeakReporter: Send + Sync {
    /// Receives one report. Must not panic.
    fn report(&self, leak: &LeakReport);
}

impl<F> LeakReporter for F
where
    F: Fn(&LeakReport) + Send + Sync,
{
    fn report(&self, leak: &LeakReport) {
        self(leak);
    }
}

/// Writes each report as a single `warn` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter;

impl LeakReporter for LoggingReporter {
    fn report(&self, leak: &LeakReport) {
        warn!(
            monitor = %leak.monitor,
            obligation = %leak.obligation,
            shape = leak.shape,
            location = %leak.location,
            problems = leak.problem_count,
            "{leak}"
        );
    }
}

// ============================================================================
// TracingMonitor
// ============================================================================

/// Snapshot of a [`TracingMonitor`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Handles registered.
    pub registered: u64,
    /// Handles discharged at least once.
    pub discharged: u64,
    /// Handles dropped while pending.
    pub leaked: u64,
}

impl MonitorStats {
    /// Handles that are neither discharged nor leaked.
    #[must_use]
    pub const fn pending(&self) -> u64 {
        self.registered
            .saturating_sub(self.discharged)
            .saturating_sub(self.leaked)
    }
}

/// Debug/test monitor: every container is tracked and every leak is reported.
pub struct TracingMonitor {
    name: String,
    reporter: Arc<dyn LeakReporter>,
    registered: AtomicU64,
    discharged: AtomicU64,
    leaked: AtomicU64,
}

impl TracingMonitor {
    /// A monitor reporting through [`LoggingReporter`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_reporter(name, LoggingReporter)
    }

    /// A monitor reporting through `reporter`.
    pub fn with_reporter(name: impl Into<String>, reporter: impl LeakReporter + 'static) -> Self {
        Self {
            name: name.into(),
            reporter: Arc::new(reporter),
            registered: AtomicU64::new(0),
            discharged: AtomicU64::new(0),
            leaked: AtomicU64::new(0),
        }
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> MonitorStats {
        MonitorStats {
            registered: self.registered.load(Ordering::Relaxed),
            discharged: self.discharged.load(Ordering::Relaxed),
            leaked: self.leaked.load(Ordering::Relaxed),
        }
    }
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MONITOR_NAME)
    }
}

impl fmt::Debug for TracingMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingMonitor")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ObligationMonitor for TracingMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_trace_enabled(&self) -> bool {
        true
    }

    fn on_register(&self, _record: &Arc<ObligationRecord>) {
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    fn on_discharge(&self, _record: &ObligationRecord) {
        self.discharged.fetch_add(1, Ordering::Relaxed);
    }

    fn on_leak(&self, record: &ObligationRecord) {
        self.leaked.fetch_add(1, Ordering::Relaxed);
        let report = LeakReport::from_record(&self.name, record);
        let reporter = &self.reporter;
        if panic::catch_unwind(AssertUnwindSafe(|| reporter.report(&report))).is_err() {
            debug!(obligation = %report.obligation, "leak reporter panicked; report dropped");
        }
    }
}
