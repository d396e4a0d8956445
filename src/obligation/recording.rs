//! A monitor that remembers every registration, for test assertions.
//!
//! Instead of waiting on reports, tests query the registry directly: which handles are
//! still pending, how often a handle was discharged, which ones leaked.

use super::{ObligationId, ObligationMonitor, ObligationRecord};
use crate::tracing_compat::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Registry-backed monitor.
///
/// Trace mode is off by default, so forwarding combinators reuse handles; switch it on
/// with [`RecordingMonitor::set_trace_enabled`] to see a fresh handle per step.
#[derive(Debug)]
pub struct RecordingMonitor {
    name: String,
    trace_enabled: AtomicBool,
    records: Mutex<Vec<Arc<ObligationRecord>>>,
}

impl RecordingMonitor {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::named("recording")
    }

    /// An empty registry with a custom name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            trace_enabled: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Turns per-step handle registration on or off.
    pub fn set_trace_enabled(&self, enabled: bool) {
        self.trace_enabled.store(enabled, Ordering::Release);
    }

    /// Every record, in registration order.
    #[must_use]
    pub fn registered(&self) -> Vec<Arc<ObligationRecord>> {
        self.records.lock().clone()
    }

    /// Records never discharged, whether their container is still alive or not.
    #[must_use]
    pub fn pending(&self) -> Vec<Arc<ObligationRecord>> {
        self.filtered(|r| !r.is_discharged())
    }

    /// Identifiers of [`RecordingMonitor::pending`] records.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<ObligationId> {
        self.pending().iter().map(|r| r.id()).collect()
    }

    /// Records whose container was dropped while pending.
    #[must_use]
    pub fn leaked(&self) -> Vec<Arc<ObligationRecord>> {
        self.filtered(|r| r.is_leaked())
    }

    /// Looks a record up by identifier.
    #[must_use]
    pub fn find(&self, id: ObligationId) -> Option<Arc<ObligationRecord>> {
        self.records.lock().iter().find(|r| r.id() == id).cloned()
    }

    /// Discharge count of a record, zero when unknown.
    #[must_use]
    pub fn discharge_count(&self, id: ObligationId) -> u32 {
        self.find(id).map_or(0, |r| r.discharge_count())
    }

    /// Forgets every record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn filtered(&self, keep: impl Fn(&ObligationRecord) -> bool) -> Vec<Arc<ObligationRecord>> {
        self.records
            .lock()
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

impl Default for RecordingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ObligationMonitor for RecordingMonitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_trace_enabled(&self) -> bool {
        self.trace_enabled.load(Ordering::Acquire)
    }

    fn on_register(&self, record: &Arc<ObligationRecord>) {
        self.records.lock().push(Arc::clone(record));
    }

    fn on_leak(&self, record: &ObligationRecord) {
        debug!(
            monitor = %self.name,
            obligation = %record.id(),
            "recorded leak: {}",
            record.describe()
        );
    }
}
