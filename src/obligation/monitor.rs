//! The monitor strategy seam.

use super::ObligationRecord;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Strategy that observes obligation lifecycles.
///
/// A monitor never takes part in computing values or problems. It is told when a
/// handle is registered, discharged for the first time, and dropped while pending.
pub trait ObligationMonitor: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Whether registration should allocate a record at all.
    ///
    /// When false, handles are untracked and the remaining callbacks are never invoked.
    fn tracks(&self) -> bool {
        true
    }

    /// Whether every container step gets its own handle.
    ///
    /// When false, combinators that produce an equivalent container pass the existing
    /// handle along instead of registering a new one.
    fn is_trace_enabled(&self) -> bool;

    /// A handle was registered.
    fn on_register(&self, _record: &Arc<ObligationRecord>) {}

    /// A handle was discharged for the first time.
    fn on_discharge(&self, _record: &ObligationRecord) {}

    /// A handle was dropped while still pending. Called at most once per handle.
    ///
    /// Implementations must not panic: this runs inside `Drop`.
    fn on_leak(&self, record: &ObligationRecord);
}

/// Production monitor: tracks nothing, costs nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl NoopMonitor {
    /// The process-wide shared instance.
    #[must_use]
    pub fn shared() -> Arc<dyn ObligationMonitor> {
        static SHARED: OnceLock<Arc<dyn ObligationMonitor>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Self)))
    }
}

impl ObligationMonitor for NoopMonitor {
    fn name(&self) -> &str {
        "noop"
    }

    fn tracks(&self) -> bool {
        false
    }

    fn is_trace_enabled(&self) -> bool {
        false
    }

    fn on_leak(&self, _record: &ObligationRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_shared_is_singleton() {
        crate::test_utils::init_test_logging();
        crate::test_phase!("noop_shared_is_singleton");
        let a = NoopMonitor::shared();
        let b = NoopMonitor::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.tracks());
        assert!(!a.is_trace_enabled());
        assert_eq!(a.name(), "noop");
        crate::test_complete!("noop_shared_is_singleton");
    }
}
