#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! mod common;
//! use common::*;
//! ```

use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use retcheck::{FactoryGuard, ObligationId, RecordingMonitor, RetFactory};
use std::collections::BTreeSet;
use std::sync::{Arc, Once};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED5EED;

const PROPTEST_SEED_ENV: &str = "RETCHECK_PROPTEST_SEED";
const PROPTEST_MAX_SHRINK_ITERS_ENV: &str = "RETCHECK_PROPTEST_MAX_SHRINK_ITERS";

/// Configuration for property tests with optional deterministic seed support.
#[derive(Debug, Clone)]
pub struct PropertyTestConfig {
    /// Fixed seed for reproducibility (overrides CI default when set).
    pub seed: Option<u64>,
    /// Number of successful cases required.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl PropertyTestConfig {
    /// Build a config with defaults for property tests.
    #[must_use]
    pub fn new(cases: u32) -> Self {
        Self {
            seed: read_proptest_seed(),
            cases,
            max_shrink_iters: read_max_shrink_iters()
                .unwrap_or(ProptestConfig::default().max_shrink_iters),
        }
    }

    /// Convert into a ProptestConfig, applying deterministic seed rules.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        let mut config = ProptestConfig::with_cases(self.cases);

        // Honor existing PROPTEST_RNG_SEED, otherwise apply our own.
        if matches!(config.rng_seed, RngSeed::Random) {
            if let Some(seed) = self.seed {
                config.rng_seed = RngSeed::Fixed(seed);
            }
        }

        config.max_shrink_iters = self.max_shrink_iters;
        config
    }
}

/// Build a ProptestConfig with deterministic seed support for CI.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    PropertyTestConfig::new(cases).to_proptest_config()
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }

    if std::env::var("CI").is_ok() {
        return Some(DEFAULT_PROPTEST_SEED);
    }

    None
}

fn read_max_shrink_iters() -> Option<u32> {
    std::env::var(PROPTEST_MAX_SHRINK_ITERS_ENV)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// A recording monitor installed as this thread's factory.
///
/// Keep the guard alive for the duration of the test.
pub fn recording_factory() -> (Arc<RecordingMonitor>, FactoryGuard) {
    let recorder = Arc::new(RecordingMonitor::new());
    let guard = RetFactory::monitored(recorder.clone()).scoped();
    (recorder, guard)
}

/// Like [`recording_factory`], with a fresh handle per forwarding step.
pub fn tracing_recording_factory() -> (Arc<RecordingMonitor>, FactoryGuard) {
    let (recorder, guard) = recording_factory();
    recorder.set_trace_enabled(true);
    (recorder, guard)
}

/// Pending obligation identifiers, as a set.
pub fn pending_set(recorder: &RecordingMonitor) -> BTreeSet<ObligationId> {
    recorder.pending_ids().into_iter().collect()
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// Assert that a recorder holds exactly the given pending obligations.
#[macro_export]
macro_rules! assert_pending {
    ($recorder:expr, [$($id:expr),* $(,)?]) => {{
        let actual = $crate::common::pending_set(&$recorder);
        let expected: ::std::collections::BTreeSet<::retcheck::ObligationId> =
            [$($id),*].into_iter().collect();
        $crate::assert_with_log!(actual == expected, "pending obligations", expected, actual);
    }};
}
