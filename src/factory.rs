//! Container factories and process-wide factory selection.
//!
//! A [`RetFactory`] decides whether new containers carry a tracked obligation. It can be
//! passed around explicitly (`factory.val_ok(..)`), which is the preferred style for code
//! that wants a particular monitor. The free constructors (`RetVal::ok`, ...) consult
//! [`RetFactory::current`] instead:
//!
//! 1. a thread-confined override installed with [`RetFactory::scoped`], if any;
//! 2. otherwise the process-wide factory, built lazily from [`ConfigLoader`] on first use
//!    and replaceable with [`RetFactory::install_global`].
//!
//! Swapping factories is test tooling. A container keeps the monitor it was registered
//! with for its whole life, and so do the containers derived from it; install a new
//! factory before container traffic starts, or per test thread with a scoped override.

use crate::config::{ConfigError, ConfigLoader, FactoryKind, MonitorKind, RetConfig};
use crate::obligation::{NoopMonitor, Obligation, ObligationMonitor, TracingMonitor};
use crate::problem::ProblemList;
use crate::ret::{NoValue, Nullable, Required, RetNullable, RetVal, RetVoid, Shape};
use crate::tracing_compat::{debug, info, warn};
use parking_lot::RwLock;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<RwLock<RetFactory>> = OnceLock::new();

thread_local! {
    static OVERRIDE: RefCell<Option<RetFactory>> = const { RefCell::new(None) };
}

/// Produces containers with or without obligation tracking.
#[derive(Clone)]
pub enum RetFactory {
    /// No tracking: every handle is untracked.
    Simple,
    /// Every container registers with the monitor.
    Monitored(Arc<dyn ObligationMonitor>),
}

impl RetFactory {
    /// The untracked factory.
    #[must_use]
    pub const fn simple() -> Self {
        Self::Simple
    }

    /// A factory registering with `monitor`.
    #[must_use]
    pub fn monitored(monitor: Arc<dyn ObligationMonitor>) -> Self {
        Self::Monitored(monitor)
    }

    /// Builds the factory a configuration describes.
    #[must_use]
    pub fn from_config(config: &RetConfig) -> Self {
        match (config.factory, config.monitor) {
            (FactoryKind::Simple, _) => Self::Simple,
            (FactoryKind::Monitored, MonitorKind::Noop) => Self::Monitored(NoopMonitor::shared()),
            (FactoryKind::Monitored, MonitorKind::Tracing) => Self::Monitored(Arc::new(
                TracingMonitor::new(config.monitor_name.clone()),
            )),
        }
    }

    /// Builds the factory from the environment, falling back to defaults on bad input.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_loaded(ConfigLoader::new().load())
    }

    /// Builds the factory from an explicit set of variables, with the same fallback as
    /// [`from_env`](Self::from_env).
    #[must_use]
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_loaded(ConfigLoader::new().load_from_vars(vars))
    }

    fn from_loaded(loaded: Result<RetConfig, ConfigError>) -> Self {
        let config = loaded.unwrap_or_else(|err| {
            warn!(error = %err, "invalid retcheck configuration, using defaults");
            RetConfig::default()
        });
        debug!(factory = %config.factory, monitor = %config.monitor, "factory configured");
        Self::from_config(&config)
    }

    /// Which family this factory produces.
    #[must_use]
    pub fn kind(&self) -> FactoryKind {
        match self {
            Self::Simple => FactoryKind::Simple,
            Self::Monitored(_) => FactoryKind::Monitored,
        }
    }

    /// The monitor, for monitored factories.
    #[must_use]
    pub fn monitor(&self) -> Option<&Arc<dyn ObligationMonitor>> {
        match self {
            Self::Simple => None,
            Self::Monitored(monitor) => Some(monitor),
        }
    }

    /// Issues an obligation for a new container.
    pub fn obligation(
        &self,
        shape: &'static str,
        problems: &ProblemList,
        location: &'static Location<'static>,
    ) -> Obligation {
        match self {
            Self::Simple => Obligation::untracked(),
            Self::Monitored(monitor) => Obligation::register(monitor, shape, problems, location),
        }
    }

    #[track_caller]
    fn ok_obligation<S: Shape>(&self) -> Obligation {
        self.obligation(S::NAME, ProblemList::empty_ref(), Location::caller())
    }

    /// An Ok [`RetVal`].
    #[track_caller]
    pub fn val_ok<T>(&self, value: T) -> RetVal<T> {
        RetVal::ok_with(value, self.ok_obligation::<Required>())
    }

    /// A Problem [`RetVal`]. Panics when `problems` is empty.
    #[track_caller]
    pub fn val_from_problems<T>(&self, problems: ProblemList) -> RetVal<T> {
        RetVal::problems_with(problems, self, Location::caller())
    }

    /// An Ok [`RetNullable`].
    #[track_caller]
    pub fn nullable_ok<T>(&self, value: Option<T>) -> RetNullable<T> {
        RetNullable::ok_with(value, self.ok_obligation::<Nullable>())
    }

    /// A Problem [`RetNullable`]. Panics when `problems` is empty.
    #[track_caller]
    pub fn nullable_from_problems<T>(&self, problems: ProblemList) -> RetNullable<T> {
        RetNullable::problems_with(problems, self, Location::caller())
    }

    /// An Ok [`RetVoid`].
    #[track_caller]
    pub fn void_ok(&self) -> RetVoid {
        RetVoid::ok_with((), self.ok_obligation::<NoValue>())
    }

    /// A Problem [`RetVoid`]. Panics when `problems` is empty.
    #[track_caller]
    pub fn void_from_problems(&self, problems: ProblemList) -> RetVoid {
        RetVoid::problems_with(problems, self, Location::caller())
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// The factory free constructors use on this thread.
    #[must_use]
    pub fn current() -> Self {
        OVERRIDE
            .with(|cell| cell.borrow().clone())
            .unwrap_or_else(|| global().read().clone())
    }

    /// Replaces the process-wide factory, returning the previous one.
    ///
    /// Containers already created keep their monitor.
    pub fn install_global(factory: Self) -> Self {
        info!(factory = ?factory, "installing process-wide factory");
        std::mem::replace(&mut *global().write(), factory)
    }

    /// Makes this factory current on this thread until the guard is dropped.
    pub fn scoped(self) -> FactoryGuard {
        debug!(factory = ?self, "installing scoped factory override");
        let previous = OVERRIDE.with(|cell| cell.borrow_mut().replace(self));
        FactoryGuard {
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Default for RetFactory {
    fn default() -> Self {
        Self::Monitored(NoopMonitor::shared())
    }
}

impl fmt::Debug for RetFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("RetFactory::Simple"),
            Self::Monitored(monitor) => write!(f, "RetFactory::Monitored({})", monitor.name()),
        }
    }
}

fn global() -> &'static RwLock<RetFactory> {
    GLOBAL.get_or_init(|| RwLock::new(RetFactory::from_env()))
}

/// Restores the previous thread-local factory on drop.
#[must_use = "the override ends when the guard is dropped"]
pub struct FactoryGuard {
    previous: Option<RetFactory>,
    _not_send: PhantomData<*const ()>,
}

impl fmt::Debug for FactoryGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryGuard")
            .field("previous", &self.previous)
            .finish()
    }
}

impl Drop for FactoryGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        OVERRIDE.with(|cell| *cell.borrow_mut() = previous);
    }
}
