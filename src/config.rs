//! Configuration for factory and monitor selection.
//!
//! Precedence, lowest first:
//! 1. Profile defaults ([`Profile`])
//! 2. Environment variables (`RETCHECK_*`)
//! 3. Programmatic overrides ([`ConfigLoader::override_value`])
//!
//! ```
//! use retcheck::config::{ConfigLoader, FactoryKind, MonitorKind, Profile};
//!
//! let config = ConfigLoader::new()
//!     .profile(Profile::Debug)
//!     .override_value("RETCHECK_MONITOR_NAME", "ingest checks")
//!     .load_from_vars(Vec::<(String, String)>::new())
//!     .unwrap();
//! assert_eq!(config.factory, FactoryKind::Monitored);
//! assert_eq!(config.monitor, MonitorKind::Tracing);
//! assert_eq!(config.monitor_name, "ingest checks");
//! ```

use crate::obligation::leak::DEFAULT_MONITOR_NAME;
use crate::tracing_compat::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prefix of every recognised environment variable.
pub const ENV_PREFIX: &str = "RETCHECK_";

const KEY_PROFILE: &str = "RETCHECK_PROFILE";
const KEY_FACTORY: &str = "RETCHECK_FACTORY";
const KEY_MONITOR: &str = "RETCHECK_MONITOR";
const KEY_MONITOR_NAME: &str = "RETCHECK_MONITOR_NAME";
const KEY_PRODUCTION: &str = "RETCHECK_PRODUCTION";
const KEY_MONITOR_DEBUG: &str = "RETCHECK_MONITOR_DEBUG";

const KNOWN_KEYS: [&str; 6] = [
    KEY_PROFILE,
    KEY_FACTORY,
    KEY_MONITOR,
    KEY_MONITOR_NAME,
    KEY_PRODUCTION,
    KEY_MONITOR_DEBUG,
];

// ============================================================================
// Kinds and profiles
// ============================================================================

/// Which container family the process-wide factory produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryKind {
    /// Containers carry no obligation tracking.
    Simple,
    /// Containers register with the configured monitor.
    Monitored,
}

impl FromStr for FactoryKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "monitored" => Ok(Self::Monitored),
            other => Err(ConfigError::Parse(format!("unknown factory kind: {other}"))),
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("simple"),
            Self::Monitored => f.write_str("monitored"),
        }
    }
}

/// Which monitor a monitored factory uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorKind {
    /// Registration is free and nothing is reported.
    Noop,
    /// Every container is tracked and leaks are logged.
    Tracing,
}

impl FromStr for MonitorKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "noop" | "none" | "off" => Ok(Self::Noop),
            "tracing" | "debug" => Ok(Self::Tracing),
            other => Err(ConfigError::Parse(format!("unknown monitor kind: {other}"))),
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Tracing => f.write_str("tracing"),
        }
    }
}

/// Preset configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Simple factory: no tracking at all.
    Production,
    /// Monitored factory with the no-op monitor.
    #[default]
    Standard,
    /// Monitored factory with the tracing monitor.
    Debug,
}

impl Profile {
    /// The profile's configuration.
    #[must_use]
    pub fn to_config(self) -> RetConfig {
        let (factory, monitor) = match self {
            Self::Production => (FactoryKind::Simple, MonitorKind::Noop),
            Self::Standard => (FactoryKind::Monitored, MonitorKind::Noop),
            Self::Debug => (FactoryKind::Monitored, MonitorKind::Tracing),
        };
        RetConfig {
            factory,
            monitor,
            monitor_name: DEFAULT_MONITOR_NAME.to_owned(),
        }
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "standard" | "default" => Ok(Self::Standard),
            "debug" => Ok(Self::Debug),
            other => Err(ConfigError::Parse(format!("unknown profile: {other}"))),
        }
    }
}

// ============================================================================
// RetConfig
// ============================================================================

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetConfig {
    /// Container family.
    pub factory: FactoryKind,
    /// Monitor used by the monitored family.
    pub monitor: MonitorKind,
    /// Name shown in leak reports.
    pub monitor_name: String,
}

impl RetConfig {
    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor_name.trim().is_empty() {
            return Err(ConfigError::EmptyMonitorName);
        }
        if self.factory == FactoryKind::Simple && self.monitor == MonitorKind::Tracing {
            return Err(ConfigError::TracingWithoutMonitoring);
        }
        Ok(())
    }
}

impl Default for RetConfig {
    fn default() -> Self {
        Profile::default().to_config()
    }
}

// ============================================================================
// ConfigLoader
// ============================================================================

/// Builds a [`RetConfig`] from a profile, the environment, and overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    profile: Profile,
    overrides: BTreeMap<String, String>,
}

impl ConfigLoader {
    /// Creates a loader with the standard profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base profile.
    #[must_use]
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Adds a programmatic override (highest precedence).
    #[must_use]
    pub fn override_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Loads configuration from the process environment.
    ///
    /// Entries whose key or value is not valid UTF-8 are skipped.
    pub fn load(&self) -> Result<RetConfig, ConfigError> {
        self.load_from_vars(std::env::vars_os().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                _ => {
                    debug!("skipping non-UTF-8 environment entry");
                    None
                }
            }
        }))
    }

    /// Loads configuration from an explicit set of variables instead of the environment.
    ///
    /// Unrecognised `RETCHECK_*` variables are ignored; an unrecognised key passed to
    /// [`override_value`](Self::override_value) is an error.
    pub fn load_from_vars<I, K, V>(&self, vars: I) -> Result<RetConfig, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env: BTreeMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| k.starts_with(ENV_PREFIX))
            .filter(|(k, _)| {
                let known = KNOWN_KEYS.contains(&k.as_str());
                if !known {
                    debug!(key = %k, "ignoring unrecognised environment variable");
                }
                known
            })
            .collect();

        // The profile key picks the base before any field-level key applies.
        let profile = match self
            .overrides
            .get(KEY_PROFILE)
            .or_else(|| env.get(KEY_PROFILE))
        {
            Some(value) => value.parse()?,
            None => self.profile,
        };
        let mut config = profile.to_config();

        apply_overrides(&mut config, &env)?;
        apply_overrides(&mut config, &self.overrides)?;
        config.validate()?;
        Ok(config)
    }
}

fn apply_overrides(
    config: &mut RetConfig,
    overrides: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    // Boolean switches first so that explicit kinds win over them.
    for key in [KEY_PRODUCTION, KEY_MONITOR_DEBUG] {
        if let Some(value) = overrides.get(key) {
            apply_override(config, key, value)?;
        }
    }
    for (key, value) in overrides {
        if key != KEY_PRODUCTION && key != KEY_MONITOR_DEBUG {
            apply_override(config, key, value)?;
        }
    }
    Ok(())
}

fn apply_override(config: &mut RetConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        KEY_PROFILE => {}
        KEY_FACTORY => config.factory = value.parse()?,
        KEY_MONITOR => config.monitor = value.parse()?,
        KEY_MONITOR_NAME => config.monitor_name = value.to_owned(),
        KEY_PRODUCTION => {
            if parse_bool(value, key)? {
                config.factory = FactoryKind::Simple;
                config.monitor = MonitorKind::Noop;
            }
        }
        KEY_MONITOR_DEBUG => {
            if parse_bool(value, key)? {
                config.factory = FactoryKind::Monitored;
                config.monitor = MonitorKind::Tracing;
            }
        }
        _ => return Err(ConfigError::InvalidOverride(key.to_owned())),
    }
    Ok(())
}

fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Parse(format!(
            "invalid bool for {key}: {value}"
        ))),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A value could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
    /// An unknown key was passed as a programmatic override.
    #[error("invalid override: {0}")]
    InvalidOverride(String),
    /// The monitor name was blank.
    #[error("monitor name must not be empty")]
    EmptyMonitorName,
    /// The simple factory cannot feed a tracing monitor.
    #[error("tracing monitor requires the monitored factory")]
    TracingWithoutMonitoring,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn default_is_monitored_noop() {
        init_test("default_is_monitored_noop");
        let config = ConfigLoader::new().load_from_vars(vars(&[])).unwrap();
        crate::assert_with_log!(
            config == RetConfig::default(),
            "defaults",
            RetConfig::default(),
            config
        );
        assert_eq!(config.factory, FactoryKind::Monitored);
        assert_eq!(config.monitor, MonitorKind::Noop);
        assert_eq!(config.monitor_name, "problem state");
        crate::test_complete!("default_is_monitored_noop");
    }

    #[test]
    fn profiles_map_to_kinds() {
        init_test("profiles_map_to_kinds");
        assert_eq!(Profile::Production.to_config().factory, FactoryKind::Simple);
        assert_eq!(Profile::Debug.to_config().monitor, MonitorKind::Tracing);
        assert_eq!("prod".parse::<Profile>().unwrap(), Profile::Production);
        crate::test_complete!("profiles_map_to_kinds");
    }

    #[test]
    fn env_overrides_profile_and_overrides_win() {
        init_test("env_overrides_profile_and_overrides_win");
        let env = vars(&[
            ("RETCHECK_MONITOR", "tracing"),
            ("RETCHECK_MONITOR_NAME", "from env"),
            ("UNRELATED", "ignored"),
        ]);
        let config = ConfigLoader::new()
            .override_value("RETCHECK_MONITOR_NAME", "from code")
            .load_from_vars(env)
            .unwrap();
        assert_eq!(config.monitor, MonitorKind::Tracing);
        assert_eq!(config.monitor_name, "from code");
        crate::test_complete!("env_overrides_profile_and_overrides_win");
    }

    #[test]
    fn profile_key_selects_base() {
        init_test("profile_key_selects_base");
        let config = ConfigLoader::new()
            .load_from_vars(vars(&[("RETCHECK_PROFILE", "production")]))
            .unwrap();
        assert_eq!(config.factory, FactoryKind::Simple);
        crate::test_complete!("profile_key_selects_base");
    }

    #[test]
    fn boolean_switches() {
        init_test("boolean_switches");
        let debug = ConfigLoader::new()
            .load_from_vars(vars(&[("RETCHECK_MONITOR_DEBUG", "yes")]))
            .unwrap();
        assert_eq!(debug.monitor, MonitorKind::Tracing);

        let production = ConfigLoader::new()
            .profile(Profile::Debug)
            .load_from_vars(vars(&[("RETCHECK_PRODUCTION", "true")]))
            .unwrap();
        assert_eq!(production.factory, FactoryKind::Simple);
        assert_eq!(production.monitor, MonitorKind::Noop);

        let explicit_wins = ConfigLoader::new()
            .load_from_vars(vars(&[
                ("RETCHECK_MONITOR_DEBUG", "true"),
                ("RETCHECK_MONITOR", "noop"),
            ]))
            .unwrap();
        assert_eq!(explicit_wins.monitor, MonitorKind::Noop);
        crate::test_complete!("boolean_switches");
    }

    #[test]
    fn invalid_values_are_rejected() {
        init_test("invalid_values_are_rejected");
        let bad_bool =
            ConfigLoader::new().load_from_vars(vars(&[("RETCHECK_PRODUCTION", "maybe")]));
        assert!(matches!(bad_bool, Err(ConfigError::Parse(_))));

        let unknown = ConfigLoader::new()
            .override_value("RETCHECK_COLOUR", "blue")
            .load_from_vars(vars(&[]));
        assert_eq!(
            unknown,
            Err(ConfigError::InvalidOverride("RETCHECK_COLOUR".into()))
        );

        let inconsistent = ConfigLoader::new().load_from_vars(vars(&[
            ("RETCHECK_FACTORY", "simple"),
            ("RETCHECK_MONITOR", "tracing"),
        ]));
        assert_eq!(inconsistent, Err(ConfigError::TracingWithoutMonitoring));

        let blank = ConfigLoader::new()
            .override_value("RETCHECK_MONITOR_NAME", "  ")
            .load_from_vars(vars(&[]));
        assert_eq!(blank, Err(ConfigError::EmptyMonitorName));
        crate::test_complete!("invalid_values_are_rejected");
    }

    #[test]
    fn unrecognised_env_keys_keep_the_profile() {
        init_test("unrecognised_env_keys_keep_the_profile");
        let config = ConfigLoader::new()
            .load_from_vars(vars(&[
                ("RETCHECK_PROFILE", "debug"),
                ("RETCHECK_PROPTEST_SEED", "42"),
                ("RETCHECK_COLOUR", "blue"),
            ]))
            .unwrap();
        crate::assert_with_log!(
            config == Profile::Debug.to_config(),
            "debug profile survives unknown keys",
            Profile::Debug.to_config(),
            config
        );
        assert_eq!(config.factory, FactoryKind::Monitored);
        assert_eq!(config.monitor, MonitorKind::Tracing);
        crate::test_complete!("unrecognised_env_keys_keep_the_profile");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_environment_entries_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        init_test("non_utf8_environment_entries_are_skipped");
        let key = OsStr::from_bytes(b"RETCHECK_CONFIG_TEST_RAW_\xff");
        let value = OsStr::from_bytes(b"\xff\xfe");
        std::env::set_var(key, value);
        let loaded = std::panic::catch_unwind(|| ConfigLoader::new().load());
        std::env::remove_var(key);

        let loaded = loaded.expect("loading must not panic");
        crate::assert_with_log!(loaded.is_ok(), "environment loads", true, loaded.is_ok());
        crate::test_complete!("non_utf8_environment_entries_are_skipped");
    }
}
