// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::logging::parse_level_str;

pub const DEFAULT_RESTART_DELAY_MS: u64 = 5000;
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 2000;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [supervisor]
/// restart_delay_ms = 5000
/// grace_period_ms = 2000
/// use_shell = false
///
/// [logging]
/// level = "info"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub supervisor: SupervisorSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Validated configuration. Only obtainable via `TryFrom<RawConfigFile>`
/// (or [`ConfigFile::default`]).
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub supervisor: SupervisorSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(supervisor: SupervisorSection, logging: LoggingSection) -> Self {
        Self {
            supervisor,
            logging,
        }
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.supervisor.restart_delay_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.supervisor.grace_period_ms)
    }

    /// `[logging].level`, already validated.
    pub fn log_level(&self) -> Option<tracing::Level> {
        self.logging.level.as_deref().and_then(parse_level_str)
    }
}

/// `[supervisor]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupervisorSection {
    /// Fixed delay between a target exiting and the replacement being spawned.
    #[serde(default = "default_restart_delay_ms")]
    pub restart_delay_ms: u64,

    /// How long the shutdown handler waits for the loop to finish cleanup.
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,

    /// Run the command line through the platform shell instead of executing
    /// the first word directly.
    #[serde(default)]
    pub use_shell: bool,
}

fn default_restart_delay_ms() -> u64 {
    DEFAULT_RESTART_DELAY_MS
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD_MS
}

impl Default for SupervisorSection {
    fn default() -> Self {
        Self {
            restart_delay_ms: default_restart_delay_ms(),
            grace_period_ms: default_grace_period_ms(),
            use_shell: false,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}
