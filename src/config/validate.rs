// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RunnerError};
use crate::logging::parse_level_str;

/// Upper bound for `restart_delay_ms` (one day).
pub const MAX_RESTART_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.supervisor, raw.logging))
    }
}

pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    validate_supervisor(cfg)?;
    validate_logging(cfg)?;
    Ok(())
}

fn validate_supervisor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.supervisor.grace_period_ms == 0 {
        return Err(RunnerError::Config(
            "[supervisor].grace_period_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.supervisor.restart_delay_ms > MAX_RESTART_DELAY_MS {
        return Err(RunnerError::Config(format!(
            "[supervisor].restart_delay_ms must be <= {} (got {})",
            MAX_RESTART_DELAY_MS, cfg.supervisor.restart_delay_ms
        )));
    }

    Ok(())
}

fn validate_logging(cfg: &RawConfigFile) -> Result<()> {
    if let Some(ref level) = cfg.logging.level {
        if parse_level_str(level).is_none() {
            return Err(RunnerError::Config(format!(
                "[logging].level '{}' is not one of error, warn, info, debug, trace",
                level
            )));
        }
    }
    Ok(())
}
