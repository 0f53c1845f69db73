// src/config/loader.rs

//! Reading the optional TOML config file.
//!
//! Loading happens before logging is initialised (the file can set the log
//! level), so nothing here logs; failures travel back to `main` as
//! [`RunnerError`](crate::errors::RunnerError) values.

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Deserialize a config file without semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let text = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&text)?)
}

/// Deserialize a config file and validate it into a [`ConfigFile`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    load_from_path(path).and_then(ConfigFile::try_from)
}

/// `--config` / `PROCRUNNER_CONFIG` is optional; without it every setting
/// takes its default.
pub fn load_optional(path: Option<&Path>) -> Result<ConfigFile> {
    path.map_or_else(|| Ok(ConfigFile::default()), load_and_validate)
}
