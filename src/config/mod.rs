// src/config/mod.rs

//! Configuration loading and validation for procrunner.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate value ranges (`validate.rs`).
//!
//! The config file is optional; without one every value has its default.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, LoggingSection, RawConfigFile, SupervisorSection};
pub use validate::validate_config;
