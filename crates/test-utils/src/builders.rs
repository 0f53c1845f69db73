#![allow(dead_code)]

use std::time::Duration;

use procrunner::config::{ConfigFile, RawConfigFile};
use procrunner::process::CommandLine;
use procrunner::supervisor::SupervisorOptions;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn restart_delay_ms(mut self, ms: u64) -> Self {
        self.config.supervisor.restart_delay_ms = ms;
        self
    }

    pub fn grace_period_ms(mut self, ms: u64) -> Self {
        self.config.supervisor.grace_period_ms = ms;
        self
    }

    pub fn use_shell(mut self, val: bool) -> Self {
        self.config.supervisor.use_shell = val;
        self
    }

    pub fn log_level(mut self, level: &str) -> Self {
        self.config.logging.level = Some(level.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SupervisorOptions`.
pub struct OptionsBuilder {
    command: String,
    attach_pid: Option<u32>,
    restart_delay: Duration,
}

impl OptionsBuilder {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            attach_pid: None,
            restart_delay: Duration::from_millis(5000),
        }
    }

    pub fn attach(mut self, pid: u32) -> Self {
        self.attach_pid = Some(pid);
        self
    }

    pub fn restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn build(self) -> SupervisorOptions {
        SupervisorOptions {
            command: CommandLine::parse(&self.command, false)
                .expect("test command line should parse"),
            attach_pid: self.attach_pid,
            restart_delay: self.restart_delay,
        }
    }
}
