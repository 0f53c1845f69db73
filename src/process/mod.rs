// src/process/mod.rs

//! Process layer: the OS collaborator the supervision loop consumes.
//!
//! - [`command_line`] turns the user's command-line string into a command.
//! - [`target`] defines the `TargetProcess` handle and `ExitReport`.
//! - [`spawn`] creates new target processes with `tokio::process`.
//! - [`attach`] opens existing processes by id.
//! - [`backend`] provides the `ProcessBackend` trait and the concrete
//!   `RealProcessBackend` used in production, which tests replace with a
//!   scripted fake.

pub mod attach;
pub mod backend;
pub mod command_line;
pub mod spawn;
pub mod target;

pub use backend::{ProcessBackend, RealProcessBackend};
pub use command_line::CommandLine;
pub use target::{ExitReport, SupervisedTarget, TargetProcess};
