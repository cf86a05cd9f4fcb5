//! Container engine driver
//!
//! Leaves first: [`runner`] executes engine commands, [`status`] classifies
//! status text, [`commands`] builds argument vectors, [`diagnosis`] explains
//! start failures, and [`controller`] ties them into start/stop decisions.

pub mod commands;
pub mod config;
pub mod controller;
pub mod diagnosis;
pub mod locks;
pub mod runner;
pub mod status;

pub use config::EngineConfig;
pub use controller::{LifecycleController, StartAction, StartOutcome, StopOutcome};
pub use diagnosis::{StartFailure, StartStep};
pub use runner::{CommandOutput, ExecutionError, ProcessRunner, SystemRunner};
pub use status::{ContainerStatus, StatusInterpreter};
