//! Berth - lifecycle management for named containers
//!
//! Berth drives a Docker-compatible container engine through its
//! command-line interface. It reads the engine's free-text status output,
//! decides whether a container has to be created, started again or left
//! alone, and explains failures in a single structured report.
//!
//! # Example
//!
//! ```no_run
//! use berth::{ContainerSpec, LifecycleController, SystemRunner};
//!
//! let spec = ContainerSpec::builder("testNginx", "nginx")
//!     .port(8888, 80)
//!     .build()
//!     .unwrap();
//!
//! let controller = LifecycleController::new(SystemRunner::new("docker"));
//! if controller.is_engine_available() {
//!     match controller.start(&spec) {
//!         Ok(outcome) => println!("{:?}: {}", outcome.action, outcome.status),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```

pub mod cli;
pub mod container;
pub mod engine;
pub mod error;
pub mod output;

pub use container::{ContainerSpec, DeclaredContainer, Manifest};
pub use engine::{
    ContainerStatus, EngineConfig, LifecycleController, ProcessRunner, StartFailure,
    StartOutcome, StopOutcome, SystemRunner,
};
pub use error::{BerthError, Result};
pub use output::{format_output, OutputFormat};
