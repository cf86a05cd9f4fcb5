//! Error types for Berth

use thiserror::Error;

use crate::engine::diagnosis::StartFailure;
use crate::engine::runner::ExecutionError;

#[derive(Error, Debug)]
pub enum BerthError {
    #[error("Invalid container spec: {0}")]
    InvalidSpec(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("{0}")]
    Startup(Box<StartFailure>),

    #[error("Failed to tear down container '{name}': {}", join_failures(.failures))]
    Teardown {
        name: String,
        failures: Vec<ExecutionError>,
    },

    #[error("Container engine '{binary}' is not available. Install it or pass --engine to point at a compatible binary")]
    EngineUnavailable { binary: String },

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Container '{0}' is not declared in the manifest")]
    UnknownContainer(String),
}

impl From<StartFailure> for BerthError {
    fn from(failure: StartFailure) -> Self {
        BerthError::Startup(Box::new(failure))
    }
}

fn join_failures(failures: &[ExecutionError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, BerthError>;
