//! Engine selection

use serde::{Deserialize, Serialize};

/// Binary invoked when nothing else is configured
pub const DEFAULT_BINARY: &str = "docker";

/// Substring the version probe must print for the engine to count as available
pub const DEFAULT_BANNER: &str = "Docker version";

/// Which engine CLI to drive, and how to recognise it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub binary: String,
    pub banner: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            banner: DEFAULT_BANNER.to_string(),
        }
    }
}
