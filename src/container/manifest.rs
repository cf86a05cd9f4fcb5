//! Container manifest loading
//!
//! A manifest is a JSON document declaring the containers Berth manages:
//!
//! ```json
//! {
//!   "group": "Docker",
//!   "containers": [
//!     { "name": "testNginx", "image": "nginx", "ports": { "8888": 80 }, "group": "web" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::debug;

use super::spec::ContainerSpec;
use crate::engine::EngineConfig;
use crate::error::{BerthError, Result};

/// Label used for containers when the manifest names no group
pub const DEFAULT_GROUP: &str = "Docker";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    group: Option<String>,
    #[serde(default)]
    containers: Vec<RawContainer>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContainer {
    name: String,
    image: String,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default)]
    ports: IndexMap<u16, u16>,
    #[serde(default)]
    environment: IndexMap<String, Option<String>>,
    #[serde(default)]
    volumes: IndexMap<String, String>,
    #[serde(default)]
    group: Option<String>,
}

impl RawContainer {
    fn into_declared(self) -> Result<DeclaredContainer> {
        let mut builder = ContainerSpec::builder(self.name, self.image);
        if let Some(repository) = self.repository {
            builder = builder.repository(repository);
        }
        if let Some(tag) = self.tag {
            builder = builder.tag(tag);
        }
        for (host, container) in self.ports {
            builder = builder.port(host, container);
        }
        for (key, value) in self.environment {
            builder = builder.env(key, value.unwrap_or_default());
        }
        for (host, container) in self.volumes {
            builder = builder.volume(host, container);
        }

        Ok(DeclaredContainer {
            spec: builder.build()?,
            group: self.group.filter(|g| !g.trim().is_empty()),
        })
    }
}

/// One container entry of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredContainer {
    pub spec: ContainerSpec,
    /// Optional sub-group, presentation only
    pub group: Option<String>,
}

/// A validated set of container declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub engine: EngineConfig,
    pub group: String,
    containers: Vec<DeclaredContainer>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            group: DEFAULT_GROUP.to_string(),
            containers: Vec::new(),
        }
    }
}

impl Manifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BerthError::Manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        let manifest = Self::parse(&content)?;
        debug!(path = %path.display(), containers = manifest.containers.len(), "loaded manifest");
        Ok(manifest)
    }

    /// Parse and validate manifest JSON
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawManifest = serde_json::from_str(content)
            .map_err(|e| BerthError::Manifest(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut containers = Vec::with_capacity(raw.containers.len());
        for entry in raw.containers {
            let declared = entry.into_declared()?;
            if !seen.insert(declared.spec.name().to_string()) {
                return Err(BerthError::Manifest(format!(
                    "container '{}' is declared more than once",
                    declared.spec.name()
                )));
            }
            containers.push(declared);
        }

        Ok(Self {
            engine: raw.engine,
            group: raw
                .group
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            containers,
        })
    }

    /// Declared containers, in manifest order
    pub fn containers(&self) -> &[DeclaredContainer] {
        &self.containers
    }

    pub fn find(&self, name: &str) -> Result<&DeclaredContainer> {
        self.containers
            .iter()
            .find(|c| c.spec.name() == name)
            .ok_or_else(|| BerthError::UnknownContainer(name.to_string()))
    }

    /// Resolve names to declarations; no names selects every container
    pub fn select(&self, names: &[String]) -> Result<Vec<&DeclaredContainer>> {
        if names.is_empty() {
            return Ok(self.containers.iter().collect());
        }
        names.iter().map(|name| self.find(name)).collect()
    }

    /// `Main` or `Main -> sub` for a declared container
    pub fn group_label(&self, container: &DeclaredContainer) -> String {
        match &container.group {
            Some(sub) => format!("{} -> {}", self.group, sub),
            None => self.group.clone(),
        }
    }
}
