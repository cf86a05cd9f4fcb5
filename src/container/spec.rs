//! Declarative container description
//!
//! A [`ContainerSpec`] is built once, validated on construction, and then
//! handed read-only to the lifecycle controller.

use std::fmt::Display;
use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::error::{BerthError, Result};

/// Tag used when none (or a blank one) is given
pub const DEFAULT_TAG: &str = "latest";

/// Container names accepted by Docker-compatible engines
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").expect("container name pattern is valid")
    })
}

/// Desired state of one named container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSpec {
    name: String,
    repository: Option<String>,
    image: String,
    tag: String,
    ports: IndexMap<u16, u16>,
    environment: IndexMap<String, String>,
    volumes: IndexMap<String, String>,
}

impl ContainerSpec {
    /// Start building a spec for container `name` running `image`
    pub fn builder(name: impl Into<String>, image: impl Into<String>) -> ContainerSpecBuilder {
        ContainerSpecBuilder {
            name: name.into(),
            image: image.into(),
            repository: None,
            tag: None,
            ports: IndexMap::new(),
            environment: IndexMap::new(),
            volumes: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Host port -> container port, in declaration order
    pub fn ports(&self) -> &IndexMap<u16, u16> {
        &self.ports
    }

    /// Variable name -> value, in declaration order
    pub fn environment(&self) -> &IndexMap<String, String> {
        &self.environment
    }

    /// Host path -> container path, in declaration order
    pub fn volumes(&self) -> &IndexMap<String, String> {
        &self.volumes
    }

    /// `repository/image:tag`, or `image:tag` without a repository
    pub fn image_reference(&self) -> String {
        match &self.repository {
            Some(repository) => format!("{}/{}:{}", repository, self.image, self.tag),
            None => format!("{}:{}", self.image, self.tag),
        }
    }
}

/// Builder for [`ContainerSpec`]; `build` enforces the spec invariants
#[derive(Debug, Clone)]
pub struct ContainerSpecBuilder {
    name: String,
    image: String,
    repository: Option<String>,
    tag: Option<String>,
    ports: IndexMap<u16, u16>,
    environment: IndexMap<String, String>,
    volumes: IndexMap<String, String>,
}

impl ContainerSpecBuilder {
    pub fn repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Publish `container` on host port `host`. A repeated host port replaces the earlier mapping.
    pub fn port(mut self, host: u16, container: u16) -> Self {
        self.ports.insert(host, container);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn volume(mut self, host: impl Into<String>, container: impl Into<String>) -> Self {
        self.volumes.insert(host.into(), container.into());
        self
    }

    pub fn build(self) -> Result<ContainerSpec> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(BerthError::InvalidSpec("container name must not be empty".to_string()));
        }
        if !name_pattern().is_match(&name) {
            return Err(BerthError::InvalidSpec(format!(
                "container name '{}' may only contain letters, digits, '_', '.' and '-' and must start with a letter or digit",
                name
            )));
        }

        let image = self.image.trim().to_string();
        if image.is_empty() {
            return Err(BerthError::InvalidSpec(format!(
                "container '{}' has no image",
                name
            )));
        }
        if image.contains(':') {
            return Err(BerthError::InvalidSpec(format!(
                "image '{}' of container '{}' must not carry a tag; use the tag field",
                image, name
            )));
        }

        for key in self.environment.keys() {
            if key.is_empty() || key.contains('=') {
                return Err(BerthError::InvalidSpec(format!(
                    "invalid environment variable name '{}' for container '{}'",
                    key, name
                )));
            }
        }

        for (host, container) in &self.volumes {
            if host.trim().is_empty() || container.trim().is_empty() {
                return Err(BerthError::InvalidSpec(format!(
                    "volume mapping '{}:{}' of container '{}' has an empty side",
                    host, container, name
                )));
            }
        }

        let repository = self
            .repository
            .map(|r| r.trim().trim_end_matches('/').to_string())
            .filter(|r| !r.is_empty());

        let tag = self
            .tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG.to_string());

        Ok(ContainerSpec {
            name,
            repository,
            image,
            tag,
            ports: self.ports,
            environment: self.environment,
            volumes: self.volumes,
        })
    }
}

/// Render a mapping as `{k: v, ...}` in iteration order
pub fn render_map<K: Display, V: Display>(map: &IndexMap<K, V>) -> String {
    let entries: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{{}}}", entries.join(", "))
}
