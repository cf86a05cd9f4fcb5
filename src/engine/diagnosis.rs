//! Start failure diagnosis
//!
//! Hints are a heuristic over the engine's own error text, not structured
//! error codes. Rules are checked in order and the first match wins; new
//! engine messages are supported by adding a row to [`HINT_RULES`].

use std::fmt;

use serde::Serialize;

use crate::container::{render_map, ContainerSpec};

/// Step of `start` that produced the failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartStep {
    /// The initial status query failed
    StatusQuery,
    /// Creating the container with `run` failed
    Run,
    /// Starting the existing container failed
    StartExisting,
    /// The container was not running afterwards
    Verification,
}

impl fmt::Display for StartStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartStep::StatusQuery => write!(f, "status query"),
            StartStep::Run => write!(f, "run"),
            StartStep::StartExisting => write!(f, "start"),
            StartStep::Verification => write!(f, "verification"),
        }
    }
}

struct HintRule {
    /// Lower-case substrings, any of which triggers the rule
    patterns: &'static [&'static str],
    hint: fn(&ContainerSpec) -> String,
}

const HINT_RULES: &[HintRule] = &[
    HintRule {
        patterns: &["pull access denied"],
        hint: missing_image,
    },
    HintRule {
        patterns: &[
            "cannot connect to the docker daemon",
            "is the docker daemon running",
            "error during connect",
        ],
        hint: daemon_unreachable,
    },
    HintRule {
        patterns: &["port is already allocated", "address already in use"],
        hint: port_conflict,
    },
    HintRule {
        patterns: &["is already in use by container"],
        hint: name_conflict,
    },
];

fn missing_image(spec: &ContainerSpec) -> String {
    format!(
        "The image {} may not exist, or you may need to log in to its registry.",
        spec.image_reference()
    )
}

fn daemon_unreachable(_: &ContainerSpec) -> String {
    "The container engine daemon is unreachable. Start it and retry.".to_string()
}

fn port_conflict(spec: &ContainerSpec) -> String {
    format!(
        "A host port of {} is already in use. Free it or change the port mapping.",
        render_map(spec.ports())
    )
}

fn name_conflict(spec: &ContainerSpec) -> String {
    format!(
        "Another container is already named {}. Stop and remove it first.",
        spec.name()
    )
}

/// Hint for the given engine output, if any rule recognises it
pub fn hint_for(spec: &ContainerSpec, output: &str) -> Option<String> {
    let lower = output.to_lowercase();
    HINT_RULES
        .iter()
        .find(|rule| rule.patterns.iter().any(|p| lower.contains(p)))
        .map(|rule| (rule.hint)(spec))
}

/// Everything needed to diagnose a failed start without re-running it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartFailure {
    pub step: StartStep,
    pub image_reference: String,
    pub spec: ContainerSpec,
    /// Raw engine text: stderr of the failed command, or the last status text
    pub output: String,
    pub hint: Option<String>,
}

impl StartFailure {
    pub fn new(spec: &ContainerSpec, step: StartStep, output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            step,
            image_reference: spec.image_reference(),
            hint: hint_for(spec, &output),
            spec: spec.clone(),
            output,
        }
    }
}

impl fmt::Display for StartFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} had issues starting:", self.spec.name())?;
        writeln!(f, "Attempted image: {}", self.image_reference)?;
        writeln!(f, "Ports: {}", render_map(self.spec.ports()))?;
        writeln!(f, "Environment variables: {}", render_map(self.spec.environment()))?;
        writeln!(f, "Volumes: {}", render_map(self.spec.volumes()))?;
        if let Some(hint) = &self.hint {
            writeln!(f, "Hint: {}", hint)?;
        }
        write!(f, "Command Output: {}", self.output)
    }
}
