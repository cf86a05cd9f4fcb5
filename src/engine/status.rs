//! Status interpretation
//!
//! Engines describe a container's state as free text ("Up 5 minutes",
//! "Exited (0) 2 hours ago"). The interpreter classifies that text with an
//! ordered rule table of substring patterns; the first matching rule wins.

use std::fmt;

use serde::Serialize;

/// Classified state of a named container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    /// The engine knows no container of that name
    Absent,
    /// The container exists but is not running
    Exited,
    Running,
    /// Anything else the engine reported (created, restarting, dead, ...)
    Unknown,
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerStatus::Absent => write!(f, "absent"),
            ContainerStatus::Exited => write!(f, "exited"),
            ContainerStatus::Running => write!(f, "running"),
            ContainerStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A substring and the status it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRule {
    pub pattern: String,
    pub status: ContainerStatus,
}

impl StatusRule {
    pub fn new(pattern: impl Into<String>, status: ContainerStatus) -> Self {
        Self {
            pattern: pattern.into(),
            status,
        }
    }
}

/// Docker status vocabulary. "Up" is checked first so that a running
/// container is never reported as exited.
const DOCKER_RULES: &[(&str, ContainerStatus)] = &[
    ("Up", ContainerStatus::Running),
    ("Exited", ContainerStatus::Exited),
];

/// Ordered rule table over raw status text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInterpreter {
    rules: Vec<StatusRule>,
}

impl Default for StatusInterpreter {
    fn default() -> Self {
        Self {
            rules: DOCKER_RULES
                .iter()
                .map(|(pattern, status)| StatusRule::new(*pattern, *status))
                .collect(),
        }
    }
}

impl StatusInterpreter {
    /// An interpreter with no rules: every non-empty text is `Unknown`
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, checked after all existing ones
    pub fn with_rule(mut self, pattern: impl Into<String>, status: ContainerStatus) -> Self {
        self.rules.push(StatusRule::new(pattern, status));
        self
    }

    pub fn rules(&self) -> &[StatusRule] {
        &self.rules
    }

    /// Classify raw status text. Never fails.
    pub fn classify(&self, raw: &str) -> ContainerStatus {
        let text = raw.trim();
        if text.is_empty() {
            return ContainerStatus::Absent;
        }
        self.rules
            .iter()
            .find(|rule| text.contains(rule.pattern.as_str()))
            .map(|rule| rule.status)
            .unwrap_or(ContainerStatus::Unknown)
    }
}
