//! Engine command construction
//!
//! Every function here is pure: it only turns names and specs into the
//! argument vector handed to the process runner (the binary is not included).

use crate::container::ContainerSpec;

/// `run -d --name <name> [-p h:c]... [-e K=V]... [-v h:c]... <image>`.
/// Ports, environment and volumes keep their declaration order.
pub fn run_command(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        spec.name().to_string(),
    ];

    for (host, container) in spec.ports() {
        args.push("-p".to_string());
        args.push(format!("{}:{}", host, container));
    }

    for (key, value) in spec.environment() {
        args.push("-e".to_string());
        args.push(format!("{}={}", key, value));
    }

    for (host, container) in spec.volumes() {
        args.push("-v".to_string());
        args.push(format!("{}:{}", host, container));
    }

    args.push(spec.image_reference());
    args
}

/// Start an existing, stopped container
pub fn start_command(name: &str) -> Vec<String> {
    container_verb("start", name)
}

pub fn stop_command(name: &str) -> Vec<String> {
    container_verb("stop", name)
}

pub fn remove_command(name: &str) -> Vec<String> {
    container_verb("remove", name)
}

/// List the status text of the container named exactly `name`, stopped or not.
/// Engines read the name filter as a regex, so the name is escaped.
pub fn status_query(name: &str) -> Vec<String> {
    vec![
        "container".to_string(),
        "ps".to_string(),
        "--all".to_string(),
        "--filter".to_string(),
        format!("name=^{}$", regex::escape(name)),
        "--format".to_string(),
        "{{.Status}}".to_string(),
    ]
}

pub fn version_query() -> Vec<String> {
    vec!["--version".to_string()]
}

fn container_verb(verb: &str, name: &str) -> Vec<String> {
    vec!["container".to_string(), verb.to_string(), name.to_string()]
}
