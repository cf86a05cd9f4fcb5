//! Lifecycle controller
//!
//! Decides what to do with a named container based on what the engine
//! reports right now. Nothing about containers is remembered between calls:
//! every operation re-queries the engine, so each call can be retried on
//! its own.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::commands;
use super::config::{EngineConfig, DEFAULT_BANNER};
use super::diagnosis::{StartFailure, StartStep};
use super::locks::NameLocks;
use super::runner::{ExecutionError, ProcessRunner, SystemRunner};
use super::status::{ContainerStatus, StatusInterpreter};
use crate::container::ContainerSpec;
use crate::error::{BerthError, Result};

/// What `start` did to reach the running state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartAction {
    /// No container existed; a new one was created with `run`
    Created,
    /// A stopped container was started again
    StartedExisting,
    /// Nothing was issued
    AlreadyRunning,
}

/// A successful start, with the status text that confirmed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub action: StartAction,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// There was nothing to stop
    NotFound,
    /// The container was stopped and removed
    Removed,
}

/// Drives one container engine through a [`ProcessRunner`]
#[derive(Debug)]
pub struct LifecycleController<R> {
    runner: R,
    banner: String,
    interpreter: StatusInterpreter,
    locks: NameLocks,
}

impl LifecycleController<SystemRunner> {
    /// Controller for the engine binary named in `config`
    pub fn from_config(config: &EngineConfig) -> Self {
        LifecycleController::new(SystemRunner::new(config.binary.clone()))
            .with_banner(config.banner.clone())
    }
}

impl<R: ProcessRunner> LifecycleController<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            banner: DEFAULT_BANNER.to_string(),
            interpreter: StatusInterpreter::default(),
            locks: NameLocks::new(),
        }
    }

    /// Substring the version probe output must contain
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    pub fn with_interpreter(mut self, interpreter: StatusInterpreter) -> Self {
        self.interpreter = interpreter;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Probe the engine. Any failure counts as "not available".
    pub fn is_engine_available(&self) -> bool {
        match self.runner.run(&commands::version_query()) {
            Ok(output) => {
                debug!(version = %output.stdout, "engine version probe");
                !output.stdout.is_empty() && output.stdout.contains(&self.banner)
            }
            Err(e) => {
                warn!(error = %e, "engine version probe failed");
                false
            }
        }
    }

    /// Classified status of `name` together with the raw text it came from.
    /// The text is empty when no such container exists.
    pub fn status(&self, name: &str) -> Result<(ContainerStatus, String)> {
        let text = self.query_status(name)?;
        Ok((self.interpreter.classify(&text), text))
    }

    /// Bring the container described by `spec` to the running state.
    ///
    /// Every failure, including engine errors, is reported as
    /// [`BerthError::Startup`] carrying a [`StartFailure`].
    pub fn start(&self, spec: &ContainerSpec) -> Result<StartOutcome> {
        self.locks.with(spec.name(), || self.start_unlocked(spec))
    }

    /// Stop and remove the container named `name`, if it exists.
    ///
    /// Removal is attempted even when stopping failed. The final state is
    /// not re-queried.
    pub fn stop(&self, name: &str) -> Result<StopOutcome> {
        self.locks.with(name, || self.stop_unlocked(name))
    }

    /// Stop, then start. A failed stop aborts before starting.
    pub fn restart(&self, spec: &ContainerSpec) -> Result<StartOutcome> {
        self.locks.with(spec.name(), || {
            self.stop_unlocked(spec.name())?;
            self.start_unlocked(spec)
        })
    }

    fn start_unlocked(&self, spec: &ContainerSpec) -> Result<StartOutcome> {
        let name = spec.name();
        let current = self
            .query_status(name)
            .map_err(|e| fail(spec, StartStep::StatusQuery, e.detail()))?;

        let (action, step, args) = match self.interpreter.classify(&current) {
            ContainerStatus::Absent => {
                info!(container = name, image = %spec.image_reference(), "container not found, creating it");
                (StartAction::Created, StartStep::Run, commands::run_command(spec))
            }
            ContainerStatus::Exited => {
                info!(container = name, status = %current, "container exists but is not running, starting it");
                (
                    StartAction::StartedExisting,
                    StartStep::StartExisting,
                    commands::start_command(name),
                )
            }
            ContainerStatus::Running => {
                info!(container = name, status = %current, "container is already running");
                return self.verify(spec, StartAction::AlreadyRunning);
            }
            ContainerStatus::Unknown => {
                info!(container = name, status = %current, "container is in an unrecognised state, leaving it alone");
                return self.verify(spec, StartAction::AlreadyRunning);
            }
        };

        if let Err(e) = self.runner.run(&args) {
            warn!(container = name, error = %e, "start command failed");
            return Err(fail(spec, step, e.detail()));
        }

        self.verify(spec, action)
    }

    fn verify(&self, spec: &ContainerSpec, action: StartAction) -> Result<StartOutcome> {
        let name = spec.name();
        let status = self
            .query_status(name)
            .map_err(|e| fail(spec, StartStep::Verification, e.detail()))?;

        if self.interpreter.classify(&status) == ContainerStatus::Running {
            info!(container = name, %status, "container started");
            Ok(StartOutcome { action, status })
        } else {
            warn!(container = name, %status, "container is not running after start");
            Err(fail(spec, StartStep::Verification, status))
        }
    }

    fn stop_unlocked(&self, name: &str) -> Result<StopOutcome> {
        let current = self.query_status(name)?;
        info!(container = name, status = %current, "current status");

        if self.interpreter.classify(&current) == ContainerStatus::Absent {
            info!(container = name, "container does not exist");
            return Ok(StopOutcome::NotFound);
        }

        let mut failures = Vec::new();

        info!(container = name, "stopping container");
        if let Err(e) = self.runner.run(&commands::stop_command(name)) {
            warn!(container = name, error = %e, "stop failed, removing anyway");
            failures.push(e);
        }

        info!(container = name, "removing container");
        if let Err(e) = self.runner.run(&commands::remove_command(name)) {
            warn!(container = name, error = %e, "remove failed");
            failures.push(e);
        }

        if failures.is_empty() {
            Ok(StopOutcome::Removed)
        } else {
            Err(BerthError::Teardown {
                name: name.to_string(),
                failures,
            })
        }
    }

    fn query_status(&self, name: &str) -> std::result::Result<String, ExecutionError> {
        let output = self.runner.run(&commands::status_query(name))?;
        Ok(output.stdout.trim().to_string())
    }
}

fn fail(spec: &ContainerSpec, step: StartStep, output: impl Into<String>) -> BerthError {
    StartFailure::new(spec, step, output).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::runner::CommandOutput;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Answers status queries from a queue and fails selected verbs
    #[derive(Default)]
    struct ScriptedRunner {
        statuses: Mutex<VecDeque<String>>,
        failures: HashMap<&'static str, String>,
        version: Option<String>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedRunner {
        fn with_statuses(statuses: &[&str]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().map(|s| s.to_string()).collect()),
                ..Self::default()
            }
        }

        fn failing(mut self, verb: &'static str, stderr: &str) -> Self {
            self.failures.insert(verb, stderr.to_string());
            self
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }

        /// Calls other than status queries
        fn actions(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| verb(c) != "ps")
                .map(|c| c.join(" "))
                .collect()
        }
    }

    fn verb(args: &[String]) -> &str {
        match args.first().map(String::as_str) {
            Some("container") => args.get(1).map(String::as_str).unwrap_or(""),
            Some(first) => first,
            None => "",
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn run(&self, args: &[String]) -> std::result::Result<CommandOutput, ExecutionError> {
            self.calls.lock().unwrap().push(args.to_vec());
            let verb = verb(args);
            if let Some(stderr) = self.failures.get(verb) {
                return Err(ExecutionError {
                    command: format!("docker {}", args.join(" ")),
                    exit_code: Some(1),
                    stderr: stderr.clone(),
                });
            }
            let stdout = match verb {
                "ps" => self.statuses.lock().unwrap().pop_front().unwrap_or_default(),
                "--version" => self.version.clone().unwrap_or_default(),
                _ => String::new(),
            };
            Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            })
        }
    }

    fn nginx() -> ContainerSpec {
        ContainerSpec::builder("testNginx", "nginx")
            .tag("latest")
            .port(8888, 80)
            .build()
            .unwrap()
    }

    fn startup_failure(err: BerthError) -> StartFailure {
        match err {
            BerthError::Startup(failure) => *failure,
            other => panic!("expected a startup failure, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_available() {
        let runner = ScriptedRunner {
            version: Some("Docker version 20.10.7, build f0df350".to_string()),
            ..ScriptedRunner::default()
        };
        assert!(LifecycleController::new(runner).is_engine_available());
    }

    #[test]
    fn test_engine_unavailable_on_error() {
        let runner = ScriptedRunner::default().failing("--version", "'docker' is not recognized");
        assert!(!LifecycleController::new(runner).is_engine_available());
    }

    #[test]
    fn test_engine_unavailable_without_banner() {
        let runner = ScriptedRunner {
            version: Some("podman version 4.9.3".to_string()),
            ..ScriptedRunner::default()
        };
        let controller = LifecycleController::new(runner);
        assert!(!controller.is_engine_available());

        let controller = controller.with_banner("podman version");
        assert!(controller.is_engine_available());
    }

    #[test]
    fn test_engine_unavailable_on_empty_output() {
        let controller = LifecycleController::new(ScriptedRunner::default()).with_banner("");
        assert!(!controller.is_engine_available());
    }

    #[test]
    fn test_status_returns_text_and_classification() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["Up 5 minutes"]));
        let (status, text) = controller.status("any-container").unwrap();
        assert_eq!(status, ContainerStatus::Running);
        assert_eq!(text, "Up 5 minutes");
    }

    #[test]
    fn test_status_uses_configured_interpreter() {
        let runner = ScriptedRunner::with_statuses(&["running"]);
        let interpreter = StatusInterpreter::empty().with_rule("running", ContainerStatus::Running);
        let controller = LifecycleController::new(runner).with_interpreter(interpreter);
        assert_eq!(controller.status("web").unwrap().0, ContainerStatus::Running);
    }

    #[test]
    fn test_start_absent_runs_once_then_verifies() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["", "Up 2 seconds"]));
        let outcome = controller.start(&nginx()).unwrap();

        assert_eq!(outcome.action, StartAction::Created);
        assert_eq!(outcome.status, "Up 2 seconds");
        assert_eq!(
            controller.runner().actions(),
            vec!["run -d --name testNginx -p 8888:80 nginx:latest"]
        );

        let calls = controller.runner().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(verb(&calls[0]), "ps");
        assert_eq!(verb(&calls[1]), "run");
        assert_eq!(verb(&calls[2]), "ps");
    }

    #[test]
    fn test_start_exited_reuses_container() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[
            "Exited (0) 2 hours ago",
            "Up 1 second",
        ]));
        let outcome = controller.start(&nginx()).unwrap();

        assert_eq!(outcome.action, StartAction::StartedExisting);
        assert_eq!(controller.runner().actions(), vec!["container start testNginx"]);
    }

    #[test]
    fn test_start_running_issues_nothing() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[
            "Up 5 minutes",
            "Up 5 minutes",
        ]));
        let outcome = controller.start(&nginx()).unwrap();

        assert_eq!(outcome.action, StartAction::AlreadyRunning);
        assert!(controller.runner().actions().is_empty());
        let calls = controller.runner().calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| verb(c) == "ps"));
    }

    #[test]
    fn test_start_running_container_that_dies_before_verification_fails() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[
            "Up 5 minutes",
            "Exited (137) 1 second ago",
        ]));
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::Verification);
        assert_eq!(failure.output, "Exited (137) 1 second ago");
        assert!(controller.runner().actions().is_empty());
    }

    #[test]
    fn test_start_unknown_fails_verification() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["Created", "Created"]));
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::Verification);
        assert_eq!(failure.output, "Created");
        assert!(controller.runner().actions().is_empty());
    }

    #[test]
    fn test_start_unknown_then_running_succeeds() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[
            "Restarting (1) 1 second ago",
            "Up 1 second",
        ]));
        let outcome = controller.start(&nginx()).unwrap();
        assert_eq!(outcome.action, StartAction::AlreadyRunning);
        assert!(controller.runner().actions().is_empty());
    }

    #[test]
    fn test_start_fails_when_not_running_after_successful_run() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["", "Exited (1) 1 second ago"]));
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::Verification);
        assert_eq!(failure.output, "Exited (1) 1 second ago");
        assert!(failure.to_string().contains("testNginx had issues starting"));
    }

    #[test]
    fn test_start_pull_access_denied() {
        let runner = ScriptedRunner::with_statuses(&[""]).failing("run", "pull access denied for nginx");
        let controller = LifecycleController::new(runner);
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::Run);
        assert_eq!(failure.image_reference, "nginx:latest");
        let message = failure.to_string();
        assert!(message.contains("testNginx had issues starting"));
        assert!(failure.hint.unwrap().contains("nginx:latest"));
        assert!(message.contains("nginx:latest"));
        // no verification after a failed run
        assert_eq!(controller.runner().calls().len(), 2);
    }

    #[test]
    fn test_start_existing_failure_is_structured() {
        let runner = ScriptedRunner::with_statuses(&["Exited (0)"]).failing("start", "some engine error");
        let controller = LifecycleController::new(runner);
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::StartExisting);
        assert_eq!(failure.output, "some engine error");
        assert_eq!(failure.hint, None);
    }

    #[test]
    fn test_start_status_query_failure_is_structured() {
        let runner = ScriptedRunner::default().failing("ps", "Cannot connect to the Docker daemon");
        let controller = LifecycleController::new(runner);
        let failure = startup_failure(controller.start(&nginx()).unwrap_err());

        assert_eq!(failure.step, StartStep::StatusQuery);
        assert!(failure.hint.is_some());
    }

    #[test]
    fn test_stop_absent_issues_nothing() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[""]));
        assert_eq!(controller.stop("test-container").unwrap(), StopOutcome::NotFound);
        assert!(controller.runner().actions().is_empty());
    }

    #[test]
    fn test_stop_existing_stops_then_removes() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["Up 5 minutes"]));
        assert_eq!(controller.stop("test-container").unwrap(), StopOutcome::Removed);
        assert_eq!(
            controller.runner().actions(),
            vec!["container stop test-container", "container remove test-container"]
        );
    }

    #[test]
    fn test_stop_exited_still_removes() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&["Exited (0) 1 hour ago"]));
        assert_eq!(controller.stop("web").unwrap(), StopOutcome::Removed);
        assert_eq!(controller.runner().actions().len(), 2);
    }

    #[test]
    fn test_stop_failure_still_attempts_remove() {
        let runner = ScriptedRunner::with_statuses(&["Up 1 minute"]).failing("stop", "cannot stop");
        let controller = LifecycleController::new(runner);
        let err = controller.stop("web").unwrap_err();

        assert_eq!(
            controller.runner().actions(),
            vec!["container stop web", "container remove web"]
        );
        match err {
            BerthError::Teardown { name, failures } => {
                assert_eq!(name, "web");
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].stderr, "cannot stop");
            }
            other => panic!("expected teardown error, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_status_failure_propagates() {
        let runner = ScriptedRunner::default().failing("ps", "daemon down");
        let controller = LifecycleController::new(runner);
        assert!(matches!(controller.stop("web"), Err(BerthError::Execution(_))));
        assert!(controller.runner().actions().is_empty());
    }

    #[test]
    fn test_restart_stops_then_creates() {
        let controller = LifecycleController::new(ScriptedRunner::with_statuses(&[
            "Up 3 hours",
            "",
            "Up 1 second",
        ]));
        let outcome = controller.restart(&nginx()).unwrap();

        assert_eq!(outcome.action, StartAction::Created);
        assert_eq!(
            controller.runner().actions(),
            vec![
                "container stop testNginx",
                "container remove testNginx",
                "run -d --name testNginx -p 8888:80 nginx:latest",
            ]
        );
    }

    #[test]
    fn test_restart_aborts_when_stop_fails() {
        let runner = ScriptedRunner::with_statuses(&["Up 3 hours"]).failing("remove", "busy");
        let controller = LifecycleController::new(runner);
        assert!(matches!(
            controller.restart(&nginx()),
            Err(BerthError::Teardown { .. })
        ));
        assert!(!controller.runner().actions().iter().any(|a| a.starts_with("run")));
    }

    #[test]
    fn test_custom_interpreter() {
        let runner = ScriptedRunner::with_statuses(&["stopped", "running"]);
        let interpreter = StatusInterpreter::empty()
            .with_rule("running", ContainerStatus::Running)
            .with_rule("stopped", ContainerStatus::Exited);
        let controller = LifecycleController::new(runner).with_interpreter(interpreter);

        let outcome = controller.start(&nginx()).unwrap();
        assert_eq!(outcome.action, StartAction::StartedExisting);
    }
}
