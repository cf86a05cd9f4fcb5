//! Process runner for the container engine binary
//!
//! The lifecycle controller only ever sees the [`ProcessRunner`] contract:
//! an argument vector goes in, captured text comes out, or an
//! [`ExecutionError`] carrying the engine's stderr.

use std::fmt;
use std::process::{Command, Stdio};

use tracing::debug;

/// Captured output of an engine invocation that exited successfully.
/// Both streams are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// An engine invocation that exited non-zero or could not be launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionError {
    /// Rendered command line, for logs and reports
    pub command: String,
    /// Exit code, `None` when the process never started or was killed by a signal
    pub exit_code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

impl ExecutionError {
    /// The engine's own error text, or a generic line when it printed nothing
    pub fn detail(&self) -> String {
        if self.stderr.is_empty() {
            match self.exit_code {
                Some(code) => format!("process exited with status {}", code),
                None => "process terminated without output".to_string(),
            }
        } else {
            self.stderr.clone()
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` failed", self.command)?;
        if let Some(code) = self.exit_code {
            write!(f, " with status {}", code)?;
        }
        write!(f, ": {}", self.detail())
    }
}

impl std::error::Error for ExecutionError {}

/// Executes engine argument vectors
pub trait ProcessRunner {
    /// Run the engine with `args` (the binary itself is not part of `args`)
    fn run(&self, args: &[String]) -> Result<CommandOutput, ExecutionError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, args: &[String]) -> Result<CommandOutput, ExecutionError> {
        (**self).run(args)
    }
}

/// Runs the engine as a child process of the current one
#[derive(Debug, Clone)]
pub struct SystemRunner {
    binary: String,
}

impl SystemRunner {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, args: &[String]) -> Result<CommandOutput, ExecutionError> {
        let command = render_command(&self.binary, args);
        debug!(%command, "executing engine command");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExecutionError {
                command: command.clone(),
                exit_code: None,
                stderr: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            debug!(%command, code = ?output.status.code(), %stderr, "engine command failed");
            return Err(ExecutionError {
                command,
                exit_code: output.status.code(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

/// Render a command line for display, quoting arguments that contain whitespace
pub fn render_command(binary: &str, args: &[String]) -> String {
    fn quote(part: &str) -> String {
        if part.is_empty() {
            return "\"\"".to_string();
        }
        if part.chars().any(char::is_whitespace) {
            return format!("\"{}\"", part.replace('"', "\\\""));
        }
        part.to_string()
    }

    std::iter::once(binary)
        .chain(args.iter().map(String::as_str))
        .map(quote)
        .collect::<Vec<_>>()
        .join(" ")
}
