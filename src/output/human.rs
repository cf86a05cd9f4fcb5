//! Human-readable output formatting

use crate::engine::{StartAction, StopOutcome};
use crate::output::report::{Report, ReportData};

pub fn format_human(report: &Report) -> String {
    match &report.data {
        ReportData::EngineCheck { binary, available } => {
            if *available {
                format!("Container engine '{}' is available", binary)
            } else {
                format!("Container engine '{}' is NOT available", binary)
            }
        }
        ReportData::Listing { containers } => {
            if containers.is_empty() {
                return "No containers declared".to_string();
            }
            let mut output = String::from("Containers\n----------\n");
            output.push_str(&format!("{:<24} {:<40} {}\n", "NAME", "IMAGE", "GROUP"));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for row in containers {
                output.push_str(&format!(
                    "{:<24} {:<40} {}\n",
                    truncate(&row.name, 24),
                    truncate(&row.image, 40),
                    row.group
                ));
            }
            output
        }
        ReportData::Status { name, status, text } => {
            if text.is_empty() {
                format!("{}: {}", name, status)
            } else {
                format!("{}: {} ({})", name, status, text)
            }
        }
        ReportData::Started { name, outcome } => {
            let action = match outcome.action {
                StartAction::Created => "created",
                StartAction::StartedExisting => "started",
                StartAction::AlreadyRunning => "already running",
            };
            format!("{}: {} ({})", name, action, outcome.status)
        }
        ReportData::Stopped { name, outcome } => match outcome {
            StopOutcome::NotFound => format!("{}: container does not exist", name),
            StopOutcome::Removed => format!("{}: stopped and removed", name),
        },
        ReportData::Plan { command, .. } => command.clone(),
        ReportData::Multiple { reports } => reports
            .iter()
            .map(format_human)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
