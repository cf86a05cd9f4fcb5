//! Results of CLI operations, ready for formatting

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{ContainerStatus, StartOutcome, StopOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ReportData,
}

impl Report {
    pub fn new(data: ReportData) -> Self {
        Self {
            at: Utc::now(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportData {
    EngineCheck {
        binary: String,
        available: bool,
    },
    Listing {
        containers: Vec<ListingRow>,
    },
    Status {
        name: String,
        status: ContainerStatus,
        text: String,
    },
    Started {
        name: String,
        #[serde(flatten)]
        outcome: StartOutcome,
    },
    Stopped {
        name: String,
        outcome: StopOutcome,
    },
    Plan {
        name: String,
        command: String,
    },
    Multiple {
        reports: Vec<Report>,
    },
}

/// One declared container
#[derive(Debug, Clone, Serialize)]
pub struct ListingRow {
    pub name: String,
    pub image: String,
    pub group: String,
}
