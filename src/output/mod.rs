//! Output formatting module

pub mod formatter;
pub mod human;
pub mod json;
pub mod report;

pub use formatter::{format_output, OutputFormat};
pub use report::{ListingRow, Report, ReportData};
