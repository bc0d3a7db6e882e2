pub mod formatter;

pub use formatter::Formatter;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{DatasetKind, SanctionRecord};
use crate::cli::OutputFormat;
use crate::error::Result;

/// One dataset's line in the `fetch` report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub dataset: &'static str,
    pub count: Option<usize>,
    pub last_updated: Option<DateTime<Utc>>,
    pub saved_to: Option<String>,
    pub error: Option<String>,
}

/// Format search results based on the specified format
pub fn format_records(
    kind: DatasetKind,
    records: &[SanctionRecord],
    total: usize,
    format: OutputFormat,
) -> Result<String> {
    Formatter::new(format).format_records(kind, records, total)
}

/// Format a refresh report based on the specified format
pub fn format_refresh_summary(rows: &[RefreshSummary], format: OutputFormat) -> Result<String> {
    Formatter::new(format).format_refresh_summary(rows)
}
