pub mod init;
pub mod project;
pub mod status;
pub mod story;
pub mod task;
pub mod user;

use backlog_core::{EntityKind, ErrorCode, FileStore, Priority, Status, Tracker, valid_estimate};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::context;
use crate::output::{CliError, OutputMode, fail};

/// Open the tracker or render why it could not be opened.
pub(crate) fn open_tracker(
    project_root: &Path,
    user_flag: Option<&str>,
    output: OutputMode,
) -> anyhow::Result<Tracker<FileStore>> {
    context::open(project_root, user_flag).map_err(|e| fail(output, e))
}

pub(crate) fn not_found(kind: EntityKind, id: &str) -> CliError {
    CliError::with_code(format!("{kind} '{id}' not found"), ErrorCode::EntityNotFound)
}

pub(crate) fn parse_priority(raw: &str) -> Result<Priority, CliError> {
    raw.parse::<Priority>()
        .map_err(|e| CliError::with_code(format!("{e}"), ErrorCode::InvalidEnumValue))
}

pub(crate) fn parse_status(raw: &str) -> Result<Status, CliError> {
    raw.parse::<Status>()
        .map_err(|e| CliError::with_code(format!("{e}"), ErrorCode::InvalidEnumValue))
}

/// Clap value parser for `--est-time`: hours as a finite, non-negative number.
pub(crate) fn parse_estimate(raw: &str) -> Result<f64, String> {
    let hours: f64 = raw.trim().parse().map_err(|e| format!("{e}"))?;
    if valid_estimate(hours) {
        Ok(hours)
    } else {
        Err(format!("'{raw}' is not a non-negative number of hours"))
    }
}

/// Parse an RFC 3339 timestamp (`2024-05-01T09:00:00Z`).
pub(crate) fn parse_time(raw: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CliError {
            suggestion: Some("Use RFC 3339, e.g. 2024-05-01T09:00:00Z.".to_string()),
            ..CliError::new(format!("invalid timestamp '{raw}': {e}"))
        })
}

/// Marker shown next to the selected record in pretty listings.
pub(crate) fn marker(selected: Option<&str>, id: &str) -> &'static str {
    if selected == Some(id) { "*" } else { " " }
}
