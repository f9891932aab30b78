//! How `bl` writes records, confirmations and errors.
//!
//! Every command renders through [`render_mode`], so one listing has three
//! shapes: aligned sections for a terminal, tab-separated rows for pipes,
//! and JSON for scripts. Errors go to stderr in the same mode.
//!
//! The mode is picked by the first of: `--format`, `--json`,
//! `BACKLOG_FORMAT` (`pretty`, `text` or `json`, any case), and finally
//! whether stdout is a terminal.

use backlog_core::{ErrorCode, ServiceError};
use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Environment variable holding the default output mode.
pub const FORMAT_ENV: &str = "BACKLOG_FORMAT";

const RULE_WIDTH: usize = 72;

/// Heading plus a dashed rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{:-<RULE_WIDTH$}", "")
}

/// One `Key:        value` line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and aligned columns for a terminal.
    Pretty,
    /// Tab-separated rows.
    Text,
    /// JSON documents.
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Parse a `BACKLOG_FORMAT` value. Unknown values are ignored.
    fn from_env_value(raw: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(raw.trim(), true).ok()
    }

    fn pick(flag: Option<Self>, json: bool, env: Option<&str>, terminal: bool) -> Self {
        flag.or_else(|| json.then_some(Self::Json))
            .or_else(|| env.and_then(Self::from_env_value))
            .unwrap_or(if terminal { Self::Pretty } else { Self::Text })
    }
}

/// Output mode for this invocation.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env = std::env::var(FORMAT_ENV).ok();
    OutputMode::pick(format_flag, json_flag, env.as_deref(), io::stdout().is_terminal())
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` to stdout as JSON, or hand it to the text or pretty
/// renderer.
pub fn render_mode<T: Serialize + ?Sized>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    match mode {
        OutputMode::Json => write_json(&mut out, value)?,
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A failure as the user sees it. In JSON mode this is the `error` object.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####` code, when the failure has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Tag with `code`; the code's hint becomes the suggestion.
    pub fn with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl From<&ServiceError> for CliError {
    fn from(err: &ServiceError) -> Self {
        Self::with_code(err.to_string(), err.code())
    }
}

/// Write `error` to stderr: `{"error": {...}}` in JSON mode, otherwise an
/// `error:` line and an optional suggestion.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let mut out = io::stderr().lock();
    if mode.is_json() {
        return write_json(&mut out, &serde_json::json!({ "error": error }));
    }
    writeln!(out, "error: {}", error.message)?;
    if let Some(suggestion) = &error.suggestion {
        writeln!(out, "  suggestion: {suggestion}")?;
    }
    Ok(())
}

/// Render `error`, then hand it back as the command's failure so `main`
/// exits non-zero.
pub fn fail(mode: OutputMode, error: CliError) -> anyhow::Error {
    if let Err(e) = render_error(mode, &error) {
        tracing::warn!("could not write error output: {e}");
    }
    anyhow::anyhow!(error.message)
}

/// Confirmation for commands with nothing else to show.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if mode.is_json() {
        return write_json(&mut out, &serde_json::json!({ "ok": true, "message": message }));
    }
    writeln!(out, "✓ {message}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_core::EntityKind;

    #[test]
    fn format_flag_wins_over_json_and_env() {
        let mode = OutputMode::pick(Some(OutputMode::Text), true, Some("json"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_wins_over_env() {
        assert_eq!(OutputMode::pick(None, true, Some("pretty"), true), OutputMode::Json);
    }

    #[test]
    fn env_value_ignores_case_and_padding() {
        assert_eq!(OutputMode::pick(None, false, Some("JSON"), true), OutputMode::Json);
        assert_eq!(OutputMode::pick(None, false, Some(" Text\n"), true), OutputMode::Text);
        assert_eq!(OutputMode::pick(None, false, Some("pretty"), false), OutputMode::Pretty);
    }

    #[test]
    fn terminal_decides_when_nothing_else_does() {
        assert_eq!(OutputMode::pick(None, false, Some("yaml"), true), OutputMode::Pretty);
        assert_eq!(OutputMode::pick(None, false, None, false), OutputMode::Text);
    }

    #[test]
    fn service_errors_carry_code_and_hint() {
        let err = ServiceError::NoSelection(EntityKind::Story);
        let cli: CliError = (&err).into();
        assert_eq!(cli.error_code.as_deref(), Some("E2002"));
        assert!(cli.suggestion.is_some());
        assert_eq!(cli.message, "no story is selected");
    }

    #[test]
    fn estimate_errors_map_to_their_code() {
        let cli = CliError::from(&ServiceError::InvalidEstimate(f64::NAN));
        assert_eq!(cli.error_code.as_deref(), Some("E2006"));
        assert!(cli.message.contains("non-negative"));
    }

    #[test]
    fn cli_error_json_skips_empty_fields() {
        let json = serde_json::to_value(CliError::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "boom"}));
    }
}
