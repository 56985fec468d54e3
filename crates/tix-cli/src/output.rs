//! Shared output layer: pretty, text, and JSON renderings of every command.
//!
//! # Choosing a mode
//!
//! First match wins:
//! 1. `--format`, then the hidden `--json` shorthand
//! 2. `FORMAT=pretty|text|json` in the environment
//! 3. `output` in `tix/config.toml`
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::io::{self, IsTerminal, Write};
use tix_core::error::{ErrorCode, TixError};

/// Shared width for pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Heading line plus rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in pretty output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, icons, visual framing).
    Pretty,
    /// Plain rows for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Pure resolution over already-read inputs.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    // Unknown values fall through to the next layer.
    if let Some(mode) = format_env.and_then(OutputMode::parse_loose) {
        return mode;
    }

    if let Some(mode) = config_output.and_then(OutputMode::parse_loose) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, config, and TTY.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        config_output,
        is_tty,
    )
}

/// Write `value` to stdout in `mode`. JSON comes straight from `Serialize`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A command failure as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// What went wrong.
    pub message: String,
    /// How to fix it, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Uncoded error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error tagged with a machine-readable code and its hint.
    pub fn with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(ToString::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Structured form of any command failure.
pub fn cli_error_for(err: &anyhow::Error) -> CliError {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.clone();
    }
    if let Some(tix) = err.downcast_ref::<TixError>() {
        return CliError::from(tix);
    }
    CliError::new(format!("{err:#}"))
}

impl From<&TixError> for CliError {
    fn from(err: &TixError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: Some(err.suggestion()),
            error_code: Some(err.error_code().to_string()),
        }
    }
}

/// Write an error in the requested format.
pub fn write_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *w, &wrapper)?;
            writeln!(w)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(w, "error[{code}]: {}", error.message)?,
                None => writeln!(w, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(w, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// [`write_error`] to stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tix_core::aggregate::AggregateError;

    #[test]
    fn resolve_format_flag_wins_over_everything() {
        let mode = resolve_output_mode_inner(
            Some(OutputMode::Text),
            true,
            Some("pretty"),
            Some("json"),
            true,
        );
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("text"), None, true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_env_wins_over_config() {
        let mode = resolve_output_mode_inner(None, false, Some("JSON"), Some("text"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_config_used_when_env_unknown() {
        let mode = resolve_output_mode_inner(None, false, Some("fancy"), Some("text"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_tty_default() {
        assert_eq!(
            resolve_output_mode_inner(None, false, None, None, true),
            OutputMode::Pretty
        );
        assert_eq!(
            resolve_output_mode_inner(None, false, None, None, false),
            OutputMode::Text
        );
    }

    #[test]
    fn cli_error_from_tix_error_carries_code() {
        let err = TixError::from(AggregateError::PriorityOutOfRange {
            ticket_id: "CAM-3".to_string(),
            value: 8,
        });
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E3001"));
        assert!(cli.message.contains("CAM-3"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn text_error_includes_code_and_suggestion() {
        let error = CliError {
            message: "boom".to_string(),
            suggestion: Some("try again".to_string()),
            error_code: Some("E4002".to_string()),
        };
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Text, &error).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "error[E4002]: boom\n  suggestion: try again\n");
    }

    #[test]
    fn with_code_attaches_hint() {
        let cli = CliError::with_code("bad grouping", ErrorCode::InvalidEnumValue);
        assert_eq!(cli.error_code.as_deref(), Some("E3002"));
        assert_eq!(
            cli.suggestion.as_deref(),
            ErrorCode::InvalidEnumValue.hint()
        );
    }

    #[test]
    fn cli_error_for_unwraps_known_errors() {
        let tagged: anyhow::Error =
            CliError::with_code("bad grouping", ErrorCode::InvalidEnumValue).into();
        assert_eq!(cli_error_for(&tagged).error_code.as_deref(), Some("E3002"));

        let tix: anyhow::Error = TixError::from(AggregateError::PriorityOutOfRange {
            ticket_id: "CAM-9".to_string(),
            value: -1,
        })
        .into();
        assert_eq!(cli_error_for(&tix).error_code.as_deref(), Some("E3001"));

        let plain = anyhow::anyhow!("disk full").context("writing board");
        let cli = cli_error_for(&plain);
        assert_eq!(cli.message, "writing board: disk full");
        assert!(cli.error_code.is_none());
    }

    #[test]
    fn json_error_is_wrapped() {
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Json, &CliError::new("boom")).expect("write");
        let value: serde_json::Value = serde_json::from_slice(&buf).expect("json");
        assert_eq!(value["error"]["message"], "boom");
        assert!(value["error"].get("error_code").is_none());
    }
}
