use std::fmt;

use crate::aggregate::AggregateError;
use crate::prefs::PrefsError;
use crate::source::SourceError;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    FetchFailed,
    MalformedPayload,
    SourceUnreadable,
    PriorityOutOfRange,
    InvalidEnumValue,
    PreferenceReadFailed,
    PreferenceWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::FetchFailed => "E2001",
            Self::MalformedPayload => "E2002",
            Self::SourceUnreadable => "E2003",
            Self::PriorityOutOfRange => "E3001",
            Self::InvalidEnumValue => "E3002",
            Self::PreferenceReadFailed => "E4001",
            Self::PreferenceWriteFailed => "E4002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::FetchFailed => "Ticket fetch failed",
            Self::MalformedPayload => "Malformed ticket payload",
            Self::SourceUnreadable => "Ticket source file unreadable",
            Self::PriorityOutOfRange => "Ticket priority out of range",
            Self::InvalidEnumValue => "Invalid grouping/sort value",
            Self::PreferenceReadFailed => "Preference read failed",
            Self::PreferenceWriteFailed => "Preference write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in tix/config.toml and retry."),
            Self::FetchFailed => Some("Check network access to the source URL and retry."),
            Self::MalformedPayload => {
                Some("The source must return {\"tickets\": [...], \"users\": [...]}.")
            }
            Self::SourceUnreadable => Some("Check that the --source path exists and is readable."),
            Self::PriorityOutOfRange => {
                Some("Ticket priorities must be 0-4; fix the upstream data source.")
            }
            Self::InvalidEnumValue => Some("Use status|user|priority or priority|title."),
            Self::PreferenceReadFailed | Self::PreferenceWriteFailed => {
                Some("Check permissions on the tix config directory.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Top-level error for callers that drive a full board session.
#[derive(Debug, thiserror::Error)]
pub enum TixError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),
}

impl TixError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Source(err) => err.code(),
            Self::Aggregate(err) => err.code(),
            Self::Prefs(err) => err.code(),
        }
    }

    /// Remediation text for terminal and JSON error output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or(code.message()).to_string()
    }
}
