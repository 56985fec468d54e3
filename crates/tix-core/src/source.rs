//! Data sources: where the one-shot ticket payload comes from.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ErrorCode;
use crate::model::Payload;

/// Endpoint the board was originally built against.
pub const DEFAULT_SOURCE_URL: &str = "https://api.quicksell.co/v1/internal/frontend-assignment";

/// Fetch failures. Every variant is a FetchFailure for the session.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed payload from {origin}: {source}")]
    Malformed {
        origin: String,
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Unreadable { path: PathBuf, source: io::Error },
}

impl SourceError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } | Self::Status { .. } => ErrorCode::FetchFailed,
            Self::Malformed { .. } => ErrorCode::MalformedPayload,
            Self::Unreadable { .. } => ErrorCode::SourceUnreadable,
        }
    }
}

/// Something that can produce the full ticket payload in one call.
pub trait DataSource {
    /// Fetch `{ tickets, users }`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on transport failure or an undecodable body.
    fn fetch(&self) -> Result<Payload, SourceError>;

    /// Human-readable origin for logs.
    fn describe(&self) -> String;
}

fn decode(origin: &str, body: &str) -> Result<Payload, SourceError> {
    serde_json::from_str(body).map_err(|source| SourceError::Malformed {
        origin: origin.to_string(),
        source,
    })
}

/// `GET <url>` returning a JSON payload.
#[derive(Debug)]
pub struct HttpSource {
    url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Bound the whole request. Without this the transport's own defaults apply.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::AgentBuilder::new().timeout(timeout).build();
        self
    }
}

impl DataSource for HttpSource {
    fn fetch(&self) -> Result<Payload, SourceError> {
        debug!(url = %self.url, "fetching tickets");
        let response = self
            .agent
            .get(&self.url)
            .set("Accept", "application/json")
            .set("User-Agent", "tix")
            .call()
            .map_err(|err| match err {
                ureq::Error::Status(status, _) => SourceError::Status {
                    url: self.url.clone(),
                    status,
                },
                ureq::Error::Transport(transport) => SourceError::Transport {
                    url: self.url.clone(),
                    message: transport.to_string(),
                },
            })?;

        let body = response
            .into_string()
            .map_err(|err| SourceError::Transport {
                url: self.url.clone(),
                message: err.to_string(),
            })?;
        decode(&self.url, &body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Local JSON file with the same shape as the HTTP payload.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> Result<Payload, SourceError> {
        debug!(path = %self.path.display(), "reading tickets");
        let body = std::fs::read_to_string(&self.path).map_err(|source| {
            SourceError::Unreadable {
                path: self.path.clone(),
                source,
            }
        })?;
        decode(&self.path.display().to_string(), &body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A configured source location: an HTTP(S) URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    File(PathBuf),
}

impl SourceLocation {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed.strip_prefix("file://").unwrap_or(trimmed)))
        }
    }

    /// Build the matching source. `timeout` only applies to URLs.
    #[must_use]
    pub fn into_source(self, timeout: Option<Duration>) -> Box<dyn DataSource> {
        match self {
            Self::Url(url) => {
                let source = HttpSource::new(url);
                Box::new(match timeout {
                    Some(timeout) => source.with_timeout(timeout),
                    None => source,
                })
            }
            Self::File(path) => Box::new(FileSource::new(path)),
        }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::Url(DEFAULT_SOURCE_URL.to_string())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn location_parse_distinguishes_urls_from_paths() {
        assert_eq!(
            SourceLocation::parse("https://example.com/tickets"),
            SourceLocation::Url("https://example.com/tickets".to_string())
        );
        assert_eq!(
            SourceLocation::parse(" HTTP://example.com "),
            SourceLocation::Url("HTTP://example.com".to_string())
        );
        assert_eq!(
            SourceLocation::parse("fixtures/board.json"),
            SourceLocation::File(PathBuf::from("fixtures/board.json"))
        );
        assert_eq!(
            SourceLocation::parse("file:///tmp/board.json"),
            SourceLocation::File(PathBuf::from("/tmp/board.json"))
        );
    }

    #[test]
    fn default_location_is_board_endpoint() {
        assert_eq!(SourceLocation::default().to_string(), DEFAULT_SOURCE_URL);
    }

    #[test]
    fn file_source_decodes_payload() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("board.json");
        std::fs::write(
            &path,
            r#"{"tickets":[{"id":"CAM-1","title":"t","userId":"usr-1","status":"Backlog","priority":2}],
                "users":[{"id":"usr-1","name":"Anoop"}]}"#,
        )
        .expect("write fixture");

        let payload = FileSource::new(&path).fetch().expect("fetch");
        assert_eq!(payload.tickets.len(), 1);
        assert_eq!(payload.users[0].name, "Anoop");
    }

    #[test]
    fn file_source_reports_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let err = FileSource::new(dir.path().join("nope.json"))
            .fetch()
            .expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::SourceUnreadable);
    }

    #[test]
    fn file_source_reports_malformed_payload() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("board.json");
        std::fs::write(&path, r#"{"tickets": "not a list"}"#).expect("write fixture");

        let err = FileSource::new(&path).fetch().expect_err("must fail");
        assert_eq!(err.code(), ErrorCode::MalformedPayload);
        assert!(err.to_string().contains("board.json"));
    }
}
