use chrono::{DateTime, Utc};
pub use interfaces::defs::{DiagnosticEvent, DiagnosticLevel, DiagnosticsSink};
pub use interfaces::defs::{DigestFormatter, FormatterError, NormalizedEntry};
pub use interfaces::defs::{MAX_DESCRIPTION_CHARS, UNKNOWN_FEED_TITLE};

use crate::validator::InvalidUrl;

/// Feed as returned by a fetch collaborator, before any defaults are applied.
///
/// `entries == None` means the response carried no usable entry list.
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub title: Option<String>,
    pub entries: Option<Vec<RawEntry>>,
}

#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "AI-Newspipe/1.0".to_string(),
            timeout_seconds: 30,
            max_feed_size_mb: 10,
            follow_redirects: true,
            max_redirects: 5,
            concurrency: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewspipeError {
    #[error("Invalid URL: {url} ({reason})")]
    InvalidUrl { url: String, reason: InvalidUrl },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Digest formatting failed: {0}")]
    Formatter(#[from] FormatterError),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NewspipeError>;
