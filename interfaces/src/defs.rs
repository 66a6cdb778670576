use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub const UNKNOWN_FEED_TITLE: &str = "Unknown Feed";
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// One qualifying feed entry, as handed to a digest formatter.
///
/// `description` never exceeds `MAX_DESCRIPTION_CHARS` characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEntry {
    pub title: String,
    pub description: String,
    pub published: String,
    pub link: String,
    pub feed_title: String,
    pub feed_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FormatterError {
    #[error("summarization request failed: {0}")]
    Request(String),

    #[error("summarization returned no content")]
    EmptyResponse,

    #[error("could not serialize entries: {0}")]
    Serialization(String),

    #[error("template rendering failed: {0}")]
    Template(String),
}

// Object style note:
// A formatter is called exactly once per run with the complete entry list.
// It either returns the whole markdown document or fails; callers never
// write a partial digest.

#[async_trait]
pub trait DigestFormatter: Send + Sync {
    fn formatter_name(&self) -> String;
    async fn format(&self, entries: &[NormalizedEntry]) -> Result<String, FormatterError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Structured events emitted by the loader and the normalizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticEvent {
    FileNotFound { path: String },
    SourcesRead { path: String },
    ValidUrl { url: String },
    InvalidUrlSkipped { url: String, reason: String },
    SourcesLoaded { valid: usize },
    BatchStarted { feeds: usize },
    FeedFetchStarted { url: String },
    FeedFetched { url: String, feed_title: String, total: usize },
    FeedFailed { url: String, error: String },
    EntryAdded { feed_title: String, title: String },
    NoEntriesToday { feed_title: String },
    FeedToday { feed_title: String, today: usize },
    BatchSummary { total: usize, today: usize, filtered: usize },
}

impl DiagnosticEvent {
    pub fn level(&self) -> DiagnosticLevel {
        match self {
            DiagnosticEvent::ValidUrl { .. } | DiagnosticEvent::EntryAdded { .. } => {
                DiagnosticLevel::Debug
            }
            DiagnosticEvent::InvalidUrlSkipped { .. } | DiagnosticEvent::NoEntriesToday { .. } => {
                DiagnosticLevel::Warn
            }
            DiagnosticEvent::FileNotFound { .. } | DiagnosticEvent::FeedFailed { .. } => {
                DiagnosticLevel::Error
            }
            _ => DiagnosticLevel::Info,
        }
    }
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticEvent::FileNotFound { path } => write!(f, "File not found: {}", path),
            DiagnosticEvent::SourcesRead { path } => write!(f, "Reading URLs from file: {}", path),
            DiagnosticEvent::ValidUrl { url } => write!(f, "Valid URL found: {}", url),
            DiagnosticEvent::InvalidUrlSkipped { url, reason } => {
                write!(f, "Invalid URL found: {} ({})", url, reason)
            }
            DiagnosticEvent::SourcesLoaded { valid } => write!(f, "Found {} valid URLs", valid),
            DiagnosticEvent::BatchStarted { feeds } => {
                write!(f, "Starting to fetch {} feeds", feeds)
            }
            DiagnosticEvent::FeedFetchStarted { url } => write!(f, "Fetching feed: {}", url),
            DiagnosticEvent::FeedFetched { feed_title, total, .. } => {
                write!(f, "Found {} total entries in {}", total, feed_title)
            }
            DiagnosticEvent::FeedFailed { url, error } => {
                write!(f, "Error fetching feed {}: {}", url, error)
            }
            DiagnosticEvent::EntryAdded { title, .. } => write!(f, "Added entry: {}", title),
            DiagnosticEvent::NoEntriesToday { feed_title } => {
                write!(f, "No entries from today found in {}", feed_title)
            }
            DiagnosticEvent::FeedToday { feed_title, today } => {
                write!(f, "Found {} entries from today in {}", today, feed_title)
            }
            DiagnosticEvent::BatchSummary { total, today, filtered } => write!(
                f,
                "Feed processing summary: {} total entries, {} from today, \
                 {} older entries filtered out",
                total, today, filtered
            ),
        }
    }
}

/// Receives diagnostics from pipeline components.
///
/// Components hold a sink instead of configuring process-wide logging, so
/// tests can capture exactly what a single run reported.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_severity() {
        let skipped = DiagnosticEvent::InvalidUrlSkipped {
            url: "not_a_url".to_owned(),
            reason: "relative URL without a base".to_owned(),
        };
        assert_eq!(skipped.level(), DiagnosticLevel::Warn);

        let failed = DiagnosticEvent::FeedFailed {
            url: "https://valid.com/feed".to_owned(),
            error: "HTTP 500".to_owned(),
        };
        assert_eq!(failed.level(), DiagnosticLevel::Error);

        assert_eq!(DiagnosticEvent::SourcesLoaded { valid: 2 }.level(), DiagnosticLevel::Info);
    }

    #[test]
    fn batch_summary_reads_naturally() {
        let event = DiagnosticEvent::BatchSummary { total: 2, today: 1, filtered: 1 };
        assert_eq!(
            event.to_string(),
            "Feed processing summary: 2 total entries, 1 from today, 1 older entries filtered out"
        );
    }

    #[test]
    fn normalized_entry_serializes_all_fields() {
        let entry = NormalizedEntry {
            title: "AI News".to_owned(),
            description: "Test description".to_owned(),
            published: "Fri, 16 Oct 2026 09:00:00 +0000".to_owned(),
            link: "https://news.example.org/a".to_owned(),
            feed_title: "Test Feed".to_owned(),
            feed_url: "https://news.example.org/rss".to_owned(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["feed_title"], "Test Feed");
        assert_eq!(value["feed_url"], "https://news.example.org/rss");
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    struct UpperCaseTitles;

    #[async_trait]
    impl DigestFormatter for UpperCaseTitles {
        fn formatter_name(&self) -> String {
            "upper".to_owned()
        }

        async fn format(&self, entries: &[NormalizedEntry]) -> Result<String, FormatterError> {
            if entries.is_empty() {
                return Err(FormatterError::Template("nothing to render".to_owned()));
            }
            Ok(entries.iter().map(|e| e.title.to_uppercase()).collect::<Vec<_>>().join("\n"))
        }
    }

    #[tokio::test]
    async fn formatter_trait_is_object_safe() {
        let formatter: Box<dyn DigestFormatter> = Box::new(UpperCaseTitles);
        let err = formatter.format(&[]).await.unwrap_err();
        assert!(matches!(err, FormatterError::Template(_)));
        assert_eq!(formatter.formatter_name(), "upper");
    }
}
