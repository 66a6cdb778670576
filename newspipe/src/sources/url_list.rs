use crate::types::{DiagnosticEvent, DiagnosticsSink, NewspipeError, Result};
use crate::validator::{FeedUrl, UrlValidator};
use std::path::Path;
use std::sync::Arc;

/// Reads feed URLs from a newline-delimited text file.
///
/// Blank lines and lines starting with `#` are ignored. Every other line goes
/// through a lenient `UrlValidator`, so bad lines are reported and dropped
/// while the rest keep their file order (duplicates included).
pub struct SourceLoader {
    validator: UrlValidator,
    sink: Arc<dyn DiagnosticsSink>,
}

impl SourceLoader {
    pub fn new(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            validator: UrlValidator::lenient(sink.clone()),
            sink,
        }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<FeedUrl>> {
        let path = path.as_ref();
        let display = path.display().to_string();

        if !path.exists() {
            self.sink.record(DiagnosticEvent::FileNotFound { path: display.clone() });
            return Err(NewspipeError::FileNotFound { path: display });
        }

        self.sink.record(DiagnosticEvent::SourcesRead { path: display });
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    pub fn parse_str(&self, content: &str) -> Result<Vec<FeedUrl>> {
        let candidates = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'));

        let urls = self.validator.filter(candidates)?;
        self.sink.record(DiagnosticEvent::SourcesLoaded { valid: urls.len() });
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use crate::types::DiagnosticLevel;

    #[test]
    fn skips_comments_blanks_and_invalid_lines() {
        let sink = Arc::new(MemorySink::new());
        let loader = SourceLoader::new(sink.clone());

        let urls = loader.parse_str("# comment\n\nhttps://valid.com/feed\nnot_a_url\n").unwrap();
        let urls: Vec<&str> = urls.iter().map(FeedUrl::as_str).collect();

        assert_eq!(urls, vec!["https://valid.com/feed"]);
        assert_eq!(sink.count_at(DiagnosticLevel::Warn), 1);
        assert!(sink.events().contains(&DiagnosticEvent::SourcesLoaded { valid: 1 }));
    }

    #[test]
    fn trims_whitespace_and_keeps_duplicates() {
        let loader = SourceLoader::new(Arc::new(MemorySink::new()));
        let urls = loader
            .parse_str(
                "  https://a.com/rss  \n\t# indented comment\nhttps://b.com/rss\r\nhttps://a.com/rss\n",
            )
            .unwrap();
        let urls: Vec<&str> = urls.iter().map(FeedUrl::as_str).collect();
        assert_eq!(urls, vec!["https://a.com/rss", "https://b.com/rss", "https://a.com/rss"]);
    }

    #[test]
    fn empty_input_yields_no_urls() {
        let loader = SourceLoader::new(Arc::new(MemorySink::new()));
        assert!(loader.parse_str("").unwrap().is_empty());
        assert!(loader.parse_str("not_a_url\nhttp://invalid\n").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        let sink = Arc::new(MemorySink::new());
        let loader = SourceLoader::new(sink.clone());
        let err = loader.load("/nonexistent/news_sources.txt").unwrap_err();
        assert!(matches!(err, NewspipeError::FileNotFound { .. }));
        assert_eq!(sink.count_at(DiagnosticLevel::Error), 1);
    }
}
