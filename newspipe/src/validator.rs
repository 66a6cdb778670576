use crate::types::{DiagnosticEvent, DiagnosticsSink, NewspipeError, Result};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Hosts that show up in templates and docs but never serve a real feed.
const PLACEHOLDER_HOSTS: [&str; 3] = ["invalid", "example", "localhost"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUrl {
    #[error("empty value")]
    Empty,

    #[error("unparseable: {0}")]
    Unparseable(String),

    #[error("missing host")]
    MissingHost,

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("host '{0}' is not a dotted domain")]
    UndottedHost(String),

    #[error("placeholder host '{0}'")]
    PlaceholderHost(String),
}

/// An http(s) URL that passed validation. Only `UrlValidator` builds these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedUrl(String);

impl FeedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for FeedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FeedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any invalid URL is an error.
    Strict,
    /// Invalid URLs are reported to the sink and skipped.
    Lenient,
}

pub struct UrlValidator {
    mode: ValidationMode,
    sink: Arc<dyn DiagnosticsSink>,
}

impl UrlValidator {
    pub fn new(mode: ValidationMode, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self { mode, sink }
    }

    pub fn strict(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self::new(ValidationMode::Strict, sink)
    }

    pub fn lenient(sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self::new(ValidationMode::Lenient, sink)
    }

    /// Pure structural and policy check, independent of mode.
    pub fn check(raw: &str) -> std::result::Result<FeedUrl, InvalidUrl> {
        let candidate = raw.trim();
        if candidate.is_empty() {
            return Err(InvalidUrl::Empty);
        }

        let parsed = Url::parse(candidate).map_err(|e| InvalidUrl::Unparseable(e.to_string()))?;

        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => return Err(InvalidUrl::MissingHost),
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(InvalidUrl::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let bare_host = host.trim_end_matches('.');
        if PLACEHOLDER_HOSTS.contains(&bare_host) {
            return Err(InvalidUrl::PlaceholderHost(host.to_string()));
        }

        let labels = host.split('.').filter(|label| !label.is_empty()).count();
        if !host.contains('.') || labels < 2 {
            return Err(InvalidUrl::UndottedHost(host.to_string()));
        }

        Ok(FeedUrl(candidate.to_string()))
    }

    /// Returns the validated URL, `None` for a skipped one in lenient mode,
    /// or an error in strict mode.
    pub fn accept(&self, raw: &str) -> Result<Option<FeedUrl>> {
        match Self::check(raw) {
            Ok(url) => {
                self.sink.record(DiagnosticEvent::ValidUrl { url: url.to_string() });
                Ok(Some(url))
            }
            Err(reason) => match self.mode {
                ValidationMode::Strict => Err(NewspipeError::InvalidUrl {
                    url: raw.to_string(),
                    reason,
                }),
                ValidationMode::Lenient => {
                    self.sink.record(DiagnosticEvent::InvalidUrlSkipped {
                        url: raw.to_string(),
                        reason: reason.to_string(),
                    });
                    Ok(None)
                }
            },
        }
    }

    pub fn validate(&self, raw: &str) -> Result<bool> {
        Ok(self.accept(raw)?.is_some())
    }

    /// Validates a list, keeping order and duplicates.
    pub fn filter<I, S>(&self, urls: I) -> Result<Vec<FeedUrl>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accepted = Vec::new();
        for raw in urls {
            if let Some(url) = self.accept(raw.as_ref())? {
                accepted.push(url);
            }
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{MemorySink, NullSink};

    fn lenient() -> UrlValidator {
        UrlValidator::lenient(Arc::new(NullSink))
    }

    fn strict() -> UrlValidator {
        UrlValidator::strict(Arc::new(NullSink))
    }

    #[test]
    fn accepts_http_and_https_feeds() {
        assert!(lenient().validate("https://valid.com/feed").unwrap());
        assert!(lenient().validate("http://another-valid.com/rss").unwrap());
        assert!(lenient().validate("https://feeds.bbci.co.uk/news/rss.xml").unwrap());
        assert!(lenient().validate("https://example.com:8443/feed?x=1").unwrap());
    }

    #[test]
    fn rejects_missing_scheme_or_host() {
        for raw in [
            "not_a_url",
            "valid.com/feed",
            "//valid.com/feed",
            "mailto:someone@valid.com",
            "file:///etc/hosts",
        ] {
            assert!(!lenient().validate(raw).unwrap(), "{raw} should be rejected");
        }
        assert_eq!(
            UrlValidator::check("not_a_url").unwrap_err(),
            InvalidUrl::Unparseable("relative URL without a base".to_string())
        );
        assert_eq!(
            UrlValidator::check("mailto:someone@valid.com").unwrap_err(),
            InvalidUrl::MissingHost
        );
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            UrlValidator::check("ftp://valid.com/feed").unwrap_err(),
            InvalidUrl::UnsupportedScheme("ftp".to_string())
        );
        assert!(!lenient().validate("wss://valid.com/socket").unwrap());
    }

    #[test]
    fn rejects_placeholder_hosts_even_with_valid_scheme() {
        for host in PLACEHOLDER_HOSTS {
            for scheme in ["http", "https"] {
                let raw = format!("{scheme}://{host}/feed");
                assert!(!lenient().validate(&raw).unwrap(), "{raw} should be rejected");
                assert_eq!(
                    UrlValidator::check(&raw).unwrap_err(),
                    InvalidUrl::PlaceholderHost(host.to_string())
                );
            }
        }
        assert!(!lenient().validate("http://localhost:8080/feed").unwrap());
    }

    #[test]
    fn rejects_undotted_hosts() {
        assert_eq!(
            UrlValidator::check("https://intranet/feed").unwrap_err(),
            InvalidUrl::UndottedHost("intranet".to_string())
        );
        assert!(!lenient().validate("https://intranet./feed").unwrap());
    }

    #[test]
    fn rejects_empty_values() {
        assert_eq!(UrlValidator::check("").unwrap_err(), InvalidUrl::Empty);
        assert_eq!(UrlValidator::check("   ").unwrap_err(), InvalidUrl::Empty);
    }

    #[test]
    fn strict_mode_raises_on_invalid() {
        let err = strict().validate("http://invalid").unwrap_err();
        match err {
            NewspipeError::InvalidUrl { url, reason } => {
                assert_eq!(url, "http://invalid");
                assert_eq!(reason, InvalidUrl::PlaceholderHost("invalid".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(strict().validate("https://valid.com/feed").unwrap());
    }

    #[test]
    fn lenient_mode_reports_skipped_urls() {
        let sink = Arc::new(MemorySink::new());
        let validator = UrlValidator::lenient(sink.clone());
        assert!(!validator.validate("not_a_url").unwrap());

        let warnings: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, DiagnosticEvent::InvalidUrlSkipped { .. }))
            .collect();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn validation_is_idempotent() {
        let validator = lenient();
        for raw in ["https://valid.com/feed", "not_a_url", "http://example/feed", ""] {
            assert_eq!(validator.validate(raw).unwrap(), validator.validate(raw).unwrap());
            assert_eq!(UrlValidator::check(raw), UrlValidator::check(raw));
        }
    }

    #[test]
    fn filter_keeps_order_and_duplicates() {
        let urls = ["https://b.com/rss", "bogus", "https://a.com/rss", "https://b.com/rss"];
        let kept = lenient().filter(urls).unwrap();
        let kept: Vec<&str> = kept.iter().map(FeedUrl::as_str).collect();
        assert_eq!(kept, vec!["https://b.com/rss", "https://a.com/rss", "https://b.com/rss"]);

        assert!(strict().filter(urls).is_err());
    }
}
