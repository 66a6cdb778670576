use crate::parser::FeedParser;
use crate::traits::FeedFetcher;
use crate::types::{FetchConfig, NewspipeError, RawFeed, Result};
use crate::validator::FeedUrl;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Fetches feeds over HTTP and parses them with `FeedParser`.
///
/// One request per call, no retries. The timeout comes from `FetchConfig`.
pub struct HttpFeedFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFeedFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn max_feed_bytes(&self) -> u64 {
        self.config.max_feed_size_mb as u64 * 1024 * 1024
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    fn fetcher_name(&self) -> String {
        format!("http ({})", self.config.user_agent)
    }

    async fn fetch(&self, url: &FeedUrl) -> Result<RawFeed> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NewspipeError::Fetch(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_bytes() {
                return Err(NewspipeError::Fetch(format!(
                    "Feed too large: {}MB",
                    content_length / (1024 * 1024)
                )));
            }
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(NewspipeError::Fetch("Empty response body".to_string()));
        }
        if body.len() as u64 > self.max_feed_bytes() {
            return Err(NewspipeError::Fetch(format!(
                "Feed too large: {}MB",
                body.len() / (1024 * 1024)
            )));
        }

        if !FeedParser::looks_like_feed(&String::from_utf8_lossy(&body)) {
            return Err(NewspipeError::Fetch("Response does not look like a feed".to_string()));
        }

        info!(
            "Successfully fetched feed: {} ({} bytes in {}ms)",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );

        FeedParser::parse_feed(&body)
    }
}
