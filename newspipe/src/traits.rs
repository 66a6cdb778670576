use crate::types::{RawFeed, Result};
use crate::validator::FeedUrl;
use async_trait::async_trait;

/// Retrieves one feed and maps it to a `RawFeed`.
///
/// Implementations make a single attempt; the normalizer treats any error as
/// a failure of that feed alone.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Human-readable name for logs
    fn fetcher_name(&self) -> String;

    async fn fetch(&self, url: &FeedUrl) -> Result<RawFeed>;
}
