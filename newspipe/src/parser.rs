use crate::types::{NewspipeError, RawEntry, RawFeed, Result};
use feed_rs::parser;
use tracing::debug;

/// Maps RSS, Atom and JSON Feed documents onto `RawFeed`.
pub struct FeedParser;

impl FeedParser {
    pub fn parse_feed(content: &[u8]) -> Result<RawFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content)
            .map_err(|e| NewspipeError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);
        let entries = feed.entries.into_iter().map(Self::parse_entry).collect::<Vec<_>>();

        debug!("Parsed feed with {} entries", entries.len());

        Ok(RawFeed {
            title,
            entries: Some(entries),
        })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> RawEntry {
        let title = entry.title.map(|t| t.content);

        // Summary first, content body as a fallback for Atom feeds without one
        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        let link = entry.links.into_iter().next().map(|l| l.href);

        // `updated` is an edit time, not a publication date
        let published_at = entry.published;
        // feed-rs normalizes to UTC and drops the source text
        let published = published_at.map(|dt| dt.to_rfc2822());

        RawEntry {
            title,
            description,
            published,
            published_at,
            link,
        }
    }

    pub fn looks_like_feed(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        let has_feed_markers = content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
            || content_lower.contains("jsonfeed.org/version");

        has_feed_markers
            && (content.trim_start().starts_with("<?xml")
                || content_lower.contains('<')
                || content_lower.contains('{'))
    }
}
