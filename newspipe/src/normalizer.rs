use crate::traits::FeedFetcher;
use crate::types::{
    DiagnosticEvent, DiagnosticsSink, NormalizedEntry, RawEntry, MAX_DESCRIPTION_CHARS,
    UNKNOWN_FEED_TITLE,
};
use crate::utils::{text, time};
use crate::validator::FeedUrl;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Totals gathered during one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub feeds: usize,
    pub failed_feeds: usize,
    pub total: usize,
    pub today: usize,
}

impl NormalizeReport {
    pub fn filtered(&self) -> usize {
        self.total - self.today
    }
}

/// A validated URL together with the title its feed reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: FeedUrl,
    pub title: String,
}

impl FeedSource {
    /// An absent title becomes `UNKNOWN_FEED_TITLE`. An empty one is kept.
    pub fn new(url: &FeedUrl, title: Option<String>) -> Self {
        Self {
            url: url.clone(),
            title: title.unwrap_or_else(|| UNKNOWN_FEED_TITLE.to_string()),
        }
    }
}

struct FeedOutcome {
    entries: Vec<NormalizedEntry>,
    total: usize,
    failed: bool,
}

impl FeedOutcome {
    fn failed() -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
            failed: true,
        }
    }
}

/// Fetches every feed once and keeps the entries published today.
///
/// Feeds are independent: a fetch error or an unusable response is reported
/// to the sink and that feed contributes nothing. Output follows input URL
/// order, then per-feed entry order, at any concurrency.
pub struct FeedNormalizer {
    fetcher: Arc<dyn FeedFetcher>,
    sink: Arc<dyn DiagnosticsSink>,
    concurrency: usize,
}

impl FeedNormalizer {
    pub fn new(fetcher: Arc<dyn FeedFetcher>, sink: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            fetcher,
            sink,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// "Today" is the local calendar date at call time.
    pub async fn fetch_and_normalize(&self, urls: &[FeedUrl]) -> Vec<NormalizedEntry> {
        self.fetch_and_normalize_on(urls, time::today_local()).await
    }

    pub async fn fetch_and_normalize_on(
        &self,
        urls: &[FeedUrl],
        today: NaiveDate,
    ) -> Vec<NormalizedEntry> {
        self.fetch_and_normalize_report(urls, today).await.0
    }

    pub async fn fetch_and_normalize_report(
        &self,
        urls: &[FeedUrl],
        today: NaiveDate,
    ) -> (Vec<NormalizedEntry>, NormalizeReport) {
        self.sink.record(DiagnosticEvent::BatchStarted { feeds: urls.len() });

        // `buffered` yields in submission order, so reassembly is deterministic
        let outcomes: Vec<FeedOutcome> = stream::iter(urls)
            .map(|url| self.process_feed(url, today))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = NormalizeReport {
            feeds: urls.len(),
            ..NormalizeReport::default()
        };
        let mut all_entries = Vec::new();

        for outcome in outcomes {
            report.total += outcome.total;
            report.today += outcome.entries.len();
            if outcome.failed {
                report.failed_feeds += 1;
            }
            all_entries.extend(outcome.entries);
        }

        self.sink.record(DiagnosticEvent::BatchSummary {
            total: report.total,
            today: report.today,
            filtered: report.filtered(),
        });

        (all_entries, report)
    }

    async fn process_feed(&self, url: &FeedUrl, today: NaiveDate) -> FeedOutcome {
        self.sink.record(DiagnosticEvent::FeedFetchStarted { url: url.to_string() });

        let raw = match self.fetcher.fetch(url).await {
            Ok(raw) => raw,
            Err(e) => {
                self.sink.record(DiagnosticEvent::FeedFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                return FeedOutcome::failed();
            }
        };

        let source = FeedSource::new(url, raw.title);

        let raw_entries = match raw.entries {
            Some(entries) => entries,
            None => {
                self.sink.record(DiagnosticEvent::FeedFailed {
                    url: url.to_string(),
                    error: "response carries no entry list".to_string(),
                });
                return FeedOutcome::failed();
            }
        };

        let total = raw_entries.len();
        self.sink.record(DiagnosticEvent::FeedFetched {
            url: url.to_string(),
            feed_title: source.title.clone(),
            total,
        });

        let mut entries = Vec::new();
        for raw_entry in raw_entries {
            if !is_from_day(&raw_entry, today) {
                continue;
            }
            let entry = normalize_entry(raw_entry, &source);
            self.sink.record(DiagnosticEvent::EntryAdded {
                feed_title: source.title.clone(),
                title: entry.title.clone(),
            });
            entries.push(entry);
        }

        if entries.is_empty() {
            self.sink.record(DiagnosticEvent::NoEntriesToday { feed_title: source.title });
        } else {
            self.sink.record(DiagnosticEvent::FeedToday {
                feed_title: source.title,
                today: entries.len(),
            });
        }

        FeedOutcome {
            entries,
            total,
            failed: false,
        }
    }
}

/// Compares the UTC calendar date of the entry timestamp with `day`.
///
/// The entry's own offset is not carried over to the local zone, so entries
/// published near midnight may land on the neighbouring day. Entries without
/// a timestamp never match.
pub fn is_from_day(entry: &RawEntry, day: NaiveDate) -> bool {
    entry
        .published_at
        .map(|published| published.date_naive() == day)
        .unwrap_or(false)
}

pub fn normalize_entry(entry: RawEntry, source: &FeedSource) -> NormalizedEntry {
    let description = entry
        .description
        .as_deref()
        .map(|d| text::truncate_chars(d, MAX_DESCRIPTION_CHARS).to_string())
        .unwrap_or_default();

    NormalizedEntry {
        title: entry.title.unwrap_or_default(),
        description,
        published: entry.published.unwrap_or_default(),
        link: entry.link.unwrap_or_default(),
        feed_title: source.title.clone(),
        feed_url: source.url.to_string(),
    }
}
