use crate::normalizer::FeedNormalizer;
use crate::sources::SourceLoader;
use crate::traits::FeedFetcher;
use crate::types::{DiagnosticsSink, DigestFormatter, FetchConfig, Result};
use crate::validator::{FeedUrl, UrlValidator};
use crate::writer::DigestWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub sources_file: PathBuf,
    pub output_dir: PathBuf,
    pub fetch: FetchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources_file: PathBuf::from("news_sources.txt"),
            output_dir: PathBuf::from("summaries"),
            fetch: FetchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No usable URL survived validation.
    NoSources,
    /// Feeds were read but none had entries from today.
    NoEntries,
    Written { path: PathBuf, entries: usize },
}

/// One batch pass: load URLs, normalize today's entries, format, write.
///
/// Empty inputs end the run early with a warning. Any error from loading,
/// formatting or writing aborts the run before a digest file exists.
pub struct Pipeline {
    config: PipelineConfig,
    loader: SourceLoader,
    normalizer: FeedNormalizer,
    formatter: Box<dyn DigestFormatter>,
    writer: DigestWriter,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn FeedFetcher>,
        formatter: Box<dyn DigestFormatter>,
        sink: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        let loader = SourceLoader::new(sink.clone());
        let normalizer =
            FeedNormalizer::new(fetcher, sink.clone()).with_concurrency(config.fetch.concurrency);
        let writer = DigestWriter::new(config.output_dir.clone());

        Self {
            config,
            loader,
            normalizer,
            formatter,
            writer,
            sink,
        }
    }

    /// Runs over the URLs listed in the configured sources file.
    pub async fn run(&self) -> Result<RunOutcome> {
        info!("Reading URLs from {}", self.config.sources_file.display());
        let urls = self.loader.load(&self.config.sources_file)?;
        self.process(urls).await
    }

    /// Runs over an explicit URL list. Any invalid URL aborts the run.
    pub async fn run_with_urls<I, S>(&self, urls: I) -> Result<RunOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = UrlValidator::strict(self.sink.clone()).filter(urls)?;
        self.process(urls).await
    }

    async fn process(&self, urls: Vec<FeedUrl>) -> Result<RunOutcome> {
        if urls.is_empty() {
            warn!("No valid URLs found!");
            return Ok(RunOutcome::NoSources);
        }

        info!("Fetching {} feeds...", urls.len());
        let entries = self.normalizer.fetch_and_normalize(&urls).await;

        if entries.is_empty() {
            warn!("No entries found!");
            return Ok(RunOutcome::NoEntries);
        }

        info!("Formatting {} entries with {}", entries.len(), self.formatter.formatter_name());
        let markdown = self.formatter.format(&entries).await?;

        let path = self.writer.write(&markdown)?;
        info!("Saved to: {}", path.display());

        Ok(RunOutcome::Written {
            path,
            entries: entries.len(),
        })
    }
}
