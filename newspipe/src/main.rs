use ai_newspipe::{
    init_tracing, DigestFormatter, FetchConfig, HttpFeedFetcher, LlmDigest, MarkdownDigest,
    OpenAiClient, Pipeline, PipelineConfig, RunOutcome, TracingSink,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Collects today's entries from a list of RSS feeds into a markdown digest.
#[derive(Debug, Parser)]
#[command(name = "ai-newspipe", version, about)]
struct Cli {
    /// File with one feed URL per line; `#` starts a comment
    #[arg(long, env = "AI_NEWSPIPE_SOURCES", default_value = "news_sources.txt")]
    sources: PathBuf,

    /// Directory that receives the digest files
    #[arg(long, env = "AI_NEWSPIPE_OUTPUT_DIR", default_value = "summaries")]
    output_dir: PathBuf,

    /// Feed URL to read instead of the sources file (repeatable, validated strictly)
    #[arg(long = "url")]
    urls: Vec<String>,

    /// Summarize with the OpenAI API instead of plain templating
    #[arg(long, env = "AI_NEWSPIPE_SUMMARIZE")]
    summarize: bool,

    /// Number of feeds fetched at the same time
    #[arg(long, env = "AI_NEWSPIPE_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// HTTP timeout per feed, in seconds
    #[arg(long, env = "AI_NEWSPIPE_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    #[arg(long, env = "AI_NEWSPIPE_USER_AGENT", default_value = "AI-Newspipe/1.0")]
    user_agent: String,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            sources_file: self.sources.clone(),
            output_dir: self.output_dir.clone(),
            fetch: FetchConfig {
                user_agent: self.user_agent.clone(),
                timeout_seconds: self.timeout,
                concurrency: self.concurrency,
                ..FetchConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads its env fallbacks
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    info!("Starting AI Newspipe");

    let result = run(cli).await;
    if let Err(e) = &result {
        error!("Error: {}", e);
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.pipeline_config();

    // Build the formatter first so a missing API key fails before any fetch
    let formatter: Box<dyn DigestFormatter> = if cli.summarize {
        Box::new(LlmDigest::new(Arc::new(OpenAiClient::from_env()?)))
    } else {
        Box::new(MarkdownDigest::new())
    };

    let fetcher = Arc::new(HttpFeedFetcher::new(config.fetch.clone())?);
    let pipeline = Pipeline::new(config, fetcher, formatter, Arc::new(TracingSink));

    let outcome = if cli.urls.is_empty() {
        pipeline.run().await?
    } else {
        pipeline.run_with_urls(&cli.urls).await?
    };

    match outcome {
        RunOutcome::Written { path, entries } => {
            info!("Saved {} entries to: {}", entries, path.display());
            info!("Process completed successfully!");
        }
        RunOutcome::NoSources | RunOutcome::NoEntries => {
            info!("Nothing to write, finished without a digest");
        }
    }
    Ok(())
}
