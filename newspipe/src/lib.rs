pub mod types;
pub mod validator;
pub mod sources;
pub mod traits;
pub mod parser;
pub mod fetcher;
pub mod normalizer;
pub mod llm_adapter;
pub mod digest;
pub mod writer;
pub mod diagnostics;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use validator::{FeedUrl, InvalidUrl, UrlValidator, ValidationMode};
pub use sources::SourceLoader;
pub use traits::FeedFetcher;
pub use parser::FeedParser;
pub use fetcher::HttpFeedFetcher;
pub use normalizer::{FeedNormalizer, FeedSource, NormalizeReport};
pub use llm_adapter::{LlmClient, OpenAiClient, OpenAiClientConfig};
pub use digest::{LlmDigest, MarkdownDigest};
pub use writer::DigestWriter;
pub use diagnostics::{init_tracing, MemorySink, NullSink, TracingSink};
pub use pipeline::{Pipeline, PipelineConfig, RunOutcome};
