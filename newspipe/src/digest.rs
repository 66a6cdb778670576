use crate::llm_adapter::{ChatMessage, ChatRequest, ChatRole, LlmClient};
use crate::types::{DigestFormatter, FormatterError, NormalizedEntry};
use crate::utils::time;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

const CURATOR_ROLE: &str = "You are an AI news curator specializing in artificial intelligence \
                            and machine learning news analysis.";

/// Renders entries straight into markdown, grouped by feed.
pub struct MarkdownDigest {
    generated_at: Option<DateTime<Local>>,
}

impl MarkdownDigest {
    pub fn new() -> Self {
        Self { generated_at: None }
    }

    /// Pins the "Generated on" timestamp instead of reading the clock.
    pub fn generated_at(at: DateTime<Local>) -> Self {
        Self {
            generated_at: Some(at),
        }
    }

    pub fn render(&self, entries: &[NormalizedEntry]) -> Result<String, FormatterError> {
        let generated_at = self.generated_at.unwrap_or_else(Local::now);
        let mut digest = String::new();

        write_digest(&mut digest, &time::display_stamp(&generated_at), entries)
            .map_err(|e| FormatterError::Template(e.to_string()))?;

        Ok(digest)
    }
}

impl Default for MarkdownDigest {
    fn default() -> Self {
        Self::new()
    }
}

fn write_digest(
    out: &mut String,
    generated_on: &str,
    entries: &[NormalizedEntry],
) -> std::fmt::Result {
    write!(out, "# AI News Summary\n\n")?;
    write!(out, "Generated on: {}\n\n", generated_on)?;

    for (feed_title, feed_entries) in group_by_feed(entries) {
        write!(out, "## {}\n\n", feed_title)?;
        for entry in feed_entries {
            write!(out, "### [{}]({})\n\n", entry.title, entry.link)?;
            write!(out, "*Published: {}*\n\n", entry.published)?;
            write!(out, "{}\n\n", entry.description)?;
            out.push_str("---\n\n");
        }
    }
    Ok(())
}

/// Groups by feed title, ordering groups by first appearance.
fn group_by_feed(entries: &[NormalizedEntry]) -> Vec<(&str, Vec<&NormalizedEntry>)> {
    let mut groups: Vec<(&str, Vec<&NormalizedEntry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(title, _)| *title == entry.feed_title) {
            Some((_, group)) => group.push(entry),
            None => groups.push((entry.feed_title.as_str(), vec![entry])),
        }
    }
    groups
}

#[async_trait]
impl DigestFormatter for MarkdownDigest {
    fn formatter_name(&self) -> String {
        "markdown".to_string()
    }

    async fn format(&self, entries: &[NormalizedEntry]) -> Result<String, FormatterError> {
        info!("Rendering markdown digest for {} entries", entries.len());
        self.render(entries)
    }
}

/// Delegates the digest to a chat-completion model.
pub struct LlmDigest {
    client: Arc<dyn LlmClient>,
}

impl LlmDigest {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn build_prompt(entries: &[NormalizedEntry]) -> Result<String, FormatterError> {
        let entries_json = serde_json::to_string_pretty(entries)
            .map_err(|e| FormatterError::Serialization(e.to_string()))?;

        Ok(format!(
            "You are an AI news curator specializing in artificial intelligence, machine learning, and LLM news.

Task: Analyze these RSS feed entries and create a comprehensive summary in markdown format.

Requirements:
1. Focus on AI, ML, and LLM-related news only
2. For each relevant article:
   - Highlight key technological advancements
   - Note any significant business or industry implications
   - Identify potential societal impacts
3. Group related stories together
4. Use clear markdown formatting
5. Include a summary section at the top

Format the output as a proper markdown document with:
- A main title with date
- A brief executive summary
- Grouped categories of news
- Individual entries with titles, links, and your analysis
- Clear separation between sections

Here are the feed entries in JSON format:

{}

Please analyze these entries and provide your response in complete markdown format, ready for direct saving to a file.",
            entries_json
        ))
    }
}

#[async_trait]
impl DigestFormatter for LlmDigest {
    fn formatter_name(&self) -> String {
        format!("llm via {}", self.client.client_name())
    }

    async fn format(&self, entries: &[NormalizedEntry]) -> Result<String, FormatterError> {
        info!("Analyzing {} feed entries with {}", entries.len(), self.client.client_name());

        let request = ChatRequest {
            messages: vec![
                ChatMessage::new(ChatRole::System, CURATOR_ROLE),
                ChatMessage::new(ChatRole::User, Self::build_prompt(entries)?),
            ],
            temperature: None,
            max_tokens: None,
        };

        let content = self
            .client
            .complete(request)
            .await
            .map_err(|e| FormatterError::Request(e.to_string()))?;

        if content.trim().is_empty() {
            return Err(FormatterError::EmptyResponse);
        }

        debug!("Summary is {} characters long", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_adapter::LlmError;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn entry(feed_title: &str, title: &str) -> NormalizedEntry {
        NormalizedEntry {
            title: title.to_string(),
            description: format!("{} description", title),
            published: "Fri, 16 Oct 2026 09:00:00 +0000".to_string(),
            link: format!("https://news.example.org/{}", title),
            feed_title: feed_title.to_string(),
            feed_url: format!("https://{}.example.org/rss", feed_title.to_lowercase()),
        }
    }

    struct ScriptedClient {
        reply: Mutex<Option<std::result::Result<String, LlmError>>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn replying(reply: std::result::Result<String, LlmError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        fn client_name(&self) -> String {
            "scripted".to_string()
        }

        async fn complete(&self, request: ChatRequest) -> std::result::Result<String, LlmError> {
            self.requests.lock().unwrap().push(request);
            self.reply.lock().unwrap().take().unwrap_or(Err(LlmError::EmptyMessages))
        }
    }

    #[test]
    fn markdown_groups_entries_by_feed_in_first_seen_order() {
        let at = Local.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
        let entries = vec![entry("Beta", "one"), entry("Alpha", "two"), entry("Beta", "three")];

        let markdown = MarkdownDigest::generated_at(at).render(&entries).unwrap();

        assert!(markdown.starts_with("# AI News Summary\n\nGenerated on: 2026-10-16 08:00:00\n\n"));
        let beta = markdown.find("## Beta").unwrap();
        let alpha = markdown.find("## Alpha").unwrap();
        assert!(beta < alpha);
        assert_eq!(markdown.matches("## Beta").count(), 1);
        assert!(markdown.find("### [three]").unwrap() < alpha);
        assert!(markdown.contains("*Published: Fri, 16 Oct 2026 09:00:00 +0000*"));
        assert_eq!(markdown.matches("---\n").count(), 3);
    }

    #[test]
    fn prompt_embeds_entries_as_json() {
        let prompt = LlmDigest::build_prompt(&[entry("Test Feed", "AI News")]).unwrap();
        assert!(prompt.contains("\"title\": \"AI News\""));
        assert!(prompt.contains("\"feed_title\": \"Test Feed\""));
        assert!(prompt.to_lowercase().contains("markdown format"));
    }

    #[tokio::test]
    async fn llm_digest_returns_model_content() {
        let client = Arc::new(ScriptedClient::replying(Ok(
            "# AI News Summary\n\nTest summary".to_string()
        )));
        let digest = LlmDigest::new(client.clone());

        let markdown = digest.format(&[entry("Test Feed", "AI News")]).await.unwrap();

        assert_eq!(markdown, "# AI News Summary\n\nTest summary");
        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].role, ChatRole::System);
        assert_eq!(requests[0].messages[1].role, ChatRole::User);
    }

    #[tokio::test]
    async fn llm_failures_surface_as_formatter_errors() {
        let failing =
            LlmDigest::new(Arc::new(ScriptedClient::replying(Err(LlmError::EmptyMessages))));
        assert!(matches!(
            failing.format(&[entry("F", "x")]).await,
            Err(FormatterError::Request(_))
        ));

        let blank = LlmDigest::new(Arc::new(ScriptedClient::replying(Ok("   ".to_string()))));
        assert!(matches!(
            blank.format(&[entry("F", "x")]).await,
            Err(FormatterError::EmptyResponse)
        ));
    }
}
