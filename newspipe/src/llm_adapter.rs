use crate::types::{NewspipeError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct OpenAiClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl OpenAiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the key and optional overrides from the environment.
    /// Fails before any request is made when the key is absent.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(NewspipeError::MissingCredential(API_KEY_VAR))?;

        let mut cfg = Self::new(api_key);
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            cfg.base_url = base;
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            cfg.model = model;
        }
        if let Ok(timeout) = std::env::var("OPENAI_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        Ok(cfg)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    fn as_api_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("chat completion requires at least one message")]
    EmptyMessages,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn client_name(&self) -> String;

    /// Returns the content of the first choice, possibly empty.
    async fn complete(&self, request: ChatRequest) -> std::result::Result<String, LlmError>;
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    cfg: OpenAiClientConfig,
}

impl OpenAiClient {
    pub fn new(cfg: OpenAiClientConfig) -> Result<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(NewspipeError::MissingCredential(API_KEY_VAR));
        }
        let http = Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self { http, cfg })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiClientConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }

    fn build_api_request(&self, req: &ChatRequest) -> ApiChatRequest {
        ApiChatRequest {
            model: self.cfg.model.clone(),
            temperature: req.temperature.unwrap_or(self.cfg.temperature),
            max_tokens: Some(req.max_tokens.unwrap_or(self.cfg.max_tokens)),
            messages: req
                .messages
                .iter()
                .map(|m| ApiChatMessage {
                    role: m.role.as_api_str().to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn client_name(&self) -> String {
        format!("openai ({})", self.cfg.model)
    }

    async fn complete(&self, request: ChatRequest) -> std::result::Result<String, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::EmptyMessages);
        }

        let api_request = self.build_api_request(&request);
        debug!("Sending {} messages to {}", api_request.messages.len(), self.endpoint());

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.cfg.api_key)
            .json(&api_request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(LlmError::Api { status, message });
        }

        let parsed: ApiChatResponse = serde_json::from_slice(&bytes)?;
        let content = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .unwrap_or_default();

        info!("Received {} characters from {}", content.len(), self.client_name());
        Ok(content)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ApiChatRequest {
    model: String,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<ApiChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatResponse {
    choices: Vec<ApiChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChatChoice {
    message: ApiChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}
