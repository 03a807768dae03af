mod client;
pub(crate) mod types;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{AiError, Result};
use crate::traits::ChatModel;

use client::OpenAiClient;
use types::{ChatRequest, WireMessage};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: u32 = 1024;

/// Hosted endpoints that speak the OpenAI chat-completions wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    pub fn base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_API_URL,
            Provider::Groq => GROQ_API_URL,
        }
    }

    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "groq" => Ok(Provider::Groq),
            other => Err(AiError::Config(format!("Unknown provider: {other}"))),
        }
    }
}

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAi {
    /// A model hosted by `provider`, e.g. Groq's `llama3-8b-8192`.
    pub fn for_provider(
        provider: Provider,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: provider.base_url().to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::new(&self.model)
            .message(WireMessage::user(prompt))
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS)
    }

    /// Single-prompt chat completion, returning the first choice's text.
    pub async fn chat_completion(&self, prompt: &str) -> Result<String> {
        let client = OpenAiClient::new(&self.api_key, &self.base_url, self.timeout)?;
        let response = client.chat(&self.request(prompt)).await?;
        response.text().ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl ChatModel for OpenAi {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat_completion(prompt).await
    }

    fn name(&self) -> &str {
        &self.model
    }
}
