//! AI Pipe chat-completion client
//!
//! Speaks the OpenAI-style `/chat/completions` wire contract with a bearer
//! credential. The provider is known to answer in one of two JSON shapes; the
//! decode tries them in a fixed order and treats anything else as a failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::chat::ChatProvider;

const SYSTEM_PROMPT: &str = "You are a helpful TA for IIT-M's Tools in Data Science course.";

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Known response shapes, tried in declaration order
#[derive(Deserialize)]
#[serde(untagged)]
enum ChatResponse {
    /// Standard `choices[0].message.content` shape
    Choices { choices: Vec<Choice> },
    /// Flat `result` shape some upstreams answer with
    Flat { result: String },
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl ChatResponse {
    fn into_text(self) -> Result<String> {
        match self {
            Self::Choices { choices } => choices
                .into_iter()
                .next()
                .map(|c| c.message.content.trim().to_string())
                .ok_or_else(|| Error::Generation("Response contained no choices".to_string())),
            Self::Flat { result } => Ok(result.trim().to_string()),
        }
    }
}

/// Chat provider backed by the AI Pipe completion API
pub struct AipipeClient {
    client: Client,
    api_key: String,
    config: LlmConfig,
}

impl AipipeClient {
    /// Create a new client, resolving the bearer credential up front so a
    /// missing key fails at startup rather than on the first query
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Generation(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl ChatProvider for AipipeClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Generation(format!("Completion failed: HTTP {}", status)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Failed to read completion body: {}", e)))?;

        let parsed: ChatResponse = serde_json::from_value(body)
            .map_err(|_| Error::Generation("Unexpected completion response format".to_string()))?;

        parsed.into_text()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn name(&self) -> &str {
        "aipipe"
    }
}
