//! OpenAI chat completions adapter.
//!
//! Sends the assembled prompt as a single user message to
//! `/v1/chat/completions`. Works with any OpenAI-compatible server.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::adapters::http;
use crate::domain::errors::{DomainError, DomainResult, ProviderKind};
use crate::domain::models::{ApiKey, LlmConfig};
use crate::domain::ports::{LanguageModel, LanguageModelFactory};

const PROVIDER: ProviderKind = ProviderKind::Llm;

/// Settings shared by every client the factory builds
#[derive(Debug, Clone)]
pub struct OpenAiChatSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl From<&LlmConfig> for OpenAiChatSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Chat completions client bound to one API key
pub struct OpenAiChatModel {
    settings: OpenAiChatSettings,
    api_key: ApiKey,
    client: Client,
}

impl OpenAiChatModel {
    pub fn new(settings: OpenAiChatSettings, api_key: ApiKey) -> DomainResult<Self> {
        let client = http::build_client(PROVIDER, settings.timeout_secs)?;
        Ok(Self {
            settings,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.settings.model, prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> DomainResult<String> {
        let body = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| http::send_error(PROVIDER, self.settings.timeout_secs, &e))?;

        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, "Chat completions API", response).await);
        }

        let parsed: ChatResponse = http::decode(PROVIDER, "chat completion", response).await?;
        let answer = parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| DomainError::provider(PROVIDER, "completion contained no text"))?;

        debug!(answer_chars = answer.len(), "completion received");
        Ok(answer)
    }
}

/// Builds [`OpenAiChatModel`] clients per API key
#[derive(Debug, Clone)]
pub struct OpenAiChatFactory {
    settings: OpenAiChatSettings,
}

impl OpenAiChatFactory {
    pub const fn new(settings: OpenAiChatSettings) -> Self {
        Self { settings }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

impl LanguageModelFactory for OpenAiChatFactory {
    fn connect(&self, api_key: &ApiKey) -> DomainResult<Arc<dyn LanguageModel>> {
        Ok(Arc::new(OpenAiChatModel::new(
            self.settings.clone(),
            api_key.clone(),
        )?))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
