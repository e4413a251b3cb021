//! Language model port.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ApiKey;

/// A text-in, text-out completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &'static str;

    /// Model identifier reported in answers.
    fn model(&self) -> &str;

    /// Generate a completion for an assembled prompt.
    async fn generate(&self, prompt: &str) -> DomainResult<String>;
}

/// Builds a model client for a given credential.
///
/// The LLM key can be supplied per chat session, so the query pipeline holds
/// a factory rather than a single client.
pub trait LanguageModelFactory: Send + Sync {
    fn connect(&self, api_key: &ApiKey) -> DomainResult<Arc<dyn LanguageModel>>;
}
