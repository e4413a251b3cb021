//! Answer generation.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AnswerResult, Prompt};
use crate::domain::ports::LanguageModel;

/// One language-model call per prompt, no retries
pub struct Generator {
    model: Arc<dyn LanguageModel>,
}

impl Generator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    #[instrument(skip(self, prompt), fields(model = self.model.model(), context = prompt.context.len()))]
    pub async fn generate(&self, prompt: &Prompt) -> DomainResult<AnswerResult> {
        let answer = self.model.generate(&prompt.text).await?;
        Ok(AnswerResult {
            answer,
            context: prompt.context.clone(),
            model: self.model.model().to_string(),
        })
    }
}
