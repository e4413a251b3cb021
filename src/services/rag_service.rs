//! Query pipeline: QueryEmbedder -> Retriever -> PromptAssembler -> Generator.
//!
//! The pipeline holds only shared, immutable collaborators. Conversation
//! state lives in the caller's [`ChatSession`], so one pipeline can serve
//! many sessions at once.

use std::sync::Arc;

use tracing::{info, instrument};

use super::embedder::Embedder;
use super::generator::Generator;
use super::prompt_assembler::PromptAssembler;
use super::retriever::Retriever;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AnswerResult, ApiKey, ChatSession, IndexCoordinate, RetrievedContext};
use crate::domain::ports::LanguageModelFactory;

pub struct QueryPipeline {
    embedder: Arc<Embedder>,
    retriever: Retriever,
    assembler: PromptAssembler,
    models: Arc<dyn LanguageModelFactory>,
    fallback_key: Option<ApiKey>,
    top_k: usize,
}

impl QueryPipeline {
    pub fn new(
        embedder: Arc<Embedder>,
        retriever: Retriever,
        models: Arc<dyn LanguageModelFactory>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            retriever,
            assembler: PromptAssembler::new(),
            models,
            fallback_key: None,
            top_k,
        }
    }

    /// Key used when a session carries none of its own
    #[must_use]
    pub fn with_fallback_key(mut self, key: Option<ApiKey>) -> Self {
        self.fallback_key = key;
        self
    }

    #[must_use]
    pub fn with_assembler(mut self, assembler: PromptAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub const fn coordinate(&self) -> &IndexCoordinate {
        self.retriever.coordinate()
    }

    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Whether `session` could be answered without asking for a key
    pub const fn has_credential(&self, session: &ChatSession) -> bool {
        session.api_key().is_some() || self.fallback_key.is_some()
    }

    /// Embed the question and fetch the top-k chunks
    #[instrument(skip(self, question))]
    pub async fn search(&self, question: &str) -> DomainResult<RetrievedContext> {
        let vector = self.embedder.embed(question).await?;
        self.retriever.retrieve(&vector, self.top_k).await
    }

    /// Answer one question within `session`.
    ///
    /// The LLM credential is checked before any provider is called. The
    /// session gains the exchange only when an answer was produced.
    #[instrument(skip(self, session, question), fields(session_id = %session.id))]
    pub async fn answer(
        &self,
        session: &mut ChatSession,
        question: &str,
    ) -> DomainResult<AnswerResult> {
        let key = session
            .api_key()
            .or(self.fallback_key.as_ref())
            .ok_or_else(|| {
                DomainError::MissingCredential(
                    "LLM API key not provided. Enter one for this session or set OPENAI_API_KEY"
                        .to_string(),
                )
            })?;
        let model = self.models.connect(key)?;

        let context = self.search(question).await?;
        let prompt = self.assembler.assemble(question, &context);
        let result = Generator::new(model).generate(&prompt).await?;

        info!(
            retrieved = result.context.len(),
            model = %result.model,
            "answer generated"
        );
        session.record_exchange(question, &result.answer);
        Ok(result)
    }
}
