//! Query-side values passed between pipeline stages.

use serde::{Deserialize, Serialize};

use super::record::RetrievedContext;

/// An assembled prompt together with the values it was built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// The user question, verbatim
    pub question: String,

    /// Context substituted into the template
    pub context: RetrievedContext,

    /// Final text sent to the language model
    pub text: String,
}

/// The generated answer and the context that grounded it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub context: RetrievedContext,
    /// Model that produced the answer
    pub model: String,
}

impl AnswerResult {
    /// True when no chunk was available to ground the answer
    pub fn is_ungrounded(&self) -> bool {
        self.context.is_empty()
    }
}
