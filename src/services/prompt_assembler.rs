//! Prompt assembly.
//!
//! One fixed template; the question and the retrieved chunk texts are
//! substituted verbatim.

use crate::domain::models::{Prompt, RetrievedContext};

/// Joins chunk texts inside `{context}`
pub const CHUNK_SEPARATOR: &str = "\n\n<|chunk|>\n\n";

const CHUNK_MARKER: &str = "<|chunk|>";
const ESCAPED_MARKER: &str = "<|chunk\u{200b}|>";

/// Substituted when retrieval found nothing
pub const NO_CONTEXT: &str = "(no relevant context was found)";

pub const DEFAULT_TEMPLATE: &str = "You are a customer support agent for the service described by the reference document. \
Answer the question using only the retrieved context below. \
If the context does not contain the answer, say that you don't know. \
Use at most three sentences and keep the answer concise.\n\
Question: {question}\n\
Context: {context}\n\
Answer:";

#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: String,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptAssembler {
    pub fn new() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn assemble(&self, question: &str, context: &RetrievedContext) -> Prompt {
        let rendered = render_context(context);
        // context first so a literal "{question}" inside a chunk stays literal
        let text = self
            .template
            .replacen("{context}", &rendered, 1)
            .replacen("{question}", question, 1);
        Prompt {
            question: question.to_string(),
            context: context.clone(),
            text,
        }
    }
}

/// Join chunk texts with [`CHUNK_SEPARATOR`], never letting chunk text
/// contain the marker itself
pub fn render_context(context: &RetrievedContext) -> String {
    if context.is_empty() {
        return NO_CONTEXT.to_string();
    }
    context
        .texts()
        .map(|text| text.replace(CHUNK_MARKER, ESCAPED_MARKER))
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}
