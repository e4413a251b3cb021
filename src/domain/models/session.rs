//! Conversation session owned by the presentation layer.
//!
//! The query pipeline never stores conversations itself. Callers create a
//! [`ChatSession`] per user (or per terminal) and pass it into every
//! `answer` call, so independent sessions can be served concurrently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::ApiKey;

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One visible message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Explicit per-conversation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,

    #[serde(skip)]
    llm_api_key: Option<ApiKey>,

    turns: Vec<Turn>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            llm_api_key: None,
            turns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<ApiKey>) -> Self {
        self.llm_api_key = key;
        self
    }

    pub fn set_api_key(&mut self, key: ApiKey) {
        self.llm_api_key = Some(key);
    }

    pub const fn api_key(&self) -> Option<&ApiKey> {
        self.llm_api_key.as_ref()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Append a completed exchange.
    ///
    /// Both turns are pushed together so a failed exchange never leaves a
    /// dangling user turn in the transcript.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        let now = Utc::now();
        self.turns.push(Turn {
            role: Role::User,
            content: question.to_string(),
            created_at: now,
        });
        self.turns.push(Turn {
            role: Role::Assistant,
            content: answer.to_string(),
            created_at: now,
        });
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_exchange_appends_pair() {
        let mut session = ChatSession::new();
        session.record_exchange("What is the minimum age?", "13.");

        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "13.");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let session = ChatSession::new().with_api_key(ApiKey::new("sk-secret"));
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(session.api_key().is_some());
    }
}
