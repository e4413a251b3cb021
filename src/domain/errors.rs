//! Domain errors for the Docent retrieval pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// External capability that produced a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Embedding,
    VectorIndex,
    Llm,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => write!(f, "embedding"),
            Self::VectorIndex => write!(f, "vector index"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

/// Coarse classification used by callers to choose between retry and abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    SourceRead,
    Provider,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::SourceRead => "source_read",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level errors that can occur in the Docent pipelines.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Failed to read source document {}: {reason}", path.display())]
    SourceRead { path: PathBuf, reason: String },

    #[error("{provider} provider error: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} request timed out after {timeout_secs}s")]
    Timeout {
        provider: ProviderKind,
        timeout_secs: u64,
    },

    #[error("Upsert failed at batch {batch} (chunk ids {first_id} ..= {last_id}): {source}")]
    BatchFailed {
        batch: usize,
        first_id: String,
        last_id: String,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a provider failure.
    pub fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::MissingCredential(_) | Self::DimensionMismatch { .. } => {
                ErrorKind::Configuration
            }
            Self::SourceRead { .. } => ErrorKind::SourceRead,
            Self::Provider { .. }
            | Self::Timeout { .. }
            | Self::BatchFailed { .. }
            | Self::SerializationError(_) => ErrorKind::Provider,
        }
    }

    /// Whether re-running the same operation unchanged may succeed.
    ///
    /// Ingestion ids are deterministic, so a provider failure can always be
    /// retried blindly. Configuration and source errors need operator action.
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Provider)
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            DomainError::MissingCredential("OPENAI_API_KEY".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DomainError::DimensionMismatch {
                expected: 1536,
                actual: 3
            }
            .kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            DomainError::SourceRead {
                path: PathBuf::from("missing.txt"),
                reason: "not found".into()
            }
            .kind(),
            ErrorKind::SourceRead
        );
        assert_eq!(
            DomainError::Timeout {
                provider: ProviderKind::Llm,
                timeout_secs: 60
            }
            .kind(),
            ErrorKind::Provider
        );
    }

    #[test]
    fn test_batch_failed_message_names_range() {
        let err = DomainError::BatchFailed {
            batch: 2,
            first_id: "tos:page:3:offset:0".into(),
            last_id: "tos:page:4:offset:812".into(),
            source: Box::new(DomainError::provider(ProviderKind::VectorIndex, "503")),
        };
        let message = err.to_string();
        assert!(message.contains("batch 2"));
        assert!(message.contains("tos:page:3:offset:0"));
        assert!(message.contains("tos:page:4:offset:812"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_configuration_not_retryable() {
        assert!(!DomainError::Configuration("index.name is not set".into()).is_retryable());
    }
}
