//! Document source port.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Document;

/// Extracts page-delimited text from a source file.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load `path` as a document with the given id.
    ///
    /// Fails with `SourceRead` when the file is missing or unreadable.
    async fn load(&self, path: &Path, document_id: &str) -> DomainResult<Document>;
}
