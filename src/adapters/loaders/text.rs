//! Plain-text document loader.
//!
//! Pages are delimited by the form-feed character, which is what
//! `pdftotext` emits between pages. A file without form feeds is a single
//! page.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Document, Page};
use crate::domain::ports::DocumentLoader;

/// Page separator in extracted text
pub const PAGE_BREAK: char = '\x0c';

#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl TextLoader {
    pub const fn new() -> Self {
        Self
    }

    /// Split extracted text into 1-based pages
    pub fn split_pages(text: &str) -> Vec<Page> {
        let mut pages: Vec<Page> = text
            .split(PAGE_BREAK)
            .enumerate()
            .map(|(i, page)| Page::new(i + 1, page))
            .collect();
        // pdftotext terminates the last page with a form feed too
        if pages.len() > 1 && pages.last().is_some_and(|p| p.text.is_empty()) {
            pages.pop();
        }
        pages
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    async fn load(&self, path: &Path, document_id: &str) -> DomainResult<Document> {
        let source_error = |reason: String| DomainError::SourceRead {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| source_error(e.to_string()))?;
        if !metadata.is_file() {
            return Err(source_error("not a regular file".to_string()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| source_error(e.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| source_error(format!("file is not valid UTF-8: {e}")))?;

        let pages = Self::split_pages(&text);
        debug!(path = %path.display(), pages = pages.len(), "loaded document");
        Ok(Document::new(
            document_id,
            path.display().to_string(),
            pages,
        ))
    }
}
