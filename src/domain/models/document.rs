//! Source document models
//!
//! A document is the loader's output: one source file split into pages.
//! It exists only for the duration of an ingestion run.

use serde::{Deserialize, Serialize};

/// One page of raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number within the source file
    pub number: usize,

    /// Raw page text as extracted by the loader
    pub text: String,
}

impl Page {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Returns true if the page carries no indexable text
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A loaded source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier used as the prefix of every chunk id
    pub id: String,

    /// Human-readable origin (usually the file path)
    pub source: String,

    /// Pages in reading order
    pub pages: Vec<Page>,
}

impl Document {
    pub fn new(id: impl Into<String>, source: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            pages,
        }
    }

    /// Build a single-page document, mostly for tests and ad-hoc ingestion
    pub fn single_page(id: impl Into<String>, source: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, source, vec![Page::new(1, text)])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total characters across all pages
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Derive a document id from a file name.
///
/// Keeps ASCII alphanumerics plus `-` and `_`, lowercases, and collapses
/// everything else to `-`, so the id is stable across runs and safe to embed
/// in index record ids.
pub fn document_id_from_stem(stem: &str) -> String {
    let mut id = String::with_capacity(stem.len());
    let mut last_dash = false;
    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            id.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !id.is_empty() {
            id.push('-');
            last_dash = true;
        }
    }
    while id.ends_with('-') {
        id.pop();
    }
    if id.is_empty() {
        "document".to_string()
    } else {
        id
    }
}
