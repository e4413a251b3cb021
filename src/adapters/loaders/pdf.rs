//! PDF document loader.
//!
//! Each PDF page becomes one [`Page`], numbered as in the file. Pages with
//! no extractable text (scans, figures) come through blank and are skipped
//! by the chunker.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Document, Page};
use crate::domain::ports::DocumentLoader;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl PdfLoader {
    pub const fn new() -> Self {
        Self
    }

    fn extract_pages(path: &Path) -> Result<Vec<Page>, String> {
        let pdf = lopdf::Document::load(path).map_err(|e| format!("not a readable PDF: {e}"))?;
        if pdf.is_encrypted() {
            return Err("encrypted PDFs are not supported".to_string());
        }

        let pages = pdf
            .get_pages()
            .into_keys()
            .map(|number| {
                let text = pdf.extract_text(&[number]).unwrap_or_else(|e| {
                    warn!(page = number, error = %e, "no text extracted from page");
                    String::new()
                });
                Page::new(number as usize, text)
            })
            .collect();
        Ok(pages)
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
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

        // lopdf parses synchronously
        let owned: PathBuf = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || Self::extract_pages(&owned))
            .await
            .map_err(|e| source_error(format!("PDF extraction aborted: {e}")))?
            .map_err(source_error)?;

        debug!(path = %path.display(), pages = pages.len(), "loaded PDF");
        Ok(Document::new(
            document_id,
            path.display().to_string(),
            pages,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Write a PDF with one Courier text line per page
    fn write_pdf(path: &Path, lines: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_one_page_per_pdf_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tos.pdf");
        write_pdf(
            &path,
            &[
                "Terms of service",
                "Users must be 13 years or older to use the service.",
            ],
        );

        let document = PdfLoader::new().load(&path, "tos").await.unwrap();

        assert_eq!(document.id, "tos");
        assert_eq!(document.page_count(), 2);
        assert_eq!(document.pages[0].number, 1);
        assert_eq!(document.pages[1].number, 2);
        assert!(document.pages[0].text.contains("Terms of service"));
        assert!(document.pages[1].text.contains("13 years or older"));
    }

    #[tokio::test]
    async fn test_non_pdf_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.pdf");
        std::fs::write(&path, "plain text, not a PDF").unwrap();

        let err = PdfLoader::new().load(&path, "notes").await.unwrap_err();
        assert!(matches!(err, DomainError::SourceRead { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_source_error() {
        let err = PdfLoader::new()
            .load(Path::new("/nonexistent/tos.pdf"), "tos")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::SourceRead { .. }));
    }
}
