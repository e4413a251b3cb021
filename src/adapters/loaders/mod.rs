//! Document loaders.

pub mod pdf;
pub mod text;

use std::path::Path;

use crate::domain::ports::DocumentLoader;

pub use pdf::PdfLoader;
pub use text::TextLoader;

/// Pick a loader from the file extension; anything but `.pdf` is read as text
pub fn loader_for(path: &Path) -> Box<dyn DocumentLoader> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        Box::new(PdfLoader::new())
    } else {
        Box::new(TextLoader::new())
    }
}
