use std::path::{Path, PathBuf};

use gtk::glib;
use pdfium_render::prelude::*;
use thiserror::Error;

use crate::highlight::{HighlightOutcome, OverlayRegistry, TextItem, highlighter};
use crate::services::page_text;

/// Errors raised while loading, rendering, or reading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document stream could not be opened or parsed. Fatal to the
    /// session; no partial state is kept.
    #[error("failed to load document {reference}: {reason}")]
    Load { reference: String, reason: String },

    /// One page failed to rasterize. Local to that page; earlier pages stay
    /// visible.
    #[error("failed to render page {page_number}: {reason}")]
    Render { page_number: u16, reason: String },

    /// A page's text content could not be read during a highlight pass.
    #[error("failed to read text on page {page_number}: {reason}")]
    TextContent { page_number: u16, reason: String },

    /// The reference could not be resolved to a filesystem path.
    #[error("invalid document reference: {reference}")]
    InvalidReference { reference: String },
}

/// Resolve a URI-like document reference to a filesystem path.
///
/// Accepts plain paths as-is and `file://` URIs with percent-encoded
/// reserved characters (spaces, parentheses) the way they arrive from
/// `gio::File` or the command line.
pub fn resolve_reference(reference: &str) -> Result<PathBuf, DocumentError> {
    if reference.starts_with("file://") {
        let (path, _) = glib::filename_from_uri(reference).map_err(|_| {
            DocumentError::InvalidReference {
                reference: reference.to_string(),
            }
        })?;
        Ok(path)
    } else {
        Ok(PathBuf::from(reference))
    }
}

/// Owns the loaded document and all per-document derived state: the page
/// count and the overlay registry. Replaced wholesale when a new document
/// is loaded.
pub struct DocumentSession {
    document: PdfDocument<'static>,
    reference: String,
    source_path: PathBuf,
    page_count: u16,
    registry: OverlayRegistry,
}

impl DocumentSession {
    /// Load the document behind `reference`. On failure nothing is retained.
    pub fn open(pdfium: &'static Pdfium, reference: &str) -> Result<Self, DocumentError> {
        let source_path = resolve_reference(reference)?;

        let document =
            pdfium
                .load_pdf_from_file(&source_path, None)
                .map_err(|err| DocumentError::Load {
                    reference: reference.to_string(),
                    reason: err.to_string(),
                })?;

        let page_count = document.pages().len();

        Ok(Self {
            document,
            reference: reference.to_string(),
            source_path,
            page_count,
            registry: OverlayRegistry::new(),
        })
    }

    pub fn document(&self) -> &PdfDocument<'static> {
        &self.document
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OverlayRegistry {
        &mut self.registry
    }

    /// Retrieve the positioned text runs of a page (1-based), fresh from the
    /// engine.
    pub fn text_items(&self, page_number: u16) -> Result<Vec<TextItem>, DocumentError> {
        let page = self
            .document
            .pages()
            .get(page_number - 1)
            .map_err(|err| DocumentError::TextContent {
                page_number,
                reason: err.to_string(),
            })?;

        page_text::extract_text_items(&page).map_err(|err| DocumentError::TextContent {
            page_number,
            reason: err.to_string(),
        })
    }

    /// Run one highlight pass for `query` over every registered page,
    /// updating the overlay registry in place.
    pub fn highlight(&mut self, query: &str) -> HighlightOutcome {
        let document = &self.document;
        let page_count = self.page_count;

        highlighter::run_highlight_pass(&mut self.registry, page_count, query, |page_number| {
            let page = document
                .pages()
                .get(page_number - 1)
                .map_err(|err| DocumentError::TextContent {
                    page_number,
                    reason: err.to_string(),
                })?;

            page_text::extract_text_items(&page).map_err(|err| DocumentError::TextContent {
                page_number,
                reason: err.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_pass_through() {
        let path = resolve_reference("/reports/q2-interim.pdf").unwrap();
        assert_eq!(path, PathBuf::from("/reports/q2-interim.pdf"));
    }

    #[test]
    fn file_uris_decode_reserved_characters() {
        let path =
            resolve_reference("file:///reports/Q2%202025%20Interim%20Report%20%281%29.pdf").unwrap();
        assert_eq!(path, PathBuf::from("/reports/Q2 2025 Interim Report (1).pdf"));
    }

    #[test]
    fn malformed_file_uris_are_rejected() {
        let err = resolve_reference("file:///reports/broken%").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidReference { .. }));
    }
}
