//! Text extraction from raw document bytes

use crate::error::{MatcherError, Result};
use crate::input::file_detector::DocumentKind;
use std::panic::{self, AssertUnwindSafe};

/// Raw document as received from a shell, discarded after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(bytes: impl Into<Vec<u8>>, kind: DocumentKind) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
        }
    }

    pub fn plain_text(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, DocumentKind::PlainText)
    }

    pub fn pdf(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, DocumentKind::Pdf)
    }
}

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed inputs instead of returning an error
        let pages = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| {
            MatcherError::Extraction("PDF parser aborted on malformed document".to_string())
        })?
        .map_err(|e| MatcherError::Extraction(format!("Failed to extract text from PDF: {}", e)))?;

        let page_count = pages.len();
        let text = pages
            .into_iter()
            .filter(|page| !page.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(MatcherError::Extraction(format!(
                "No text could be extracted from PDF ({} page(s), no text layer)",
                page_count
            )));
        }

        log::debug!("Extracted {} characters from {} PDF page(s)", text.len(), page_count);
        Ok(text)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            MatcherError::Extraction(format!(
                "Text is not valid UTF-8 (invalid byte at offset {})",
                e.utf8_error().valid_up_to()
            ))
        })
    }
}

/// Route a document to the extractor for its declared kind.
pub fn extract_text(document: &Document) -> Result<String> {
    match document.kind {
        DocumentKind::Pdf => PdfExtractor.extract(&document.bytes),
        DocumentKind::PlainText => PlainTextExtractor.extract(&document.bytes),
    }
}
