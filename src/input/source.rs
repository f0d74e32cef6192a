//! Per-side request input: an uploaded file or inline text.
//!
//! Shells collect an optional file and an optional text for each side and
//! call [`DocumentInput::resolve`]. When both are present the **file wins**
//! and the text is discarded with a warning; this is the only precedence
//! rule and every shell goes through it.

use crate::error::{MatcherError, Result};
use crate::input::text_extractor::{extract_text, Document};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Cv,
    JobDescription,
}

impl Side {
    /// Field prefix used by the HTTP and CLI shells.
    pub fn field_prefix(self) -> &'static str {
        match self {
            Side::Cv => "cv",
            Side::JobDescription => "jd",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Cv => write!(f, "CV"),
            Side::JobDescription => write!(f, "job description"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    File(Document),
    Text(String),
}

impl DocumentInput {
    pub fn text(text: impl Into<String>) -> Self {
        DocumentInput::Text(text.into())
    }

    pub fn file(document: Document) -> Self {
        DocumentInput::File(document)
    }

    /// Collapse an optional file and optional text into one input.
    ///
    /// Empty text counts as absent. Missing both is an input error.
    pub fn resolve(side: Side, file: Option<Document>, text: Option<String>) -> Result<Self> {
        let text = text.filter(|t| !t.is_empty());

        match (file, text) {
            (Some(document), Some(_)) => {
                log::warn!(
                    "Both {prefix}_file and {prefix}_text supplied for the {side}; using the file",
                    prefix = side.field_prefix(),
                    side = side
                );
                Ok(DocumentInput::File(document))
            }
            (Some(document), None) => Ok(DocumentInput::File(document)),
            (None, Some(text)) => Ok(DocumentInput::Text(text)),
            (None, None) => Err(MatcherError::InvalidInput(format!(
                "Either {prefix}_file or {prefix}_text must be provided",
                prefix = side.field_prefix()
            ))),
        }
    }

    /// Produce the raw text for this side, rejecting blank content.
    pub fn into_raw_text(self, side: Side) -> Result<String> {
        let text = match self {
            DocumentInput::File(document) => extract_text(&document)?,
            DocumentInput::Text(text) => text,
        };

        if text.trim().is_empty() {
            return Err(MatcherError::InvalidInput(format!("The {} text is empty", side)));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_wins_over_text() {
        let doc = Document::plain_text(b"from file".to_vec());
        let input =
            DocumentInput::resolve(Side::Cv, Some(doc.clone()), Some("from text".to_string()))
                .unwrap();
        assert_eq!(input, DocumentInput::File(doc));
    }

    #[test]
    fn test_text_only() {
        let input =
            DocumentInput::resolve(Side::JobDescription, None, Some("Rust".into())).unwrap();
        assert_eq!(input, DocumentInput::Text("Rust".to_string()));
    }

    #[test]
    fn test_neither_is_input_error() {
        let err = DocumentInput::resolve(Side::Cv, None, None).unwrap_err();
        assert!(matches!(err, MatcherError::InvalidInput(_)));
        assert!(err.to_string().contains("cv_file or cv_text"));
    }

    #[test]
    fn test_empty_text_counts_as_absent() {
        let err =
            DocumentInput::resolve(Side::JobDescription, None, Some(String::new())).unwrap_err();
        assert!(err.to_string().contains("jd_file or jd_text"));
    }

    #[test]
    fn test_blank_text_rejected_on_extraction() {
        let err = DocumentInput::text("   \n\t").into_raw_text(Side::Cv).unwrap_err();
        assert!(matches!(err, MatcherError::InvalidInput(_)));
        assert!(err.to_string().contains("CV"));
    }

    #[test]
    fn test_file_is_extracted() {
        let input = DocumentInput::file(Document::plain_text(b"Kubernetes".to_vec()));
        assert_eq!(input.into_raw_text(Side::Cv).unwrap(), "Kubernetes");
    }
}
