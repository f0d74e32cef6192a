//! File type detection

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Declared source type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    PlainText,
    Pdf,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => DocumentKind::Pdf,
            _ => DocumentKind::PlainText,
        }
    }

    /// Uploads are only treated as PDF when the name says so.
    pub fn from_file_name(name: &str) -> Self {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(DocumentKind::PlainText)
    }
}
