//! Input handling module

pub mod file_detector;
pub mod source;
pub mod text_extractor;

pub use file_detector::DocumentKind;
pub use source::{DocumentInput, Side};
pub use text_extractor::{extract_text, Document};
