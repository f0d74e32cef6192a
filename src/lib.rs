//! Semantic CV to job description matching
//!
//! The pipeline extracts text from both documents, normalizes it, scores the
//! pair with a sentence encoder and reports which required skills the CV
//! covers. [`processing::Matcher`] is the entry point; the CLI and the HTTP
//! API in [`server`] are thin shells around it.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;
pub mod server;

pub use config::Config;
pub use error::{ErrorKind, MatcherError, Result};
pub use input::{Document, DocumentInput, DocumentKind, Side};
pub use processing::{MatchResult, Matcher, SkillListing};
