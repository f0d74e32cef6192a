//! Text processing and matching module

pub mod bert_encoder;
pub mod embedding_manager;
pub mod embeddings;
pub mod gap_analyzer;
pub mod matcher;
pub mod mock_embedder;
pub mod similarity;
pub mod skill_matcher;
pub mod text_processor;

pub use embeddings::{EmbeddingEngine, EmbeddingModel};
pub use matcher::{MatchResult, Matcher, SkillListing};
