//! CV to job description matching pipeline

use crate::config::Config;
use crate::error::{MatcherError, Result};
use crate::input::{DocumentInput, Side};
use crate::processing::embeddings::EmbeddingEngine;
use crate::processing::gap_analyzer::analyze_gaps;
use crate::processing::similarity::{match_score, round_score};
use crate::processing::skill_matcher::SkillMatcher;
use crate::processing::text_processor::{NormalizedText, TextNormalizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of matching one CV against one job description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Semantic similarity in [0, 1]
    pub match_score: f32,
    /// Required skills found in the CV
    pub matched_skills: Vec<String>,
    /// Required skills absent from the CV
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillListing {
    pub total: usize,
    pub skills: Vec<String>,
}

/// Runs the full pipeline. Shared between requests behind an `Arc`.
pub struct Matcher {
    engine: EmbeddingEngine,
    normalizer: TextNormalizer,
    skills: SkillMatcher,
    score_decimals: u32,
}

impl Matcher {
    /// Matcher using the BERT encoder named in `config`; the model loads on first use.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_engine(config, EmbeddingEngine::from_config(&config.embedding))
    }

    pub fn with_engine(config: &Config, engine: EmbeddingEngine) -> Result<Self> {
        let normalizer = TextNormalizer::new()
            .with_stopword_removal(config.processing.remove_stopwords_for_embedding);
        let skills = SkillMatcher::from_config(&config.skills)?;

        Ok(Self {
            engine,
            normalizer,
            skills,
            score_decimals: config.scoring.decimals,
        })
    }

    pub fn match_documents(&self, cv: DocumentInput, jd: DocumentInput) -> Result<MatchResult> {
        let start = Instant::now();

        let cv_text = cv.into_raw_text(Side::Cv)?;
        let jd_text = jd.into_raw_text(Side::JobDescription)?;
        log::debug!(
            "Raw text: CV {} chars, JD {} chars",
            cv_text.len(),
            jd_text.len()
        );

        let cv_norm = self.normalize(Side::Cv, &cv_text)?;
        let jd_norm = self.normalize(Side::JobDescription, &jd_text)?;

        let cv_vector = self.engine.embed(&cv_norm.embedding)?;
        let jd_vector = self.engine.embed(&jd_norm.embedding)?;
        let score = round_score(match_score(&cv_vector, &jd_vector)?, self.score_decimals);

        let cv_skills = self.skills.extract(&cv_norm.skill_scan);
        let jd_skills = self.skills.extract(&jd_norm.skill_scan);
        let gap = analyze_gaps(&cv_skills, &jd_skills);

        log::info!(
            "Match score {:.2}: {} matched, {} missing ({} CV skills, {} JD skills) in {:.2?}",
            score,
            gap.matched.len(),
            gap.missing.len(),
            cv_skills.len(),
            jd_skills.len(),
            start.elapsed()
        );

        Ok(MatchResult {
            match_score: score,
            matched_skills: gap.matched,
            missing_skills: gap.missing,
        })
    }

    /// Run [`Matcher::match_documents`] on the blocking pool.
    pub async fn match_documents_async(
        self: &Arc<Self>,
        cv: DocumentInput,
        jd: DocumentInput,
    ) -> Result<MatchResult> {
        let matcher = Arc::clone(self);
        tokio::task::spawn_blocking(move || matcher.match_documents(cv, jd))
            .await
            .map_err(|e| MatcherError::Internal(format!("Matching task failed: {}", e)))?
    }

    pub fn list_skills(&self) -> SkillListing {
        SkillListing {
            total: self.skills.skill_count(),
            skills: self.skills.skills().to_vec(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    pub fn warm_up(&self) -> Result<()> {
        self.engine.warm_up()
    }

    pub async fn warm_up_async(self: &Arc<Self>) -> Result<()> {
        let matcher = Arc::clone(self);
        tokio::task::spawn_blocking(move || matcher.warm_up())
            .await
            .map_err(|e| MatcherError::Internal(format!("Warm-up task failed: {}", e)))?
    }

    pub fn model_name(&self) -> Option<&str> {
        self.engine.model_name()
    }

    fn normalize(&self, side: Side, text: &str) -> Result<NormalizedText> {
        let normalized = self.normalizer.normalize(text);
        if normalized.embedding.is_empty() {
            return Err(MatcherError::EmptyInput(format!(
                "The {} has no usable text after normalization",
                side
            )));
        }
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::mock_embedder::MockEmbedder;

    fn mock_matcher() -> Matcher {
        Matcher::with_engine(
            &Config::default(),
            EmbeddingEngine::with_model(Box::new(MockEmbedder::default())),
        )
        .unwrap()
    }

    #[test]
    fn test_basic_match() {
        let matcher = mock_matcher();
        let result = matcher
            .match_documents(
                DocumentInput::text("Python Developer, Django, React, PostgreSQL, 3 years"),
                DocumentInput::text("Python, Django, React or Vue.js, SQL databases, Docker"),
            )
            .unwrap();

        assert!((0.0..=1.0).contains(&result.match_score));
        for skill in ["Python", "Django", "React"] {
            assert!(result.matched_skills.contains(&skill.to_string()));
        }
        assert!(result.missing_skills.contains(&"Docker".to_string()));
        assert!(!result.missing_skills.contains(&"PostgreSQL".to_string()));
    }

    #[test]
    fn test_score_is_rounded() {
        let matcher = mock_matcher();
        let result = matcher
            .match_documents(
                DocumentInput::text("rust tokio axum"),
                DocumentInput::text("rust services with tokio"),
            )
            .unwrap();
        let scaled = result.match_score * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-3);
    }

    #[test]
    fn test_empty_cv_is_input_error() {
        let matcher = mock_matcher();
        let err = matcher
            .match_documents(DocumentInput::text("  "), DocumentInput::text("Python"))
            .unwrap_err();
        assert!(err.kind().is_caller_fault());
    }

    #[test]
    fn test_noise_only_text_is_empty_input() {
        let matcher = mock_matcher();
        let err = matcher
            .match_documents(
                DocumentInput::text("https://example.com"),
                DocumentInput::text("Python"),
            )
            .unwrap_err();
        assert!(matches!(err, MatcherError::EmptyInput(_)));
    }

    #[test]
    fn test_list_skills() {
        let listing = mock_matcher().list_skills();
        assert_eq!(listing.total, listing.skills.len());
        assert_eq!(listing.skills[0], "Python");
    }

    #[tokio::test]
    async fn test_async_match() {
        let matcher = Arc::new(mock_matcher());
        let result = matcher
            .match_documents_async(
                DocumentInput::text("Go and Kubernetes"),
                DocumentInput::text("k8s"),
            )
            .await
            .unwrap();
        assert_eq!(result.matched_skills, vec!["Kubernetes".to_string()]);
        assert!(result.missing_skills.is_empty());
    }
}
