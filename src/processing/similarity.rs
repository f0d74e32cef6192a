//! Cosine similarity and score mapping

use crate::error::{MatcherError, Result};

/// Cosine similarity between two embeddings.
///
/// A zero-magnitude vector has no direction, so the result is `None`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<Option<f32>> {
    if a.len() != b.len() {
        return Err(MatcherError::Model(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Err(MatcherError::Model("Embedding vectors are empty".to_string()));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(None);
    }

    let cosine = dot_product / (norm_a * norm_b);
    if cosine.is_nan() {
        return Err(MatcherError::Model(
            "Cosine similarity is NaN; embeddings contain invalid values".to_string(),
        ));
    }

    Ok(Some(cosine))
}

/// Match score in [0, 1]: `(cosine + 1) / 2`, or 0 when either vector is zero.
pub fn match_score(a: &[f32], b: &[f32]) -> Result<f32> {
    let score = match cosine_similarity(a, b)? {
        Some(cosine) => ((cosine + 1.0) / 2.0).clamp(0.0, 1.0),
        None => {
            log::debug!("Zero-magnitude embedding, scoring as 0");
            0.0
        }
    };
    Ok(score)
}

/// Round to `decimals` places, staying within [0, 1].
pub fn round_score(score: f32, decimals: u32) -> f32 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (f64::from(score) * factor).round() / factor;
    (rounded as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_vectors_score_one() {
        let v = vec![0.3, -1.2, 4.0];
        assert_relative_eq!(match_score(&v, &v).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_opposite_and_orthogonal() {
        assert_relative_eq!(match_score(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0, epsilon = 1e-6);
        assert_relative_eq!(match_score(&[1.0, 0.0], &[0.0, 2.0]).unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), None);
        assert_eq!(match_score(&[0.0, 0.0], &[1.0, 1.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch_is_model_error() {
        let err = match_score(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, MatcherError::Model(_)));
    }

    #[test]
    fn test_empty_vectors_are_model_error() {
        assert!(matches!(match_score(&[], &[]), Err(MatcherError::Model(_))));
    }

    #[test]
    fn test_nan_is_model_error() {
        assert!(matches!(
            match_score(&[f32::NAN, 1.0], &[1.0, 1.0]),
            Err(MatcherError::Model(_))
        ));
    }

    #[test]
    fn test_rounding() {
        assert_relative_eq!(round_score(0.876_54, 2), 0.88);
        assert_relative_eq!(round_score(0.876_54, 0), 1.0);
        assert_relative_eq!(round_score(0.999_999, 2), 1.0);
        assert_eq!(round_score(0.0, 3), 0.0);
    }
}
