//! Lazily loaded embedding engine

use crate::config::EmbeddingConfig;
use crate::error::{MatcherError, Result};
use crate::processing::bert_encoder::BertEncoder;
use once_cell::sync::OnceCell;
use std::time::Instant;

/// A sentence encoder producing one fixed-size vector per text.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize;

    fn name(&self) -> &str;
}

type ModelLoader = Box<dyn Fn() -> Result<Box<dyn EmbeddingModel>> + Send + Sync>;

/// Holds the model slot and the loader that fills it.
///
/// The first caller of [`EmbeddingEngine::embed`] or [`EmbeddingEngine::warm_up`]
/// runs the loader; concurrent callers block until it finishes. After a
/// successful load the slot is read without locking. A failed load leaves the
/// slot empty so a later call tries again.
pub struct EmbeddingEngine {
    model: OnceCell<Box<dyn EmbeddingModel>>,
    loader: ModelLoader,
}

impl EmbeddingEngine {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn EmbeddingModel>> + Send + Sync + 'static,
    {
        Self {
            model: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Engine backed by the candle BERT encoder described by `config`
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let config = config.clone();
        Self::new(move || {
            let encoder = BertEncoder::load(&config)?;
            Ok(Box::new(encoder) as Box<dyn EmbeddingModel>)
        })
    }

    /// Engine with an already constructed model
    pub fn with_model(model: Box<dyn EmbeddingModel>) -> Self {
        Self {
            model: OnceCell::with_value(model),
            loader: Box::new(|| {
                Err(MatcherError::Model("Preloaded model slot is empty".to_string()))
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    /// Load the model now instead of on the first request.
    pub fn warm_up(&self) -> Result<()> {
        self.model().map(|_| ())
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(MatcherError::EmptyInput(
                "Cannot embed empty text".to_string(),
            ));
        }

        let model = self.model()?;
        let vector = model.embed(text)?;

        if vector.len() != model.dimension() {
            return Err(MatcherError::Model(format!(
                "Model '{}' returned {} values, expected {}",
                model.name(),
                vector.len(),
                model.dimension()
            )));
        }

        Ok(vector)
    }

    /// Model name, if loaded
    pub fn model_name(&self) -> Option<&str> {
        self.model.get().map(|model| model.name())
    }

    fn model(&self) -> Result<&dyn EmbeddingModel> {
        let model = self.model.get_or_try_init(|| {
            log::info!("Loading embedding model");
            let start = Instant::now();
            let model = (self.loader)().map_err(|e| {
                log::error!("Embedding model failed to load: {}", e);
                match e {
                    MatcherError::Model(_) => e,
                    other => MatcherError::Model(format!("Failed to load model: {}", other)),
                }
            })?;
            log::info!(
                "Loaded embedding model '{}' ({} dims) in {:.2?}",
                model.name(),
                model.dimension(),
                start.elapsed()
            );
            Ok::<_, MatcherError>(model)
        })?;
        Ok(model.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::mock_embedder::MockEmbedder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_lazy_load() {
        let engine = EmbeddingEngine::new(|| {
            Ok(Box::new(MockEmbedder::new(16)) as Box<dyn EmbeddingModel>)
        });
        assert!(!engine.is_ready());

        let vector = engine.embed("rust developer").unwrap();
        assert_eq!(vector.len(), 16);
        assert!(engine.is_ready());
        assert_eq!(engine.model_name(), Some("mock-embedder"));
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let engine = EmbeddingEngine::with_model(Box::new(MockEmbedder::new(8)));
        let err = engine.embed("   ").unwrap_err();
        assert!(matches!(err, MatcherError::EmptyInput(_)));
    }

    #[test]
    fn test_concurrent_first_calls_load_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let engine = Arc::new(EmbeddingEngine::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            Ok(Box::new(MockEmbedder::new(8)) as Box<dyn EmbeddingModel>)
        }));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || engine.embed(&format!("request {}", i)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let engine = EmbeddingEngine::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(MatcherError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "weights missing",
                )))
            } else {
                Ok(Box::new(MockEmbedder::new(8)) as Box<dyn EmbeddingModel>)
            }
        });

        let err = engine.warm_up().unwrap_err();
        assert!(matches!(err, MatcherError::Model(_)));
        assert!(!engine.is_ready());

        engine.warm_up().unwrap();
        assert!(engine.is_ready());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    struct FailingOnKeyword;

    impl EmbeddingModel for FailingOnKeyword {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains("boom") {
                Err(MatcherError::Model("inference failed".to_string()))
            } else {
                Ok(vec![1.0, 0.0])
            }
        }

        fn dimension(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "failing-on-keyword"
        }
    }

    #[test]
    fn test_model_survives_inference_error() {
        let engine = EmbeddingEngine::with_model(Box::new(FailingOnKeyword));
        assert!(engine.embed("boom").is_err());
        assert!(engine.is_ready());
        assert_eq!(engine.embed("fine").unwrap(), vec![1.0, 0.0]);
    }
}
