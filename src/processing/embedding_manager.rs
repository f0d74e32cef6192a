//! Locating and downloading encoder model files

use crate::config::EmbeddingConfig;
use crate::error::{MatcherError, Result};
use hf_hub::{Cache, Repo, RepoType};
use serde::Serialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightsFormat {
    Safetensors,
    PyTorch,
}

/// Paths to everything needed to build the encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
    pub format: WeightsFormat,
}

/// Where the configured model comes from and whether it is available offline
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub model_id: String,
    pub revision: String,
    pub source: String,
    pub available: bool,
    pub weights: Option<PathBuf>,
}

impl ModelFiles {
    /// Model files in a local directory
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(MatcherError::Model(format!(
                "Model directory not found: {}",
                dir.display()
            )));
        }

        let require = |name: &str| -> Result<PathBuf> {
            let path = dir.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                Err(MatcherError::Model(format!(
                    "Missing {} in model directory {}",
                    name,
                    dir.display()
                )))
            }
        };

        let config = require(CONFIG_FILE)?;
        let tokenizer = require(TOKENIZER_FILE)?;

        let (weights, format) = if dir.join(SAFETENSORS_FILE).is_file() {
            (dir.join(SAFETENSORS_FILE), WeightsFormat::Safetensors)
        } else if dir.join(PYTORCH_FILE).is_file() {
            (dir.join(PYTORCH_FILE), WeightsFormat::PyTorch)
        } else {
            return Err(MatcherError::Model(format!(
                "No {} or {} in model directory {}",
                SAFETENSORS_FILE,
                PYTORCH_FILE,
                dir.display()
            )));
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
            format,
        })
    }

    /// Resolve model files for the configuration, fetching from the hub if needed.
    ///
    /// Blocking; call from a blocking context.
    pub fn resolve(config: &EmbeddingConfig) -> Result<Self> {
        if let Some(dir) = &config.local_path {
            log::info!("Using local model directory {}", dir.display());
            return Self::from_dir(dir);
        }

        log::info!("Resolving model {}@{}", config.model_id, config.revision);

        let api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| MatcherError::Model(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hub_repo(config));

        let fetch = |name: &str| {
            repo.get(name)
                .map_err(|e| MatcherError::Model(format!("Failed to fetch {}: {}", name, e)))
        };

        let config_path = fetch(CONFIG_FILE)?;
        let tokenizer = fetch(TOKENIZER_FILE)?;
        let (weights, format) = match fetch(SAFETENSORS_FILE) {
            Ok(path) => (path, WeightsFormat::Safetensors),
            Err(e) => {
                log::warn!("{}; falling back to {}", e, PYTORCH_FILE);
                (fetch(PYTORCH_FILE)?, WeightsFormat::PyTorch)
            }
        };

        Ok(Self {
            config: config_path,
            tokenizer,
            weights,
            format,
        })
    }

    /// Files already in the local hub cache, without touching the network
    pub fn cached(config: &EmbeddingConfig) -> Option<Self> {
        if let Some(dir) = &config.local_path {
            return Self::from_dir(dir).ok();
        }

        let cache = Cache::from_env();
        let repo = cache.repo(hub_repo(config));

        let config_path = repo.get(CONFIG_FILE)?;
        let tokenizer = repo.get(TOKENIZER_FILE)?;
        let (weights, format) = match repo.get(SAFETENSORS_FILE) {
            Some(path) => (path, WeightsFormat::Safetensors),
            None => (repo.get(PYTORCH_FILE)?, WeightsFormat::PyTorch),
        };

        Some(Self {
            config: config_path,
            tokenizer,
            weights,
            format,
        })
    }
}

/// Pre-fetch the configured model into the hub cache.
pub async fn download_model(config: &EmbeddingConfig) -> Result<ModelFiles> {
    if let Some(dir) = &config.local_path {
        return ModelFiles::from_dir(dir);
    }

    let api = hf_hub::api::tokio::Api::new()
        .map_err(|e| MatcherError::Model(format!("Failed to initialize HF API: {}", e)))?;
    let repo = api.repo(hub_repo(config));

    let config_path = repo
        .get(CONFIG_FILE)
        .await
        .map_err(|e| MatcherError::Model(format!("Failed to download {}: {}", CONFIG_FILE, e)))?;
    let tokenizer = repo.get(TOKENIZER_FILE).await.map_err(|e| {
        MatcherError::Model(format!("Failed to download {}: {}", TOKENIZER_FILE, e))
    })?;

    let (weights, format) = match repo.get(SAFETENSORS_FILE).await {
        Ok(path) => (path, WeightsFormat::Safetensors),
        Err(e) => {
            log::warn!("{} not available ({}), trying {}", SAFETENSORS_FILE, e, PYTORCH_FILE);
            let path = repo.get(PYTORCH_FILE).await.map_err(|e| {
                MatcherError::Model(format!("Failed to download model weights: {}", e))
            })?;
            (path, WeightsFormat::PyTorch)
        }
    };
    log::info!("Model files cached at {}", weights.display());

    Ok(ModelFiles {
        config: config_path,
        tokenizer,
        weights,
        format,
    })
}

pub fn model_status(config: &EmbeddingConfig) -> ModelStatus {
    let cached = ModelFiles::cached(config);
    let source = match &config.local_path {
        Some(dir) => format!("local:{}", dir.display()),
        None => "huggingface-hub".to_string(),
    };

    ModelStatus {
        model_id: config.model_id.clone(),
        revision: config.revision.clone(),
        source,
        available: cached.is_some(),
        weights: cached.map(|files| files.weights),
    }
}

fn hub_repo(config: &EmbeddingConfig) -> Repo {
    Repo::with_revision(config.model_id.clone(), RepoType::Model, config.revision.clone())
}
