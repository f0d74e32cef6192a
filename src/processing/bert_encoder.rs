//! Sentence-transformer encoder on candle's BERT implementation

use crate::config::{DevicePreference, EmbeddingConfig};
use crate::error::{MatcherError, Result};
use crate::processing::embedding_manager::{ModelFiles, WeightsFormat};
use crate::processing::embeddings::EmbeddingModel;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::{PaddingParams, Tokenizer, TruncationDirection, TruncationParams};

pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    hidden_size: usize,
    name: String,
}

impl BertEncoder {
    /// Resolve model files for `config` and build the encoder.
    pub fn load(config: &EmbeddingConfig) -> Result<Self> {
        let files = ModelFiles::resolve(config)?;
        let device = select_device(config.device)?;
        let name = match &config.local_path {
            Some(dir) => dir.display().to_string(),
            None => config.model_id.clone(),
        };
        Self::from_files(&files, config.max_length, device, name)
    }

    pub fn from_files(
        files: &ModelFiles,
        max_length: usize,
        device: Device,
        name: String,
    ) -> Result<Self> {
        let config_contents = std::fs::read_to_string(&files.config)?;
        let bert_config: BertConfig = serde_json::from_str(&config_contents)
            .map_err(|e| MatcherError::Model(format!("Failed to parse model config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| MatcherError::Model(format!("Failed to load tokenizer: {}", e)))?;

        let dtype = DType::F32;
        let vb = match files.format {
            // SAFETY: the weights file is memory-mapped read-only and not modified while loaded
            WeightsFormat::Safetensors => unsafe {
                VarBuilder::from_mmaped_safetensors(&[files.weights.clone()], dtype, &device)?
            },
            WeightsFormat::PyTorch => VarBuilder::from_pth(&files.weights, dtype, &device)?,
        };

        Self::from_parts(&bert_config, tokenizer, vb, max_length, device, name)
    }

    fn from_parts(
        bert_config: &BertConfig,
        mut tokenizer: Tokenizer,
        vb: VarBuilder,
        max_length: usize,
        device: Device,
        name: String,
    ) -> Result<Self> {
        let max_length = max_length.min(bert_config.max_position_embeddings);

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                direction: TruncationDirection::Right,
                ..Default::default()
            }))
            .map_err(|e| MatcherError::Model(format!("Failed to configure truncation: {}", e)))?;
        tokenizer.with_padding(None::<PaddingParams>);

        let model = BertModel::load(vb, bert_config)?;

        log::debug!(
            "BERT encoder: hidden={}, layers={}, max_length={}, device={:?}",
            bert_config.hidden_size,
            bert_config.num_hidden_layers,
            max_length,
            device
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            hidden_size: bert_config.hidden_size,
            name,
        })
    }
}

impl EmbeddingModel for BertEncoder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| MatcherError::Model(format!("Tokenization failed: {}", e)))?;

        let ids = encoding.get_ids();
        let len = ids.len();
        if len == 0 {
            return Err(MatcherError::Model("Tokenizer produced no tokens".to_string()));
        }

        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?
            .to_dtype(DType::F32)?;

        // Mean over real tokens only
        let mask = attention_mask.to_dtype(DType::F32)?;
        let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
        let counts = mask.sum(1)?.unsqueeze(1)?;
        let pooled = summed.broadcast_div(&counts)?.squeeze(0)?;

        Ok(pooled.to_vec1::<f32>()?)
    }

    fn dimension(&self) -> usize {
        self.hidden_size
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pick the compute device for the configured preference.
pub fn select_device(preference: DevicePreference) -> Result<Device> {
    match preference {
        DevicePreference::Cpu => Ok(Device::Cpu),
        DevicePreference::Cuda => cuda_device(),
        DevicePreference::Metal => metal_device(),
        DevicePreference::Auto => {
            if let Ok(device) = cuda_device() {
                log::info!("Using CUDA GPU");
                return Ok(device);
            }
            if let Ok(device) = metal_device() {
                log::info!("Using Metal GPU");
                return Ok(device);
            }
            log::info!("No GPU available, using CPU");
            Ok(Device::Cpu)
        }
    }
}

#[cfg(feature = "cuda")]
fn cuda_device() -> Result<Device> {
    Device::new_cuda(0)
        .map_err(|e| MatcherError::Model(format!("Failed to initialize CUDA: {}", e)))
}

#[cfg(not(feature = "cuda"))]
fn cuda_device() -> Result<Device> {
    Err(MatcherError::Model(
        "CUDA support not compiled in (build with --features cuda)".to_string(),
    ))
}

#[cfg(feature = "metal")]
fn metal_device() -> Result<Device> {
    Device::new_metal(0)
        .map_err(|e| MatcherError::Model(format!("Failed to initialize Metal: {}", e)))
}

#[cfg(not(feature = "metal"))]
fn metal_device() -> Result<Device> {
    Err(MatcherError::Model(
        "Metal support not compiled in (build with --features metal)".to_string(),
    ))
}
