//! Configuration management for the CV matcher

use crate::error::{MatcherError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `embedding.device`.
pub const DEVICE_ENV_VAR: &str = "CV_MATCHER_DEVICE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub processing: ProcessingConfig,
    pub scoring: ScoringConfig,
    pub skills: SkillsConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Hugging Face repo id of a BERT-architecture encoder
    pub model_id: String,
    pub revision: String,
    /// Directory with config.json, tokenizer.json and weights; skips the hub when set
    pub local_path: Option<PathBuf>,
    /// Maximum number of subword tokens fed to the encoder
    pub max_length: usize,
    pub device: DevicePreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    Cpu,
    Cuda,
    Metal,
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub remove_stopwords_for_embedding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Decimal places kept in the reported match score
    pub decimals: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Extra canonical skills appended after the built-in vocabulary
    pub additional_skills: Vec<String>,
    /// alias -> canonical skill name
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            revision: "main".to_string(),
            local_path: None,
            max_length: 512,
            device: DevicePreference::Cpu,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            remove_stopwords_for_embedding: false,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            color_output: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig::default(),
            processing: ProcessingConfig::default(),
            scoring: ScoringConfig::default(),
            skills: SkillsConfig::default(),
            server: ServerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl DevicePreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "cpu" => Some(DevicePreference::Cpu),
            "cuda" => Some(DevicePreference::Cuda),
            "metal" => Some(DevicePreference::Metal),
            "auto" => Some(DevicePreference::Auto),
            _ => None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                MatcherError::Configuration(format!(
                    "Failed to parse config '{}': {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            MatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-matcher")
            .join("config.toml")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(DEVICE_ENV_VAR) {
            match DevicePreference::parse(&value) {
                Some(device) => self.embedding.device = device,
                None => log::warn!(
                    "Ignoring unknown {} value '{}' (expected cpu, cuda, metal or auto)",
                    DEVICE_ENV_VAR,
                    value
                ),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding.model_id.trim().is_empty() && self.embedding.local_path.is_none() {
            return Err(MatcherError::Configuration(
                "embedding.model_id must be set when embedding.local_path is not".to_string(),
            ));
        }
        if self.embedding.max_length < 2 {
            return Err(MatcherError::Configuration(format!(
                "embedding.max_length must be at least 2, got {}",
                self.embedding.max_length
            )));
        }
        if self.scoring.decimals > 6 {
            return Err(MatcherError::Configuration(format!(
                "scoring.decimals must be between 0 and 6, got {}",
                self.scoring.decimals
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.scoring.decimals, 2);
        assert!(!config.processing.remove_stopwords_for_embedding);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.skills.additional_skills.push("Elixir".to_string());
        config.skills.aliases.insert("ex".to_string(), "Elixir".to_string());
        config.server.port = 9100;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.skills.additional_skills, vec!["Elixir".to_string()]);
        assert_eq!(loaded.skills.aliases.get("ex").map(String::as_str), Some("Elixir"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.embedding.max_length, 512);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[scoring]\ndecimals = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.scoring.decimals, 3);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[scoring\ndecimals = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, MatcherError::Configuration(_)));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.scoring.decimals = 12;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.embedding.max_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_device_parse() {
        assert_eq!(DevicePreference::parse("CUDA"), Some(DevicePreference::Cuda));
        assert_eq!(DevicePreference::parse(" cpu "), Some(DevicePreference::Cpu));
        assert_eq!(DevicePreference::parse("tpu"), None);
    }
}
