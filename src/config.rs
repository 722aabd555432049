// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Lancedb,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uri: String,
    pub table_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Http,
    Hashing,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: Option<u64>,
    pub prompt_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub scanned_page_threshold: usize,
    pub max_file_size_mb: usize,
    pub skip_patterns: Vec<String>,
    pub pdfium_library_dir: Option<PathBuf>,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrStrategy {
    /// Grayscale, contrast boost, unsharp mask and median denoise before recognition.
    Enhanced,
    /// The raw page render.
    Plain,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OcrConfig {
    pub enabled: bool,
    pub binary: String,
    pub languages: String,
    pub render_scale: f32,
    pub engine_mode: u8,
    pub page_segmentation_mode: u8,
    pub strategies: Vec<OcrStrategy>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub k: usize,
    pub fetch_k: usize,
    pub diversity_weight: f32,
    pub min_relevance: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub min_shared_tokens: usize,
    pub history_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Lancedb,
            uri: "data/lancedb".to_string(),
            table_name: "pdf_qa".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Http,
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "paraphrase-multilingual".to_string(),
            dimension: 768,
            batch_size: 32,
            timeout_secs: None,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/v1".to_string(),
            api_key: None,
            model: "llama-3.2-3b-instruct".to_string(),
            temperature: 0.1,
            max_tokens: 512,
            timeout_secs: None,
            prompt_path: None,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
            scanned_page_threshold: 50,
            max_file_size_mb: 100,
            skip_patterns: vec![".git/*".to_string(), "*.part".to_string()],
            pdfium_library_dir: None,
            show_progress: false,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "tesseract".to_string(),
            languages: "hin+eng".to_string(),
            render_scale: 3.0,
            engine_mode: 3,
            page_segmentation_mode: 6,
            strategies: vec![OcrStrategy::Enhanced, OcrStrategy::Plain],
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 10,
            fetch_k: 30,
            diversity_weight: 0.5,
            min_relevance: 0.4,
        }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            min_shared_tokens: 2,
            history_path: PathBuf::from("data/chat_history.json"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    /// Layers built-in defaults, the TOML file and `PDF_QA__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PDF_QA")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            ingest: IngestConfig::default(),
            ocr: OcrConfig::default(),
            retrieval: RetrievalConfig::default(),
            answer: AnswerConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ingest.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(PipelineError::Config(
                "chunk_overlap must be smaller than chunk_size".to_string(),
            ));
        }

        if self.retrieval.k == 0 {
            return Err(PipelineError::Config("k must be greater than 0".to_string()));
        }

        if self.retrieval.fetch_k < self.retrieval.k {
            return Err(PipelineError::Config(
                "fetch_k must be at least k".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.diversity_weight) {
            return Err(PipelineError::Config(
                "diversity_weight must be within [0, 1]".to_string(),
            ));
        }

        if self.ocr.render_scale <= 0.0 {
            return Err(PipelineError::Config(
                "render_scale must be positive".to_string(),
            ));
        }

        if self.embedding.dimension == 0 || self.embedding.batch_size == 0 {
            return Err(PipelineError::Config(
                "embedding dimension and batch_size must be greater than 0".to_string(),
            ));
        }

        if self.embedding.provider == EmbeddingProvider::Http {
            Validator::validate_url(&self.embedding.base_url)
                .map_err(|e| PipelineError::Config(format!("embedding.base_url: {}", e)))?;
        }
        Validator::validate_url(&self.generation.base_url)
            .map_err(|e| PipelineError::Config(format!("generation.base_url: {}", e)))?;

        Ok(())
    }
}
