//! Configuration management for the grounded service.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults (OpenAI models, Milvus on localhost, 1000/200 chunking)
//! - A YAML config file (`grounded.yaml` or the path in `GROUNDED_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Later sources win. The backend and models chosen here are fixed for the
//! lifetime of the process; nothing switches them per call.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "grounded.yaml";

const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["openai", "ollama", "mock"];
const KNOWN_LLM_PROVIDERS: [&str; 2] = ["openai", "ollama"];
const KNOWN_LANGUAGES: [&str; 2] = ["ko", "en"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config file this configuration was read from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// OpenAI API key (from `OPENAI_API_KEY`, never read from the YAML file)
    #[serde(skip)]
    pub openai_api_key: Option<String>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    #[serde(rename = "vectorStore")]
    pub vector_store: VectorStoreSettings,
    pub chunking: ChunkingSettings,
    pub prompt: PromptSettings,
    pub logging: LoggingSettings,
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "openai", "ollama", "mock"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions; fixes the collection schema
    pub dimensions: usize,

    /// Custom endpoint (OpenAI-compatible base URL or Ollama URL)
    pub endpoint: Option<String>,

    /// Maximum texts per embedding request
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
            batch_size: 100,
        }
    }
}

/// Language model provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Provider name: "openai", "ollama"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,

    /// Custom endpoint
    pub endpoint: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            max_tokens: None,
            endpoint: None,
        }
    }
}

/// Vector store backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct VectorStoreSettings {
    /// Backend: "milvus", "qdrant", "memory"
    pub backend: String,

    pub host: String,

    /// Backend port; unset means the backend's own default
    /// (19530 for Milvus, 6334 for the Qdrant gRPC API)
    pub port: Option<u16>,

    /// Collection holding every chunk of every document
    pub collection: String,

    /// Distance metric: "l2", "cosine", "ip"
    pub distance: String,

    /// Environment variable holding the backend access token, if any
    pub token_env: Option<String>,

    /// ANN index parameters (cluster backend only)
    pub index: IndexSettings,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            backend: "milvus".to_string(),
            host: "localhost".to_string(),
            port: None,
            collection: "rag_documents".to_string(),
            distance: "l2".to_string(),
            token_env: None,
            index: IndexSettings::default(),
        }
    }
}

/// Approximate nearest-neighbor index parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexSettings {
    /// "IVF_FLAT" or "HNSW"
    pub index_type: String,

    /// IVF cluster count
    pub nlist: u32,

    /// IVF clusters probed per search
    pub nprobe: u32,

    /// HNSW graph degree
    pub m: u32,

    /// HNSW build-time candidate list size
    pub ef_construction: u32,

    /// HNSW search-time candidate list size
    pub ef: u32,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            index_type: "IVF_FLAT".to_string(),
            nlist: 1024,
            nprobe: 16,
            m: 16,
            ef_construction: 200,
            ef: 64,
        }
    }
}

/// Document chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Grounding prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptSettings {
    /// Built-in template language: "ko" or "en"
    pub language: String,

    /// Custom YAML prompt definition, replacing the built-in template
    pub template_file: Option<PathBuf>,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            language: "ko".to_string(),
            template_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub color: bool,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: None,
            color: true,
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            openai_api_key: None,
            verbose: false,
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            vector_store: VectorStoreSettings::default(),
            chunking: ChunkingSettings::default(),
            prompt: PromptSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and the process environment.
    ///
    /// Environment variables:
    /// - `GROUNDED_CONFIG`: Path to config file
    /// - `OPENAI_API_KEY`: OpenAI credential
    /// - `GROUNDED_VECTOR_BACKEND`, `GROUNDED_STORE_HOST`, `GROUNDED_STORE_PORT`,
    ///   `GROUNDED_COLLECTION`: vector store selection
    /// - `GROUNDED_EMBEDDING_PROVIDER`, `GROUNDED_EMBEDDING_MODEL`: embeddings
    /// - `GROUNDED_LLM_PROVIDER`, `GROUNDED_LLM_MODEL`, `GROUNDED_LLM_TEMPERATURE`: generation
    /// - `GROUNDED_PROMPT_LANGUAGE`: built-in template language
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use grounded_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Backend: {}", config.vector_store.backend);
    /// ```
    pub fn load() -> AppResult<Self> {
        let explicit = std::env::var("GROUNDED_CONFIG").ok().map(PathBuf::from);
        Self::load_from(explicit)
    }

    /// Load configuration, reading `config_file` (or `grounded.yaml` if present).
    ///
    /// An explicitly named file that does not exist is an error; the default
    /// file is optional.
    pub fn load_from(config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_yaml_file(&path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_yaml_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a YAML config file; missing sections keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.config_file = Some(path.to_path_buf());

        tracing::debug!("Loaded config file {:?}", path);
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }

        if let Some(backend) = lookup("GROUNDED_VECTOR_BACKEND") {
            self.vector_store.backend = backend;
        }
        if let Some(host) = lookup("GROUNDED_STORE_HOST") {
            self.vector_store.host = host;
        }
        if let Some(port) = lookup("GROUNDED_STORE_PORT") {
            self.vector_store.port = Some(port.parse().map_err(|_| {
                AppError::Config(format!("GROUNDED_STORE_PORT is not a port: {}", port))
            })?);
        }
        if let Some(collection) = lookup("GROUNDED_COLLECTION") {
            self.vector_store.collection = collection;
        }

        if let Some(provider) = lookup("GROUNDED_EMBEDDING_PROVIDER") {
            self.embedding.provider = provider;
        }
        if let Some(model) = lookup("GROUNDED_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Some(provider) = lookup("GROUNDED_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("GROUNDED_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(temperature) = lookup("GROUNDED_LLM_TEMPERATURE") {
            self.llm.temperature = temperature.parse().map_err(|_| {
                AppError::Config(format!(
                    "GROUNDED_LLM_TEMPERATURE is not a number: {}",
                    temperature
                ))
            })?;
        }

        if let Some(language) = lookup("GROUNDED_PROMPT_LANGUAGE") {
            self.prompt.language = language;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.logging.level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.logging.color = false;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the file and the environment.
    pub fn with_overrides(
        mut self,
        backend: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        json_logs: bool,
    ) -> Self {
        if let Some(backend) = backend {
            self.vector_store.backend = backend;
        }

        if let Some(log_level) = log_level {
            self.logging.level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.logging.level.is_none() {
                self.logging.level = Some("debug".to_string());
            }
        }

        if no_color {
            self.logging.color = false;
        }

        if json_logs {
            self.logging.json = true;
        }

        self
    }

    /// Resolve the credential for a provider name.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        match provider.trim().to_lowercase().as_str() {
            "openai" => self.openai_api_key.clone(),
            _ => None,
        }
    }

    /// Resolve the vector store access token from the configured variable.
    pub fn resolve_store_token(&self) -> Option<String> {
        self.vector_store
            .token_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Validate the configuration before wiring any adapter.
    ///
    /// Backend, distance and index names are left to the store layer, which
    /// owns their parsers.
    pub fn validate(&self) -> AppResult<()> {
        check_known("embedding provider", &self.embedding.provider, &KNOWN_EMBEDDING_PROVIDERS)?;
        check_known(
            "LLM provider",
            &self.llm.provider.trim().to_lowercase(),
            &KNOWN_LLM_PROVIDERS,
        )?;
        check_known("prompt language", &self.prompt.language, &KNOWN_LANGUAGES)?;

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than zero".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.vector_store.collection.trim().is_empty() {
            return Err(AppError::Config(
                "Collection name must not be empty".to_string(),
            ));
        }

        if self.chunking.chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }

        for provider in [&self.embedding.provider, &self.llm.provider] {
            if provider.trim().eq_ignore_ascii_case("openai") && self.openai_api_key.is_none() {
                return Err(AppError::Config(
                    "OpenAI provider requires OPENAI_API_KEY".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn check_known(what: &str, value: &str, known: &[&str]) -> AppResult<()> {
    if known.contains(&value) {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Unknown {}: {}. Supported: {}",
            what,
            value,
            known.join(", ")
        )))
    }
}
