use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::document::FileMode;
use crate::translation::prompts::{PersonaPreset, PLAIN_TEXT_PERSONA};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language name or code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language name or code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Which documents a job picks up
    #[serde(default)]
    pub file_mode: FileMode,

    /// Marker inserted before the extension of derived output names;
    /// files already carrying it are skipped during discovery
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Ollama backend config
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Ollama model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Free-text persona; overrides `persona_preset` when set
    #[serde(default)]
    pub persona_instruction: Option<String>,

    /// Preset used when no explicit persona is configured
    #[serde(default)]
    pub persona_preset: PersonaPreset,

    /// Units per backend request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            persona_instruction: None,
            persona_preset: PersonaPreset::default(),
            batch_size: default_batch_size(),
            temperature: None,
        }
    }
}

/// Ollama service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    /// Service endpoint URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Everything one translation job needs, with the persona already resolved
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub model: String,
    pub persona_instruction: String,
    pub batch_size: usize,
    pub file_mode: FileMode,
}

const MAX_BATCH_SIZE: usize = 100;

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Traditional Chinese".to_string()
}

fn default_output_suffix() -> String {
    "_zh".to_string()
}

fn default_model() -> String {
    "translategemma".to_string()
}

fn default_batch_size() -> usize {
    20
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language must not be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }
        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("Model must not be empty"));
        }

        let batch_size = self.translation.batch_size;
        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(anyhow!("Batch size must be between 1 and {}, got {}", MAX_BATCH_SIZE, batch_size));
        }

        if let Some(temperature) = self.translation.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err(anyhow!("Temperature must be between 0.0 and 1.0, got {}", temperature));
            }
        }

        Url::parse(&self.ollama.endpoint)
            .with_context(|| format!("Invalid Ollama endpoint: {}", self.ollama.endpoint))?;

        Ok(())
    }

    /// Persona text sent with every request.
    ///
    /// An explicit instruction wins; otherwise subtitles use the configured
    /// preset and plain text uses a neutral translator persona.
    pub fn resolved_persona(&self) -> String {
        match &self.translation.persona_instruction {
            Some(instruction) if !instruction.trim().is_empty() => instruction.trim().to_string(),
            _ => match self.file_mode {
                FileMode::Srt => self.translation.persona_preset.instruction().to_string(),
                FileMode::PlainText => PLAIN_TEXT_PERSONA.to_string(),
            },
        }
    }

    /// Build the job settings consumed by the engine
    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            source_lang: self.source_language.trim().to_string(),
            target_lang: self.target_language.trim().to_string(),
            model: self.translation.model.trim().to_string(),
            persona_instruction: self.resolved_persona(),
            batch_size: self.translation.batch_size.max(1),
            file_mode: self.file_mode,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            file_mode: FileMode::default(),
            output_suffix: default_output_suffix(),
            translation: TranslationConfig::default(),
            ollama: OllamaConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
