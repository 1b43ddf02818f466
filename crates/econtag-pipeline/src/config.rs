//! Configuration loading for econtag.
//! Reads econtag.toml from the current directory or the path in ECONTAG_CONFIG.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use econtag_common::labels::FallbackLabels;
use econtag_ingestion::chunker::ChunkerConfig;
use econtag_ingestion::section::ExtractorConfig;
use econtag_llm::classifier::RetryPolicy;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible endpoint root; "/v1/chat/completions" is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Empty means: read ECONTAG_API_KEY from the environment.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_base_url()          -> String { "https://api.groq.com/openai".to_string() }
fn default_model()             -> String { "openai/gpt-oss-20b".to_string() }
fn default_max_tokens()        -> u32    { 800 }
fn default_backoff_base_secs() -> u64    { 10 }
fn default_max_retries()       -> u32    { 6 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url:          default_base_url(),
            model:             default_model(),
            api_key:           String::new(),
            max_tokens:        default_max_tokens(),
            backoff_base_secs: default_backoff_base_secs(),
            max_retries:       default_max_retries(),
        }
    }
}

impl LlmConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var("ECONTAG_API_KEY").ok().filter(|k| !k.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_secs(self.backoff_base_secs),
            max_attempts: self.max_retries,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_intro_lines")]
    pub intro_lines: usize,
    #[serde(default = "default_conclusion_lines")]
    pub conclusion_lines: usize,
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,
    /// Feed keyword-based approach hints to the aggregator.
    #[serde(default = "bool_true")]
    pub keyword_hints: bool,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

fn default_max_lines()             -> usize { 3000 }
fn default_intro_lines()           -> usize { 200 }
fn default_conclusion_lines()      -> usize { 150 }
fn default_chunk_chars()           -> usize { 1500 }
fn bool_true()                     -> bool  { true }
fn default_download_timeout_secs() -> u64   { 30 }

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_lines:             default_max_lines(),
            intro_lines:           default_intro_lines(),
            conclusion_lines:      default_conclusion_lines(),
            chunk_chars:           default_chunk_chars(),
            keyword_hints:         bool_true(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

impl ExtractConfig {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            max_lines:        self.max_lines,
            intro_lines:      self.intro_lines,
            conclusion_lines: self.conclusion_lines,
        }
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig { max_chars: self.chunk_chars }
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default = "default_fallback_methodology")]
    pub fallback_methodology: String,
    #[serde(default = "default_fallback_field")]
    pub fallback_field: String,
    #[serde(default = "default_fallback_approach")]
    pub fallback_empirical_approach: String,
}

fn default_fallback_methodology() -> String { "Empirical".to_string() }
fn default_fallback_field()       -> String { "Public".to_string() }
fn default_fallback_approach()    -> String { "Descriptive/Observational".to_string() }

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            fallback_methodology:        default_fallback_methodology(),
            fallback_field:              default_fallback_field(),
            fallback_empirical_approach: default_fallback_approach(),
        }
    }
}

impl LabelConfig {
    pub fn fallback_labels(&self) -> FallbackLabels {
        FallbackLabels {
            methodology:        self.fallback_methodology.clone(),
            field:              self.fallback_field.clone(),
            empirical_approach: self.fallback_empirical_approach.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_papers_file")]
    pub papers_file: String,
}

fn default_papers_file() -> String { "papers.toml".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self { papers_file: default_papers_file() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default = "default_json_path")]
    pub json_path: String,
}

fn default_csv_path()  -> String { "classified_papers.csv".to_string() }
fn default_json_path() -> String { "classified_papers.json".to_string() }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path:  default_csv_path(),
            json_path: default_json_path(),
        }
    }
}

impl Config {
    /// Load configuration from econtag.toml.
    /// Checks ECONTAG_CONFIG first, then the current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("ECONTAG_CONFIG")
            .unwrap_or_else(|_| "econtag.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy econtag.example.toml to econtag.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
