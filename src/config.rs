use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::{Result, SubtransError};

// Default values for translation configuration
fn default_max_concurrent_requests() -> usize {
    10
}

fn default_context_window_size() -> usize {
    3
}

fn default_placeholder() -> String {
    "[Translation Error]".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub deepl: DeeplConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Maximum number of windows in flight at once, shared by primary and fallback calls
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Number of consecutive subtitle lines translated together
    #[serde(default = "default_context_window_size")]
    pub context_window_size: usize,
    /// Text substituted for every line of a window that no backend could translate
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Backend queried first for every window
    #[serde(default = "BackendKind::default_primary")]
    pub primary: BackendKind,
    /// Backend queried when the primary fails
    #[serde(default = "BackendKind::default_fallback")]
    pub fallback: BackendKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI chat completions with numbered-line prompting
    OpenAi,
    /// DeepL REST API
    Deepl,
}

impl BackendKind {
    fn default_primary() -> Self {
        Self::OpenAi
    }

    fn default_fallback() -> Self {
        Self::Deepl
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Deepl => "deepl",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; requests fail fast when empty
    pub api_key: String,
    /// Base URL of the API, without the `/v1` suffix
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeeplConfig {
    /// API key; requests fail fast when empty
    pub api_key: String,
    /// Use the paid API host instead of the free one
    pub use_pro: bool,
    /// Overrides the host chosen by `use_pro`
    pub endpoint: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP service listens on
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily rolling log file
    pub log_dir: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            context_window_size: default_context_window_size(),
            placeholder: default_placeholder(),
            primary: BackendKind::OpenAi,
            fallback: BackendKind::Deepl,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

impl Default for DeeplConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            use_pro: false,
            endpoint: None,
            timeout_secs: 30,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: ".subtrans/log".to_string(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtransError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtransError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtransError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognised keys: `OPENAI_API_KEY`, `DEEPL_API_KEY`, `OPENAI_MODEL`,
    /// `MAX_CONCURRENT_REQUESTS`, `CONTEXT_WINDOW_SIZE`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            debug!("Using OpenAI API key from environment");
            self.openai.api_key = key;
        }
        if let Some(key) = lookup("DEEPL_API_KEY") {
            debug!("Using DeepL API key from environment");
            self.deepl.api_key = key;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Some(value) = lookup("MAX_CONCURRENT_REQUESTS") {
            self.translate.max_concurrent_requests = parse_count("MAX_CONCURRENT_REQUESTS", &value)?;
        }
        if let Some(value) = lookup("CONTEXT_WINDOW_SIZE") {
            self.translate.context_window_size = parse_count("CONTEXT_WINDOW_SIZE", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.max_concurrent_requests == 0 {
            return Err(SubtransError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.translate.max_concurrent_requests > Semaphore::MAX_PERMITS {
            return Err(SubtransError::Config(format!(
                "max_concurrent_requests must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.translate.context_window_size == 0 {
            return Err(SubtransError::Config(
                "context_window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| SubtransError::Config(format!("Invalid value '{}' for {}: {}", value, key, e)))
}
