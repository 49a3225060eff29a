// Translation backends
//
// Every backend implements `Translator`; the orchestrator only sees the trait,
// so the primary/fallback pair is chosen by configuration:
// - openai: chat completions with numbered-line prompting
// - deepl: DeepL REST API

pub mod common;
pub mod deepl;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use crate::config::BackendKind;
use crate::config::Config;
use crate::error::Result;

/// A backend call that produced no usable translation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{backend}: {reason}")]
pub struct BackendFailure {
    pub backend: BackendKind,
    pub reason: String,
}

/// Result of one backend call: exactly one translated string per input
/// string, or the reason the backend gave up
pub type TranslationOutcome = std::result::Result<Vec<String>, BackendFailure>;

/// Translation capability shared by all backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Which backend this is, for logs and statistics
    fn kind(&self) -> BackendKind;

    /// Translate an ordered group of lines.
    ///
    /// On success the returned list has the same length as `texts`. An empty
    /// `texts` succeeds without contacting the backend.
    async fn translate(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> TranslationOutcome;

    /// Advisory availability probe
    async fn health_check(&self) -> bool {
        true
    }
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the backend named by `kind` from its configuration section
    pub fn create_translator(kind: BackendKind, config: &Config) -> Result<Box<dyn Translator>> {
        Ok(match kind {
            BackendKind::OpenAi => Box::new(openai::OpenAiTranslator::new(config.openai.clone())?),
            BackendKind::Deepl => Box::new(deepl::DeeplTranslator::new(config.deepl.clone())?),
        })
    }

    /// Create the configured primary and fallback backends
    pub fn create_pair(config: &Config) -> Result<(Box<dyn Translator>, Box<dyn Translator>)> {
        let primary = Self::create_translator(config.translate.primary, config)?;
        let fallback = Self::create_translator(config.translate.fallback, config)?;
        Ok((primary, fallback))
    }
}
