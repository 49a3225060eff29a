use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{BackendKind, DeeplConfig};
use crate::error::{Result, SubtransError};
use super::common::{build_client, ensure_success, fit_to_count, into_outcome};
use super::{TranslationOutcome, Translator};

const API_URL: &str = "https://api-free.deepl.com";
const API_URL_PRO: &str = "https://api.deepl.com";

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    #[serde(default)]
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

/// Fallback backend: DeepL REST API
pub struct DeeplTranslator {
    client: Client,
    config: DeeplConfig,
}

impl DeeplTranslator {
    pub fn new(config: DeeplConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn base_url(&self) -> &str {
        match &self.config.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/'),
            None if self.config.use_pro => API_URL_PRO,
            None => API_URL,
        }
    }

    async fn request(&self, texts: &[String], source_language: &str, target_language: &str) -> Result<Vec<String>> {
        if self.config.api_key.is_empty() {
            return Err(SubtransError::Translation("DeepL API key not configured".to_string()));
        }

        let mut form: Vec<(&str, String)> = texts.iter().map(|text| ("text", text.clone())).collect();
        form.push(("source_lang", source_language_code(source_language)));
        form.push(("target_lang", target_language_code(target_language)));

        let url = format!("{}/v2/translate", self.base_url());
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.config.api_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| SubtransError::Translation(format!("HTTP request failed: {}", e)))?;

        let response = ensure_success(BackendKind::Deepl, response).await?;

        let reply: DeeplResponse = response.json().await
            .map_err(|e| SubtransError::Translation(format!("Failed to parse response: {}", e)))?;

        if reply.translations.is_empty() {
            return Err(SubtransError::Translation("Empty translation received".to_string()));
        }

        let translated = reply.translations.into_iter().map(|t| t.text).collect();
        debug!("DeepL translated {} lines", texts.len());
        Ok(fit_to_count(translated, texts.len()))
    }
}

/// DeepL target code; Portuguese needs an explicit variant
fn target_language_code(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "pt" => "PT-PT".to_string(),
        "pt-br" => "PT-BR".to_string(),
        "en" => "EN-US".to_string(),
        other => other.to_uppercase(),
    }
}

/// DeepL source code; source languages never carry a regional variant
fn source_language_code(code: &str) -> String {
    code.split(['-', '_']).next().unwrap_or(code).to_uppercase()
}

#[async_trait]
impl Translator for DeeplTranslator {
    fn kind(&self) -> BackendKind {
        BackendKind::Deepl
    }

    async fn translate(&self, texts: &[String], source_language: &str, target_language: &str) -> TranslationOutcome {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        into_outcome(BackendKind::Deepl, self.request(texts, source_language, target_language).await)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v2/usage", self.base_url());
        match self.client
            .get(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.config.api_key))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("DeepL health check failed: {}", e);
                false
            }
        }
    }
}
