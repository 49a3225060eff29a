use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{BackendKind, OpenAiConfig};
use crate::error::{Result, SubtransError};
use super::common::{build_client, ensure_success, fit_to_count, into_outcome, language_code_to_name};
use super::{TranslationOutcome, Translator};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Primary backend: OpenAI chat completions.
///
/// The window is sent as numbered lines and the model is told to answer with
/// exactly as many numbered lines, so neighbouring subtitles act as context
/// while the reply still maps back line by line.
pub struct OpenAiTranslator {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiTranslator {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            config,
        })
    }

    fn build_system_prompt(&self, source_language: &str, target_language: &str, num_lines: usize) -> String {
        let source_name = language_code_to_name(source_language);
        let target_name = language_code_to_name(target_language);
        let line_refs = (1..=num_lines)
            .map(|i| format!("{})", i))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are a professional subtitle translator. Translate the following lines from {} ({}) to {} ({}).\n\
             \n\
             CRITICAL RULES:\n\
             1. Output EXACTLY {} lines, numbered {}\n\
             2. Preserve the meaning while making it natural in {}\n\
             3. Keep sentences concise - subtitles need to be readable quickly\n\
             4. Maintain the speaker's tone and intent\n\
             5. Consider context between lines - they are sequential subtitles\n\
             6. Never add explanations or notes - only output translations\n\
             \n\
             INPUT FORMAT:\n\
             {}\n\
             \n\
             OUTPUT FORMAT (must match exactly):\n\
             {}\n\
             \n\
             Translate now:",
            source_name, source_language, target_name, target_language,
            num_lines, line_refs, target_name, line_refs, line_refs
        )
    }

    fn build_user_prompt(texts: &[String]) -> String {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| format!("{}) {}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Extract one translation per line, dropping `1)`, `1.` or `1:` prefixes
    /// that match the line's position
    fn parse_response(response_text: &str, expected_count: usize) -> Vec<String> {
        let results = response_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(i, line)| strip_number_prefix(line, i + 1).to_string())
            .collect();

        fit_to_count(results, expected_count)
    }

    async fn request(&self, texts: &[String], source_language: &str, target_language: &str) -> Result<Vec<String>> {
        if self.config.api_key.is_empty() {
            return Err(SubtransError::Translation("OpenAI API key not configured".to_string()));
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.build_system_prompt(source_language, target_language, texts.len()),
                },
                ChatMessage {
                    role: "user",
                    content: Self::build_user_prompt(texts),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubtransError::Translation(format!("HTTP request failed: {}", e)))?;

        let response = ensure_success(BackendKind::OpenAi, response).await?;

        let chat: ChatResponse = response.json().await
            .map_err(|e| SubtransError::Translation(format!("Failed to parse response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!("Raw OpenAI response: {}", content);

        if content.trim().is_empty() {
            return Err(SubtransError::Translation("Empty translation received".to_string()));
        }

        let translated = Self::parse_response(&content, texts.len());
        debug!("OpenAI translated {} lines", texts.len());
        Ok(translated)
    }
}

fn strip_number_prefix(line: &str, position: usize) -> &str {
    for separator in [") ", ". ", ": ", ")"] {
        if let Some((prefix, rest)) = line.split_once(separator) {
            let prefix = prefix.trim();
            if prefix.bytes().all(|b| b.is_ascii_digit()) && prefix.parse::<usize>().ok() == Some(position) {
                return rest.trim();
            }
        }
    }
    line
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
    }

    async fn translate(&self, texts: &[String], source_language: &str, target_language: &str) -> TranslationOutcome {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        into_outcome(BackendKind::OpenAi, self.request(texts, source_language, target_language).await)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1/models", self.config.endpoint.trim_end_matches('/'));
        match self.client.get(&url).bearer_auth(&self.config.api_key).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("OpenAI health check failed: {}", e);
                false
            }
        }
    }
}
