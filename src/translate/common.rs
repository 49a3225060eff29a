use reqwest::{Client, Response};
use std::time::Duration;
use tracing::warn;

use crate::config::BackendKind;
use crate::error::{Result, SubtransError};
use super::{BackendFailure, TranslationOutcome};

/// Build the HTTP client for one backend; the timeout bounds every call so a
/// stalled request surfaces as a backend failure instead of a hang
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Turn a non-2xx response into a translation error carrying status and body
pub async fn ensure_success(backend: BackendKind, response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(SubtransError::Translation(format!(
        "{} API error {}: {}",
        backend,
        status,
        error_text.trim()
    )))
}

/// Pad with empty strings or truncate so the reply has exactly `expected` items
pub fn fit_to_count(mut texts: Vec<String>, expected: usize) -> Vec<String> {
    if texts.len() != expected {
        warn!("Backend returned {} lines, expected {}", texts.len(), expected);
    }
    texts.resize(expected, String::new());
    texts
}

/// Convert an internal result into the outcome reported to the orchestrator
pub fn into_outcome(backend: BackendKind, result: Result<Vec<String>>) -> TranslationOutcome {
    result.map_err(|e| {
        let reason = match e {
            SubtransError::Translation(message) => message,
            other => other.to_string(),
        };
        warn!("{} translation failed: {}", backend, reason);
        BackendFailure { backend, reason }
    })
}

/// Convert language code to full language name for clearer prompts
pub fn language_code_to_name(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "English".to_string(),
        "tr" => "Turkish".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" => "Chinese".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "pt-br" => "Brazilian Portuguese".to_string(),
        "pl" => "Polish".to_string(),
        "nl" => "Dutch".to_string(),
        "ar" => "Arabic".to_string(),
        "hi" => "Hindi".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        "sv" => "Swedish".to_string(),
        "da" => "Danish".to_string(),
        "no" | "nb" => "Norwegian".to_string(),
        "fi" => "Finnish".to_string(),
        "he" => "Hebrew".to_string(),
        "hu" => "Hungarian".to_string(),
        "cs" => "Czech".to_string(),
        "sk" => "Slovak".to_string(),
        "bg" => "Bulgarian".to_string(),
        "ro" => "Romanian".to_string(),
        "el" => "Greek".to_string(),
        "uk" => "Ukrainian".to_string(),
        "id" => "Indonesian".to_string(),
        _ => code.to_string(), // Fallback to the code itself if not found
    }
}
