//! HTTP front end for the translation workflow
//!
//! Routes:
//! - `GET /health` - liveness probe
//! - `POST /subtitle-translate` - translate one SRT document
//! - `POST /translate` - alias of `/subtitle-translate`

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::Result;
use crate::job::{JobStatus, StatsReport};
use crate::workflow::Workflow;

const MIN_LANGUAGE_CODE_LEN: usize = 2;
const MAX_LANGUAGE_CODE_LEN: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub srt_content: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslationRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.srt_content.is_empty() {
            return Err("srt_content must not be empty".to_string());
        }
        for (field, code) in [
            ("source_language", &self.source_language),
            ("target_language", &self.target_language),
        ] {
            let len = code.chars().count();
            if !(MIN_LANGUAGE_CODE_LEN..=MAX_LANGUAGE_CODE_LEN).contains(&len) {
                return Err(format!(
                    "{} must be between {} and {} characters",
                    field, MIN_LANGUAGE_CODE_LEN, MAX_LANGUAGE_CODE_LEN
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub translated_srt_content: String,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub stats: Option<StatsReport>,
}

/// Request rejected before a job was started
#[derive(Debug)]
struct ValidationError(String);

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": self.0 }))).into_response()
    }
}

pub fn create_router(workflow: Arc<Workflow>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/subtitle-translate", post(translate_subtitle))
        .route("/translate", post(translate_subtitle))
        .with_state(workflow)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C
pub async fn serve(workflow: Arc<Workflow>, bind: &str) -> Result<()> {
    let app = create_router(workflow);
    let listener = TcpListener::bind(bind).await?;

    info!(address = %bind, "Subtitle translation service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Subtitle translation service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn translate_subtitle(
    State(workflow): State<Arc<Workflow>>,
    payload: std::result::Result<Json<TranslationRequest>, JsonRejection>,
) -> std::result::Result<Json<TranslationResponse>, ValidationError> {
    let Json(request) = payload.map_err(|rejection| ValidationError(rejection.body_text()))?;
    request.validate().map_err(ValidationError)?;

    info!(
        "Translation request: {} -> {}",
        request.source_language, request.target_language
    );

    let job = workflow
        .translate(&request.srt_content, &request.source_language, &request.target_language)
        .await;

    let response = if job.status == JobStatus::Failure {
        error!("Translation failed: {}", job.error.as_deref().unwrap_or("no error message"));
        TranslationResponse {
            translated_srt_content: String::new(),
            status: JobStatus::Failure,
            error_message: Some(job.error.unwrap_or_else(|| "Translation failed".to_string())),
            stats: Some(job.stats.report()),
        }
    } else {
        TranslationResponse {
            translated_srt_content: job.translated_content,
            status: job.status,
            error_message: job.error,
            stats: Some(job.stats.report()),
        }
    };

    Ok(Json(response))
}
