use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::{Config, TranslateConfig};
use crate::error::{Result, SubtransError};
use crate::job::{JobStatistics, JobStatus, TranslationJob};
use crate::subtitle::{self, reconstruct_with_report};
use crate::translate::{BackendFailure, BackendKind, TranslationOutcome, Translator, TranslatorFactory};
use crate::window::{Window, create_windows};

/// How one window ended up after the primary/fallback protocol
#[derive(Debug, Clone, PartialEq)]
pub enum WindowResult {
    /// One translated line per input line, from the named backend
    Translated { backend: BackendKind, texts: Vec<String> },
    /// Both backends failed; `reason` names both failures
    Failed { reason: String },
}

/// Translates whole SRT documents window by window with primary/fallback failover
pub struct Workflow {
    primary: Box<dyn Translator>,
    fallback: Box<dyn Translator>,
    settings: TranslateConfig,
}

impl Workflow {
    /// Build the workflow with the backends named in the configuration
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let (primary, fallback) = TranslatorFactory::create_pair(config)?;

        info!(
            "Translation backends: primary={}, fallback={}, window size {}, concurrency {}",
            primary.kind(),
            fallback.kind(),
            config.translate.context_window_size,
            config.translate.max_concurrent_requests
        );

        Ok(Self::with_translators(primary, fallback, config.translate.clone()))
    }

    pub fn with_translators(
        primary: Box<dyn Translator>,
        fallback: Box<dyn Translator>,
        settings: TranslateConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            settings,
        }
    }

    pub fn settings(&self) -> &TranslateConfig {
        &self.settings
    }

    /// Availability of the primary and fallback backends
    pub async fn health_check(&self) -> Vec<(BackendKind, bool)> {
        let (primary, fallback) = tokio::join!(self.primary.health_check(), self.fallback.health_check());
        vec![(self.primary.kind(), primary), (self.fallback.kind(), fallback)]
    }

    /// Translate SRT content from source to target language.
    ///
    /// Never fails: anything that goes wrong is reported through the job's
    /// status, error message and statistics.
    pub async fn translate(
        &self,
        srt_content: &str,
        source_language: &str,
        target_language: &str,
    ) -> TranslationJob {
        let stats = JobStatistics::new();
        let span = info_span!("job", id = %Uuid::new_v4());

        let outcome = AssertUnwindSafe(self.run(srt_content, source_language, target_language, &stats))
            .catch_unwind()
            .instrument(span.clone())
            .await;

        span.in_scope(|| match outcome {
            Ok(Ok(job)) => job,
            Ok(Err(e)) => {
                error!("Translation job failed: {}", e);
                TranslationJob::failure(e.to_string(), stats.snapshot())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Translation job panicked: {}", message);
                TranslationJob::failure(format!("Unexpected error: {}", message), stats.snapshot())
            }
        })
    }

    /// Translate an SRT file into another SRT file
    pub async fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        source_language: &str,
        target_language: &str,
    ) -> Result<TranslationJob> {
        let content = subtitle::read_srt(input_path).await?;
        let job = self.translate(&content, source_language, target_language).await;

        if job.status != JobStatus::Failure {
            subtitle::write_srt(&job.translated_content, output_path).await?;
        }

        Ok(job)
    }

    async fn run(
        &self,
        srt_content: &str,
        source_language: &str,
        target_language: &str,
        stats: &JobStatistics,
    ) -> Result<TranslationJob> {
        if self.settings.max_concurrent_requests == 0 {
            return Err(SubtransError::Config(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }

        let document = subtitle::parse(srt_content);
        let units = document.units();
        stats.set_total(units.len());

        info!(
            "Starting translation of {} subtitles ({} sentences) {} -> {}",
            document.entries().len(),
            units.len(),
            source_language,
            target_language
        );

        let windows = create_windows(&units, self.settings.context_window_size)?;
        let limiter = Semaphore::new(self.settings.max_concurrent_requests.min(Semaphore::MAX_PERMITS));

        let results = join_all(
            windows
                .iter()
                .map(|window| self.translate_window(window, source_language, target_language, &limiter, stats)),
        )
        .await;

        // Flatten in window order, whatever order the windows finished in
        let mut translated = Vec::with_capacity(units.len());
        for (window, result) in windows.iter().zip(results) {
            match result {
                WindowResult::Translated { texts, .. } => translated.extend(texts),
                WindowResult::Failed { reason } => {
                    error!("Window {} failed: {}", window.index, reason);
                    translated.extend(std::iter::repeat_n(self.settings.placeholder.clone(), window.len()));
                }
            }
        }

        // Counts follow the written document: an entry that kept its source text failed
        let report = reconstruct_with_report(&document, &translated, &self.settings.placeholder);
        let translated_units = report.translated_units(&document);
        stats.record_translated(translated_units);
        stats.record_failed(units.len() - translated_units);

        let translated_content = report.content;
        let stats = stats.snapshot();
        let status = JobStatus::from_counts(stats.translated_sentences, stats.failed_sentences);

        info!(
            "Translation completed ({}): {}/{} sentences in {:.2}s",
            status.as_str(),
            stats.translated_sentences,
            stats.total_sentences,
            stats.elapsed_seconds
        );

        Ok(TranslationJob {
            translated_content,
            status,
            error: None,
            stats,
        })
    }

    /// Translate one window, falling back to the secondary backend with the
    /// same source lines when the primary fails
    async fn translate_window(
        &self,
        window: &Window<'_>,
        source_language: &str,
        target_language: &str,
        limiter: &Semaphore,
        stats: &JobStatistics,
    ) -> WindowResult {
        // Held across both attempts; released on every return path
        let _permit = match limiter.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                return WindowResult::Failed {
                    reason: format!("Concurrency limiter unavailable: {}", e),
                };
            }
        };

        debug!("Translating window {} ({} lines)", window.index, window.len());

        let primary = checked(
            self.primary.kind(),
            self.primary.translate(window.units, source_language, target_language).await,
            window.len(),
        );
        let primary_failure = match primary {
            Ok(texts) => {
                stats.record_primary_call();
                return WindowResult::Translated {
                    backend: self.primary.kind(),
                    texts,
                };
            }
            Err(failure) => failure,
        };

        warn!(
            "Primary service failed for window {} ({}), trying fallback",
            window.index, primary_failure.reason
        );

        let fallback = checked(
            self.fallback.kind(),
            self.fallback.translate(window.units, source_language, target_language).await,
            window.len(),
        );
        match fallback {
            Ok(texts) => {
                stats.record_fallback_call();
                WindowResult::Translated {
                    backend: self.fallback.kind(),
                    texts,
                }
            }
            Err(fallback_failure) => {
                error!(
                    "All translation services failed. Primary: {}, Fallback: {}",
                    primary_failure, fallback_failure
                );
                WindowResult::Failed {
                    reason: format!("Translation failed: {} / {}", primary_failure, fallback_failure),
                }
            }
        }
    }
}

/// Reject a successful outcome whose length does not match its window, so a
/// misbehaving backend cannot shift every later line out of place
fn checked(backend: BackendKind, outcome: TranslationOutcome, expected: usize) -> TranslationOutcome {
    match outcome {
        Ok(texts) if texts.len() != expected => Err(BackendFailure {
            backend,
            reason: format!("returned {} lines for {}", texts.len(), expected),
        }),
        other => other,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
