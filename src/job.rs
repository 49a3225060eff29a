use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Final state of a translation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Every line was translated
    Success,
    /// Some windows failed on both backends, others succeeded
    Partial,
    /// Nothing was translated, or the job aborted
    Failure,
}

impl JobStatus {
    pub fn from_counts(translated: usize, failed: usize) -> Self {
        if failed == 0 {
            Self::Success
        } else if translated > 0 {
            Self::Partial
        } else {
            Self::Failure
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Partial => "partial",
            Self::Failure => "failure",
        }
    }
}

/// Counters for one running job, updated concurrently by window tasks
#[derive(Debug)]
pub struct JobStatistics {
    started: Instant,
    total: AtomicUsize,
    translated: AtomicUsize,
    failed: AtomicUsize,
    primary_calls: AtomicUsize,
    fallback_calls: AtomicUsize,
}

impl JobStatistics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            total: AtomicUsize::new(0),
            translated: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            primary_calls: AtomicUsize::new(0),
            fallback_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn record_primary_call(&self) {
        self.primary_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_call(&self) {
        self.fallback_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_translated(&self, units: usize) {
        self.translated.fetch_add(units, Ordering::Relaxed);
    }

    pub fn record_failed(&self, units: usize) {
        self.failed.fetch_add(units, Ordering::Relaxed);
    }

    /// Freeze the counters, stamping the elapsed time
    pub fn snapshot(&self) -> TranslationStats {
        TranslationStats {
            total_sentences: self.total.load(Ordering::Relaxed),
            translated_sentences: self.translated.load(Ordering::Relaxed),
            failed_sentences: self.failed.load(Ordering::Relaxed),
            primary_calls: self.primary_calls.load(Ordering::Relaxed),
            fallback_calls: self.fallback_calls.load(Ordering::Relaxed),
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl Default for JobStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics of a finished job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationStats {
    pub total_sentences: usize,
    pub translated_sentences: usize,
    pub failed_sentences: usize,
    /// Windows translated by the primary backend
    pub primary_calls: usize,
    /// Windows translated by the fallback backend
    pub fallback_calls: usize,
    pub elapsed_seconds: f64,
}

impl TranslationStats {
    /// Fraction of lines translated, 1.0 for an empty job
    pub fn success_rate(&self) -> f64 {
        if self.total_sentences == 0 {
            return 1.0;
        }
        self.translated_sentences as f64 / self.total_sentences as f64
    }

    /// Wire representation: percentages and seconds rounded to two decimals
    pub fn report(&self) -> StatsReport {
        StatsReport {
            total_sentences: self.total_sentences,
            translated_sentences: self.translated_sentences,
            failed_sentences: self.failed_sentences,
            success_rate: round2(self.success_rate() * 100.0),
            openai_calls: self.primary_calls,
            deepl_calls: self.fallback_calls,
            elapsed_seconds: round2(self.elapsed_seconds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub total_sentences: usize,
    pub translated_sentences: usize,
    pub failed_sentences: usize,
    pub success_rate: f64,
    pub openai_calls: usize,
    pub deepl_calls: usize,
    pub elapsed_seconds: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Result of a complete translation job
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationJob {
    pub translated_content: String,
    pub status: JobStatus,
    pub error: Option<String>,
    pub stats: TranslationStats,
}

impl TranslationJob {
    /// A job that aborted before producing a document
    pub fn failure(error: impl Into<String>, stats: TranslationStats) -> Self {
        Self {
            translated_content: String::new(),
            status: JobStatus::Failure,
            error: Some(error.into()),
            stats,
        }
    }
}
