use async_trait::async_trait;
use std::collections::HashMap;

use subtrans::config::{BackendKind, Config, TranslateConfig};
use subtrans::job::JobStatus;
use subtrans::subtitle;
use subtrans::translate::{BackendFailure, TranslationOutcome, Translator};
use subtrans::workflow::Workflow;

const EPISODE: &str = "\u{feff}1\r\n00:00:01,000 --> 00:00:03,000\r\nHello there.\r\nGeneral Kenobi.\r\n\r\n\
2\r\n00:00:04,000 --> 00:00:06,000\r\nYou are a bold one.\r\n\r\n\
garbage block without timestamp\r\n\r\n\
3\r\n00:00:07,000 --> 00:00:09,000\r\nKill him!\r\n\r\n\
4\r\n00:00:10,000 --> 00:00:12,000\r\nBack away.\r\nI will deal with this Jedi slime myself.\r\n";

/// Dictionary backend that fails any window containing an unknown line
struct Dictionary {
    kind: BackendKind,
    words: HashMap<&'static str, &'static str>,
}

impl Dictionary {
    fn new(kind: BackendKind, words: &[(&'static str, &'static str)]) -> Self {
        Self {
            kind,
            words: words.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl Translator for Dictionary {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn translate(&self, texts: &[String], _source: &str, _target: &str) -> TranslationOutcome {
        texts
            .iter()
            .map(|text| {
                self.words.get(text.as_str()).map(|t| t.to_string()).ok_or_else(|| BackendFailure {
                    backend: self.kind,
                    reason: format!("unknown line: {}", text),
                })
            })
            .collect()
    }
}

fn settings(window_size: usize) -> TranslateConfig {
    TranslateConfig {
        context_window_size: window_size,
        max_concurrent_requests: 2,
        ..TranslateConfig::default()
    }
}

const PRIMARY_WORDS: &[(&str, &str)] = &[
    ("Hello there.", "Merhaba."),
    ("General Kenobi.", "General Kenobi."),
    ("You are a bold one.", "Cesur birisin."),
    ("Kill him!", "Öldürün onu!"),
];

#[tokio::test]
async fn translates_whole_episode_with_fallback() {
    let mut fallback_words = PRIMARY_WORDS.to_vec();
    fallback_words.push(("Back away.", "Geri çekilin."));
    fallback_words.push(("I will deal with this Jedi slime myself.", "Bu Jedi pisliğiyle ben ilgileneceğim."));

    let workflow = Workflow::with_translators(
        Box::new(Dictionary::new(BackendKind::OpenAi, PRIMARY_WORDS)),
        Box::new(Dictionary::new(BackendKind::Deepl, &fallback_words)),
        settings(3),
    );

    let job = workflow.translate(EPISODE, "en", "tr").await;

    assert_eq!(job.status, JobStatus::Success);
    assert_eq!(job.stats.total_sentences, 6);
    assert_eq!(job.stats.translated_sentences, 6);
    assert_eq!(job.stats.primary_calls, 1);
    assert_eq!(job.stats.fallback_calls, 1);
    assert_eq!(
        job.translated_content,
        "1\n00:00:01,000 --> 00:00:03,000\nMerhaba.\nGeneral Kenobi.\n\n\
2\n00:00:04,000 --> 00:00:06,000\nCesur birisin.\n\n\
3\n00:00:07,000 --> 00:00:09,000\nÖldürün onu!\n\n\
4\n00:00:10,000 --> 00:00:12,000\nGeri çekilin.\nBu Jedi pisliğiyle ben ilgileneceğim."
    );
}

#[tokio::test]
async fn partial_job_leaves_untranslated_entries_readable() {
    let workflow = Workflow::with_translators(
        Box::new(Dictionary::new(BackendKind::OpenAi, PRIMARY_WORDS)),
        Box::new(Dictionary::new(BackendKind::Deepl, &[])),
        settings(2),
    );

    let job = workflow.translate(EPISODE, "en", "tr").await;

    // Windows: [Hello, General], [bold, Kill], [Back away, Jedi slime]
    assert_eq!(job.status, JobStatus::Partial);
    assert_eq!(job.stats.translated_sentences, 4);
    assert_eq!(job.stats.failed_sentences, 2);
    assert_eq!(job.stats.fallback_calls, 0);

    let document = subtitle::parse(&job.translated_content);
    assert_eq!(document.entries().len(), 4);
    assert_eq!(document.entries()[2].text, "Öldürün onu!");
    assert_eq!(document.entries()[3].text, "Back away.\nI will deal with this Jedi slime myself.");
    assert_eq!(document.entries()[3].timestamp(), "00:00:10,000 --> 00:00:12,000");
}

#[tokio::test]
async fn every_window_size_gives_the_same_document() {
    let mut words = PRIMARY_WORDS.to_vec();
    words.push(("Back away.", "Geri çekilin."));
    words.push(("I will deal with this Jedi slime myself.", "Bu Jedi pisliğiyle ben ilgileneceğim."));

    let mut outputs = Vec::new();
    for window_size in 1..=7 {
        let workflow = Workflow::with_translators(
            Box::new(Dictionary::new(BackendKind::OpenAi, &words)),
            Box::new(Dictionary::new(BackendKind::Deepl, &[])),
            settings(window_size),
        );
        let job = workflow.translate(EPISODE, "en", "tr").await;
        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.stats.primary_calls, 6_usize.div_ceil(window_size));
        outputs.push(job.translated_content);
    }

    assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn file_round_trip_with_default_config_values() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("episode.srt");
    let output = dir.path().join("episode.tr.srt");
    std::fs::write(&input, EPISODE).unwrap();

    let config = Config::default();
    let workflow = Workflow::with_translators(
        Box::new(Dictionary::new(BackendKind::OpenAi, &[])),
        Box::new(Dictionary::new(BackendKind::Deepl, &[])),
        config.translate.clone(),
    );

    // Nothing translates: the job fails and no output is written
    let job = workflow.translate_file(&input, &output, "en", "tr").await.unwrap();
    assert_eq!(job.status, JobStatus::Failure);
    assert!(!output.exists());
    assert_eq!(job.stats.failed_sentences, 6);
}
