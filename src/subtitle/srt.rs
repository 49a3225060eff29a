use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::model::{Document, SubtitleEntry};

/// One or more blank lines; lines holding only spaces or tabs count as blank
static BLOCK_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("block separator pattern is valid"));

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})")
        .expect("timestamp pattern is valid")
});

/// Parse SRT content into a document.
///
/// Blocks without a numeric index line or a timing line are skipped; they
/// take no part in the unit map. Parsing never fails.
pub fn parse(content: &str) -> Document {
    let normalized = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let content = normalized.trim();

    if content.is_empty() {
        return Document::default();
    }

    let mut entries = Vec::new();
    let mut skipped = 0;

    for block in BLOCK_SEPARATOR.split(content) {
        match parse_block(block) {
            Some(entry) => entries.push(entry),
            None => {
                skipped += 1;
                debug!("Skipping malformed subtitle block: {:?}", block);
            }
        }
    }

    if skipped > 0 {
        debug!("Skipped {} malformed subtitle blocks", skipped);
    }

    Document::new(entries)
}

fn parse_block(block: &str) -> Option<SubtitleEntry> {
    let lines: Vec<&str> = block.trim().split('\n').collect();
    if lines.len() < 3 {
        return None;
    }

    let index = lines[0].trim().parse::<i64>().ok()?;
    let captures = TIMESTAMP_PATTERN.captures(lines[1].trim())?;

    Some(SubtitleEntry {
        index,
        start_time: captures[1].to_string(),
        end_time: captures[2].to_string(),
        text: lines[2..].join("\n").trim().to_string(),
    })
}

/// Rebuild SRT content from a document and per-unit translations.
///
/// Only the first `min(unit_count, translated.len())` translations are used.
/// An entry takes its translated text only when every one of its lines was
/// delivered; otherwise the original text is kept for the whole entry.
pub fn reconstruct(document: &Document, translated: &[String]) -> String {
    render(document, translated, None).content
}

/// Like [`reconstruct`], but units equal to `placeholder` count as undelivered
pub fn reconstruct_with_placeholder(
    document: &Document,
    translated: &[String],
    placeholder: &str,
) -> String {
    render(document, translated, Some(placeholder)).content
}

/// Rebuilt document plus which entries kept their source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconstruction {
    pub content: String,
    /// `translated[i]` is false when entry `i` fell back to its original text
    pub translated: Vec<bool>,
}

impl Reconstruction {
    /// Units belonging to entries that were output translated
    pub fn translated_units(&self, document: &Document) -> usize {
        document
            .entries()
            .iter()
            .zip(&self.translated)
            .filter(|(_, translated)| **translated)
            .map(|(entry, _)| entry.line_count())
            .sum()
    }
}

/// Like [`reconstruct_with_placeholder`], also reporting entry outcomes
pub fn reconstruct_with_report(
    document: &Document,
    translated: &[String],
    placeholder: &str,
) -> Reconstruction {
    render(document, translated, Some(placeholder))
}

fn render(document: &Document, translated: &[String], placeholder: Option<&str>) -> Reconstruction {
    let entries = document.entries();
    let mut lines: Vec<Vec<String>> = vec![Vec::new(); entries.len()];
    let mut complete = vec![true; entries.len()];

    for (position, unit) in document.unit_map().iter().enumerate() {
        match translated.get(position).and_then(|text| delivered(text, placeholder)) {
            Some(line) => lines[unit.entry_index].push(line),
            None => complete[unit.entry_index] = false,
        }
    }

    let content = entries
        .iter()
        .zip(lines)
        .zip(&complete)
        .map(|((entry, lines), complete)| {
            let text = if *complete {
                lines.join("\n")
            } else {
                entry.text.clone()
            };
            format!("{}\n{}\n{}", entry.index, entry.timestamp(), text)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    Reconstruction {
        content,
        translated: complete,
    }
}

/// A translated line fit for output, or `None` when the unit has to be
/// treated as missing. Blank lines would split the block on re-parse, so
/// they never count as delivered, and stray line breaks are folded.
fn delivered(text: &str, placeholder: Option<&str>) -> Option<String> {
    if placeholder == Some(text) || text.trim().is_empty() {
        return None;
    }
    if !text.contains(['\r', '\n']) {
        return Some(text.to_string());
    }

    let line = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1
00:00:01,000 --> 00:00:04,000
Hello, how are you?

2
00:00:05,000 --> 00:00:08,000
I'm doing great, thank you!

3
00:00:09,000 --> 00:00:12,000
That's wonderful to hear.";

    const MULTILINE: &str = "1
00:00:01,000 --> 00:00:04,000
Line A
Line B

2
00:00:05,000 --> 00:00:08,000
Line C";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple_srt() {
        let document = parse(SAMPLE);
        let entries = document.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].start_time, "00:00:01,000");
        assert_eq!(entries[0].end_time, "00:00:04,000");
        assert_eq!(entries[0].text, "Hello, how are you?");
        assert_eq!(entries[2].text, "That's wonderful to hear.");
    }

    #[test]
    fn test_parse_multiline_subtitle() {
        let document = parse(MULTILINE);

        assert_eq!(document.entries().len(), 2);
        assert_eq!(document.entries()[0].text, "Line A\nLine B");
        assert_eq!(document.units(), strings(&["Line A", "Line B", "Line C"]));

        let map: Vec<(usize, usize)> = document
            .unit_map()
            .iter()
            .map(|unit| (unit.entry_index, unit.line_index))
            .collect();
        assert_eq!(map, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_parse_handles_different_line_endings() {
        let crlf = "1\r\n00:00:01,000 --> 00:00:04,000\r\nHello\r\n\r\n2\r\n00:00:05,000 --> 00:00:08,000\r\nWorld";
        let cr = crlf.replace("\r\n", "\r");

        for content in [crlf.to_string(), cr] {
            let document = parse(&content);
            assert_eq!(document.entries().len(), 2);
            assert_eq!(document.entries()[0].text, "Hello");
            assert_eq!(document.entries()[1].text, "World");
        }
    }

    #[test]
    fn test_parse_strips_byte_order_mark() {
        let content = format!("\u{feff}{}", SAMPLE);
        let document = parse(&content);
        assert_eq!(document.entries().len(), 3);
        assert_eq!(document.entries()[0].index, 1);
    }

    #[test]
    fn test_parse_keeps_dot_separator_and_index_verbatim() {
        let content = "42\n00:01:02.345-->00:01:03.000\nDotted\n\n7\n00:01:04,000 --> 00:01:05,000\nBack";
        let document = parse(content);

        assert_eq!(document.entries()[0].index, 42);
        assert_eq!(document.entries()[0].start_time, "00:01:02.345");
        assert_eq!(document.entries()[1].index, 7);

        let output = reconstruct(&document, &document.units());
        assert!(output.starts_with("42\n00:01:02.345 --> 00:01:03.000\nDotted"));
    }

    #[test]
    fn test_parse_accepts_multiple_and_whitespace_blank_lines() {
        let content = "1\n00:00:01,000 --> 00:00:02,000\nOne\n\n\n  \n2\n00:00:03,000 --> 00:00:04,000\nTwo\n";
        let document = parse(content);
        assert_eq!(document.entries().len(), 2);
        assert_eq!(document.entries()[1].text, "Two");
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let content = "1
00:00:01,000 --> 00:00:04,000
Kept

2
Missing timestamp line here
Dropped

three
00:00:05,000 --> 00:00:06,000
Bad index

4
00:00:07,000 --> 00:00:08,000
Also kept";

        let document = parse(content);
        assert_eq!(document.entries().len(), 2);
        assert_eq!(document.entries()[0].text, "Kept");
        assert_eq!(document.entries()[1].index, 4);
        assert_eq!(document.unit_count(), 2);
    }

    #[test]
    fn test_missing_timestamp_removes_exactly_one_entry() {
        let broken = SAMPLE.replace("00:00:05,000 --> 00:00:08,000\n", "");
        assert_eq!(parse(SAMPLE).entries().len(), 3);
        assert_eq!(parse(&broken).entries().len(), 2);
    }

    #[test]
    fn test_short_block_is_skipped() {
        let document = parse("1\n00:00:01,000 --> 00:00:02,000");
        assert!(document.is_empty());
    }

    #[test]
    fn test_empty_content() {
        assert!(parse("").is_empty());
        assert!(parse(" \n\r\n ").is_empty());
        assert_eq!(reconstruct(&parse(""), &[]), "");
    }

    #[test]
    fn test_reconstruct_srt() {
        let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\n\n2\n00:00:05,000 --> 00:00:08,000\nWorld";
        let document = parse(content);

        let output = reconstruct(&document, &strings(&["Merhaba", "Dünya"]));
        assert_eq!(
            output,
            "1\n00:00:01,000 --> 00:00:04,000\nMerhaba\n\n2\n00:00:05,000 --> 00:00:08,000\nDünya"
        );
    }

    #[test]
    fn test_round_trip_identity() {
        for content in [SAMPLE, MULTILINE] {
            let document = parse(content);
            let output = reconstruct(&document, &document.units());
            assert_eq!(output, content);
            assert_eq!(parse(&output), document);
        }
    }

    #[test]
    fn test_round_trip_of_messy_input_is_stable() {
        let messy = "\u{feff}  5\r\n00:00:01.000 --> 00:00:02.000 X1:10\r\n  first  \r\nsecond\r\n\r\n\r\nnot a block\r\n\r\n6\r\n00:00:03,000 --> 00:00:04,000\r\nthird\r\n";
        let document = parse(messy);
        let output = reconstruct(&document, &document.units());
        let reparsed = parse(&output);

        assert_eq!(reparsed.entries(), document.entries());
        assert_eq!(reparsed.unit_map(), document.unit_map());
    }

    #[test]
    fn test_reconstruct_with_fewer_units_never_mixes() {
        let document = parse(MULTILINE);

        // Only "Line A" delivered: entry 0 is incomplete, entry 1 untouched
        let output = reconstruct(&document, &strings(&["Satır A"]));
        assert_eq!(output, MULTILINE);

        // Entry 0 fully covered, entry 1 missing
        let output = reconstruct(&document, &strings(&["Satır A", "Satır B"]));
        let reparsed = parse(&output);
        assert_eq!(reparsed.entries()[0].text, "Satır A\nSatır B");
        assert_eq!(reparsed.entries()[1].text, "Line C");
    }

    #[test]
    fn test_reconstruct_ignores_surplus_units() {
        let document = parse(MULTILINE);
        let output = reconstruct(&document, &strings(&["a", "b", "c", "d", "e"]));
        let reparsed = parse(&output);

        assert_eq!(reparsed.entries().len(), 2);
        assert_eq!(reparsed.entries()[1].text, "c");
    }

    #[test]
    fn test_reconstruct_placeholder_keeps_source_text() {
        let document = parse(SAMPLE);
        let translated = strings(&["Merhaba", "[Translation Error]", "Harika"]);

        let output = reconstruct_with_placeholder(&document, &translated, "[Translation Error]");
        let reparsed = parse(&output);

        assert_eq!(reparsed.entries()[0].text, "Merhaba");
        assert_eq!(reparsed.entries()[1].text, "I'm doing great, thank you!");
        assert_eq!(reparsed.entries()[2].text, "Harika");
        assert!(!output.contains("[Translation Error]"));
    }

    #[test]
    fn test_reconstruct_blank_translation_falls_back() {
        let document = parse(MULTILINE);
        let output = reconstruct(&document, &strings(&["Satır A", "   ", "Satır C"]));
        let reparsed = parse(&output);

        assert_eq!(reparsed.entries()[0].text, "Line A\nLine B");
        assert_eq!(reparsed.entries()[1].text, "Satır C");
    }

    #[test]
    fn test_reconstruct_folds_line_breaks_in_units() {
        let document = parse(SAMPLE);
        let output = reconstruct(&document, &strings(&["a\n\nb", "c", "d"]));
        let reparsed = parse(&output);

        assert_eq!(reparsed.entries().len(), 3);
        assert_eq!(reparsed.entries()[0].text, "a b");
    }

    #[test]
    fn test_report_marks_fallen_back_entries() {
        let document = parse("1\n00:00:01,000 --> 00:00:02,000\nLine A\nLine B\n\n2\n00:00:03,000 --> 00:00:04,000\nLine C");
        let report = reconstruct_with_report(&document, &strings(&["X", "", "Y"]), "[Translation Error]");

        assert_eq!(report.translated, vec![false, true]);
        assert_eq!(report.translated_units(&document), 1);
        assert!(report.content.contains("Line A\nLine B"));
        assert!(report.content.ends_with("\nY"));
    }
}
