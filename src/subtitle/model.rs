use serde::{Deserialize, Serialize};

/// A single subtitle cue as it appeared in the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Display index, kept as written even when not contiguous
    pub index: i64,
    /// Start timestamp exactly as captured (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`)
    pub start_time: String,
    /// End timestamp exactly as captured
    pub end_time: String,
    /// Cue text; multi-line cues keep their embedded newlines
    pub text: String,
}

impl SubtitleEntry {
    /// Timing line as emitted in SRT output
    pub fn timestamp(&self) -> String {
        format!("{} --> {}", self.start_time, self.end_time)
    }

    /// Number of translatable lines in this entry
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Location of one translatable line inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRef {
    pub entry_index: usize,
    pub line_index: usize,
}

impl From<(usize, usize)> for UnitRef {
    fn from((entry_index, line_index): (usize, usize)) -> Self {
        Self {
            entry_index,
            line_index,
        }
    }
}

/// Parsed subtitle document.
///
/// `unit_map[i]` locates the i-th flattened line returned by [`Document::units`].
/// Both are derived from `entries` at construction time and never change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: Vec<SubtitleEntry>,
    unit_map: Vec<UnitRef>,
}

impl Document {
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        let unit_map = entries
            .iter()
            .enumerate()
            .flat_map(|(entry_index, entry)| {
                (0..entry.line_count()).map(move |line_index| UnitRef {
                    entry_index,
                    line_index,
                })
            })
            .collect();

        Self { entries, unit_map }
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn unit_map(&self) -> &[UnitRef] {
        &self.unit_map
    }

    /// Flattened translatable lines in document order
    pub fn units(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|entry| entry.text.split('\n').map(str::to_string))
            .collect()
    }

    pub fn unit_count(&self) -> usize {
        self.unit_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
