use crate::error::{Result, SubtransError};

/// A run of consecutive units translated together so the backend sees
/// neighbouring lines as context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window<'a> {
    /// Ordinal of this window within the job
    pub index: usize,
    /// Position of the first unit in the flattened unit list
    pub offset: usize,
    pub units: &'a [String],
}

impl Window<'_> {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Partition `units` into consecutive windows of `window_size` units.
///
/// Every window except possibly the last holds exactly `window_size` units;
/// an empty slice yields no windows.
pub fn create_windows(units: &[String], window_size: usize) -> Result<Vec<Window<'_>>> {
    if window_size == 0 {
        return Err(SubtransError::Config(
            "context window size must be at least 1".to_string(),
        ));
    }

    Ok(units
        .chunks(window_size)
        .enumerate()
        .map(|(index, units)| Window {
            index,
            offset: index * window_size,
            units,
        })
        .collect())
}
