// SRT document model and codec
//
// - model: entries and the unit map that ties flattened lines back to entries
// - srt: lenient parsing and placeholder-aware reconstruction

pub mod model;
pub mod srt;

use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

pub use model::{Document, SubtitleEntry, UnitRef};
pub use srt::{Reconstruction, parse, reconstruct, reconstruct_with_placeholder, reconstruct_with_report};

use crate::error::{Result, SubtransError};

/// Read SRT content from disk
pub async fn read_srt<P: AsRef<Path>>(input_path: P) -> Result<String> {
    let input_path = input_path.as_ref();
    if !input_path.exists() {
        return Err(SubtransError::FileNotFound(input_path.display().to_string()));
    }

    info!("Reading SRT file: {}", input_path.display());
    let bytes = fs::read(input_path).await?;
    Ok(decode(bytes))
}

/// UTF-8 when valid, otherwise ISO-8859-1, where every byte is one code point
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => {
            debug!("Input is not valid UTF-8 ({}), decoding as ISO-8859-1", e);
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

/// Write SRT content to disk, ending the file with a newline
pub async fn write_srt<P: AsRef<Path>>(content: &str, output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing SRT file: {}", output_path.display());

    let mut srt_content = content.to_string();
    if !srt_content.is_empty() && !srt_content.ends_with('\n') {
        srt_content.push('\n');
    }

    fs::write(output_path, srt_content).await?;

    info!("SRT file written successfully");
    Ok(())
}
