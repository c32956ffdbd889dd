//! Per-frame summaries: logging and CSV export of row counts.

use csv::WriterBuilder;
use tracing::{debug, info};

use crate::bucket::FrameCount;
use crate::error::Result;

/// Logs each frame with its row count.
pub fn log_frame_counts(counts: &[FrameCount]) {
    for c in counts {
        info!(frame = %c.frame, rows = c.rows, "Frame");
    }

    let total: usize = counts.iter().map(|c| c.rows).sum();
    let busiest = counts.iter().max_by_key(|c| c.rows);
    info!(
        frames = counts.len(),
        total,
        busiest = busiest.map(|c| c.frame.to_string()),
        "Frame summary"
    );
}

/// Logs frame counts as pretty-printed JSON.
pub fn print_json(counts: &[FrameCount]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(counts)?);
    Ok(())
}

/// Writes `frame,rows` lines to a CSV file, replacing any existing file.
pub fn write_frame_counts(path: &str, counts: &[FrameCount]) -> Result<()> {
    debug!(path, frames = counts.len(), "Writing frame counts CSV");

    let mut writer = WriterBuilder::new().has_headers(true).from_path(path)?;
    for c in counts {
        writer.serialize(c)?;
    }
    writer.flush()?;

    Ok(())
}
