use thiserror::Error;

/// Errors raised by the load, bucket and render stages.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// A designated column is not present in the input header
    #[error("missing column '{0}' in input header")]
    MissingColumn(String),

    /// A cell in a designated column could not be parsed
    #[error("row {row}: cannot parse {column} value '{value}'")]
    BadCell {
        row: usize,
        column: String,
        value: String,
    },

    /// Degenerate generator or loader settings
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Nothing to animate
    #[error("no animation frames: input produced zero rows")]
    EmptyFrames,

    /// A plotly control (play/pause button) could not be built
    #[error("chart control error: {0}")]
    Control(#[from] plotly::layout::ControlBuilderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, HeatmapError>;
