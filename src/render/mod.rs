//! Heatmap rendering: chart style, the plotly figure, and HTML output.

pub mod figure;
pub mod html;
pub mod style;

pub use figure::{MonthDensity, build_figure};
pub use html::{PlotlyJs, render_html, write_html};
pub use style::ChartStyle;

use crate::bucket::BucketedTable;
use crate::error::Result;
use crate::output::write_frame_counts;

/// Where a rendered heatmap and its side files go.
#[derive(Debug, Clone, Default)]
pub struct RenderTarget {
    pub output: String,
    pub plotly_js: PlotlyJs,
    /// Per-frame row counts CSV, written only once the figure is built.
    pub frame_counts: Option<String>,
}

/// Builds the figure for `table` and writes the page plus any requested counts file.
///
/// Nothing is written if the figure cannot be built.
#[tracing::instrument(skip_all, fields(output = %target.output))]
pub fn render_heatmap(
    table: &BucketedTable,
    style: &ChartStyle,
    target: &RenderTarget,
) -> Result<()> {
    let plot = build_figure(table, style)?;

    if let Some(path) = &target.frame_counts {
        write_frame_counts(path, &table.frame_counts())?;
    }
    write_html(&target.output, plot, target.plotly_js)
}
