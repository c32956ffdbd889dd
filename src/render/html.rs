//! Standalone HTML output for a heatmap [`Plot`].

use std::fs;
use std::path::Path;

use plotly::Plot;
use tracing::info;

use crate::error::Result;

/// Where the page loads plotly.js from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlotlyJs {
    /// Bundle embedded in the page, so the file opens offline.
    #[default]
    Embedded,
    /// `<script src>` tags pointing at the public plotly.js CDN.
    Cdn,
}

impl PlotlyJs {
    pub fn from_cdn_flag(cdn: bool) -> Self {
        if cdn {
            PlotlyJs::Cdn
        } else {
            PlotlyJs::Embedded
        }
    }
}

/// Renders the complete HTML document for `plot`.
pub fn render_html(mut plot: Plot, plotly_js: PlotlyJs) -> String {
    // Plots are created with the bundle embedded
    if plotly_js == PlotlyJs::Cdn {
        plot.use_cdn_js();
    }
    plot.to_html()
}

/// Writes `plot` as a standalone HTML page at `path`.
#[tracing::instrument(skip(plot), fields(path = %path.as_ref().display()))]
pub fn write_html(path: impl AsRef<Path>, plot: Plot, plotly_js: PlotlyJs) -> Result<()> {
    let frames = plot.frame_count();
    let html = render_html(plot, plotly_js);
    fs::write(path.as_ref(), &html)?;
    info!(bytes = html.len(), frames, "Heatmap written");
    Ok(())
}
