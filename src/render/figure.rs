//! Animated `densitymapbox` heatmap assembled as a plotly [`Plot`].

use plotly::common::{Anchor, ColorBar, ColorScale, Font, Pad, PlotType, ThicknessMode, Ticks};
use plotly::layout::update_menu::{ButtonBuilder, UpdateMenu, UpdateMenuDirection, UpdateMenuType};
use plotly::layout::{
    Animation, AnimationEasing, AnimationMode, AnimationOptions, Center, ColorAxis, Frame,
    FrameSettings, Layout, Mapbox, Margin, Slider, SliderCurrentValue, SliderCurrentValueXAnchor,
    SliderMethod, SliderStep, SliderTransition, SliderTransitionEasing, TransitionSettings,
};
use plotly::{Plot, Trace, Traces};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::bucket::{BucketedTable, FrameLabel};
use crate::error::{HeatmapError, Result};
use crate::render::style::ChartStyle;

/// One month of accident locations drawn on the shared `coloraxis`.
///
/// plotly's own `DensityMapbox` has no `coloraxis` or `hovertemplate` and
/// only takes integral radii, so this trace serializes the fields directly.
#[derive(Debug, Clone, Serialize)]
pub struct MonthDensity {
    #[serde(rename = "type")]
    kind: PlotType,
    name: String,
    lat: Vec<f64>,
    lon: Vec<f64>,
    radius: f64,
    coloraxis: &'static str,
    subplot: &'static str,
    hovertemplate: String,
}

impl MonthDensity {
    fn new(table: &BucketedTable, label: FrameLabel, style: &ChartStyle) -> Box<Self> {
        let rows = table.frame_rows(label);
        Box::new(Self {
            kind: PlotType::DensityMapbox,
            name: String::new(),
            lat: rows.iter().map(|r| r.record.latitude).collect(),
            lon: rows.iter().map(|r| r.record.longitude).collect(),
            radius: style.radius,
            coloraxis: "coloraxis",
            subplot: "mapbox",
            hovertemplate: format!(
                "Month={}<br>Latitude=%{{lat}}<br>Longitude=%{{lon}}<extra></extra>",
                label
            ),
        })
    }
}

impl Trace for MonthDensity {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Builds the animated heatmap: one density trace per month, a play/pause
/// menu and a slider with one step per month.
///
/// # Errors
///
/// Returns [`HeatmapError::EmptyFrames`] if the table has no frames and
/// [`HeatmapError::Config`] for an unknown map style.
#[tracing::instrument(skip_all, fields(rows = table.rows.len(), frames = table.frames.len()))]
pub fn build_figure(table: &BucketedTable, style: &ChartStyle) -> Result<Plot> {
    let (first, last) = match (table.frames.first(), table.frames.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(HeatmapError::EmptyFrames),
    };
    let map_style = style.mapbox_style()?;

    let mut plot = Plot::new();
    // The initial view is the first month
    plot.add_trace(MonthDensity::new(table, first, style));
    for &label in &table.frames {
        let mut data = Traces::new();
        data.push(MonthDensity::new(table, label, style));
        plot.add_frame(Frame::new().name(label.to_string()).data(data));
    }
    debug!(frames = plot.frame_count(), "Frame traces built");

    let title = style
        .title
        .clone()
        .unwrap_or_else(|| default_title(first, last));

    let layout = Layout::new()
        .title(title)
        .margin(
            Margin::new()
                .right(0)
                .top(style.margin_top)
                .left(0)
                .bottom(0),
        )
        .mapbox(
            Mapbox::new()
                .center(Center::new(style.center.lat, style.center.lon))
                .zoom(style.zoom)
                .style(map_style),
        )
        .color_axis(
            ColorAxis::new()
                .color_scale(ColorScale::Vector(style.color_stops()))
                .color_bar(color_bar(style)),
        )
        .update_menus(vec![play_menu(style)?])
        .sliders(vec![month_slider(&table.frames, style)]);
    plot.set_layout(layout);

    info!(first = %first, last = %last, "Figure assembled");
    Ok(plot)
}

fn default_title(first: FrameLabel, last: FrameLabel) -> String {
    format!(
        "US Traffic Accidents Heatmap: Monthly Trend ({} - {})",
        first.month_year(),
        last.month_year()
    )
}

fn color_bar(style: &ChartStyle) -> ColorBar {
    ColorBar::new()
        .title(style.colorbar.title.as_str())
        .thickness_mode(ThicknessMode::Pixels)
        .thickness(style.colorbar.thickness)
        .len_mode(ThicknessMode::Pixels)
        .len(style.colorbar.len)
        .y_anchor(Anchor::Middle)
        .y(style.colorbar.y)
        .x_anchor(Anchor::Left)
        .x(style.colorbar.x)
        .ticks(Ticks::Outside)
}

fn play_menu(style: &ChartStyle) -> Result<UpdateMenu> {
    let play = Animation::all_frames().options(
        AnimationOptions::new()
            .frame(
                FrameSettings::new()
                    .duration(style.frame_duration_ms)
                    .redraw(true),
            )
            .mode(AnimationMode::Immediate)
            .fromcurrent(true)
            .transition(
                TransitionSettings::new()
                    .duration(style.transition_duration_ms)
                    .easing(AnimationEasing::Linear),
            ),
    );

    let buttons = vec![
        ButtonBuilder::new()
            .label("&#9654;")
            .animation(play)
            .build()?,
        ButtonBuilder::new()
            .label("&#9724;")
            .animation(Animation::pause())
            .build()?,
    ];

    Ok(UpdateMenu::new()
        .ty(UpdateMenuType::Buttons)
        .buttons(buttons)
        .direction(UpdateMenuDirection::Left)
        .pad(Pad::new(70, 0, 0))
        .show_active(false)
        .x(0.1)
        .x_anchor(Anchor::Right)
        .y(0.0)
        .y_anchor(Anchor::Top))
}

/// One step per month. Step `args` are `[[frame], {"mapbox.layers": []}]`:
/// jump to the frame and drop any overlay layers left on the map.
fn month_slider(frames: &[FrameLabel], style: &ChartStyle) -> Slider {
    let steps = frames
        .iter()
        .map(|label| {
            SliderStep::new()
                .label(label.to_string())
                .method(SliderMethod::Animate)
                .args(json!([[label], { "mapbox.layers": [] }]))
        })
        .collect();

    Slider::new()
        .active(0)
        .current_value(
            SliderCurrentValue::new()
                .font(Font::new().size(14).color("white"))
                .prefix("Date: ")
                .visible(true)
                .x_anchor(SliderCurrentValueXAnchor::Right),
        )
        .length(0.84)
        .pad(Pad::new(60, 10, 0))
        .steps(steps)
        .transition(
            SliderTransition::new()
                .duration(style.slider_transition_ms)
                .easing(SliderTransitionEasing::Linear),
        )
        .x(0.08)
        .x_anchor(Anchor::Left)
        .y(0.02)
        .y_anchor(Anchor::Top)
}
