use plotly::common::ColorScaleElement;
use plotly::layout::MapboxStyle;
use serde::{Deserialize, Serialize};

use crate::error::{HeatmapError, Result};

/// Black → red → yellow → white, the plotly "Hot" sequential ramp.
pub const HOT: [&str; 4] = [
    "rgb(0,0,0)",
    "rgb(230,0,0)",
    "rgb(255,210,0)",
    "rgb(255,255,255)",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

/// Placement and sizing of the color-intensity legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorBarStyle {
    pub title: String,
    /// Thickness in pixels.
    pub thickness: usize,
    /// Length in pixels; 315 is 70% of the default 450px plot height.
    pub len: usize,
    pub x: f64,
    pub y: f64,
}

impl Default for ColorBarStyle {
    fn default() -> Self {
        Self {
            title: "Density".to_string(),
            thickness: 20,
            len: 315,
            x: 0.02,
            y: 0.5,
        }
    }
}

/// Visual and timing parameters of the heatmap.
///
/// Loaded from JSON with every field optional, e.g.
/// ```json
/// { "radius": 8, "zoom": 4, "map_style": "open-street-map" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    /// Derived from the first and last frame when unset.
    pub title: Option<String>,
    pub radius: f64,
    /// Integral mapbox zoom level.
    pub zoom: u8,
    pub center: MapCenter,
    pub map_style: String,
    /// Colors spread evenly from 0 to 1.
    pub color_scale: Vec<String>,
    pub colorbar: ColorBarStyle,
    pub frame_duration_ms: usize,
    pub transition_duration_ms: usize,
    pub slider_transition_ms: usize,
    pub margin_top: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: None,
            radius: 6.0,
            zoom: 3,
            center: MapCenter {
                lat: 39.8,
                lon: -98.6,
            },
            map_style: "carto-darkmatter".to_string(),
            color_scale: HOT.iter().map(|c| c.to_string()).collect(),
            colorbar: ColorBarStyle::default(),
            frame_duration_ms: 1000,
            transition_duration_ms: 500,
            slider_transition_ms: 100,
            margin_top: 50,
        }
    }
}

impl ChartStyle {
    /// Loads a style from a JSON file at `path`; missing fields keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Color scale as `[position, color]` stops.
    pub fn color_stops(&self) -> Vec<ColorScaleElement> {
        let last = self.color_scale.len().saturating_sub(1).max(1) as f64;
        self.color_scale
            .iter()
            .enumerate()
            .map(|(i, c)| ColorScaleElement(i as f64 / last, c.clone()))
            .collect()
    }

    /// Maps the plotly.js style name onto the mapbox style plotly knows.
    pub fn mapbox_style(&self) -> Result<MapboxStyle> {
        let style = match self.map_style.as_str() {
            "carto-darkmatter" => MapboxStyle::CartoDarkMatter,
            "carto-positron" => MapboxStyle::CartoPositron,
            "open-street-map" => MapboxStyle::OpenStreetMap,
            "stamen-terrain" => MapboxStyle::StamenTerrain,
            "stamen-toner" => MapboxStyle::StamenToner,
            "stamen-watercolor" => MapboxStyle::StamenWatercolor,
            "white-bg" => MapboxStyle::WhiteBg,
            "basic" => MapboxStyle::Basic,
            "streets" => MapboxStyle::Streets,
            "outdoors" => MapboxStyle::Outdoors,
            "light" => MapboxStyle::Light,
            "dark" => MapboxStyle::Dark,
            "satellite" => MapboxStyle::Satellite,
            "satellite-streets" => MapboxStyle::SatelliteStreets,
            other => {
                return Err(HeatmapError::Config(format!("unknown map style '{}'", other)));
            }
        };
        Ok(style)
    }
}
