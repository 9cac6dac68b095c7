//! Visual defaults for the rendered document.

use serde::{Deserialize, Serialize};

/// Colors and sizes applied to the generated SVG. Every field has a
/// default, so hosts can deserialize a partial style from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Document background; `transparent` suppresses the backdrop rect.
    pub background: String,
    pub region_stroke: String,
    pub region_stroke_width: f64,
    pub font_family: String,
    pub font_size: f64,
    pub text_color: String,
    /// Height of the band reserved above the map when a legend renders.
    pub legend_band_height: f64,
    pub legend_swatch_size: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: "transparent".to_string(),
            region_stroke: "#ffffff".to_string(),
            region_stroke_width: 0.5,
            font_family: "Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#1c2430".to_string(),
            legend_band_height: 48.0,
            legend_swatch_size: 14.0,
        }
    }
}
