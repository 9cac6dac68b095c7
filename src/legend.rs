//! Legend band: discrete steps sampled off the active color scale.

use std::fmt;

use crate::render::escape_xml;
use crate::scale::ColorScale;
use crate::slot::Slot;
use crate::style::Style;

pub const DEFAULT_STEP_SIZE: f64 = 5.0;
pub const DEFAULT_LABEL: &str = "Legend";

/// Bounds degenerate step sizes.
const MAX_TICKS: usize = 1024;

/// Maps a tick value to its swatch color.
pub type LegendColorFn = Box<dyn Fn(f64) -> String>;
/// Formats a tick value for display.
pub type LegendFormatFn = Box<dyn Fn(f64) -> String>;

/// Configuration carried by a legend slot.
pub struct LegendProps {
    /// Value range the legend spans; falls back to the heatmap's
    /// effective domain when absent.
    pub domain: Option<(f64, f64)>,
    /// Distance between consecutive ticks.
    pub step_size: f64,
    /// Swatch palette override; falls back to the heatmap's scale.
    pub color_scale: Option<LegendColorFn>,
    /// Tick label override; the default prints up to two decimals.
    pub formatter: Option<LegendFormatFn>,
    pub label: String,
}

impl Default for LegendProps {
    fn default() -> Self {
        Self {
            domain: None,
            step_size: DEFAULT_STEP_SIZE,
            color_scale: None,
            formatter: None,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl fmt::Debug for LegendProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegendProps")
            .field("domain", &self.domain)
            .field("step_size", &self.step_size)
            .field("color_scale", &self.color_scale.is_some())
            .field("formatter", &self.formatter.is_some())
            .field("label", &self.label)
            .finish()
    }
}

impl LegendProps {
    /// Extracts legend configuration from a slot, if it is one.
    pub fn from_slot(slot: Option<&Slot>) -> Option<&Self> {
        match slot {
            Some(Slot::Legend(props)) => Some(props),
            _ => None,
        }
    }

    pub fn with_color_scale(mut self, color_scale: impl Fn(f64) -> String + 'static) -> Self {
        self.color_scale = Some(Box::new(color_scale));
        self
    }

    pub fn with_formatter(mut self, formatter: impl Fn(f64) -> String + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }
}

/// Tick values covering `domain` from its minimum in `step_size`
/// increments. The count is `floor(span / step) + 1`, so the maximum
/// appears only when the step lands on it exactly.
pub fn tick_values(domain: (f64, f64), step_size: f64) -> Vec<f64> {
    let step = if step_size.is_finite() && step_size > 0.0 {
        step_size
    } else {
        DEFAULT_STEP_SIZE
    };
    let (min, max) = domain;
    let span = max - min;
    if !span.is_finite() || span < 0.0 {
        return Vec::new();
    }
    let count = ((span / step).floor() as usize + 1).min(MAX_TICKS);
    (0..count).map(|i| min + i as f64 * step).collect()
}

/// Default tick formatting: up to two decimals, trailing zeros trimmed.
pub(crate) fn format_tick(value: f64) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Renders the legend band as a `<g>` sized to sit above the map.
/// `fallback` supplies swatch colors when the props carry no palette
/// of their own.
pub fn render_group(
    props: &LegendProps,
    domain: (f64, f64),
    fallback: &ColorScale,
    style: &Style,
) -> String {
    let ticks = tick_values(domain, props.step_size);
    let mut svg = String::new();
    svg.push_str("<g class=\"topo-heatmap__legend\">");
    let label_y = style.font_size + 2.0;
    if !props.label.is_empty() {
        svg.push_str(&format!(
            "<text x=\"8\" y=\"{label_y:.1}\" font-family=\"{}\" font-size=\"{:.1}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            escape_xml(&style.font_family),
            style.font_size,
            style.text_color,
            escape_xml(&props.label)
        ));
    }

    let swatch = style.legend_swatch_size;
    let swatch_y = label_y + 6.0;
    let text_y = swatch_y + swatch / 2.0 + style.font_size * 0.35;
    let labels: Vec<String> = ticks
        .iter()
        .map(|&value| match &props.formatter {
            Some(format) => format(value),
            None => format_tick(value),
        })
        .collect();
    let longest = labels.iter().map(|label| label.chars().count()).max().unwrap_or(0);
    let item_width = swatch + 6.0 + longest as f64 * style.font_size * 0.6 + 12.0;

    for (i, (&value, label)) in ticks.iter().zip(&labels).enumerate() {
        let color = match &props.color_scale {
            Some(scale) => scale(value),
            None => fallback.color_at(value),
        };
        let x = 8.0 + i as f64 * item_width;
        svg.push_str(&format!(
            "<rect x=\"{x:.1}\" y=\"{swatch_y:.1}\" width=\"{swatch:.1}\" height=\"{swatch:.1}\" fill=\"{}\"/>",
            escape_xml(&color)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{text_y:.1}\" font-family=\"{}\" font-size=\"{:.1}\" fill=\"{}\">{}</text>",
            x + swatch + 6.0,
            escape_xml(&style.font_family),
            style.font_size,
            style.text_color,
            escape_xml(label)
        ));
    }
    svg.push_str("</g>");
    svg
}

/// Renders the legend as a standalone SVG document.
pub fn render_svg(
    props: &LegendProps,
    domain: (f64, f64),
    fallback: &ColorScale,
    style: &Style,
    width: f64,
) -> String {
    let height = style.legend_band_height;
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">{}</svg>",
        render_group(props, domain, fallback, style)
    )
}
