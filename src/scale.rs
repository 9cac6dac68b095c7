//! Linear two-stop color scale over a numeric domain.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::HeatmapError;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());
static RGB_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$").unwrap());

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Parses `#rgb`, `#rrggbb` or `rgb(r, g, b)` notation.
pub fn parse_color(input: &str) -> Result<Rgb, HeatmapError> {
    let trimmed = input.trim();
    if HEX_COLOR.is_match(trimmed) {
        return parse_hex(&trimmed[1..]).ok_or_else(|| HeatmapError::InvalidColor(input.to_string()));
    }
    if let Some(caps) = RGB_COLOR.captures(trimmed) {
        let channel = |i: usize| -> Option<u8> {
            caps.get(i)?.as_str().parse::<u16>().ok().map(|v| v.min(255) as u8)
        };
        if let (Some(r), Some(g), Some(b)) = (channel(1), channel(2), channel(3)) {
            return Ok(Rgb { r, g, b });
        }
    }
    Err(HeatmapError::InvalidColor(input.to_string()))
}

fn parse_hex(digits: &str) -> Option<Rgb> {
    if digits.len() == 3 {
        let expand = |i: usize| -> Option<u8> {
            let nibble = u8::from_str_radix(digits.get(i..i + 1)?, 16).ok()?;
            Some(nibble * 17)
        };
        Some(Rgb { r: expand(0)?, g: expand(1)?, b: expand(2)? })
    } else {
        let pair = |i: usize| -> Option<u8> {
            u8::from_str_radix(digits.get(i..i + 2)?, 16).ok()
        };
        Some(Rgb { r: pair(0)?, g: pair(2)?, b: pair(4)? })
    }
}

/// Maps a numeric domain onto a color range by per-channel linear
/// interpolation, the way d3's `scaleLinear` does for two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    domain: (f64, f64),
    start: Rgb,
    end: Rgb,
}

impl ColorScale {
    pub fn new(domain: (f64, f64), range: (&str, &str)) -> Result<Self, HeatmapError> {
        Ok(Self {
            domain,
            start: parse_color(range.0)?,
            end: parse_color(range.1)?,
        })
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// The interpolated color for `value`, as an `rgb(r,g,b)` string.
    ///
    /// Values outside the domain extrapolate; channels saturate at the
    /// 0..=255 bounds. A zero-width domain maps everything to the
    /// midpoint of the range.
    pub fn color_at(&self, value: f64) -> String {
        let (min, max) = self.domain;
        let span = max - min;
        let t = if span == 0.0 { 0.5 } else { (value - min) / span };
        self.blend(t).to_string()
    }

    fn blend(&self, t: f64) -> Rgb {
        Rgb {
            r: channel(self.start.r, self.end.r, t),
            g: channel(self.start.g, self.end.g, t),
            b: channel(self.start.b, self.end.b, t),
        }
    }
}

fn channel(a: u8, b: u8, t: f64) -> u8 {
    let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
    v.round().clamp(0.0, 255.0) as u8
}
