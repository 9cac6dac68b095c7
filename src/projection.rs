//! Web Mercator projection fitted to the rendered shapes.

use geo::{Coord, MultiPolygon};

/// Latitudes beyond this fold to the edge of the Mercator plane.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// How the projection is scaled and positioned inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Fit the geometry's bounding box to the viewport before applying
    /// `scale` and `translate`.
    pub fit_size: bool,
    /// Multiplier on top of the fitted (or default) scale.
    pub scale: f64,
    /// Pixel offset added after projection.
    pub translate: (f64, f64),
    /// Width and height of the map viewport in pixels.
    pub viewport: (f64, f64),
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fit_size: true,
            scale: 1.0,
            translate: (0.0, 0.0),
            viewport: (600.0, 600.0),
        }
    }
}

/// A resolved lon/lat to pixel mapping. Building one is deterministic:
/// the same shapes and config always produce the same projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
    translate: (f64, f64),
}

impl Projection {
    /// Computes the projection for a set of shapes. With `fit_size` the
    /// raw Mercator bounds of the shapes are fitted to the viewport the
    /// way d3's `fitSize` does; the user scale then multiplies the
    /// fitted factor and the user translate shifts the result.
    pub fn build<'a, I>(shapes: I, config: &ProjectionConfig) -> Self
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>>,
    {
        let (width, height) = config.viewport;
        let fitted = if config.fit_size { raw_bounds(shapes) } else { None };
        let (k, tx, ty) = match fitted {
            Some((x0, y0, x1, y1)) => {
                let dx = x1 - x0;
                let dy = y1 - y0;
                let mut k = f64::INFINITY;
                if dx > 0.0 {
                    k = k.min(width / dx);
                }
                if dy > 0.0 {
                    k = k.min(height / dy);
                }
                if !k.is_finite() {
                    k = width / std::f64::consts::TAU;
                }
                (
                    k,
                    (width - k * (x0 + x1)) / 2.0,
                    (height - k * (y0 + y1)) / 2.0,
                )
            }
            None => (width / std::f64::consts::TAU, width / 2.0, height / 2.0),
        };
        Self {
            scale: k * config.scale,
            translate: (tx + config.translate.0, ty + config.translate.1),
        }
    }

    /// Pixels per raw Mercator unit.
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    /// Projects a lon/lat coordinate (degrees) to viewport pixels.
    pub fn project(&self, coord: Coord<f64>) -> (f64, f64) {
        let (x, y) = mercator_raw(coord.x, coord.y);
        (
            x * self.scale + self.translate.0,
            y * self.scale + self.translate.1,
        )
    }
}

/// Spherical Mercator on a unit sphere, y growing screen-down.
fn mercator_raw(lon_deg: f64, lat_deg: f64) -> (f64, f64) {
    let lon = lon_deg.to_radians();
    let lat = lat_deg.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    (lon, -y)
}

/// Bounding box of the shapes on the raw Mercator plane.
fn raw_bounds<'a, I>(shapes: I) -> Option<(f64, f64, f64, f64)>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for multi in shapes {
        for polygon in &multi.0 {
            let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors().iter());
            for ring in rings {
                for &coord in &ring.0 {
                    let (x, y) = mercator_raw(coord.x, coord.y);
                    if !x.is_finite() || !y.is_finite() {
                        continue;
                    }
                    bounds = Some(match bounds {
                        Some((x0, y0, x1, y1)) => {
                            (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
                        }
                        None => (x, y, x, y),
                    });
                }
            }
        }
    }
    bounds
}
