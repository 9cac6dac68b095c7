//! SVG assembly.

use geo::MultiPolygon;

use crate::projection::Projection;
use crate::style::Style;

const ROOT_CLASS: &str = "topo-heatmap";
const MAP_CLASS: &str = "topo-heatmap__map";
const REGION_CLASS: &str = "topo-heatmap__region";

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Projects a shape's rings into one SVG path string. All rings of all
/// member polygons concatenate into a single `d`, holes included, so a
/// region is always one element.
pub fn path_data(shape: &MultiPolygon<f64>, projection: &Projection) -> String {
    let mut d = String::new();
    for polygon in &shape.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors().iter());
        for ring in rings {
            if ring.0.is_empty() {
                continue;
            }
            for (i, &coord) in ring.0.iter().enumerate() {
                let (x, y) = projection.project(coord);
                if i == 0 {
                    d.push_str(&format!("M {x:.2} {y:.2}"));
                } else {
                    d.push_str(&format!(" L {x:.2} {y:.2}"));
                }
            }
            d.push_str(" Z");
        }
    }
    d
}

pub(crate) struct RegionAttrs<'a> {
    pub element_id: &'a str,
    pub fill: &'a str,
    pub tooltip_id: &'a str,
    pub tooltip_html: &'a str,
    pub clickable: bool,
}

pub(crate) fn region_element(d: &str, attrs: &RegionAttrs<'_>, style: &Style) -> String {
    let mut element = String::with_capacity(d.len() + attrs.tooltip_html.len() + 192);
    element.push_str(&format!(
        "<path class=\"{REGION_CLASS}\" id=\"{}\" d=\"{d}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" stroke-linejoin=\"round\"",
        escape_xml(attrs.element_id),
        escape_xml(attrs.fill),
        escape_xml(&style.region_stroke),
        style.region_stroke_width,
    ));
    element.push_str(&format!(
        " data-tooltip-id=\"{}\" data-tooltip-html=\"{}\"",
        escape_xml(attrs.tooltip_id),
        escape_xml(attrs.tooltip_html),
    ));
    if attrs.clickable {
        element.push_str(" cursor=\"pointer\"");
    }
    element.push_str("/>");
    element
}

/// Assembles the final document. A legend band, when present, sits
/// above the map: the viewport grows by the band height and the map
/// group shifts down to make room.
pub(crate) fn document(
    viewport: (f64, f64),
    legend_band: Option<&str>,
    regions: &[String],
    engine_attrs: &str,
    style: &Style,
) -> String {
    let (width, height) = viewport;
    let band = if legend_band.is_some() { style.legend_band_height } else { 0.0 };
    let total = height + band;
    let body_len: usize = regions.iter().map(String::len).sum();
    let mut svg = String::with_capacity(body_len + 512);
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{total}\" viewBox=\"0 0 {width} {total}\" class=\"{ROOT_CLASS}\"{engine_attrs}>"
    ));
    if !style.background.is_empty() && style.background != "transparent" {
        svg.push_str(&format!(
            "<rect width=\"{width}\" height=\"{total}\" fill=\"{}\"/>",
            escape_xml(&style.background)
        ));
    }
    if let Some(band_markup) = legend_band {
        svg.push_str(band_markup);
        svg.push_str(&format!(
            "<g class=\"{MAP_CLASS}\" transform=\"translate(0 {band})\">"
        ));
    } else {
        svg.push_str(&format!("<g class=\"{MAP_CLASS}\">"));
    }
    for region in regions {
        svg.push_str(region);
    }
    svg.push_str("</g></svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionConfig;
    use geo::{LineString, Polygon};

    fn unit_square() -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![],
        )])
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn path_data_walks_the_ring_once() {
        let shape = unit_square();
        let projection = Projection::build([&shape], &ProjectionConfig::default());
        let d = path_data(&shape, &projection);
        assert!(d.starts_with("M "));
        assert!(d.ends_with(" Z"));
        assert_eq!(d.matches(" L ").count(), 4);
        assert_eq!(d.matches('M').count(), 1);
    }

    #[test]
    fn holes_become_separate_subpaths() {
        let shape = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (2.0, 2.0),
                (2.0, 4.0),
                (4.0, 4.0),
                (4.0, 2.0),
                (2.0, 2.0),
            ])],
        )]);
        let projection = Projection::build([&shape], &ProjectionConfig::default());
        let d = path_data(&shape, &projection);
        assert_eq!(d.matches('M').count(), 2);
        assert_eq!(d.matches('Z').count(), 2);
    }

    #[test]
    fn region_attributes_are_escaped() {
        let attrs = RegionAttrs {
            element_id: "geo-1-a&b",
            fill: "rgb(1,2,3)",
            tooltip_id: "tooltip-1",
            tooltip_html: "<div class=\"x\">hi</div>",
            clickable: true,
        };
        let element = region_element("M 0 0 Z", &attrs, &Style::default());
        assert!(element.contains("id=\"geo-1-a&amp;b\""));
        assert!(element.contains(
            "data-tooltip-html=\"&lt;div class=&quot;x&quot;&gt;hi&lt;/div&gt;\""
        ));
        assert!(element.contains("cursor=\"pointer\""));
    }

    #[test]
    fn non_clickable_regions_carry_no_cursor() {
        let attrs = RegionAttrs {
            element_id: "geo-1-a",
            fill: "rgb(1,2,3)",
            tooltip_id: "tooltip-1",
            tooltip_html: "",
            clickable: false,
        };
        let element = region_element("M 0 0 Z", &attrs, &Style::default());
        assert!(!element.contains("cursor"));
    }

    #[test]
    fn legend_band_grows_the_viewport_and_shifts_the_map() {
        let style = Style::default();
        let with_band = document(
            (600.0, 600.0),
            Some("<g class=\"topo-heatmap__legend\"/>"),
            &[],
            "",
            &style,
        );
        assert!(with_band.contains("viewBox=\"0 0 600 648\""));
        assert!(with_band.contains("transform=\"translate(0 48)\""));

        let without = document((600.0, 600.0), None, &[], "", &style);
        assert!(without.contains("viewBox=\"0 0 600 600\""));
        assert!(!without.contains("translate(0 48)"));
    }

    #[test]
    fn background_rect_only_when_opaque() {
        let mut style = Style::default();
        let transparent = document((600.0, 600.0), None, &[], "", &style);
        assert!(!transparent.contains("<rect"));

        style.background = "#101418".to_string();
        let opaque = document((600.0, 600.0), None, &[], "", &style);
        assert!(opaque.contains("<rect width=\"600\" height=\"600\" fill=\"#101418\"/>"));
    }
}
