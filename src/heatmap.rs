//! Heatmap composition root.
//!
//! Owns the topology, the dataset and the overlay slots, and turns them
//! into a standalone SVG document. Decoded shapes and the fitted
//! projection are cached per topology revision; swapping the topology
//! re-validates the dataset and rebuilds both on the next render.

use std::sync::atomic::{AtomicU64, Ordering};

use geo::MultiPolygon;

use crate::data::{DataMap, Metadata};
use crate::error::HeatmapError;
use crate::legend::{self, LegendProps};
use crate::projection::{Projection, ProjectionConfig};
use crate::render::{self, RegionAttrs};
use crate::scale::ColorScale;
use crate::slot::{find_slot, Slot, SlotKind};
use crate::style::Style;
use crate::tooltip::{self, TooltipProps};
use crate::topology::{Geometry, Topology};
use crate::validate;

/// Default fill range, light to saturated blue.
pub const DEFAULT_COLOR_RANGE: (&str, &str) = ("#90caff", "#2998ff");
pub const DEFAULT_ID_PATH: &str = "id";

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// Invoked with the clicked region's geometry.
pub type ClickHandler = Box<dyn Fn(&Geometry)>;

pub struct Heatmap {
    topology: Topology,
    data: DataMap,
    metadata: Option<Metadata>,
    id_path: String,
    domain: Option<(f64, f64)>,
    color_range: (String, String),
    projection_config: ProjectionConfig,
    children: Vec<Slot>,
    on_click: Option<ClickHandler>,
    style: Style,
    instance: u64,
    revision: u64,
    view: Option<View>,
}

struct View {
    revision: u64,
    projection: Projection,
    regions: Vec<Region>,
}

struct Region {
    geometry: Geometry,
    shape: MultiPolygon<f64>,
}

impl Heatmap {
    pub fn new(topology: Topology, data: DataMap) -> Self {
        Self {
            topology,
            data,
            metadata: None,
            id_path: DEFAULT_ID_PATH.to_string(),
            domain: None,
            color_range: (
                DEFAULT_COLOR_RANGE.0.to_string(),
                DEFAULT_COLOR_RANGE.1.to_string(),
            ),
            projection_config: ProjectionConfig::default(),
            children: Vec::new(),
            on_click: None,
            style: Style::default(),
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            revision: 0,
            view: None,
        }
    }

    /// Parses a TopoJSON document and builds a heatmap over it.
    pub fn from_json(text: &str, data: DataMap) -> Result<Self, HeatmapError> {
        Ok(Self::new(Topology::from_json(text)?, data))
    }

    /// Path resolved against each geometry to identify its region,
    /// e.g. `id` or `properties.name`.
    pub fn with_id_path(mut self, id_path: impl Into<String>) -> Self {
        self.id_path = id_path.into();
        self.revision += 1;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Fixes the color domain instead of inferring `[0, max(data)]`.
    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_color_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.color_range = (start.into(), end.into());
        self
    }

    pub fn with_fit_size(mut self, fit_size: bool) -> Self {
        self.projection_config.fit_size = fit_size;
        self.revision += 1;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.projection_config.scale = scale;
        self.revision += 1;
        self
    }

    pub fn with_translate(mut self, x: f64, y: f64) -> Self {
        self.projection_config.translate = (x, y);
        self.revision += 1;
        self
    }

    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.projection_config.viewport = (width, height);
        self.revision += 1;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Attaches an overlay slot. Only the first slot of each kind is
    /// consulted when rendering.
    pub fn with_child(mut self, child: Slot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_on_click(mut self, handler: impl Fn(&Geometry) + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    /// Swaps the topology and invalidates the cached view; the next
    /// render re-validates and rebuilds shapes and projection.
    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
        self.revision += 1;
    }

    /// Replaces the dataset. Colors pick the new values up on the next
    /// render without rebuilding the cached shapes.
    pub fn set_data(&mut self, data: DataMap) {
        self.data = data;
    }

    pub fn set_metadata(&mut self, metadata: Option<Metadata>) {
        self.metadata = metadata;
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Id of the tooltip container regions point at through
    /// `data-tooltip-id`.
    pub fn tooltip_id(&self) -> String {
        format!("tooltip-{}", self.instance)
    }

    /// Id stamped on the region's `<path>` element.
    pub fn region_element_id(&self, geo_id: &str) -> String {
        format!("geo-{}-{}", self.instance, geo_id)
    }

    /// The color domain in effect: the explicit one, or `[0, max]`
    /// over the data values (`[0, 0]` for an empty dataset).
    pub fn effective_domain(&self) -> (f64, f64) {
        match self.domain {
            Some(domain) => domain,
            None => {
                let max = self.data.values().copied().fold(f64::NEG_INFINITY, f64::max);
                (0.0, if max.is_finite() { max } else { 0.0 })
            }
        }
    }

    /// The projection the current topology renders with.
    pub fn projection(&mut self) -> Result<Projection, HeatmapError> {
        self.ensure_view()?;
        match &self.view {
            Some(view) => Ok(view.projection),
            None => Err(HeatmapError::EmptyTopology),
        }
    }

    /// Renders the heatmap to a standalone SVG document.
    pub fn render(&mut self) -> Result<String, HeatmapError> {
        self.ensure_view()?;
        let view = match &self.view {
            Some(view) => view,
            None => return Err(HeatmapError::EmptyTopology),
        };
        let domain = self.effective_domain();
        let scale = ColorScale::new(domain, (&self.color_range.0, &self.color_range.1))?;
        let legend_props = LegendProps::from_slot(find_slot(&self.children, SlotKind::Legend));
        let tooltip_props = TooltipProps::from_slot(find_slot(&self.children, SlotKind::Tooltip));
        let tooltip_id = self.tooltip_id();
        let clickable = self.on_click.is_some();

        let mut regions = Vec::with_capacity(view.regions.len());
        for region in &view.regions {
            let d = render::path_data(&region.shape, &view.projection);
            if d.is_empty() {
                continue;
            }
            let key = region.geometry.identifier(&self.id_path).canonical();
            let value = self.data.get(&key).copied().unwrap_or(0.0);
            let tooltip_html = tooltip::content_for(&key, self.metadata.as_ref(), tooltip_props);
            regions.push(render::region_element(
                &d,
                &RegionAttrs {
                    element_id: &self.region_element_id(&key),
                    fill: &scale.color_at(value),
                    tooltip_id: &tooltip_id,
                    tooltip_html: &tooltip_html,
                    clickable,
                },
                &self.style,
            ));
        }

        let legend_band = legend_props.map(|props| {
            let legend_domain = props.domain.unwrap_or(domain);
            legend::render_group(props, legend_domain, &scale, &self.style)
        });

        let engine_attrs = match tooltip_props {
            Some(props) => format!(
                " data-tooltip-trigger=\"{}\" data-tooltip-float=\"{}\" data-tooltip-place=\"{}\"",
                props.trigger.as_str(),
                props.float,
                props.position.as_str()
            ),
            None => String::new(),
        };

        Ok(render::document(
            self.projection_config.viewport,
            legend_band.as_deref(),
            &regions,
            &engine_attrs,
            &self.style,
        ))
    }

    /// Dispatches a click on the region identified by `geo_id` to the
    /// registered handler. Returns whether a handler ran.
    pub fn handle_click(&mut self, geo_id: &str) -> bool {
        if self.on_click.is_none() {
            return false;
        }
        if self.ensure_view().is_err() {
            return false;
        }
        let Some(view) = self.view.as_ref() else {
            return false;
        };
        let region = view
            .regions
            .iter()
            .find(|region| region.geometry.identifier(&self.id_path).canonical() == geo_id);
        match (region, &self.on_click) {
            (Some(region), Some(handler)) => {
                handler(&region.geometry);
                true
            }
            _ => false,
        }
    }

    fn ensure_view(&mut self) -> Result<(), HeatmapError> {
        if matches!(&self.view, Some(view) if view.revision == self.revision) {
            return Ok(());
        }
        let report = validate::run(&self.topology, &self.data, self.metadata.as_ref(), &self.id_path);
        report.log();
        let geometries = self.topology.regions().ok_or(HeatmapError::EmptyTopology)?;
        let arcs = self.topology.decode_arcs();
        let mut regions = Vec::with_capacity(geometries.len());
        for geometry in geometries {
            let shape = geometry.decode(&arcs)?;
            regions.push(Region { geometry: geometry.clone(), shape });
        }
        let projection = Projection::build(
            regions.iter().map(|region| &region.shape),
            &self.projection_config,
        );
        self.view = Some(View { revision: self.revision, projection, regions });
        Ok(())
    }
}
