pub mod data;
pub mod error;
pub mod heatmap;
pub mod legend;
pub mod projection;
pub mod property;
pub mod render;
pub mod scale;
pub mod slot;
pub mod style;
pub mod tooltip;
pub mod topology;
pub mod validate;

pub use data::{DataMap, MetaItem, MetaValue, Metadata};
pub use error::HeatmapError;
pub use heatmap::{ClickHandler, Heatmap, DEFAULT_COLOR_RANGE, DEFAULT_ID_PATH};
pub use legend::{LegendProps, DEFAULT_STEP_SIZE};
pub use projection::{Projection, ProjectionConfig};
pub use property::PropertyValue;
pub use scale::ColorScale;
pub use slot::{find_slot, Slot, SlotKind};
pub use style::Style;
pub use tooltip::{TooltipPosition, TooltipProps, TooltipTrigger};
pub use topology::{Geometry, GeometryValue, NamedObject, Topology, Transform};
pub use validate::{Diagnostic, Severity, ValidationReport};
