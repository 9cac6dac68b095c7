//! Tooltip configuration and static payload markup.
//!
//! The SVG is inert on its own, so tooltips render ahead of time: every
//! region carries its payload in a `data-tooltip-html` attribute and the
//! host's tooltip engine shows it on interaction.

use std::fmt;

use crate::data::{MetaItem, Metadata};
use crate::render::escape_xml;
use crate::slot::Slot;

const TOOLTIP_CLASS: &str = "topo-heatmap__tooltip";

/// Builds the inner tooltip markup for one region's metadata record.
pub type TooltipContentFn = Box<dyn Fn(&MetaItem) -> String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipTrigger {
    #[default]
    Hover,
    Click,
}

impl TooltipTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::Click => "click",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TooltipPosition {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

impl TooltipPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// Configuration carried by a tooltip slot.
pub struct TooltipProps {
    pub trigger: TooltipTrigger,
    /// Follow the pointer instead of anchoring to the region.
    pub float: bool,
    pub position: TooltipPosition,
    /// Custom payload builder; the fallback shows the region identifier.
    pub content: Option<TooltipContentFn>,
}

impl Default for TooltipProps {
    fn default() -> Self {
        Self {
            trigger: TooltipTrigger::Hover,
            float: false,
            position: TooltipPosition::Top,
            content: None,
        }
    }
}

impl fmt::Debug for TooltipProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipProps")
            .field("trigger", &self.trigger)
            .field("float", &self.float)
            .field("position", &self.position)
            .field("content", &self.content.is_some())
            .finish()
    }
}

impl TooltipProps {
    /// Extracts tooltip configuration from a slot, if it is one.
    pub fn from_slot(slot: Option<&Slot>) -> Option<&Self> {
        match slot {
            Some(Slot::Tooltip(props)) => Some(props),
            _ => None,
        }
    }

    pub fn with_content(mut self, content: impl Fn(&MetaItem) -> String + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }
}

/// The static tooltip payload for one region.
///
/// The custom builder runs only when the slot defines one and the
/// region has a metadata record; otherwise the payload is a heading
/// with the region identifier.
pub fn content_for(geo_id: &str, metadata: Option<&Metadata>, props: Option<&TooltipProps>) -> String {
    let position = props.map(|p| p.position).unwrap_or_default();
    let body = props
        .and_then(|p| p.content.as_ref())
        .zip(metadata.and_then(|m| m.get(geo_id)))
        .map(|(content, item)| content(item));
    match body {
        Some(html) => format!(
            "<div class=\"{TOOLTIP_CLASS} {}\">{html}</div>",
            position.as_str()
        ),
        None => format!(
            "<div class=\"{TOOLTIP_CLASS} {}\"><h3 style=\"color:#fff\">{}</h3></div>",
            position.as_str(),
            escape_xml(geo_id)
        ),
    }
}
