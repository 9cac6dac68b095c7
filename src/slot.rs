//! Optional overlay slots attached to a heatmap.
//!
//! Hosts hand the heatmap a list of slots; the composition root scans
//! it for the first slot of each kind and ignores the rest. A slot
//! carries the full configuration of the overlay it enables.

use crate::legend::LegendProps;
use crate::tooltip::TooltipProps;

#[derive(Debug)]
pub enum Slot {
    Legend(LegendProps),
    Tooltip(TooltipProps),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Legend,
    Tooltip,
}

impl Slot {
    pub fn kind(&self) -> SlotKind {
        match self {
            Slot::Legend(_) => SlotKind::Legend,
            Slot::Tooltip(_) => SlotKind::Tooltip,
        }
    }
}

/// First slot of the requested kind, if any.
pub fn find_slot(children: &[Slot], kind: SlotKind) -> Option<&Slot> {
    children.iter().find(|child| child.kind() == kind)
}
