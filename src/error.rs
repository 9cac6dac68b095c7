use thiserror::Error;

/// Errors surfaced while decoding a topology or rendering a heatmap.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("failed to parse topology: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("topology contains no objects to render")]
    EmptyTopology,

    #[error("arc index {index} out of range for topology with {count} arcs")]
    ArcIndex { index: i32, count: usize },

    #[error("invalid color {0:?}: expected #rgb, #rrggbb, or rgb(r, g, b)")]
    InvalidColor(String),
}
