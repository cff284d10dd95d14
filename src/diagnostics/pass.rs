use super::timing::TimingBreakdown;
use serde::Serialize;

/// Summary of one edge distance evaluation pass.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub vertex_count: usize,
    pub active_count: usize,
    /// Active vertices whose ray found an edge away from the vertex.
    pub edges_found: usize,
    /// Active vertices whose selected sample was NaN (zero magnitude).
    pub nan_edges: usize,
    /// 95th percentile of |distance| over active vertices.
    pub dmax: f64,
    /// Mean raw magnitude over active vertices.
    pub mavg: f64,
    pub energy: f64,
    /// Pass statistics were degenerate and all magnitudes were zeroed.
    pub degenerate: bool,
    pub timings: TimingBreakdown,
}
