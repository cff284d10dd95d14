//! Mesh connectivity and per-vertex scalar filtering.

pub mod edge_table;
pub mod filter;
pub mod icosphere;

pub use edge_table::EdgeTable;
pub use filter::{median_filter, smooth_values, Weighting};
pub use icosphere::{icosphere, vertex_normals};
