#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod force;
pub mod image;
pub mod types;

// Building blocks of the force terms, public for tools and tests.
pub mod edges;
pub mod mesh;
pub mod sampling;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

// Force terms and their shared interface.
pub use crate::force::{
    register_builtin_forces, DistanceMeasure, EdgeDistanceForce, EdgeDistanceParams,
    ForceRegistry, ForceTerm, ImplicitSurfaceForce,
};
pub use crate::types::{ForceInput, SurfaceView};

pub use crate::diagnostics::{PassReport, TimingBreakdown};
pub use crate::edges::EdgeStrategy;
pub use crate::error::{ConfigError, ForceError};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::image::{Volume, VolumeGeometry};
    pub use crate::mesh::EdgeTable;
    pub use crate::{
        EdgeDistanceForce, EdgeStrategy, ForceInput, ForceRegistry, ForceTerm,
        ImplicitSurfaceForce, PassReport, SurfaceView,
    };
    pub use nalgebra::{Point3, Vector3};
}
