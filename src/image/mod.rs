pub mod geometry;
pub mod io;
pub mod linear;
pub mod traits;
pub mod volume;

pub use self::geometry::VolumeGeometry;
pub use self::linear::LinearInterpolator;
pub use self::traits::{nearest_voxel, VolumeSampler};
pub use self::volume::Volume;
