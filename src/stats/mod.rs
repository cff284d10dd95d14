//! Intensity and per-vertex statistics.
//!
//! - [`moments`]: masked mean/variance as an associative split/join reduction.
//! - [`local`]: dense windowed mean/variance with a global fallback.
//! - [`tissue`]: white/grey matter models for the neonatal edge heuristic.
//! - [`primitives`]: masked mean, absolute percentile and the S-shaped
//!   membership function used for force normalization.

pub mod local;
pub mod moments;
pub mod primitives;
pub mod tissue;

pub use local::{local_statistics, LocalStatsField, LOCAL_STATS_MIN_SAMPLE_PERCENT};
pub use moments::{masked_moments, IntensityMoments};
pub use primitives::{abs_percentile, masked_mean, s_shaped_membership};
pub use tissue::{estimate_tissue_stats, TissueClassStats, TissueStatistics};
