//! Serializable reports produced by force evaluation passes.

pub mod pass;
pub mod timing;

pub use pass::PassReport;
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
