//! Edge localization on gradient profiles sampled along vertex normals.
//!
//! - [`strategy`]: the nine edge criteria and their textual aliases.
//! - [`search`]: NaN-tolerant closest/strongest extremum search.
//! - [`neonatal`]: tissue-aware WM/cGM and cGM/CSF transition heuristics.
//! - [`veto`]: intensity-range and padding-crossing checks.
//! - [`locator`]: dispatch from strategy to search routine plus vetoes.
//!
//! Every routine returns an index into the profile. The centre index `r`
//! means "no edge"; the signed distance of an edge at `j` is `(j - r) * step`.

pub mod locator;
pub mod neonatal;
pub mod search;
pub mod strategy;
pub mod veto;

pub use locator::{locate_edge, EdgeThresholds};
pub use neonatal::TissuePrior;
pub use search::Polarity;
pub use strategy::EdgeStrategy;
