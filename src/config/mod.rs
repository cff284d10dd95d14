//! JSON configuration of the binaries.

pub mod edge_distance_demo;
