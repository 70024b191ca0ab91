//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over the visible
//! nodes, used by the canvas for hit testing and viewport culling.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
