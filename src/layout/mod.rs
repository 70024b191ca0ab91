//! Layout algorithms for the mindmap canvas.
//!
//! This module computes target positions for visible nodes from tree depth
//! and sibling order. The pipeline writes them back into the canonical node
//! set; hidden nodes keep their last position so they reappear in place.

pub mod mindmap_tree;

pub use mindmap_tree::{AnchorMode, LayoutResult, MindmapLayout, MindmapLayoutConfig};
