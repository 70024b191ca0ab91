//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries over visible node positions:
//! - Nearest node within a hit radius
//! - Rectangle intersection (viewport culling)

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;

/// A point in the spatial index with associated node ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index for visible mindmap nodes.
///
/// Rebuilt in bulk on every commit; nothing inserts incrementally.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<&NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| &point.id)
    }

    /// Find all nodes within a rectangle.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| &point.id)
            .collect()
    }

    /// Rebuild the index from a list of points.
    pub fn rebuild(&mut self, points: Vec<NodePoint>) {
        self.tree = RTree::bulk_load(points);
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
