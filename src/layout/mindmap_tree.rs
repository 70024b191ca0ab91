//! Horizontal mindmap tree layout.
//!
//! Lays out each independent root tree left-to-right:
//!
//! 1. **Pre-order walk:** assign depth per node and stack leaves at a fixed
//!    vertical step from the tree's own running cursor.
//! 2. **Post-order pass:** place every parent at the midpoint of its first
//!    and last child (not the mean of all children), which gives the
//!    balanced look of conventional mindmaps.
//! 3. **Anchor:** `x = anchor_x + depth * horizontal_spacing`. In
//!    [`AnchorMode::Fresh`] trees are stacked from the configured start
//!    point; in [`AnchorMode::InPlace`] each tree is translated so its root
//!    stays exactly where it is, so relayout never jumps the viewport.
//!
//! The function is pure and deterministic: sibling order comes from the
//! forest index (explicit `order`, then edge order), so repeated runs over
//! unchanged input give bit-identical positions.

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::graph::{Edge, Forest, Node, NodeId, Position};

/// Where each root tree is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorMode {
    /// Stack trees from `(start_x, start_y)`; used when positions are rebuilt
    /// from scratch (import).
    Fresh,
    /// Keep every root at its current position.
    InPlace,
}

/// Configuration for the mindmap layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MindmapLayoutConfig {
    /// Horizontal distance between tree levels.
    pub horizontal_spacing: f64,
    /// Vertical step between stacked leaves.
    pub vertical_spacing: f64,
    /// Fresh layout start x (root column).
    pub start_x: f64,
    /// Fresh layout start y (first leaf row).
    pub start_y: f64,
    /// Extra vertical gap between independent trees in a fresh layout.
    pub tree_gap: f64,
}

impl Default for MindmapLayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 250.0,
            vertical_spacing: 80.0,
            start_x: 100.0,
            start_y: 100.0,
            tree_gap: 80.0,
        }
    }
}

/// Internal per-node record for one tree.
#[derive(Debug)]
struct LayoutNode {
    index: NodeIndex,
    depth: u32,
    /// Children (indices into the tree's layout vec), in sibling order.
    children: Vec<usize>,
    y: f64,
}

/// Result of the layout computation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    /// Target position per laid-out node.
    pub positions: HashMap<NodeId, Position>,
    /// Number of nodes laid out.
    pub node_count: usize,
}

/// The mindmap layout engine.
pub struct MindmapLayout {
    config: MindmapLayoutConfig,
}

impl MindmapLayout {
    /// Create a new layout with the given configuration.
    pub fn new(config: MindmapLayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MindmapLayoutConfig::default())
    }

    pub fn config(&self) -> &MindmapLayoutConfig {
        &self.config
    }

    /// Compute positions for `nodes` connected by parent→child `edges`.
    ///
    /// Returns an empty result when no root can be identified (every node
    /// has a parent); callers keep their input positions in that case.
    pub fn compute(&self, nodes: &[Node], edges: &[Edge], mode: AnchorMode) -> LayoutResult {
        let forest = Forest::build(nodes, edges);
        let roots = forest.roots();
        if roots.is_empty() {
            return LayoutResult::default();
        }

        let mut result = LayoutResult::default();
        let mut claimed: HashSet<NodeIndex> = HashSet::with_capacity(forest.len());
        let mut fresh_cursor = self.config.start_y;

        for root in roots {
            let mut tree = Self::build_tree(&forest, root, &mut claimed);
            if tree.is_empty() {
                continue;
            }

            let mut cursor = match mode {
                AnchorMode::Fresh => fresh_cursor,
                AnchorMode::InPlace => 0.0,
            };
            self.place(&mut tree, &mut cursor);

            let root_node = forest.node(root);
            let (anchor_x, shift_y) = match mode {
                AnchorMode::Fresh => {
                    fresh_cursor = cursor + self.config.tree_gap;
                    (self.config.start_x, 0.0)
                }
                AnchorMode::InPlace => (root_node.position.x, root_node.position.y - tree[0].y),
            };

            for entry in &tree {
                let position = if entry.index == root && mode == AnchorMode::InPlace {
                    root_node.position
                } else {
                    let x = anchor_x + entry.depth as f64 * self.config.horizontal_spacing;
                    Position::new(x, entry.y + shift_y)
                };
                result
                    .positions
                    .insert(forest.node(entry.index).id.clone(), position);
            }
            result.node_count += tree.len();
        }

        result
    }

    /// Return a copy of `nodes` with computed positions written in. Nodes
    /// the layout did not reach keep their position.
    pub fn apply(&self, nodes: &[Node], edges: &[Edge], mode: AnchorMode) -> Vec<Node> {
        let result = self.compute(nodes, edges, mode);
        nodes
            .iter()
            .map(|node| {
                let mut node = node.clone();
                if let Some(&position) = result.positions.get(&node.id) {
                    node.position = position;
                }
                node
            })
            .collect()
    }

    /// Collect one tree in pre-order. Nodes already claimed by an earlier
    /// tree (malformed input) are skipped.
    fn build_tree(forest: &Forest<'_>, root: NodeIndex, claimed: &mut HashSet<NodeIndex>) -> Vec<LayoutNode> {
        let mut tree: Vec<LayoutNode> = Vec::new();
        let mut stack: Vec<(NodeIndex, u32, Option<usize>)> = vec![(root, 0, None)];

        while let Some((index, depth, parent)) = stack.pop() {
            if !claimed.insert(index) {
                continue;
            }
            let slot = tree.len();
            tree.push(LayoutNode {
                index,
                depth,
                children: Vec::new(),
                y: 0.0,
            });
            if let Some(parent) = parent {
                tree[parent].children.push(slot);
            }
            for child in forest.children(index).into_iter().rev() {
                stack.push((child, depth + 1, Some(slot)));
            }
        }

        tree
    }

    /// Stack leaves (pre-order) then center parents (reverse pre-order).
    fn place(&self, tree: &mut [LayoutNode], cursor: &mut f64) {
        for entry in tree.iter_mut() {
            if entry.children.is_empty() {
                entry.y = *cursor;
                *cursor += self.config.vertical_spacing;
            }
        }

        // Children always come after their parent in pre-order.
        for slot in (0..tree.len()).rev() {
            let (Some(&first), Some(&last)) = (tree[slot].children.first(), tree[slot].children.last()) else {
                continue;
            };
            tree[slot].y = (tree[first].y + tree[last].y) / 2.0;
        }
    }
}

impl Default for MindmapLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}
