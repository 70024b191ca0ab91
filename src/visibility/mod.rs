//! Collapse-driven visibility.
//!
//! [`resolve`] is the pure resolver. The helpers here project its result
//! onto a graph: structurally filtering the visible subset for layout, and
//! mirroring the result into the render-facing `hidden` flags.

mod resolver;

pub use resolver::{Visibility, resolve};

use crate::graph::{Edge, Node};

/// The visible nodes and the edges whose endpoints are both visible.
pub fn visible_subgraph(nodes: &[Node], edges: &[Edge], visibility: &Visibility) -> (Vec<Node>, Vec<Edge>) {
    let visible_nodes = nodes
        .iter()
        .filter(|n| visibility.is_visible(&n.id))
        .cloned()
        .collect();
    let visible_edges = edges
        .iter()
        .filter(|e| visibility.is_visible(&e.source) && visibility.is_visible(&e.target))
        .cloned()
        .collect();
    (visible_nodes, visible_edges)
}

/// Write `visibility` into the node/edge `hidden` flags and the derived
/// `hiddenChildCount` payload field. Positions are left untouched so hidden
/// nodes reappear where they were.
pub fn apply(nodes: &mut [Node], edges: &mut [Edge], visibility: &Visibility) {
    for node in nodes.iter_mut() {
        node.hidden = !visibility.is_visible(&node.id);
        let count = visibility.hidden_count(&node.id);
        node.data.hidden_child_count = (node.data.collapsed && count > 0).then_some(count);
    }
    for edge in edges.iter_mut() {
        edge.hidden = !(visibility.is_visible(&edge.source) && visibility.is_visible(&edge.target));
    }
}
