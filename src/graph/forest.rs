//! Arena-indexed forest view over a `(nodes, edges)` pair.
//!
//! The canonical graph is two plain vectors (the persisted shape). Every
//! traversal the engine needs (roots, ordered children, parents, subtree
//! collection) goes through this index instead, which maps each node to a
//! petgraph `StableGraph` slot. All walks are iterative worklists with a
//! visited guard, so malformed input (cycles, second parents) cannot recurse
//! without bound.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::{Directed, Direction};
use std::collections::{HashMap, HashSet};

use super::edge::Edge;
use super::node::{Node, NodeId};

/// Read-only forest index. Node weights are positions in the node slice,
/// edge weights are positions in the edge slice (used for stable ordering).
pub struct Forest<'a> {
    graph: StableGraph<usize, usize, Directed>,
    index_of: HashMap<&'a NodeId, NodeIndex>,
    nodes: &'a [Node],
}

impl<'a> Forest<'a> {
    /// Build the index. Edges whose endpoints don't exist, and self-loops,
    /// are ignored.
    pub fn build(nodes: &'a [Node], edges: &[Edge]) -> Self {
        let mut graph = StableGraph::with_capacity(nodes.len(), edges.len());
        let mut index_of = HashMap::with_capacity(nodes.len());

        for (slot, node) in nodes.iter().enumerate() {
            // First occurrence wins for duplicate ids
            if index_of.contains_key(&node.id) {
                continue;
            }
            let index = graph.add_node(slot);
            index_of.insert(&node.id, index);
        }

        for (position, edge) in edges.iter().enumerate() {
            let (Some(&source), Some(&target)) =
                (index_of.get(&edge.source), index_of.get(&edge.target))
            else {
                continue;
            };
            if source == target {
                continue;
            }
            graph.add_edge(source, target, position);
        }

        Self {
            graph,
            index_of,
            nodes,
        }
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the arena index of a node id.
    pub fn index(&self, id: &NodeId) -> Option<NodeIndex> {
        self.index_of.get(id).copied()
    }

    /// The node stored at an arena index.
    pub fn node(&self, index: NodeIndex) -> &'a Node {
        &self.nodes[self.graph[index]]
    }

    /// All arena indices in node-slice order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Children of `index` in stable sibling order: explicit `order` field
    /// first (when present), then edge-list encounter order.
    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<(Option<i64>, usize, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| {
                let child = edge.target();
                (self.node(child).data.order, *edge.weight(), child)
            })
            .collect();

        children.sort_by_key(|&(order, position, _)| (order.is_none(), order, position));
        children.into_iter().map(|(_, _, child)| child).collect()
    }

    /// The parent of `index`. With malformed input the earliest edge wins.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .min_by_key(|edge| *edge.weight())
            .map(|edge| edge.source())
    }

    /// Whether any edge points at `index`.
    pub fn has_parent(&self, index: NodeIndex) -> bool {
        self.graph
            .edges_directed(index, Direction::Incoming)
            .next()
            .is_some()
    }

    /// Nodes with no incoming edge, in node-slice order.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.indices().filter(|&ix| !self.has_parent(ix)).collect()
    }

    /// Every node reachable from `index` through outgoing edges, excluding
    /// `index` itself.
    pub fn descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut dfs = Dfs::new(&self.graph, index);
        let mut out = Vec::new();
        while let Some(next) = dfs.next(&self.graph) {
            if next != index {
                out.push(next);
            }
        }
        out
    }

    /// Ancestors of `index`, nearest first. Stops on a revisit.
    pub fn ancestors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([index]);
        let mut current = index;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }
}

/// Drop every edge that would break the forest invariant: dangling
/// endpoints, self-loops, a second parent for the same target, and edges
/// that would close a cycle. Returns the surviving edges (original order)
/// and how many were dropped.
pub fn retain_forest_edges(nodes: &[Node], edges: Vec<Edge>) -> (Vec<Edge>, usize) {
    let ids: HashSet<&NodeId> = nodes.iter().map(|n| &n.id).collect();
    let mut parent_of: HashMap<NodeId, NodeId> = HashMap::with_capacity(edges.len());
    let mut kept = Vec::with_capacity(edges.len());
    let mut dropped = 0;

    for edge in edges {
        let valid = ids.contains(&edge.source)
            && ids.contains(&edge.target)
            && edge.source != edge.target
            && !parent_of.contains_key(&edge.target)
            && !reaches(&parent_of, &edge.source, &edge.target);

        if valid {
            parent_of.insert(edge.target.clone(), edge.source.clone());
            kept.push(edge);
        } else {
            dropped += 1;
        }
    }

    (kept, dropped)
}

/// Walk parent links up from `from`; true if `to` is hit.
fn reaches(parent_of: &HashMap<NodeId, NodeId>, from: &NodeId, to: &NodeId) -> bool {
    let mut current = from;
    let mut steps = 0;
    while let Some(parent) = parent_of.get(current) {
        if parent == to {
            return true;
        }
        current = parent;
        steps += 1;
        if steps > parent_of.len() {
            return false;
        }
    }
    false
}
