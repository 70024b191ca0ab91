//! Persisted snapshot and export/import formats.
//!
//! Loading never fails: anything malformed is sanitized field by field, and
//! a payload without node/edge arrays is replaced by a default single-root
//! graph. Sanitized graphs always satisfy the forest invariant.

mod sanitize;

pub use sanitize::{sanitize_edge, sanitize_node};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::error::MindmapError;
use crate::graph::{Edge, Forest, Graph, Node, NodeData, NodeId, Position, retain_forest_edges};
use crate::history::Viewport;

/// Versioned storage key for the persisted snapshot.
pub const STORAGE_KEY: &str = "mindmap-state-v1";

/// Id of the root in a default graph.
pub const DEFAULT_ROOT_ID: &str = "root";

/// The persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
}

/// Outcome of [`load`].
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub graph: Graph,
    pub viewport: Option<Viewport>,
    /// True when the payload was discarded for the default graph.
    pub fell_back: bool,
}

/// A graph with one root topic.
pub fn default_graph(config: &EngineConfig) -> Graph {
    let root = Node::topic(
        NodeId::from(DEFAULT_ROOT_ID),
        config.default_root_label.clone(),
        0,
        Position::new(config.layout.start_x, config.layout.start_y),
    );
    Graph::new(vec![root], Vec::new())
}

/// Serialize the current state.
pub fn save(graph: &Graph, viewport: Viewport) -> Result<String, MindmapError> {
    let snapshot = PersistedSnapshot {
        nodes: graph.nodes.clone(),
        edges: graph.edges.clone(),
        viewport: Some(viewport),
    };
    serde_json::to_string(&snapshot).map_err(MindmapError::Snapshot)
}

/// Parse a persisted snapshot, falling back to the default graph.
pub fn load(text: &str, config: &EngineConfig) -> Loaded {
    let fallback = || Loaded {
        graph: default_graph(config),
        viewport: None,
        fell_back: true,
    };

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{}", MindmapError::Snapshot(err));
            return fallback();
        }
    };

    let (Some(raw_nodes), Some(raw_edges)) = (
        value.get("nodes").and_then(Value::as_array),
        value.get("edges").and_then(Value::as_array),
    ) else {
        log::warn!("snapshot has no node/edge arrays; using default graph");
        return fallback();
    };

    let graph = sanitize_graph(raw_nodes, raw_edges, config);
    if graph.nodes.is_empty() {
        log::warn!("snapshot held no usable nodes; using default graph");
        return fallback();
    }

    let viewport = value
        .get("viewport")
        .and_then(|v| serde_json::from_value::<Viewport>(v.clone()).ok())
        .filter(|v| v.x.is_finite() && v.y.is_finite() && v.zoom.is_finite() && v.zoom > 0.0);

    log::info!(
        "loaded snapshot: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Loaded {
        graph,
        viewport,
        fell_back: false,
    }
}

#[derive(Serialize)]
struct ExportNode<'a> {
    id: &'a NodeId,
    data: &'a NodeData,
}

#[derive(Serialize)]
struct ExportEdge<'a> {
    source: &'a NodeId,
    target: &'a NodeId,
}

#[derive(Serialize)]
struct ExportFile<'a> {
    nodes: Vec<ExportNode<'a>>,
    edges: Vec<ExportEdge<'a>>,
}

/// Flattened, lossy export: no positions, styles or handles.
pub fn export(graph: &Graph) -> Result<String, MindmapError> {
    let file = ExportFile {
        nodes: graph
            .nodes
            .iter()
            .map(|n| ExportNode {
                id: &n.id,
                data: &n.data,
            })
            .collect(),
        edges: graph
            .edges
            .iter()
            .map(|e| ExportEdge {
                source: &e.source,
                target: &e.target,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| MindmapError::Import(e.to_string()))
}

/// Parse an export file. Positions are not restored here; the caller runs
/// a fresh layout. Levels are rebuilt from tree depth.
pub fn import(text: &str, config: &EngineConfig) -> Result<Graph, MindmapError> {
    let value: Value = serde_json::from_str(text).map_err(|e| MindmapError::Import(e.to_string()))?;
    let raw_nodes = value
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| MindmapError::Import("missing node list".into()))?;
    let raw_edges = value
        .get("edges")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut graph = sanitize_graph(raw_nodes, raw_edges, config);
    if graph.nodes.is_empty() {
        return Err(MindmapError::Import("no usable nodes".into()));
    }
    for edge in graph.edges.iter_mut() {
        *edge = Edge::link(edge.source.clone(), edge.target.clone());
    }
    assign_levels(&mut graph);
    Ok(graph)
}

/// Sanitize raw node/edge values into a valid forest.
fn sanitize_graph(raw_nodes: &[Value], raw_edges: &[Value], config: &EngineConfig) -> Graph {
    let mut seen: HashSet<NodeId> = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for raw in raw_nodes {
        match sanitize_node(raw, &config.placeholder_label) {
            Some(node) if seen.insert(node.id.clone()) => nodes.push(node),
            Some(node) => log::warn!("dropping duplicate node id {}", node.id),
            None => log::warn!("dropping node without an id"),
        }
    }

    let edges: Vec<Edge> = raw_edges.iter().filter_map(sanitize_edge).collect();
    let (mut edges, dropped) = retain_forest_edges(&nodes, edges);
    if dropped > 0 {
        log::warn!("dropped {dropped} edges that broke the forest invariant");
    }
    for edge in edges.iter_mut() {
        edge.normalize_handles();
    }

    Graph::new(nodes, edges)
}

/// Set every node's level to its depth from its root.
fn assign_levels(graph: &mut Graph) {
    let depths: Vec<(NodeId, u32)> = {
        let forest = Forest::build(&graph.nodes, &graph.edges);
        let mut out = Vec::with_capacity(forest.len());
        for root in forest.roots() {
            let mut stack = vec![(root, 0u32)];
            while let Some((ix, depth)) = stack.pop() {
                out.push((forest.node(ix).id.clone(), depth));
                for child in forest.children(ix) {
                    stack.push((child, depth + 1));
                }
            }
        }
        out
    };
    for (id, depth) in depths {
        if let Some(node) = graph.node_mut(&id) {
            node.data.level = depth;
        }
    }
}
