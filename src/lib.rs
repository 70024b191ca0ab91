//! Mindmap Engine - WASM Module
//!
//! The graph consistency engine behind the mindmap canvas: it keeps the
//! visible subset, the tree layout and the undo/redo history in sync under
//! every structural edit. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: node/edge types, the canonical store and a petgraph forest index
//! - `visibility`: collapse-driven visibility resolver
//! - `layout`: deterministic left-to-right mindmap tree layout
//! - `pipeline`: the mutation pipeline and every editor operation
//! - `history`: snapshot-based linear undo/redo
//! - `context`: bounded context extraction for the AI collaborator
//! - `persist`: persisted snapshot, export and import formats
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing

use log::LevelFilter;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;
pub mod logging;
pub mod persist;
pub mod pipeline;
pub mod spatial;
pub mod visibility;

use config::EngineConfig;
use context::{AiSuggestion, RequestTicket};
use error::MindmapError;
use graph::{NodeId, Position};
use history::Viewport;
use layout::AnchorMode;
use pipeline::{Mindmap, NodeUpdate};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Warn);
}

/// Serialize for JS as plain objects (maps become objects, not `Map`s).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| MindmapError::from(e).into())
}

fn id_array<'a>(ids: impl IntoIterator<Item = &'a NodeId>) -> js_sys::Array {
    ids.into_iter()
        .map(|id| JsValue::from_str(id.as_str()))
        .collect()
}

/// Main entry point for the mindmap engine.
///
/// This struct wraps the internal [`Mindmap`] and provides the public API
/// exposed to JavaScript. Node ids cross the boundary as strings.
#[wasm_bindgen]
pub struct MindmapWasm {
    mindmap: Mindmap,
}

#[wasm_bindgen]
impl MindmapWasm {
    /// Create an engine with the default configuration and a single root.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            mindmap: Mindmap::default(),
        }
    }

    /// Create an engine from a (possibly partial) config object.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<MindmapWasm, JsValue> {
        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(MindmapError::from)?
        };
        config.validate()?;
        Ok(Self {
            mindmap: Mindmap::new(config),
        })
    }

    /// The storage key the persisted snapshot should be written under.
    #[wasm_bindgen(js_name = storageKey)]
    pub fn storage_key() -> String {
        persist::STORAGE_KEY.to_string()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the state from a persisted snapshot string.
    ///
    /// Never throws. Returns false when the payload was unusable and the
    /// default graph was loaded instead.
    pub fn load(&mut self, json: &str) -> bool {
        self.mindmap.load_json(json)
    }

    /// Serialize the current state for persistence.
    pub fn save(&self) -> Result<String, JsValue> {
        Ok(self.mindmap.save_json()?)
    }

    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        Ok(self.mindmap.export_json()?)
    }

    /// Replace the graph from an export file. Throws on unusable input,
    /// leaving the state untouched.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, json: &str) -> Result<(), JsValue> {
        Ok(self.mindmap.import_json(json)?)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a topic under `parent_id`.
    ///
    /// Returns the new node id, or undefined if the parent doesn't exist.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(&mut self, parent_id: &str, label: Option<String>) -> Option<String> {
        self.mindmap
            .add_child(&NodeId::from(parent_id), label.as_deref())
            .map(|id| id.0)
    }

    /// Add a note under `parent_id`.
    #[wasm_bindgen(js_name = addNote)]
    pub fn add_note(&mut self, parent_id: &str, text: &str) -> Option<String> {
        self.mindmap
            .add_note(&NodeId::from(parent_id), text)
            .map(|id| id.0)
    }

    /// Add a new root. Without coordinates it goes below the lowest node.
    #[wasm_bindgen(js_name = addRoot)]
    pub fn add_root(&mut self, label: Option<String>, x: Option<f64>, y: Option<f64>) -> String {
        let position = x.zip(y).map(|(x, y)| Position::new(x, y));
        self.mindmap.add_root(label.as_deref(), position).0
    }

    /// Delete a node and its whole subtree.
    ///
    /// Returns true if anything was removed.
    #[wasm_bindgen(js_name = deleteNode)]
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        self.mindmap.delete_node(&NodeId::from(node_id))
    }

    /// Edit payload fields (`{label?, color?, status?, description?, emoji?}`).
    #[wasm_bindgen(js_name = updateNode)]
    pub fn update_node(&mut self, node_id: &str, update: JsValue) -> Result<bool, JsValue> {
        let update: NodeUpdate =
            serde_wasm_bindgen::from_value(update).map_err(MindmapError::from)?;
        Ok(self.mindmap.update_node(&NodeId::from(node_id), &update))
    }

    #[wasm_bindgen(js_name = setCollapsed)]
    pub fn set_collapsed(&mut self, node_id: &str, collapsed: bool) -> bool {
        self.mindmap.set_collapsed(&NodeId::from(node_id), collapsed)
    }

    #[wasm_bindgen(js_name = toggleCollapse)]
    pub fn toggle_collapse(&mut self, node_id: &str) -> bool {
        self.mindmap.toggle_collapse(&NodeId::from(node_id))
    }

    /// Run the auto-layout. `fresh` re-anchors every tree at the start
    /// point; otherwise roots stay where they are.
    pub fn relayout(&mut self, fresh: bool) -> bool {
        let mode = if fresh { AnchorMode::Fresh } else { AnchorMode::InPlace };
        self.mindmap.relayout(mode)
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        self.mindmap.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.mindmap.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.mindmap.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.mindmap.can_redo()
    }

    #[wasm_bindgen(js_name = historyLength)]
    pub fn history_length(&self) -> usize {
        self.mindmap.history_len()
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Record the camera. Not an undoable change.
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.mindmap.set_viewport(Viewport { x, y, zoom });
    }

    pub fn viewport(&self) -> Result<JsValue, JsValue> {
        to_js(&self.mindmap.viewport())
    }

    // =========================================================================
    // Render-Facing State
    // =========================================================================

    /// Every node, hidden ones included (check `hidden`).
    pub fn nodes(&self) -> Result<JsValue, JsValue> {
        to_js(self.mindmap.nodes())
    }

    /// Every edge, hidden ones included (check `hidden`).
    pub fn edges(&self) -> Result<JsValue, JsValue> {
        to_js(self.mindmap.edges())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.mindmap.nodes().len()
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.mindmap.edges().len()
    }

    #[wasm_bindgen(js_name = visibleNodeIds)]
    pub fn visible_node_ids(&self) -> js_sys::Array {
        id_array(self.mindmap.visible_nodes().map(|n| &n.id))
    }

    // =========================================================================
    // AI Collaboration
    // =========================================================================

    /// Build the request payload for `node_id`, or null if it doesn't exist.
    ///
    /// The returned object carries a `ticket` that must be handed back to
    /// `applySuggestion` together with the response.
    #[wasm_bindgen(js_name = buildContext)]
    pub fn build_context(&mut self, node_id: &str, intent: &str) -> Result<JsValue, JsValue> {
        match self.mindmap.build_context(&NodeId::from(node_id), intent) {
            Some(request) => to_js(&request),
            None => Ok(JsValue::NULL),
        }
    }

    /// Apply a collaborator response body. Throws on a malformed body;
    /// otherwise returns `{status: "applied" | "empty" | "stale" | "nodeMissing"}`.
    #[wasm_bindgen(js_name = applySuggestion)]
    pub fn apply_suggestion(&mut self, ticket: JsValue, response: &str) -> Result<JsValue, JsValue> {
        let ticket: RequestTicket =
            serde_wasm_bindgen::from_value(ticket).map_err(MindmapError::from)?;
        let suggestion = AiSuggestion::from_json(response)?;
        to_js(&self.mindmap.apply_suggestion(&ticket, &suggestion))
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the visible node nearest to a canvas point, within `radius`.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<String> {
        self.mindmap.node_at(x, y, radius).map(|id| id.0.clone())
    }

    /// Find all visible nodes within a rectangle.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> js_sys::Array {
        id_array(self.mindmap.nodes_in_rect(min_x, min_y, max_x, max_y))
    }

    /// Bounding box of visible nodes as `[minX, minY, maxX, maxY]`.
    pub fn bounds(&self) -> Option<Vec<f64>> {
        self.mindmap
            .bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Set the log level (`"off"`, `"error"`, `"warn"`, `"info"`, `"debug"`).
    #[wasm_bindgen(js_name = setLogLevel)]
    pub fn set_log_level(level: &str) -> Result<(), JsValue> {
        let filter = logging::parse_level(level)
            .ok_or_else(|| MindmapError::Config(format!("unknown log level {level:?}")))?;
        logging::init(filter);
        Ok(())
    }
}

impl Default for MindmapWasm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::graph::{Edge, Forest, Graph, Node, retain_forest_edges};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    /// A full editing session: build, collapse, persist, reload.
    #[test]
    fn test_edit_save_reload_session() {
        let mut mindmap = Mindmap::default();
        let root = id(persist::DEFAULT_ROOT_ID);

        let ideas = mindmap.add_child(&root, Some("Ideas")).unwrap();
        let plans = mindmap.add_child(&root, Some("Plans")).unwrap();
        let deep = mindmap.add_child(&ideas, Some("Deep")).unwrap();
        mindmap.set_collapsed(&ideas, true);
        mindmap.set_viewport(Viewport { x: 10.0, y: -20.0, zoom: 1.5 });

        let saved = mindmap.save_json().unwrap();
        let mut reloaded = Mindmap::default();
        assert!(reloaded.load_json(&saved));

        assert_eq!(reloaded.nodes(), mindmap.nodes());
        assert_eq!(reloaded.edges(), mindmap.edges());
        assert_eq!(reloaded.viewport(), Viewport { x: 10.0, y: -20.0, zoom: 1.5 });
        assert!(!reloaded.visibility().is_visible(&deep));
        assert!(reloaded.visibility().is_visible(&plans));
        assert_eq!(reloaded.node(&ideas).unwrap().data.hidden_child_count, Some(1));

        // Fresh ids continue past the loaded ones
        let next = reloaded.add_child(&plans, None).unwrap();
        assert!(!mindmap.nodes().iter().any(|n| n.id == next));
    }

    #[test]
    fn test_layout_places_children_right_of_parent() {
        let mut mindmap = Mindmap::default();
        let root = id(persist::DEFAULT_ROOT_ID);
        let a = mindmap.add_child(&root, None).unwrap();
        let b = mindmap.add_child(&root, None).unwrap();

        let root_pos = mindmap.node(&root).unwrap().position;
        let a_pos = mindmap.node(&a).unwrap().position;
        let b_pos = mindmap.node(&b).unwrap().position;

        assert_eq!(a_pos.x, root_pos.x + 250.0);
        assert_eq!(b_pos.y - a_pos.y, 80.0);
        // Root stays put and sits between its first and last child
        assert_eq!(root_pos, Position::new(100.0, 100.0));
        assert_eq!(root_pos.y, (a_pos.y + b_pos.y) / 2.0);
    }

    #[test]
    fn test_garbage_load_falls_back_to_default() {
        let mut mindmap = Mindmap::default();
        mindmap.add_child(&id("root"), None);

        assert!(!mindmap.load_json("{\"nodes\": 5}"));
        assert_eq!(mindmap.nodes().len(), 1);
        assert_eq!(mindmap.nodes()[0].label(), "Central Topic");
        assert!(!mindmap.can_undo());
    }

    #[test]
    fn test_malformed_load_is_sanitized_into_a_forest() {
        let text = r#"{
            "nodes": [
                {"id": "r", "data": {"label": "R"}},
                {"id": "c", "type": "mystery"},
                {"id": "c"},
                {"data": {"label": "no id"}}
            ],
            "edges": [
                {"source": "r", "target": "c"},
                {"source": "c", "target": "r"},
                {"source": "r", "target": "ghost"},
                {"source": "c", "target": "c"}
            ]
        }"#;
        let mut mindmap = Mindmap::default();
        assert!(mindmap.load_json(text));

        assert_eq!(mindmap.nodes().len(), 2);
        assert_eq!(mindmap.edges().len(), 1);
        let c = mindmap.node(&id("c")).unwrap();
        assert_eq!(c.label(), "Untitled");
        assert!(!c.is_note());
    }

    #[test]
    fn test_export_import_round_trip_rebuilds_layout() {
        let mut mindmap = Mindmap::default();
        let root = id("root");
        let a = mindmap.add_child(&root, Some("A")).unwrap();
        mindmap.add_child(&a, Some("A1")).unwrap();
        let exported = mindmap.export_json().unwrap();
        assert!(!exported.contains("position"));

        let mut other = Mindmap::default();
        other.import_json(&exported).unwrap();

        let labels = |m: &Mindmap| -> Vec<(String, u32)> {
            m.nodes()
                .iter()
                .map(|n| (n.label().to_string(), n.data.level))
                .collect()
        };
        assert_eq!(labels(&other), labels(&mindmap));
        let positions = |m: &Mindmap| -> Vec<Position> { m.nodes().iter().map(|n| n.position).collect() };
        assert_eq!(positions(&other), positions(&mindmap));
    }

    #[test]
    fn test_history_capacity_evicts_oldest() {
        let config = EngineConfig {
            history_capacity: Some(3),
            ..EngineConfig::default()
        };
        let mut mindmap = Mindmap::new(config);
        for _ in 0..5 {
            mindmap.add_child(&id("root"), None);
        }
        assert_eq!(mindmap.history_len(), 3);
        assert!(mindmap.undo());
        assert!(mindmap.undo());
        assert!(!mindmap.undo());
        assert_eq!(mindmap.nodes().len(), 4);
    }

    #[test]
    fn test_viewport_restored_by_undo() {
        let mut mindmap = Mindmap::default();
        let start = mindmap.viewport();
        mindmap.set_viewport(Viewport { x: 300.0, y: 0.0, zoom: 2.0 });
        assert_eq!(mindmap.history_len(), 1);

        mindmap.add_child(&id("root"), None);
        assert!(mindmap.undo());
        assert_eq!(mindmap.viewport(), start);
        assert!(mindmap.redo());
        assert_eq!(mindmap.viewport(), Viewport { x: 300.0, y: 0.0, zoom: 2.0 });
    }

    #[test]
    fn test_spatial_queries_follow_visibility() {
        let mut mindmap = Mindmap::default();
        let root = id("root");
        let child = mindmap.add_child(&root, None).unwrap();
        let child_pos = mindmap.node(&child).unwrap().position;

        assert_eq!(mindmap.node_at(child_pos.x + 3.0, child_pos.y, 10.0), Some(&child));
        assert_eq!(mindmap.nodes_in_rect(0.0, 0.0, 1000.0, 1000.0).len(), 2);
        assert_eq!(mindmap.bounds(), Some((100.0, 100.0, 350.0, 100.0)));

        mindmap.set_collapsed(&root, true);
        assert_eq!(mindmap.node_at(child_pos.x, child_pos.y, 10.0), None);
        assert_eq!(mindmap.bounds(), Some((100.0, 100.0, 100.0, 100.0)));
    }

    #[test]
    fn test_config_from_json_feeds_layout() {
        let config = EngineConfig::from_json(r#"{"layout": {"horizontalSpacing": 100}}"#).unwrap();
        let mut mindmap = Mindmap::new(config);
        let child = mindmap.add_child(&id("root"), None).unwrap();
        assert_eq!(mindmap.node(&child).unwrap().position.x, 200.0);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        AddChild(usize),
        AddNote(usize),
        AddRoot,
        Delete(usize),
        Toggle(usize),
        Rename(usize),
        Relayout(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => any::<usize>().prop_map(Op::AddChild),
            1 => any::<usize>().prop_map(Op::AddNote),
            1 => Just(Op::AddRoot),
            2 => any::<usize>().prop_map(Op::Delete),
            2 => any::<usize>().prop_map(Op::Toggle),
            1 => any::<usize>().prop_map(Op::Rename),
            1 => any::<bool>().prop_map(Op::Relayout),
        ]
    }

    fn pick(mindmap: &Mindmap, index: usize) -> NodeId {
        let nodes = mindmap.nodes();
        nodes[index % nodes.len()].id.clone()
    }

    /// Run one op. Returns whether it committed.
    fn run(mindmap: &mut Mindmap, op: &Op) -> bool {
        match *op {
            Op::AddChild(i) => {
                let parent = pick(mindmap, i);
                mindmap.add_child(&parent, None).is_some()
            }
            Op::AddNote(i) => {
                let parent = pick(mindmap, i);
                mindmap.add_note(&parent, "note").is_some()
            }
            Op::AddRoot => {
                mindmap.add_root(None, None);
                true
            }
            Op::Delete(i) => {
                let target = pick(mindmap, i);
                mindmap.delete_node(&target)
            }
            Op::Toggle(i) => {
                let target = pick(mindmap, i);
                mindmap.toggle_collapse(&target)
            }
            Op::Rename(i) => {
                let target = pick(mindmap, i);
                let update = NodeUpdate {
                    label: Some(format!("renamed {i}")),
                    ..NodeUpdate::default()
                };
                mindmap.update_node(&target, &update)
            }
            Op::Relayout(fresh) => mindmap.relayout(if fresh {
                AnchorMode::Fresh
            } else {
                AnchorMode::InPlace
            }),
        }
    }

    fn session(ops: &[Op]) -> (Mindmap, usize) {
        let mut mindmap = Mindmap::default();
        let committed = ops.iter().filter(|op| run(&mut mindmap, op)).count();
        (mindmap, committed)
    }

    fn strict_ancestor_collapsed(forest: &Forest<'_>, node: &Node) -> bool {
        forest
            .index(&node.id)
            .map(|ix| forest.ancestors(ix).into_iter().any(|a| forest.node(a).is_collapsed()))
            .unwrap_or(false)
    }

    proptest! {
        #[test]
        fn prop_forest_invariant_holds(ops in prop::collection::vec(op(), 0..40)) {
            let (mindmap, _) = session(&ops);
            let graph = mindmap.graph();

            let ids: HashSet<&NodeId> = graph.nodes.iter().map(|n| &n.id).collect();
            prop_assert_eq!(ids.len(), graph.nodes.len());

            let mut targets = HashSet::new();
            for edge in &graph.edges {
                prop_assert!(ids.contains(&edge.source));
                prop_assert!(ids.contains(&edge.target));
                prop_assert!(targets.insert(&edge.target), "second parent for {}", edge.target);
            }
            let (_, dropped) = retain_forest_edges(&graph.nodes, graph.edges.clone());
            prop_assert_eq!(dropped, 0);
        }

        #[test]
        fn prop_visibility_closure(ops in prop::collection::vec(op(), 0..40)) {
            let (mindmap, _) = session(&ops);
            let graph = mindmap.graph();
            let forest = Forest::build(&graph.nodes, &graph.edges);
            let visibility = mindmap.visibility();

            for node in &graph.nodes {
                let expected = !strict_ancestor_collapsed(&forest, node);
                prop_assert_eq!(visibility.is_visible(&node.id), expected, "node {}", node.id);
                prop_assert_eq!(node.hidden, !expected);

                if node.is_collapsed() {
                    let ix = forest.index(&node.id).unwrap();
                    let descendants = forest.descendants(ix).len();
                    prop_assert_eq!(visibility.hidden_count(&node.id), descendants);
                }
            }
        }

        #[test]
        fn prop_layout_idempotent(ops in prop::collection::vec(op(), 0..30)) {
            let (mut mindmap, _) = session(&ops);
            mindmap.relayout(AnchorMode::InPlace);
            let graph = mindmap.graph().clone();

            let layout = layout::MindmapLayout::with_defaults();
            let first = layout.compute(&graph.nodes, &graph.edges, AnchorMode::Fresh);
            let second = layout.compute(&graph.nodes, &graph.edges, AnchorMode::Fresh);
            prop_assert_eq!(first, second);

            prop_assert!(!mindmap.relayout(AnchorMode::InPlace));
            prop_assert_eq!(mindmap.graph(), &graph);
        }

        #[test]
        fn prop_delete_cascades(ops in prop::collection::vec(op(), 0..30), victim in any::<usize>()) {
            let (mut mindmap, _) = session(&ops);
            let before = mindmap.graph().clone();
            let target = pick(&mindmap, victim);

            let forest = Forest::build(&before.nodes, &before.edges);
            let ix = forest.index(&target).unwrap();
            let mut doomed: HashSet<NodeId> = forest
                .descendants(ix)
                .into_iter()
                .map(|d| forest.node(d).id.clone())
                .collect();
            doomed.insert(target.clone());
            let last_root = !forest.has_parent(ix) && forest.roots().len() == 1;

            let deleted = mindmap.delete_node(&target);
            prop_assert_eq!(deleted, !last_root);
            if !deleted {
                prop_assert_eq!(mindmap.graph(), &before);
                return Ok(());
            }

            let after: HashSet<NodeId> = mindmap.nodes().iter().map(|n| n.id.clone()).collect();
            let expected: HashSet<NodeId> = before
                .nodes
                .iter()
                .map(|n| n.id.clone())
                .filter(|id| !doomed.contains(id))
                .collect();
            prop_assert_eq!(after, expected);

            let surviving_edges = before
                .edges
                .iter()
                .filter(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target))
                .count();
            prop_assert_eq!(mindmap.edges().len(), surviving_edges);
        }

        #[test]
        fn prop_history_round_trip(ops in prop::collection::vec(op(), 0..25)) {
            let initial = Mindmap::default().graph().clone();
            let (mut mindmap, committed) = session(&ops);
            let last = mindmap.graph().clone();
            prop_assert_eq!(mindmap.history_len(), committed + 1);

            for _ in 0..committed {
                prop_assert!(mindmap.undo());
            }
            prop_assert!(!mindmap.can_undo());
            prop_assert_eq!(mindmap.graph(), &initial);

            for _ in 0..committed {
                prop_assert!(mindmap.redo());
            }
            prop_assert!(!mindmap.can_redo());
            prop_assert_eq!(mindmap.graph(), &last);
        }
    }

    #[test]
    fn test_undo_after_collapse_scenario() {
        let nodes = vec![
            Node::topic(id("root"), "Root", 0, Position::new(100.0, 100.0)),
            Node::topic(id("child"), "Child", 1, Position::new(350.0, 100.0)),
        ];
        let edges = vec![Edge::link(id("root"), id("child"))];
        let mut mindmap = Mindmap::with_graph(
            Graph::new(nodes, edges),
            Viewport::default(),
            EngineConfig::default(),
        );

        mindmap.set_collapsed(&id("root"), true);
        assert_eq!(mindmap.visibility().visible, HashSet::from([id("root")]));
        assert_eq!(mindmap.visibility().hidden_count(&id("root")), 1);

        mindmap.undo();
        assert_eq!(
            mindmap.visibility().visible,
            HashSet::from([id("root"), id("child")])
        );
    }
}
