//! Mutation pipeline - the only writer of the canonical graph and history.
//!
//! Every structural change is a mutator `(graph, ids) -> Option<Graph>`.
//! `None` is a no-op: no state change, no history entry. A returned graph
//! is settled and committed as a whole:
//!
//! 1. Drop edges that break the forest invariant (dangling, second parent,
//!    cycle).
//! 2. Resolve visibility over the raw next graph.
//! 3. Optionally lay out the visible subset and write the positions back.
//! 4. Mirror visibility onto every node/edge, hidden ones included.
//! 5. Normalize edge handles.
//! 6. Install as canonical state and push a history snapshot, unless a
//!    snapshot is being replayed.

mod ops;

pub use ops::{ApplyOutcome, NodeUpdate};

use crate::config::EngineConfig;
use crate::context::{RequestFence, TurnLog};
use crate::graph::{
    Edge, Graph, GraphStore, IdGenerator, Node, NodeId, Position, retain_forest_edges,
};
use crate::history::{History, Snapshot, Viewport};
use crate::layout::{AnchorMode, MindmapLayout};
use crate::persist;
use crate::spatial::{NodePoint, SpatialIndex};
use crate::visibility::{self, Visibility};

/// Whether a commit reruns the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relayout {
    /// Keep positions (label/color edits).
    Skip,
    /// Relayout the visible subset, keeping roots where they are.
    InPlace,
    /// Relayout the visible subset from the configured start point.
    Fresh,
}

impl Relayout {
    fn anchor(self) -> Option<AnchorMode> {
        match self {
            Self::Skip => None,
            Self::InPlace => Some(AnchorMode::InPlace),
            Self::Fresh => Some(AnchorMode::Fresh),
        }
    }
}

impl From<AnchorMode> for Relayout {
    fn from(mode: AnchorMode) -> Self {
        match mode {
            AnchorMode::InPlace => Self::InPlace,
            AnchorMode::Fresh => Self::Fresh,
        }
    }
}

/// The mindmap editor state: canonical graph, derived views, history.
pub struct Mindmap {
    store: GraphStore,
    visibility: Visibility,
    history: History,
    viewport: Viewport,
    /// Set while a history snapshot is replayed; suppresses pushes.
    replaying: bool,
    layout: MindmapLayout,
    spatial: SpatialIndex,
    fence: RequestFence,
    turns: TurnLog,
    config: EngineConfig,
}

impl Mindmap {
    /// Create an editor over the default single-root graph.
    pub fn new(config: EngineConfig) -> Self {
        let graph = persist::default_graph(&config);
        Self::with_graph(graph, Viewport::default(), config)
    }

    /// Create an editor over an existing graph. The graph is settled
    /// (visibility and handles, no relayout) and becomes history entry 0.
    pub fn with_graph(graph: Graph, viewport: Viewport, config: EngineConfig) -> Self {
        let mut mindmap = Self {
            store: GraphStore::default(),
            visibility: Visibility::default(),
            history: History::with_capacity(config.history_capacity),
            viewport,
            replaying: false,
            layout: MindmapLayout::new(config.layout.clone()),
            spatial: SpatialIndex::new(),
            fence: RequestFence::default(),
            turns: TurnLog::new(config.turn_log_capacity),
            config,
        };
        mindmap.reset_to(graph, viewport);
        mindmap
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Run `mutator` against the current graph and commit its result.
    ///
    /// Returns false (and changes nothing) when the mutator returns `None`.
    pub fn mutate<F>(&mut self, relayout: Relayout, mutator: F) -> bool
    where
        F: FnOnce(&Graph, &mut IdGenerator) -> Option<Graph>,
    {
        let (graph, ids) = self.store.parts_mut();
        let Some(next) = mutator(graph, ids) else {
            return false;
        };
        self.commit(next, relayout);
        true
    }

    /// Settle `graph` without touching any state.
    fn settle(&self, mut graph: Graph, relayout: Relayout) -> (Graph, Visibility) {
        let (edges, dropped) = retain_forest_edges(&graph.nodes, std::mem::take(&mut graph.edges));
        if dropped > 0 {
            log::warn!("pruned {dropped} edges that broke the forest invariant");
        }
        graph.edges = edges;

        let visibility = visibility::resolve(&graph.nodes, &graph.edges);

        if let Some(mode) = relayout.anchor() {
            let (visible_nodes, visible_edges) =
                visibility::visible_subgraph(&graph.nodes, &graph.edges, &visibility);
            let result = self.layout.compute(&visible_nodes, &visible_edges, mode);
            for node in graph.nodes.iter_mut() {
                if let Some(&position) = result.positions.get(&node.id) {
                    node.position = position;
                }
            }
        }

        visibility::apply(&mut graph.nodes, &mut graph.edges, &visibility);
        for edge in graph.edges.iter_mut() {
            edge.normalize_handles();
        }

        (graph, visibility)
    }

    fn commit(&mut self, graph: Graph, relayout: Relayout) {
        let (graph, visibility) = self.settle(graph, relayout);
        self.publish(graph, visibility);
    }

    /// Install an already settled graph and record it.
    fn publish(&mut self, graph: Graph, visibility: Visibility) {
        self.install(graph, visibility);

        if self.replaying {
            return;
        }
        self.history
            .push(Snapshot::capture(self.store.graph(), self.viewport));
        log::debug!(
            "committed {} nodes / {} edges ({} visible), history {}/{}",
            self.store.nodes().len(),
            self.store.edges().len(),
            self.visibility.visible.len(),
            self.history.index() + 1,
            self.history.len()
        );
    }

    fn install(&mut self, graph: Graph, visibility: Visibility) {
        let points = graph
            .nodes
            .iter()
            .filter(|n| !n.hidden)
            .map(|n| NodePoint::new(n.id.clone(), n.position.x, n.position.y))
            .collect();
        self.spatial.rebuild(points);
        self.store.replace(graph);
        self.visibility = visibility;
    }

    /// Replace everything (load): new graph, fresh history, stale tickets.
    fn reset_to(&mut self, graph: Graph, viewport: Viewport) {
        let (graph, visibility) = self.settle(graph, Relayout::Skip);
        self.store = GraphStore::default();
        self.install(graph, visibility);
        self.viewport = viewport;
        self.history
            .reset(Snapshot::capture(self.store.graph(), self.viewport));
        self.fence.invalidate();
        self.turns.clear();
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Step back one committed mutation. False when nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    /// Step forward one committed mutation. False when nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.replaying = true;
        self.viewport = snapshot.viewport();
        self.commit(snapshot.to_graph(), Relayout::Skip);
        self.replaying = false;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Replace the state from a persisted snapshot. Returns false when the
    /// payload was unusable and the default graph was loaded instead.
    pub fn load_json(&mut self, text: &str) -> bool {
        let loaded = persist::load(text, &self.config);
        let viewport = loaded.viewport.unwrap_or_default();
        self.reset_to(loaded.graph, viewport);
        !loaded.fell_back
    }

    /// Serialize the current state in the persisted shape.
    pub fn save_json(&self) -> Result<String, crate::error::MindmapError> {
        persist::save(self.store.graph(), self.viewport)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn graph(&self) -> &Graph {
        self.store.graph()
    }

    pub fn nodes(&self) -> &[Node] {
        self.store.nodes()
    }

    pub fn edges(&self) -> &[Edge] {
        self.store.edges()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.store.graph().node(id)
    }

    /// Nodes the canvas should draw.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &Node> {
        self.store.nodes().iter().filter(|n| !n.hidden)
    }

    /// Edges the canvas should draw.
    pub fn visible_edges(&self) -> impl Iterator<Item = &Edge> {
        self.store.edges().iter().filter(|e| !e.hidden)
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Update the camera. Camera moves are not history entries.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// The visible node nearest to a canvas point, within `radius`.
    pub fn node_at(&self, x: f64, y: f64, radius: f64) -> Option<&NodeId> {
        self.spatial.nearest_within(x, y, radius)
    }

    /// Visible nodes inside a canvas rectangle.
    pub fn nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&NodeId> {
        self.spatial.in_rect(min_x, min_y, max_x, max_y)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of visible node positions.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.visible_nodes().fold(None, |acc, node| {
            let Position { x, y } = node.position;
            Some(match acc {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            })
        })
    }
}

impl Default for Mindmap {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
