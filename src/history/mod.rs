//! Linear undo/redo history of graph snapshots.
//!
//! One [`Snapshot`] per committed mutation. Pushing after an undo drops the
//! redo branch. Each snapshot carries the camera state at commit time, so
//! undo/redo also recentres the viewport.

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Graph, Node};

/// Camera state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Immutable deep copy of `(nodes, edges, viewport)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    viewport: Viewport,
}

impl Snapshot {
    pub fn capture(graph: &Graph, viewport: Viewport) -> Self {
        Self {
            nodes: graph.nodes.clone(),
            edges: graph.edges.clone(),
            viewport,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// A fresh graph value built from this snapshot.
    pub fn to_graph(&self) -> Graph {
        Graph::new(self.nodes.clone(), self.edges.clone())
    }
}

/// Snapshot stack with an index pointer at the current entry.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    /// Oldest entries are evicted past this many. `None` is unbounded.
    capacity: Option<usize>,
}

impl History {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `capacity` entries.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    /// Drop every entry and start over from `initial`.
    pub fn reset(&mut self, initial: Snapshot) {
        self.entries.clear();
        self.entries.push(initial);
        self.index = 0;
    }

    /// Record a new entry. Anything past the current index is discarded.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(snapshot);

        if let Some(capacity) = self.capacity {
            let excess = self.entries.len().saturating_sub(capacity);
            if excess > 0 {
                self.entries.drain(..excess);
            }
        }
        self.index = self.entries.len() - 1;
    }

    /// Step back one entry. `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
