//! Graph Store - the canonical `(nodes, edges)` pair plus the id generator.

use super::edge::Edge;
use super::node::{Node, NodeId};

/// The canonical graph value handed to and returned from mutators.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Find a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Find a node by id, mutably.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Monotonic node-id generator, scoped to one store instance.
///
/// Emits `node-<n>`. Re-seeded from loaded data so it never hands out an id
/// that already exists.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    const PREFIX: &'static str = "node-";

    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// A generator whose next id is past every `node-<n>` id in `nodes`.
    pub fn seeded_from(nodes: &[Node]) -> Self {
        let mut generator = Self::new();
        generator.observe(nodes);
        generator
    }

    /// Advance past every numeric suffix found in `nodes`.
    pub fn observe(&mut self, nodes: &[Node]) {
        let highest = nodes
            .iter()
            .filter_map(|n| n.id.as_str().strip_prefix(Self::PREFIX))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .max();
        if let Some(highest) = highest {
            self.next = self.next.max(highest.saturating_add(1));
        }
    }

    /// Hand out the next id not present in `taken`.
    ///
    /// Once the counter reaches `u64::MAX` it stops advancing and ids come
    /// from the lowest free suffix instead.
    pub fn next_id(&mut self, taken: &[Node]) -> NodeId {
        loop {
            let id = Self::format(self.next);
            let free = Self::is_free(&id, taken);
            match self.next.checked_add(1) {
                Some(next) => self.next = next,
                None if free => return id,
                None => return Self::lowest_free(taken),
            }
            if free {
                return id;
            }
        }
    }

    fn format(n: u64) -> NodeId {
        NodeId(format!("{}{}", Self::PREFIX, n))
    }

    fn is_free(id: &NodeId, taken: &[Node]) -> bool {
        !taken.iter().any(|n| &n.id == id)
    }

    /// At most `taken.len() + 1` candidates are tried.
    fn lowest_free(taken: &[Node]) -> NodeId {
        let mut n: u64 = 1;
        loop {
            let id = Self::format(n);
            if Self::is_free(&id, taken) {
                return id;
            }
            n = n.saturating_add(1);
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// The canonical state owned by the mutation pipeline.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph,
    ids: IdGenerator,
}

impl GraphStore {
    /// Create a store over an existing graph.
    pub fn new(graph: Graph) -> Self {
        let ids = IdGenerator::seeded_from(&graph.nodes);
        Self { graph, ids }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    /// Split borrow for mutators: the current graph plus the id generator.
    pub fn parts_mut(&mut self) -> (&Graph, &mut IdGenerator) {
        (&self.graph, &mut self.ids)
    }

    /// Replace the canonical graph. Only the pipeline calls this.
    pub(crate) fn replace(&mut self, graph: Graph) {
        self.ids.observe(&graph.nodes);
        self.graph = graph;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;

    #[test]
    fn test_generator_is_monotonic() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(&[]).as_str(), "node-1");
        assert_eq!(ids.next_id(&[]).as_str(), "node-2");
    }

    #[test]
    fn test_generator_seeds_past_existing() {
        let nodes = vec![
            Node::topic("node-7".into(), "a", 0, Position::default()),
            Node::topic("root".into(), "b", 0, Position::default()),
            Node::topic("node-x".into(), "c", 0, Position::default()),
        ];
        let mut ids = IdGenerator::seeded_from(&nodes);
        assert_eq!(ids.next_id(&nodes).as_str(), "node-8");
    }

    #[test]
    fn test_generator_survives_max_suffix() {
        let mut nodes = vec![Node::topic(
            format!("node-{}", u64::MAX).into(),
            "max",
            0,
            Position::default(),
        )];
        let mut ids = IdGenerator::seeded_from(&nodes);

        let first = ids.next_id(&nodes);
        assert_eq!(first.as_str(), "node-1");
        nodes.push(Node::topic(first, "a", 1, Position::default()));
        assert_eq!(ids.next_id(&nodes).as_str(), "node-2");
    }

    #[test]
    fn test_generators_are_independent() {
        let mut first = IdGenerator::new();
        let mut second = IdGenerator::new();
        first.next_id(&[]);
        first.next_id(&[]);
        assert_eq!(second.next_id(&[]).as_str(), "node-1");
    }

    #[test]
    fn test_graph_lookup() {
        let graph = Graph::new(
            vec![Node::topic("a".into(), "A", 0, Position::default())],
            Vec::new(),
        );
        assert!(graph.contains(&"a".into()));
        assert!(graph.node(&"b".into()).is_none());
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }
}
