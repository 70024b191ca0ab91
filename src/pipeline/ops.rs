//! Editor operations. Each one is a mutator run through [`Mindmap::mutate`],
//! so it either commits fully (one history entry) or changes nothing.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Mindmap, Relayout};
use crate::context::{self, AiRequest, AiSuggestion, AiTurn, ContextNode, RequestTicket};
use crate::error::MindmapError;
use crate::graph::{Edge, Forest, Graph, Node, NodeId, NodeVariant, Position};
use crate::layout::AnchorMode;
use crate::persist;

/// Field-level edit of a node's payload. Absent fields are left alone; an
/// empty string clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
}

impl NodeUpdate {
    /// Apply onto `node`, returning whether anything changed.
    fn apply_to(&self, node: &mut Node, placeholder: &str) -> bool {
        let mut changed = false;
        if let Some(label) = &self.label {
            let label = if label.trim().is_empty() { placeholder } else { label.as_str() };
            if node.data.label != label {
                node.data.label = label.to_string();
                changed = true;
            }
        }
        let optional = [
            (&self.color, &mut node.data.color),
            (&self.status, &mut node.data.status),
            (&self.description, &mut node.data.description),
            (&self.emoji, &mut node.data.emoji),
        ];
        for (update, field) in optional {
            let Some(value) = update else { continue };
            let next = (!value.is_empty()).then(|| value.clone());
            if *field != next {
                *field = next;
                changed = true;
            }
        }
        changed
    }
}

/// What happened to an AI response handed to [`Mindmap::apply_suggestion`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ApplyOutcome {
    /// Committed as one history entry.
    Applied { added: Vec<NodeId>, described: bool },
    /// Valid response with nothing to change.
    Empty,
    /// A newer request was issued since this ticket.
    Stale,
    /// The ticket's node was deleted while the request was in flight.
    NodeMissing,
}

/// A new node placed one column right of its parent. The layout pass
/// moves it into its slot when the parent is visible.
fn child_of(parent: &Node, id: NodeId, variant: NodeVariant, label: String, spacing: f64) -> Node {
    let position = Position::new(parent.position.x + spacing, parent.position.y);
    let level = parent.data.level + 1;
    match variant {
        NodeVariant::Topic => Node::topic(id, label, level, position),
        NodeVariant::Note => Node::note(id, label, level, position),
    }
}

/// Clear `collapsed` on `id` and every ancestor so nodes added under it are
/// visible.
fn expand_path(graph: &mut Graph, id: &NodeId) {
    let path: Vec<NodeId> = {
        let forest = Forest::build(&graph.nodes, &graph.edges);
        let Some(index) = forest.index(id) else {
            return;
        };
        std::iter::once(index)
            .chain(forest.ancestors(index))
            .map(|ix| forest.node(ix))
            .filter(|n| n.is_collapsed())
            .map(|n| n.id.clone())
            .collect()
    };
    for id in &path {
        if let Some(node) = graph.node_mut(id) {
            node.data.collapsed = false;
        }
    }
}

impl Mindmap {
    // =========================================================================
    // Structure
    // =========================================================================

    /// Add a topic under `parent`. Returns the new node's id, or `None` if
    /// the parent does not exist.
    pub fn add_child(&mut self, parent: &NodeId, label: Option<&str>) -> Option<NodeId> {
        let label = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(self.config.new_topic_label.as_str())
            .to_string();
        self.add_under(parent, NodeVariant::Topic, label)
    }

    /// Add a note under `parent`.
    pub fn add_note(&mut self, parent: &NodeId, text: &str) -> Option<NodeId> {
        self.add_under(parent, NodeVariant::Note, text.to_string())
    }

    fn add_under(&mut self, parent: &NodeId, variant: NodeVariant, label: String) -> Option<NodeId> {
        let spacing = self.config.layout.horizontal_spacing;
        let mut created = None;
        self.mutate(Relayout::InPlace, |graph, ids| {
            let parent_node = graph.node(parent)?;
            let id = ids.next_id(&graph.nodes);
            let child = child_of(parent_node, id.clone(), variant, label, spacing);

            let mut next = graph.clone();
            expand_path(&mut next, parent);
            next.nodes.push(child);
            next.edges.push(Edge::link(parent.clone(), id.clone()));
            created = Some(id);
            Some(next)
        });
        created
    }

    /// Add a new level-0 node. Without a position it goes below the lowest
    /// node, at the configured start column.
    pub fn add_root(&mut self, label: Option<&str>, position: Option<Position>) -> NodeId {
        let label = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(self.config.new_topic_label.as_str())
            .to_string();
        let start = Position::new(self.config.layout.start_x, self.config.layout.start_y);
        let step = self.config.layout.vertical_spacing;

        let (graph, ids) = self.store.parts_mut();
        let id = ids.next_id(&graph.nodes);
        self.mutate(Relayout::Skip, |graph, _| {
            let position = position.unwrap_or_else(|| {
                graph
                    .nodes
                    .iter()
                    .map(|n| n.position.y)
                    .reduce(f64::max)
                    .map_or(start, |lowest| Position::new(start.x, lowest + step * 2.0))
            });
            let mut next = graph.clone();
            next.nodes.push(Node::topic(id.clone(), label, 0, position));
            Some(next)
        });
        id
    }

    /// Remove `id` and its whole subtree, plus every incident edge.
    ///
    /// The last remaining root is kept when `protect_last_root` is set.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        let protect = self.config.protect_last_root;
        self.mutate(Relayout::InPlace, |graph, _| {
            let forest = Forest::build(&graph.nodes, &graph.edges);
            let index = forest.index(id)?;
            if protect && !forest.has_parent(index) && forest.roots().len() <= 1 {
                log::info!("refusing to delete the last root {id}");
                return None;
            }

            let mut doomed: HashSet<&NodeId> = forest
                .descendants(index)
                .into_iter()
                .map(|ix| &forest.node(ix).id)
                .collect();
            doomed.insert(id);

            let nodes = graph
                .nodes
                .iter()
                .filter(|n| !doomed.contains(&n.id))
                .cloned()
                .collect();
            let edges = graph
                .edges
                .iter()
                .filter(|e| !doomed.contains(&e.source) && !doomed.contains(&e.target))
                .cloned()
                .collect();
            Some(Graph::new(nodes, edges))
        })
    }

    /// Edit payload fields. Positions are kept; unchanged values are a no-op.
    pub fn update_node(&mut self, id: &NodeId, update: &NodeUpdate) -> bool {
        let placeholder = self.config.placeholder_label.clone();
        self.mutate(Relayout::Skip, |graph, _| {
            let mut next = graph.clone();
            let node = next.node_mut(id)?;
            update.apply_to(node, &placeholder).then_some(next)
        })
    }

    // =========================================================================
    // Collapse
    // =========================================================================

    pub fn set_collapsed(&mut self, id: &NodeId, collapsed: bool) -> bool {
        self.mutate(Relayout::InPlace, |graph, _| {
            if graph.node(id)?.data.collapsed == collapsed {
                return None;
            }
            let mut next = graph.clone();
            next.node_mut(id)?.data.collapsed = collapsed;
            Some(next)
        })
    }

    pub fn toggle_collapse(&mut self, id: &NodeId) -> bool {
        match self.node(id) {
            Some(node) => {
                let collapsed = !node.data.collapsed;
                self.set_collapsed(id, collapsed)
            }
            None => false,
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Explicit auto-layout. A no-op when positions would not change.
    pub fn relayout(&mut self, mode: AnchorMode) -> bool {
        let (settled, visibility) = self.settle(self.store.graph().clone(), mode.into());
        if &settled == self.store.graph() {
            return false;
        }
        self.publish(settled, visibility);
        true
    }

    // =========================================================================
    // Import / Export
    // =========================================================================

    /// The flattened export file.
    pub fn export_json(&self) -> Result<String, MindmapError> {
        persist::export(self.store.graph())
    }

    /// Replace the graph from an export file as one undoable step. Positions
    /// are rebuilt by a fresh layout.
    pub fn import_json(&mut self, text: &str) -> Result<(), MindmapError> {
        let graph = persist::import(text, &self.config)?;
        log::info!("importing {} nodes / {} edges", graph.node_count(), graph.edge_count());
        self.mutate(Relayout::Fresh, |_, _| Some(graph));
        self.fence.invalidate();
        Ok(())
    }

    // =========================================================================
    // AI Collaboration
    // =========================================================================

    /// Build the bounded request for `node` and issue a ticket for it.
    /// `None` (and no ticket) if the node does not exist.
    pub fn build_context(&mut self, node: &NodeId, intent: &str) -> Option<AiRequest> {
        let store = self.store.graph();
        let context = context::extract(
            &store.nodes,
            &store.edges,
            node,
            &self.config.context,
            self.turns.turns(),
        )?;
        let focus = ContextNode::from(store.node(node)?);
        let ticket = self.fence.issue(node.clone(), intent);
        Some(AiRequest {
            ticket,
            intent: intent.to_string(),
            node: focus,
            context,
        })
    }

    /// Apply a collaborator response. Only the latest ticket applies; the
    /// ticket is consumed either way.
    pub fn apply_suggestion(
        &mut self,
        ticket: &RequestTicket,
        suggestion: &AiSuggestion,
    ) -> ApplyOutcome {
        if !self.fence.is_current(ticket) {
            log::warn!(
                "dropping stale suggestion for {} (generation {})",
                ticket.node_id,
                ticket.generation
            );
            return ApplyOutcome::Stale;
        }
        self.fence.invalidate();

        if self.node(&ticket.node_id).is_none() {
            log::warn!("dropping suggestion for deleted node {}", ticket.node_id);
            return ApplyOutcome::NodeMissing;
        }

        self.turns.record(AiTurn {
            node_id: ticket.node_id.clone(),
            intent: ticket.intent.clone(),
            summary: suggestion.summary.clone(),
        });

        let description = suggestion.description_update().map(str::to_string);
        let spacing = self.config.layout.horizontal_spacing;
        let mut added = Vec::new();
        let mut described = false;

        self.mutate(Relayout::InPlace, |graph, ids| {
            let mut next = graph.clone();
            let parent = next.node_mut(&ticket.node_id)?;
            if let Some(description) = description
                && parent.data.description.as_deref() != Some(description.as_str())
            {
                parent.data.description = Some(description);
                described = true;
            }
            let parent = parent.clone();

            for addition in suggestion.usable_additions() {
                let id = ids.next_id(&next.nodes);
                let mut child = child_of(
                    &parent,
                    id.clone(),
                    NodeVariant::Topic,
                    addition.label.trim().to_string(),
                    spacing,
                );
                child.data.description = addition.description.clone();
                child.data.emoji = addition.emoji.clone();
                next.nodes.push(child);
                next.edges.push(Edge::link(parent.id.clone(), id.clone()));
                added.push(id);
            }

            if added.is_empty() && !described {
                return None;
            }
            if !added.is_empty() {
                expand_path(&mut next, &ticket.node_id);
            }
            Some(next)
        });

        if added.is_empty() && !described {
            return ApplyOutcome::Empty;
        }
        ApplyOutcome::Applied { added, described }
    }
}
