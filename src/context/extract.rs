//! Bounded context extraction around a focus node.

use serde::{Deserialize, Serialize};

use super::AiTurn;
use crate::graph::{Edge, Forest, Node, NodeId};

/// Caps on each context list. These keep the payload under external request
/// limits regardless of graph size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContextBounds {
    pub max_lineage: usize,
    pub max_siblings: usize,
    pub max_children: usize,
    pub max_recent_turns: usize,
}

impl Default for ContextBounds {
    fn default() -> Self {
        Self {
            max_lineage: 5,
            max_siblings: 8,
            max_children: 8,
            max_recent_turns: 3,
        }
    }
}

/// One node as it appears in the context payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextNode {
    pub id: NodeId,
    pub label: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Node> for ContextNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            label: node.data.label.clone(),
            level: node.data.level,
            description: node.data.description.clone(),
        }
    }
}

/// Lineage/sibling/children summary around one node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiContext {
    /// Ancestors, root first. Truncation keeps the nearest ones.
    pub lineage: Vec<ContextNode>,
    pub siblings: Vec<ContextNode>,
    pub children: Vec<ContextNode>,
    pub recent_turns: Vec<AiTurn>,
}

/// Build the context for `focus`. `None` if the node no longer exists.
///
/// Siblings and children skip note nodes.
pub fn extract(
    nodes: &[Node],
    edges: &[Edge],
    focus: &NodeId,
    bounds: &ContextBounds,
    turns: &[AiTurn],
) -> Option<AiContext> {
    let forest = Forest::build(nodes, edges);
    let index = forest.index(focus)?;

    let mut lineage: Vec<ContextNode> = forest
        .ancestors(index)
        .into_iter()
        .take(bounds.max_lineage)
        .map(|ix| forest.node(ix).into())
        .collect();
    lineage.reverse();

    let siblings = forest
        .parent(index)
        .map(|parent| {
            forest
                .children(parent)
                .into_iter()
                .filter(|&ix| ix != index)
                .map(|ix| forest.node(ix))
                .filter(|n| !n.is_note())
                .take(bounds.max_siblings)
                .map(ContextNode::from)
                .collect()
        })
        .unwrap_or_default();

    let children = forest
        .children(index)
        .into_iter()
        .map(|ix| forest.node(ix))
        .filter(|n| !n.is_note())
        .take(bounds.max_children)
        .map(ContextNode::from)
        .collect();

    let skip = turns.len().saturating_sub(bounds.max_recent_turns);
    let recent_turns = turns[skip..].to_vec();

    Some(AiContext {
        lineage,
        siblings,
        children,
        recent_turns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;

    fn node(id: &str, level: u32) -> Node {
        Node::topic(id.into(), id.to_uppercase(), level, Position::default())
    }

    fn link(s: &str, t: &str) -> Edge {
        Edge::link(s.into(), t.into())
    }

    fn ids(list: &[ContextNode]) -> Vec<&str> {
        list.iter().map(|n| n.id.as_str()).collect()
    }

    fn sample() -> (Vec<Node>, Vec<Edge>) {
        // r → a → f → (c1, note), r → a → s1, a → s2
        let mut note = node("note", 3);
        note.variant = crate::graph::NodeVariant::Note;
        let nodes = vec![
            node("r", 0),
            node("a", 1),
            node("f", 2),
            node("s1", 2),
            node("s2", 2),
            node("c1", 3),
            note,
        ];
        let edges = vec![
            link("r", "a"),
            link("a", "s1"),
            link("a", "f"),
            link("a", "s2"),
            link("f", "c1"),
            link("f", "note"),
        ];
        (nodes, edges)
    }

    #[test]
    fn test_extract_shape() {
        let (nodes, edges) = sample();
        let ctx = extract(&nodes, &edges, &"f".into(), &ContextBounds::default(), &[]).unwrap();

        assert_eq!(ids(&ctx.lineage), vec!["r", "a"]);
        assert_eq!(ids(&ctx.siblings), vec!["s1", "s2"]);
        assert_eq!(ids(&ctx.children), vec!["c1"]);
        assert_eq!(ctx.lineage[0].label, "R");
    }

    #[test]
    fn test_missing_focus_is_none() {
        let (nodes, edges) = sample();
        assert!(extract(&nodes, &edges, &"gone".into(), &ContextBounds::default(), &[]).is_none());
    }

    #[test]
    fn test_root_has_no_siblings() {
        let (nodes, edges) = sample();
        let ctx = extract(&nodes, &edges, &"r".into(), &ContextBounds::default(), &[]).unwrap();
        assert!(ctx.lineage.is_empty());
        assert!(ctx.siblings.is_empty());
        assert_eq!(ids(&ctx.children), vec!["a"]);
    }

    #[test]
    fn test_bounds_cap_every_list() {
        let mut nodes = vec![node("r", 0)];
        let mut edges = Vec::new();
        let mut parent = "r".to_string();
        // 10-deep chain ending at "d9"
        for i in 0..10 {
            let id = format!("d{i}");
            nodes.push(node(&id, i + 1));
            edges.push(link(&parent, &id));
            parent = id;
        }
        // 20 children under d9
        for i in 0..20 {
            let id = format!("k{i}");
            nodes.push(node(&id, 11));
            edges.push(link("d9", &id));
        }
        let turns: Vec<AiTurn> = (0..6)
            .map(|i| AiTurn {
                node_id: "d9".into(),
                intent: "expand".into(),
                summary: format!("turn {i}"),
            })
            .collect();

        let bounds = ContextBounds {
            max_lineage: 3,
            max_siblings: 2,
            max_children: 4,
            max_recent_turns: 2,
        };
        let ctx = extract(&nodes, &edges, &"d9".into(), &bounds, &turns).unwrap();
        assert_eq!(ids(&ctx.lineage), vec!["d6", "d7", "d8"]);
        assert_eq!(ctx.children.len(), 4);
        assert_eq!(ctx.recent_turns.len(), 2);
        assert_eq!(ctx.recent_turns[1].summary, "turn 5");

        let ctx = extract(&nodes, &edges, &"k0".into(), &bounds, &turns).unwrap();
        assert_eq!(ids(&ctx.siblings), vec!["k1", "k2"]);
    }
}
