//! Collapse/visibility resolution.
//!
//! A node is visible iff no strict ancestor is collapsed. Collapsed nodes
//! record their transitive descendant count, which the canvas shows as a
//! badge when it is non-zero.

use petgraph::stable_graph::NodeIndex;
use std::collections::{HashMap, HashSet};

use crate::graph::{Edge, Forest, Node, NodeId};

/// Result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Visibility {
    /// Ids of every visible node.
    pub visible: HashSet<NodeId>,
    /// Transitive descendant count, recorded for collapsed nodes only
    /// (a collapsed leaf records 0).
    pub hidden_child_count: HashMap<NodeId, usize>,
}

impl Visibility {
    #[inline]
    pub fn is_visible(&self, id: &NodeId) -> bool {
        self.visible.contains(id)
    }

    /// Hidden descendant count for `id`, 0 when not collapsed.
    #[inline]
    pub fn hidden_count(&self, id: &NodeId) -> usize {
        self.hidden_child_count.get(id).copied().unwrap_or(0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(usize),
}

/// Compute the visible node set and hidden-descendant counts.
///
/// Pure: reads the collapse flags, never writes them.
pub fn resolve(nodes: &[Node], edges: &[Edge]) -> Visibility {
    if nodes.is_empty() {
        return Visibility::default();
    }

    let forest = Forest::build(nodes, edges);
    let sizes = subtree_sizes(&forest);

    let mut visibility = Visibility::default();
    let mut visited: HashSet<NodeIndex> = HashSet::with_capacity(forest.len());

    // Identified roots first, then anything a cycle left unreachable.
    let starts = forest.roots().into_iter().chain(forest.indices());
    for start in starts {
        if visited.contains(&start) {
            continue;
        }

        let mut stack = vec![(start, false)];
        while let Some((ix, ancestor_collapsed)) = stack.pop() {
            if !visited.insert(ix) {
                continue;
            }
            let node = forest.node(ix);

            if !ancestor_collapsed {
                visibility.visible.insert(node.id.clone());
            }
            if node.is_collapsed() {
                let size = sizes.get(&ix).copied().unwrap_or(1);
                visibility
                    .hidden_child_count
                    .insert(node.id.clone(), size.saturating_sub(1));
            }

            // Descendants of a collapsed node are still walked so nested
            // collapses keep their counts.
            let hide_below = ancestor_collapsed || node.is_collapsed();
            for child in forest.children(ix).into_iter().rev() {
                stack.push((child, hide_below));
            }
        }
    }

    // Never leave the canvas blank. Every traversal start is visible, so
    // this only fires if that stops holding.
    if visibility.visible.is_empty() {
        log::warn!("visibility resolved to an empty set; showing all {} nodes", nodes.len());
        visibility.visible = nodes.iter().map(|n| n.id.clone()).collect();
    }

    visibility
}

/// Subtree size (self included) for every node, memoized. A node reached
/// while it is still being expanded contributes 0, which breaks cycles.
fn subtree_sizes(forest: &Forest<'_>) -> HashMap<NodeIndex, usize> {
    let mut state: HashMap<NodeIndex, Visit> = HashMap::with_capacity(forest.len());

    for start in forest.indices() {
        if state.contains_key(&start) {
            continue;
        }

        let mut stack = vec![(start, false)];
        while let Some((ix, expanded)) = stack.pop() {
            if expanded {
                let size = 1 + forest
                    .children(ix)
                    .iter()
                    .map(|child| match state.get(child) {
                        Some(Visit::Done(size)) => *size,
                        _ => 0,
                    })
                    .sum::<usize>();
                state.insert(ix, Visit::Done(size));
                continue;
            }

            if state.contains_key(&ix) {
                continue;
            }
            state.insert(ix, Visit::InProgress);
            stack.push((ix, true));
            for child in forest.children(ix) {
                if !state.contains_key(&child) {
                    stack.push((child, false));
                }
            }
        }
    }

    state
        .into_iter()
        .filter_map(|(ix, visit)| match visit {
            Visit::Done(size) => Some((ix, size)),
            Visit::InProgress => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Position;

    fn node(id: &str) -> Node {
        Node::topic(id.into(), id, 0, Position::default())
    }

    fn collapsed(id: &str) -> Node {
        let mut n = node(id);
        n.data.collapsed = true;
        n
    }

    fn link(s: &str, t: &str) -> Edge {
        Edge::link(s.into(), t.into())
    }

    fn ids(v: &Visibility) -> Vec<String> {
        let mut out: Vec<_> = v.visible.iter().map(|id| id.to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_empty_graph() {
        let v = resolve(&[], &[]);
        assert!(v.visible.is_empty());
        assert!(v.hidden_child_count.is_empty());
    }

    #[test]
    fn test_collapsed_root_hides_child() {
        let nodes = vec![collapsed("root"), node("child")];
        let edges = vec![link("root", "child")];
        let v = resolve(&nodes, &edges);

        assert_eq!(ids(&v), vec!["root"]);
        assert_eq!(v.hidden_count(&"root".into()), 1);
    }

    #[test]
    fn test_hidden_count_is_transitive() {
        // a → b → c, a → d
        let nodes = vec![collapsed("a"), node("b"), node("c"), node("d")];
        let edges = vec![link("a", "b"), link("b", "c"), link("a", "d")];
        let v = resolve(&nodes, &edges);

        assert_eq!(ids(&v), vec!["a"]);
        assert_eq!(v.hidden_count(&"a".into()), 3);
    }

    #[test]
    fn test_nested_collapse_keeps_counts() {
        // a(collapsed) → b(collapsed) → c
        let nodes = vec![collapsed("a"), collapsed("b"), node("c")];
        let edges = vec![link("a", "b"), link("b", "c")];
        let v = resolve(&nodes, &edges);

        assert_eq!(ids(&v), vec!["a"]);
        assert_eq!(v.hidden_count(&"a".into()), 2);
        assert_eq!(v.hidden_count(&"b".into()), 1);
    }

    #[test]
    fn test_collapsed_leaf_records_zero() {
        let nodes = vec![node("a"), collapsed("b")];
        let edges = vec![link("a", "b")];
        let v = resolve(&nodes, &edges);

        assert_eq!(ids(&v), vec!["a", "b"]);
        assert_eq!(v.hidden_child_count.get(&"b".into()), Some(&0));
    }

    #[test]
    fn test_collapse_in_middle() {
        // r → a(collapsed) → a1, r → b → b1
        let nodes = vec![node("r"), collapsed("a"), node("a1"), node("b"), node("b1")];
        let edges = vec![link("r", "a"), link("a", "a1"), link("r", "b"), link("b", "b1")];
        let v = resolve(&nodes, &edges);
        assert_eq!(ids(&v), vec!["a", "b", "b1", "r"]);
    }

    #[test]
    fn test_multiple_roots() {
        let nodes = vec![node("a"), node("b"), collapsed("c"), node("d")];
        let edges = vec![link("a", "b"), link("c", "d")];
        let v = resolve(&nodes, &edges);
        assert_eq!(ids(&v), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cycle_is_covered_and_terminates() {
        // x ⇄ y has no root; both still get visited.
        let nodes = vec![node("r"), node("x"), node("y")];
        let edges = vec![link("x", "y"), link("y", "x")];
        let v = resolve(&nodes, &edges);
        assert_eq!(ids(&v), vec!["r", "x", "y"]);
    }

    #[test]
    fn test_collapsed_cycle_keeps_counts_finite() {
        // Pure cycle, both collapsed: the traversal start stays visible
        // and the counts stay finite.
        let nodes = vec![collapsed("x"), collapsed("y")];
        let edges = vec![link("x", "y"), link("y", "x")];
        let v = resolve(&nodes, &edges);
        assert!(!v.visible.is_empty());
        assert!(v.hidden_count(&"x".into()) <= 1);
    }
}
