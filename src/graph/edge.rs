//! Edge type and related structures.
//!
//! Edges are the parent→child connections of the forest. Each edge has:
//! - A stable identifier, canonically `e<source>-<target>`
//! - Source and target node IDs
//! - Handle identifiers, derived from the endpoints on every commit

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::node::NodeId;

/// Stable edge identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new EdgeId from anything string-like.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The canonical id for an edge between `source` and `target`.
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("e{}-{}", source, target))
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical source handle name for a node.
pub fn source_handle(source: &NodeId) -> String {
    format!("{}-right", source)
}

/// Canonical target handle name for a node.
pub fn target_handle(target: &NodeId) -> String {
    format!("{}-left", target)
}

/// A parent→child edge as stored, rendered and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub source_handle: String,
    #[serde(default)]
    pub target_handle: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub style: Value,
    #[serde(default)]
    pub animated: bool,
    /// Render-facing visibility flag, mirrored from the resolver on commit.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Edge {
    /// Create a parent→child edge with canonical id and handles.
    pub fn link(source: NodeId, target: NodeId) -> Self {
        let mut edge = Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
            source_handle: String::new(),
            target_handle: String::new(),
            kind: None,
            data: Value::Null,
            style: Value::Null,
            animated: false,
            hidden: false,
        };
        edge.normalize_handles();
        edge
    }

    /// Rewrite both handle identifiers to the canonical naming scheme.
    pub fn normalize_handles(&mut self) {
        self.source_handle = source_handle(&self.source);
        self.target_handle = target_handle(&self.target);
    }

    /// Whether this edge touches `id` at either end.
    #[inline]
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}
