//! Node type and related structures.
//!
//! Nodes are the vertices of the mindmap forest. Each node has:
//! - A stable unique identifier (survives graph mutations and persistence)
//! - A structural `level` (depth) and `collapsed` flag
//! - A derived position (x, y) in canvas space, written by the layout engine
//! - A display payload (label, color, status, ...) the engine never interprets

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable node identifier.
///
/// Persisted ids are arbitrary strings, so this wraps a `String` rather than
/// an index. Freshly created nodes get `node-<n>` ids from the store's
/// [`IdGenerator`](super::IdGenerator).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new NodeId from anything string-like.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Canvas-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node variant. Opaque to layout; notes are excluded from AI context lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeVariant {
    #[default]
    Topic,
    Note,
}

impl NodeVariant {
    /// Parse a persisted `type` tag. Unknown tags fall back to `Topic`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "note" => Self::Note,
            _ => Self::Topic,
        }
    }
}

/// The node payload (`data` in the persisted shape).
///
/// `level`, `collapsed` and `hidden_child_count` are structural; everything
/// else is display payload carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub collapsed: bool,
    /// Derived: transitive descendant count, present only when collapsed and > 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_child_count: Option<usize>,
    /// Explicit sibling order. When absent, edge-list order decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Unknown payload fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeData {
    /// Payload for a freshly created node.
    pub fn with_label(label: impl Into<String>, level: u32) -> Self {
        Self {
            label: label.into(),
            level,
            ..Default::default()
        }
    }
}

/// A mindmap node as stored, rendered and persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type", default)]
    pub variant: NodeVariant,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub style: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Render-facing visibility flag, mirrored from the resolver on commit.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl Node {
    /// Create a topic node with the given label and level at `position`.
    pub fn topic(id: NodeId, label: impl Into<String>, level: u32, position: Position) -> Self {
        Self {
            id,
            variant: NodeVariant::Topic,
            position,
            data: NodeData::with_label(label, level),
            style: Value::Null,
            width: None,
            height: None,
            hidden: false,
        }
    }

    /// Create a note node.
    pub fn note(id: NodeId, text: impl Into<String>, level: u32, position: Position) -> Self {
        Self {
            variant: NodeVariant::Note,
            ..Self::topic(id, text, level, position)
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.data.label
    }

    #[inline]
    pub fn is_note(&self) -> bool {
        self.variant == NodeVariant::Note
    }

    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.data.collapsed
    }
}
