//! AI collaborator contract.
//!
//! The engine never talks to the network. It builds a bounded
//! [`AiRequest`] for the JS side to send, and later applies the decoded
//! [`AiSuggestion`] through the regular mutation pipeline. Each request
//! carries a [`RequestTicket`]; only the most recently issued ticket may
//! apply, so a slow response cannot land after the user moved on.

mod extract;

pub use extract::{AiContext, ContextBounds, ContextNode, extract};

use serde::{Deserialize, Serialize};

use crate::error::MindmapError;
use crate::graph::NodeId;

/// One applied AI exchange, remembered for `recentTurns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiTurn {
    pub node_id: NodeId,
    pub intent: String,
    pub summary: String,
}

/// Identifies one in-flight AI request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTicket {
    pub generation: u64,
    pub node_id: NodeId,
    pub intent: String,
}

/// Issues tickets and decides which responses are stale.
#[derive(Debug, Clone, Default)]
pub struct RequestFence {
    latest: u64,
}

impl RequestFence {
    pub fn issue(&mut self, node_id: NodeId, intent: impl Into<String>) -> RequestTicket {
        self.latest += 1;
        RequestTicket {
            generation: self.latest,
            node_id,
            intent: intent.into(),
        }
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    /// True only for the most recently issued ticket.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.latest && self.latest != 0
    }
}

/// Bounded log of applied turns, oldest first.
#[derive(Debug, Clone, Default)]
pub struct TurnLog {
    turns: Vec<AiTurn>,
    capacity: usize,
}

impl TurnLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, turn: AiTurn) {
        if self.capacity == 0 {
            return;
        }
        let excess = (self.turns.len() + 1).saturating_sub(self.capacity);
        self.turns.drain(..excess);
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[AiTurn] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The payload handed to the external AI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub ticket: RequestTicket,
    pub intent: String,
    /// The focus node's own label/description/level.
    pub node: ContextNode,
    pub context: AiContext,
}

/// One node the collaborator proposes to add under the focus node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionAddition {
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// A proposed change to the focus node itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionUpdate {
    #[serde(default)]
    pub description: Option<String>,
}

/// The collaborator's response. Only `summary` and `additions` are
/// required; an empty `additions` list is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub summary: String,
    pub additions: Vec<SuggestionAddition>,
    #[serde(default)]
    pub updates: Option<Vec<SuggestionUpdate>>,
    #[serde(default)]
    pub follow_up: Option<String>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
}

impl AiSuggestion {
    /// Decode a response body. Schema mismatches are errors the caller
    /// shows to the user; engine state is untouched either way.
    pub fn from_json(text: &str) -> Result<Self, MindmapError> {
        serde_json::from_str(text).map_err(MindmapError::Suggestion)
    }

    /// Additions with a non-blank label.
    pub fn usable_additions(&self) -> impl Iterator<Item = &SuggestionAddition> {
        self.additions.iter().filter(|a| !a.label.trim().is_empty())
    }

    /// The last description update, if any.
    pub fn description_update(&self) -> Option<&str> {
        self.updates
            .as_deref()
            .unwrap_or_default()
            .iter()
            .rev()
            .find_map(|u| u.description.as_deref())
    }
}
