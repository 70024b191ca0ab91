//! Engine configuration.
//!
//! Every field has a default, so JS callers can pass a partial object (or
//! nothing) to `MindmapWasm.withConfig`.

use serde::{Deserialize, Serialize};

use crate::context::ContextBounds;
use crate::error::MindmapError;
use crate::layout::MindmapLayoutConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Layout spacing and anchors.
    pub layout: MindmapLayoutConfig,
    /// Size caps for the AI context payload.
    pub context: ContextBounds,
    /// Maximum undo entries. `None` keeps every entry.
    pub history_capacity: Option<usize>,
    /// Refuse to delete the last remaining root.
    pub protect_last_root: bool,
    /// Label of the root in a default graph.
    pub default_root_label: String,
    /// Label used when loaded data has none.
    pub placeholder_label: String,
    /// Label of nodes created by add-child without an explicit label.
    pub new_topic_label: String,
    /// How many applied AI turns are remembered for `recentTurns`.
    pub turn_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: MindmapLayoutConfig::default(),
            context: ContextBounds::default(),
            history_capacity: None,
            protect_last_root: true,
            default_root_label: "Central Topic".to_string(),
            placeholder_label: "Untitled".to_string(),
            new_topic_label: "New Topic".to_string(),
            turn_log_capacity: 20,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(text: &str) -> Result<Self, MindmapError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| MindmapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject spacings that would collapse or explode the layout.
    pub fn validate(&self) -> Result<(), MindmapError> {
        let spacings = [
            ("horizontalSpacing", self.layout.horizontal_spacing),
            ("verticalSpacing", self.layout.vertical_spacing),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value <= 0.0 {
                return Err(MindmapError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        let gap = self.layout.tree_gap;
        if !gap.is_finite() || gap < 0.0 {
            return Err(MindmapError::Config(format!("treeGap must be non-negative, got {gap}")));
        }
        if !self.layout.start_x.is_finite() || !self.layout.start_y.is_finite() {
            return Err(MindmapError::Config("layout start must be finite".into()));
        }
        if self.history_capacity == Some(0) {
            return Err(MindmapError::Config("historyCapacity must be at least 1".into()));
        }
        Ok(())
    }
}
