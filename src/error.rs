//! Error types.
//!
//! Nothing in the engine is fatal. Structural problems in loaded data are
//! sanitized away, and mutations against missing nodes are silent no-ops.
//! These errors only surface at the boundaries: payloads that cannot be
//! decoded at all, and bad configuration.

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors raised at the engine's input boundaries.
#[derive(Debug, Error)]
pub enum MindmapError {
    /// A persisted snapshot could not be parsed as JSON.
    #[error("unreadable snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),

    /// An export/import file could not be parsed, or has no node list.
    #[error("unreadable import file: {0}")]
    Import(String),

    /// An AI suggestion payload did not match the expected schema.
    #[error("malformed suggestion payload: {0}")]
    Suggestion(#[source] serde_json::Error),

    /// Engine configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A value crossing the JS boundary could not be converted.
    #[error("js conversion failed: {0}")]
    Js(String),
}

impl From<serde_wasm_bindgen::Error> for MindmapError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Js(err.to_string())
    }
}

impl From<MindmapError> for JsValue {
    fn from(err: MindmapError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
