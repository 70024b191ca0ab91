//! Graph data structures and operations.
//!
//! The canonical mindmap state is a plain `(nodes, edges)` pair in the
//! persisted shape. Traversals go through [`Forest`], an arena-indexed view
//! built on petgraph's StableGraph, so the engine never recurses over raw
//! vectors.

mod edge;
mod forest;
mod node;
mod store;

pub use edge::{Edge, EdgeId, source_handle, target_handle};
pub use forest::{Forest, retain_forest_edges};
pub use node::{Node, NodeData, NodeId, NodeVariant, Position};
pub use store::{Graph, GraphStore, IdGenerator};
