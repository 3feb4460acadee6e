//! Arbor Core Library
//!
//! Core logic library containing the document IR: trees, undo history,
//! forest aggregation and the graph index.
//! No IO dependencies, pure logic only.
//!

pub mod config;
pub mod error;
pub mod forest;
pub mod graph;
pub mod manager;
pub mod model;
pub mod parser;
pub mod tree;
pub mod utils;


pub use config::{ArborConfig, ForestConfig};
pub use error::CoreError;
pub use forest::Forest;
pub use graph::{EdgeKind, GraphIndex, GraphLink, GraphNode, GraphScope, NodeCategory};
pub use manager::TreeManager;
pub use model::{FileEntry, MindNode, OutlineItem, TreeId, TreePatch};
pub use tree::DocumentTree;
pub use utils::generate_id;
