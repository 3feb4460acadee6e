use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid;

use crate::utils::generate_id;

/// Stable identity of a document tree.
/// Survives path moves; bound to the tree, not to its map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeId(pub uuid::Uuid);

impl TreeId {
    pub(crate) fn generate() -> Self {
        TreeId(uuid::Uuid::new_v4())
    }
}

/// Recursive outline node, the structured ("mind") serialization of a tree.
///
/// `topic` is the node label, `text` the prose attached below the heading.
/// An empty `topic` marks a synthetic container root that does not
/// correspond to a heading of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindNode {
    pub id: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MindNode>,
}

impl MindNode {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            topic: topic.into(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Synthetic container root without a heading of its own.
    pub fn container() -> Self {
        Self::new("")
    }

    pub fn is_container(&self) -> bool {
        self.topic.is_empty()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Structural equality: topics, texts and child order match.
    /// Node ids are regenerated on every derivation and excluded.
    pub fn same_structure(&self, other: &MindNode) -> bool {
        self.topic == other.topic
            && self.text == other.text
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|(a, b)| a.same_structure(b))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Flat projection of one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub level: u8,
    pub text: String,
}

/// Unit of forest batch input and of `export_all` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub content: String,
}

/// A partial update, expressed in whichever form the edit originated from.
/// The counterpart serialization is always re-derived, never supplied.
#[derive(Debug, Clone)]
pub enum TreePatch {
    Content(String),
    Mind(MindNode),
}
