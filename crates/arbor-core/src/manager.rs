use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::model::{MindNode, OutlineItem, TreePatch};
use crate::tree::DocumentTree;

/// Owns every open document tree, keyed by file path, and tracks which one
/// is current. `current` is a cursor, not ownership: when set it always
/// names a key present in the map.
#[derive(Default)]
pub struct TreeManager {
    trees: HashMap<PathBuf, DocumentTree>,
    current: Option<PathBuf>,
}

impl TreeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh tree for `path`, replacing any existing one.
    pub fn build(&mut self, path: PathBuf, initial: TreePatch) {
        self.trees.insert(path, DocumentTree::build(initial));
    }

    /// Patch the tree at `path`, building it on first use.
    pub fn update(&mut self, path: PathBuf, patch: TreePatch) {
        match self.trees.entry(path) {
            Entry::Occupied(mut entry) => entry.get_mut().update(patch),
            Entry::Vacant(entry) => {
                entry.insert(DocumentTree::build(patch));
            }
        }
    }

    /// Patch whichever tree is current.
    pub fn update_current(&mut self, patch: TreePatch) -> Result<(), CoreError> {
        self.current_tree_mut()?.update(patch);
        Ok(())
    }

    /// Mark an already-built tree as current.
    /// Callers are expected to have built it first.
    pub fn set_tree_from_cached(&mut self, path: &Path) -> Result<(), CoreError> {
        if !self.trees.contains_key(path) {
            return Err(CoreError::UnknownPath(path.to_path_buf()));
        }
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    /// Pure membership test. Callers use it to decide whether a fresh read
    /// from storage is needed before displaying a path.
    pub fn contains_cached(&self, path: &Path) -> bool {
        self.trees.contains_key(path)
    }

    /// Re-key a tree from `old_path` to `new_path`.
    /// Tree identity, content, tags and history are untouched; if the old
    /// path was current, the new path becomes current.
    pub fn move_tree(&mut self, old_path: &Path, new_path: PathBuf) -> Result<(), CoreError> {
        let tree = self
            .trees
            .remove(old_path)
            .ok_or_else(|| CoreError::UnknownPath(old_path.to_path_buf()))?;
        if self.current.as_deref() == Some(old_path) {
            self.current = Some(new_path.clone());
        }
        self.trees.insert(new_path, tree);
        Ok(())
    }

    /// Destroy the tree at `path`. Returns whether one existed.
    pub fn remove(&mut self, path: &Path) -> bool {
        let removed = self.trees.remove(path).is_some();
        if removed && self.current.as_deref() == Some(path) {
            self.current = None;
        }
        removed
    }

    pub fn add_tag(&mut self, name: impl Into<String>) -> Result<(), CoreError> {
        self.current_tree_mut()?.add_tag(name);
        Ok(())
    }

    pub fn remove_tag(&mut self, name: &str) -> Result<(), CoreError> {
        self.current_tree_mut()?.remove_tag(name);
        Ok(())
    }

    /// Undo on the current tree. `Ok(false)` reports the history boundary.
    pub fn undo(&mut self) -> Result<bool, CoreError> {
        Ok(self.current_tree_mut()?.undo())
    }

    /// Redo on the current tree. `Ok(false)` reports the history boundary.
    pub fn redo(&mut self) -> Result<bool, CoreError> {
        Ok(self.current_tree_mut()?.redo())
    }

    pub fn tree(&self, path: &Path) -> Option<&DocumentTree> {
        self.trees.get(path)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn current_tree(&self) -> Option<&DocumentTree> {
        self.trees.get(self.current.as_ref()?)
    }

    fn current_tree_mut(&mut self) -> Result<&mut DocumentTree, CoreError> {
        let path = self.current.as_ref().ok_or(CoreError::NoCurrentDocument)?;
        self.trees
            .get_mut(path)
            .ok_or(CoreError::NoCurrentDocument)
    }

    /// All cached paths, in map order. Sort before relying on the order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.trees.keys().map(PathBuf::as_path)
    }

    // Projections of the current tree. `None` while no document is current.

    pub fn markdown(&self) -> Option<&str> {
        self.current_tree().map(DocumentTree::markdown)
    }

    pub fn mind(&self) -> Option<&MindNode> {
        self.current_tree().map(DocumentTree::mind)
    }

    pub fn outline(&self) -> Option<Vec<OutlineItem>> {
        self.current_tree().map(DocumentTree::outline)
    }

    pub fn tags(&self) -> Option<Vec<&str>> {
        self.current_tree().map(DocumentTree::tags)
    }
}
