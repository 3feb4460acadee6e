use std::collections::BTreeSet;

use crate::model::{MindNode, OutlineItem, TreeId, TreePatch};
use crate::parser;

/// One live snapshot. Both serializations are stored, but one is always
/// derived from the other at patch time, so they cannot diverge.
#[derive(Debug, Clone)]
struct TreeState {
    markdown: String,
    mind: MindNode,
}

impl TreeState {
    fn from_patch(patch: TreePatch) -> Self {
        let markdown = match patch {
            TreePatch::Content(text) => text,
            TreePatch::Mind(mind) => parser::render_markdown(&mind),
        };
        let mind = parser::parse_mind(&markdown);
        Self { markdown, mind }
    }
}

/// Structural representation of one file's content.
///
/// Owns a linear undo/redo history: `states[cursor]` is the live state,
/// everything before it the undo tail, everything after it the redo tail.
pub struct DocumentTree {
    id: TreeId,
    states: Vec<TreeState>,
    cursor: usize,
    tags: BTreeSet<String>,
}

impl DocumentTree {
    /// Construct a fresh tree; the initial state is the head of history.
    pub fn build(initial: TreePatch) -> Self {
        Self {
            id: TreeId::generate(),
            states: vec![TreeState::from_patch(initial)],
            cursor: 0,
            tags: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Apply a partial patch, making the patched state live.
    /// Any redo tail is discarded.
    pub fn update(&mut self, patch: TreePatch) {
        self.states.truncate(self.cursor + 1);
        self.states.push(TreeState::from_patch(patch));
        self.cursor += 1;
    }

    /// Move the cursor back one state.
    /// Returns `false` when already at the oldest state (reported no-op).
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move the cursor forward one state.
    /// Returns `false` when already at the newest state (reported no-op).
    pub fn redo(&mut self) -> bool {
        if self.cursor + 1 >= self.states.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Idempotent tag insert.
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into());
    }

    /// Idempotent tag remove. Removing an absent tag is a no-op.
    pub fn remove_tag(&mut self, name: &str) {
        self.tags.remove(name);
    }

    fn live(&self) -> &TreeState {
        &self.states[self.cursor]
    }

    pub fn markdown(&self) -> &str {
        &self.live().markdown
    }

    pub fn mind(&self) -> &MindNode {
        &self.live().mind
    }

    pub fn outline(&self) -> Vec<OutlineItem> {
        parser::outline_of(self.mind())
    }

    /// Tags in lexical order.
    pub fn tags(&self) -> Vec<&str> {
        self.tags.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_establishes_single_live_state() {
        let tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        assert_eq!(tree.markdown(), "# A");
        assert_eq!(tree.mind().topic, "A");
        assert!(tree.tags().is_empty());
    }

    #[test]
    fn test_update_then_undo_then_redo() {
        let mut tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        tree.update(TreePatch::Content("# A\n## B".to_string()));

        assert!(tree.undo());
        assert_eq!(tree.markdown(), "# A");

        assert!(tree.redo());
        assert_eq!(tree.markdown(), "# A\n## B");
    }

    #[test]
    fn test_undo_at_oldest_is_noop() {
        let mut tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        assert!(!tree.undo());
        assert_eq!(tree.markdown(), "# A");
    }

    #[test]
    fn test_redo_at_newest_is_noop() {
        let mut tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        tree.update(TreePatch::Content("# B".to_string()));
        assert!(!tree.redo());
        assert_eq!(tree.markdown(), "# B");
    }

    #[test]
    fn test_history_roundtrip() {
        let mut tree = DocumentTree::build(TreePatch::Content("v0".to_string()));
        for i in 1..=5 {
            tree.update(TreePatch::Content(format!("v{}", i)));
        }
        for _ in 0..5 {
            assert!(tree.undo());
        }
        assert_eq!(
            tree.markdown(),
            "v0",
            "equal numbers of updates and undos restore the original state"
        );
    }

    #[test]
    fn test_update_truncates_redo_tail() {
        let mut tree = DocumentTree::build(TreePatch::Content("v0".to_string()));
        tree.update(TreePatch::Content("v1".to_string()));
        tree.update(TreePatch::Content("v2".to_string()));

        assert!(tree.undo());
        assert!(tree.undo());
        tree.update(TreePatch::Content("v1b".to_string()));

        assert!(!tree.redo(), "redo states are discarded by the new edit");
        assert_eq!(tree.markdown(), "v1b");
    }

    #[test]
    fn test_mind_patch_rederives_markdown() {
        let mut tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        let mut mind = tree.mind().clone();
        mind.children.push(MindNode::new("B"));
        tree.update(TreePatch::Mind(mind));

        assert_eq!(tree.markdown(), "# A\n\n## B\n");
        assert_eq!(tree.mind().children[0].topic, "B");
    }

    #[test]
    fn test_serializations_stay_mutually_derivable() {
        let mut tree = DocumentTree::build(TreePatch::Content(
            "# A\n\nalpha\n\n## B\n\nbeta".to_string(),
        ));
        tree.update(TreePatch::Mind(tree.mind().clone()));

        let derived = parser::parse_mind(tree.markdown());
        assert!(tree.mind().same_structure(&derived));
    }

    #[test]
    fn test_tags_add_remove_idempotent() {
        let mut tree = DocumentTree::build(TreePatch::Content(String::new()));
        tree.add_tag("todo");
        tree.add_tag("todo");
        assert_eq!(tree.tags(), vec!["todo"]);

        tree.remove_tag("todo");
        assert!(tree.tags().is_empty());

        // Removing a tag never added is a no-op, not an error.
        tree.remove_tag("missing");
        assert!(tree.tags().is_empty());
    }

    #[test]
    fn test_undo_preserves_tags() {
        let mut tree = DocumentTree::build(TreePatch::Content("# A".to_string()));
        tree.add_tag("draft");
        tree.update(TreePatch::Content("# B".to_string()));
        tree.undo();
        assert_eq!(tree.tags(), vec!["draft"]);
    }
}
