use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::CoreError;
use crate::forest::Forest;
use crate::manager::TreeManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeCategory {
    Document,
    Tag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub category: NodeCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeKind {
    /// Document over document: `a.md` is the companion parent of `a/ch1.md`.
    Hierarchy,
    /// Document carries tag.
    Tagged,
    /// Two tags appear on the same document.
    CoOccurs,
}

/// `source`/`target` are indices into `nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    pub kind: EdgeKind,
}

/// Describes which trees and forest to index. Borrowed keys only; the graph
/// never owns document trees.
pub struct GraphScope<'a> {
    pub manager: &'a TreeManager,
    pub forest: Option<&'a Forest>,
}

/// Derived node/edge index over paths and tags.
///
/// Rebuilt wholesale by [`GraphIndex::build_graph`]; there is no partial
/// update. Paths and tags are indexed in sorted order, so identical inputs
/// produce identical graphs.
#[derive(Default)]
pub struct GraphIndex {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    doc_ids: HashMap<String, usize>,
    tag_ids: HashMap<String, usize>,
}

impl GraphIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rebuild from the described source set. Any prior graph is
    /// discarded wholesale.
    pub fn build_graph(&mut self, scope: GraphScope) {
        self.nodes.clear();
        self.links.clear();
        self.doc_ids.clear();
        self.tag_ids.clear();

        let mut paths: BTreeSet<PathBuf> =
            scope.manager.paths().map(Path::to_path_buf).collect();
        if let Some(forest) = scope.forest {
            paths.extend(forest.member_paths().map(Path::to_path_buf));
        }

        // Tags per managed path, in sorted path order.
        let mut tags_by_path: BTreeMap<PathBuf, Vec<String>> = BTreeMap::new();
        let mut all_tags: BTreeSet<String> = BTreeSet::new();
        for path in &paths {
            if let Some(tree) = scope.manager.tree(path) {
                let tags: Vec<String> =
                    tree.tags().iter().map(|t| t.to_string()).collect();
                all_tags.extend(tags.iter().cloned());
                tags_by_path.insert(path.clone(), tags);
            }
        }

        for path in &paths {
            let id = self.nodes.len();
            self.nodes.push(GraphNode {
                name: path.to_string_lossy().to_string(),
                category: NodeCategory::Document,
            });
            self.doc_ids.insert(path.to_string_lossy().to_string(), id);
        }
        for tag in &all_tags {
            let id = self.nodes.len();
            self.nodes.push(GraphNode {
                name: tag.clone(),
                category: NodeCategory::Tag,
            });
            self.tag_ids.insert(tag.clone(), id);
        }

        // Hierarchy: companion parent `a.md` over everything in `a/`.
        for path in &paths {
            let Some(companion) = companion_parent(path) else {
                continue;
            };
            let child = self.doc_ids[&path.to_string_lossy().to_string()];
            if let Some(&parent) = self.doc_ids.get(&companion.to_string_lossy().to_string()) {
                self.links.push(GraphLink {
                    source: parent,
                    target: child,
                    kind: EdgeKind::Hierarchy,
                });
            }
        }

        // Tag assignment and tag co-occurrence.
        let mut seen_pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
        for (path, tags) in &tags_by_path {
            let doc = self.doc_ids[&path.to_string_lossy().to_string()];
            for tag in tags {
                self.links.push(GraphLink {
                    source: doc,
                    target: self.tag_ids[tag],
                    kind: EdgeKind::Tagged,
                });
            }
            for (i, a) in tags.iter().enumerate() {
                for b in tags.iter().skip(i + 1) {
                    let pair = (self.tag_ids[a], self.tag_ids[b]);
                    if seen_pairs.insert(pair) {
                        self.links.push(GraphLink {
                            source: pair.0,
                            target: pair.1,
                            kind: EdgeKind::CoOccurs,
                        });
                    }
                }
            }
        }
    }

    /// Resolve a path string or tag name to its node id. Never mutates.
    pub fn query_node_id(&self, name: &str) -> Result<usize, CoreError> {
        self.doc_ids
            .get(name)
            .or_else(|| self.tag_ids.get(name))
            .copied()
            .ok_or_else(|| CoreError::UnknownName(name.to_string()))
    }

    /// Empty before the first `build_graph` call.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }
}

/// `a/ch1.md` -> `a.md`. `None` when the path has no named parent directory.
fn companion_parent(path: &Path) -> Option<PathBuf> {
    let parent = path.parent()?;
    parent.file_name()?;
    let extension = path.extension()?.to_os_string();
    let mut companion = parent.to_path_buf();
    companion.set_extension(extension);
    Some(companion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreePatch;

    fn manager_with(paths: &[(&str, &str)]) -> TreeManager {
        let mut manager = TreeManager::new();
        for (path, content) in paths {
            manager.build(PathBuf::from(path), TreePatch::Content(content.to_string()));
        }
        manager
    }

    #[test]
    fn test_empty_before_first_build() {
        let graph = GraphIndex::new();
        assert!(graph.nodes().is_empty());
        assert!(graph.links().is_empty());
    }

    #[test]
    fn test_nodes_for_paths_and_tags() {
        let mut manager = manager_with(&[("a.md", "# A"), ("b.md", "# B")]);
        manager.set_tree_from_cached(Path::new("a.md")).unwrap();
        manager.add_tag("todo").unwrap();

        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });

        assert_eq!(graph.nodes().len(), 3);
        assert!(graph.query_node_id("a.md").is_ok());
        assert!(graph.query_node_id("b.md").is_ok());
        assert!(graph.query_node_id("todo").is_ok());
    }

    #[test]
    fn test_unknown_name_reported() {
        let manager = manager_with(&[("a.md", "# A")]);
        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });

        assert!(matches!(
            graph.query_node_id("never-indexed"),
            Err(CoreError::UnknownName(_))
        ));
    }

    #[test]
    fn test_companion_parent_hierarchy_edge() {
        let manager = manager_with(&[("novel.md", "# Novel"), ("novel/ch1.md", "# One")]);
        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });

        let parent = graph.query_node_id("novel.md").unwrap();
        let child = graph.query_node_id("novel/ch1.md").unwrap();
        assert!(graph.links().contains(&GraphLink {
            source: parent,
            target: child,
            kind: EdgeKind::Hierarchy,
        }));
    }

    #[test]
    fn test_tag_edges_and_cooccurrence() {
        let mut manager = manager_with(&[("a.md", "# A")]);
        manager.set_tree_from_cached(Path::new("a.md")).unwrap();
        manager.add_tag("draft").unwrap();
        manager.add_tag("todo").unwrap();

        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });

        let doc = graph.query_node_id("a.md").unwrap();
        let draft = graph.query_node_id("draft").unwrap();
        let todo = graph.query_node_id("todo").unwrap();

        let tagged = graph
            .links()
            .iter()
            .filter(|l| l.kind == EdgeKind::Tagged && l.source == doc)
            .count();
        assert_eq!(tagged, 2);

        assert!(graph.links().contains(&GraphLink {
            source: draft,
            target: todo,
            kind: EdgeKind::CoOccurs,
        }));
    }

    #[test]
    fn test_rebuild_discards_prior_graph() {
        let manager = manager_with(&[("a.md", "# A"), ("b.md", "# B")]);
        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });
        assert_eq!(graph.nodes().len(), 2);

        let smaller = manager_with(&[("c.md", "# C")]);
        graph.build_graph(GraphScope {
            manager: &smaller,
            forest: None,
        });

        assert_eq!(graph.nodes().len(), 1);
        assert!(graph.query_node_id("a.md").is_err());
    }

    #[test]
    fn test_same_input_builds_identical_graph() {
        let mut manager = manager_with(&[("a.md", "# A"), ("a/b.md", "# B")]);
        manager.set_tree_from_cached(Path::new("a.md")).unwrap();
        manager.add_tag("todo").unwrap();

        let mut first = GraphIndex::new();
        first.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });
        let mut second = GraphIndex::new();
        second.build_graph(GraphScope {
            manager: &manager,
            forest: None,
        });

        assert_eq!(first.nodes(), second.nodes());
        assert_eq!(first.links(), second.links());
    }

    #[test]
    fn test_forest_members_become_document_nodes() {
        use crate::model::FileEntry;

        let manager = manager_with(&[("a.md", "# A")]);
        let mut forest = Forest::new();
        forest.update(vec![FileEntry {
            path: PathBuf::from("f.md"),
            content: "# F".to_string(),
        }]);

        let mut graph = GraphIndex::new();
        graph.build_graph(GraphScope {
            manager: &manager,
            forest: Some(&forest),
        });

        assert!(graph.query_node_id("f.md").is_ok());
    }
}
