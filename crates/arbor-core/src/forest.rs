use std::path::{Path, PathBuf};

use crate::config::ForestConfig;
use crate::model::{FileEntry, MindNode};
use crate::parser;

/// One member file. The parsed mind is kept per member so the aggregate can
/// be recomputed without re-parsing unchanged content.
struct MemberFile {
    path: PathBuf,
    content: String,
    digest: String,
    mind: MindNode,
    /// Index into `bases`; `None` for members added before any base existed.
    base: Option<usize>,
}

impl MemberFile {
    fn node(&self) -> MindNode {
        // A promoted document root stands for itself; a container root is
        // relabeled with the file stem so the member keeps one node.
        if self.mind.is_container() {
            let stem = self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let mut node = MindNode::new(stem);
            node.text = self.mind.text.clone();
            node.children = self.mind.children.clone();
            node
        } else {
            self.mind.clone()
        }
    }
}

/// Aggregates a subset of files into one combined structural view.
///
/// Membership is ordered (insertion order drives aggregation). Files added
/// after a base grouping node nest under the most recent base; files added
/// while no base exists sit at the top level.
pub struct Forest {
    config: ForestConfig,
    bases: Vec<String>,
    members: Vec<MemberFile>,
    mind: MindNode,
    markdown: String,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self::with_config(ForestConfig::default())
    }

    pub fn with_config(config: ForestConfig) -> Self {
        let mut forest = Self {
            config,
            bases: Vec::new(),
            members: Vec::new(),
            mind: MindNode::container(),
            markdown: String::new(),
        };
        forest.rebuild_aggregates();
        forest
    }

    /// Batch build-or-replace of member file content.
    /// Aggregates are recomputed once, after the whole batch.
    pub fn update(&mut self, files: Vec<FileEntry>) {
        for file in files {
            let digest = parser::compute_digest(&file.content);
            if let Some(index) = self.members.iter().position(|m| m.path == file.path) {
                let member = &mut self.members[index];
                if member.digest == digest {
                    continue; // unchanged, skip the re-parse
                }
                member.mind = parser::parse_mind(&file.content);
                member.content = file.content;
                member.digest = digest;
            } else {
                let mind = parser::parse_mind(&file.content);
                self.members.push(MemberFile {
                    path: file.path,
                    content: file.content,
                    digest,
                    mind,
                    base: self.bases.len().checked_sub(1),
                });
            }
        }
        self.rebuild_aggregates();
    }

    /// Introduce a new top-level grouping node. Does not add file content;
    /// files from subsequent `update` batches nest under it.
    pub fn add_base(&mut self, name: impl Into<String>) {
        self.bases.push(name.into());
        self.rebuild_aggregates();
    }

    /// Drop a member file.
    pub fn remove(&mut self, path: &Path) {
        let before = self.members.len();
        self.members.retain(|m| m.path != path);
        if self.members.len() != before {
            self.rebuild_aggregates();
        }
    }

    /// Empty all membership and reset the aggregates.
    pub fn clear(&mut self) {
        self.bases.clear();
        self.members.clear();
        self.rebuild_aggregates();
    }

    /// Snapshot of every member file for the caller to persist.
    pub fn export_all(&self) -> Vec<FileEntry> {
        self.members
            .iter()
            .map(|m| FileEntry {
                path: m.path.clone(),
                content: m.content.clone(),
            })
            .collect()
    }

    /// Subset of `paths` eligible for inclusion. Pure.
    pub fn filter_paths(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths
            .iter()
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| {
                        self.config
                            .allowed_extensions
                            .iter()
                            .any(|allowed| allowed == ext)
                    })
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    pub fn member_paths(&self) -> impl Iterator<Item = &Path> {
        self.members.iter().map(|m| m.path.as_path())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m.path == path)
    }

    /// The base name a member is grouped under, if any.
    pub fn base_of(&self, path: &Path) -> Option<&str> {
        let member = self.members.iter().find(|m| m.path == path)?;
        member.base.map(|i| self.bases[i].as_str())
    }

    pub fn mind(&self) -> &MindNode {
        &self.mind
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    fn rebuild_aggregates(&mut self) {
        let mut root = MindNode::container();

        let mut base_nodes: Vec<MindNode> = self
            .bases
            .iter()
            .map(|name| MindNode::new(name.as_str()))
            .collect();
        let mut loose = Vec::new();

        for member in &self.members {
            match member.base {
                Some(i) => base_nodes[i].children.push(member.node()),
                None => loose.push(member.node()),
            }
        }

        root.children = loose;
        root.children.extend(base_nodes);
        self.mind = root;

        self.markdown = self
            .members
            .iter()
            .map(|m| m.content.trim_end())
            .filter(|content| !content.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
    }
}
