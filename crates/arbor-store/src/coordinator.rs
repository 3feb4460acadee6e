use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use arbor_core::{
    ArborConfig, FileEntry, Forest, GraphIndex, GraphLink, GraphNode, GraphScope, MindNode,
    OutlineItem, TreeManager, TreePatch,
};

use crate::error::StoreError;
use crate::events::{EventBus, Mode, StoreEvent};
use crate::io::FileIo;

/// What kind of entry the user selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Document,
    /// The settings pseudo-file: bypasses document selection entirely and
    /// only signals a mode change to observers.
    Settings,
}

/// The tree/forest/graph triad as one explicit context object.
/// Constructed once at process start and owned by the [`Coordinator`];
/// there are no hidden global access paths.
pub struct StoreState {
    pub trees: TreeManager,
    pub forest: Forest,
    pub graph: GraphIndex,
}

impl StoreState {
    pub fn new(config: &ArborConfig) -> Self {
        Self {
            trees: TreeManager::new(),
            forest: Forest::with_config(config.forest.clone()),
            graph: GraphIndex::new(),
        }
    }
}

/// The Coordinator is the high-level facade over the core IR.
///
/// # Architecture Decision: Action vs Query Separation
///
/// *   **Actions (Write/Mutation)**: unified here. Everything that mutates
///     state or touches the FileIo collaborator goes through a `Coordinator`
///     method, which also takes care of republishing derived views.
/// *   **Queries (Read)**: access `coordinator.state` directly, or use the
///     convenience projections at the bottom of this impl. Getters never
///     mutate.
pub struct Coordinator {
    pub state: StoreState,
    io: Arc<dyn FileIo>,
    events: EventBus,
    trace_events: bool,
    /// Scope of the last `build_graph` call, so retractions can rebuild.
    graph_scope: Option<bool>,
}

impl Coordinator {
    pub fn new(io: Arc<dyn FileIo>) -> Self {
        Self::with_config(io, ArborConfig::default())
    }

    pub fn with_config(io: Arc<dyn FileIo>, config: ArborConfig) -> Self {
        Self {
            state: StoreState::new(&config),
            io,
            events: EventBus::new(),
            trace_events: config.logging.trace_events,
            graph_scope: None,
        }
    }

    /// Register an observer. Events are fire-and-forget snapshots.
    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&mut self, event: StoreEvent) {
        if self.trace_events {
            debug!("emit {:?}", event);
        }
        self.events.emit(event);
    }

    fn emit_forest_outline(&mut self) {
        let snapshot = self.state.forest.mind().clone();
        self.emit(StoreEvent::ForestOutline(snapshot));
    }

    // ------------------------------------------------------------------------
    // Document commands
    // ------------------------------------------------------------------------

    /// Build a fresh tree for `path` from markdown content.
    pub fn build_from_markdown(&mut self, path: PathBuf, content: String) {
        debug!("build tree for {}", path.display());
        self.state.trees.build(path, TreePatch::Content(content));
    }

    /// Patch a tree from its textual form; the outline is re-derived.
    /// Targets the current document when `path` is `None`.
    pub fn update_by_markdown(
        &mut self,
        path: Option<PathBuf>,
        content: String,
    ) -> Result<(), StoreError> {
        let patch = TreePatch::Content(content);
        match path {
            Some(path) => self.state.trees.update(path, patch),
            None => self.state.trees.update_current(patch)?,
        }
        Ok(())
    }

    /// Patch a tree from its outline form; the text is re-derived.
    /// Targets the current document when `path` is `None`.
    pub fn update_by_mind(
        &mut self,
        path: Option<PathBuf>,
        mind: MindNode,
    ) -> Result<(), StoreError> {
        let patch = TreePatch::Mind(mind);
        match path {
            Some(path) => self.state.trees.update(path, patch),
            None => self.state.trees.update_current(patch)?,
        }
        Ok(())
    }

    /// Make `path` the current document, reading it through the FileIo
    /// collaborator first if no tree is cached for it.
    ///
    /// A read failure aborts the command with an error naming the path; no
    /// partial tree is built and the previous current document stays.
    pub async fn set_current_file(
        &mut self,
        path: &Path,
        kind: FileKind,
    ) -> Result<(), StoreError> {
        if kind == FileKind::Settings {
            self.emit(StoreEvent::ModeChange(Mode::Settings));
            return Ok(());
        }

        if !self.state.trees.contains_cached(path) {
            let content =
                self.io
                    .read_file(path)
                    .await
                    .map_err(|source| StoreError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
            self.build_from_markdown(path.to_path_buf(), content);
        }
        self.state.trees.set_tree_from_cached(path)?;
        Ok(())
    }

    /// Undo on the current document. `Ok(false)` is the history boundary.
    pub fn undo(&mut self) -> Result<bool, StoreError> {
        let moved = self.state.trees.undo()?;
        if !moved {
            warn!("undo: already at oldest state");
        }
        Ok(moved)
    }

    /// Redo on the current document. `Ok(false)` is the history boundary.
    pub fn redo(&mut self) -> Result<bool, StoreError> {
        let moved = self.state.trees.redo()?;
        if !moved {
            warn!("redo: already at newest state");
        }
        Ok(moved)
    }

    pub fn add_tag(&mut self, name: &str) -> Result<(), StoreError> {
        self.state.trees.add_tag(name)?;
        Ok(())
    }

    pub fn remove_tag(&mut self, name: &str) -> Result<(), StoreError> {
        self.state.trees.remove_tag(name)?;
        Ok(())
    }

    /// Re-key a tree after an external move/rename, then notify observers
    /// so other subsystems can re-key their own references.
    pub fn move_file(&mut self, old_path: &Path, new_path: PathBuf) -> Result<(), StoreError> {
        self.state.trees.move_tree(old_path, new_path.clone())?;
        self.emit(StoreEvent::FileMoved {
            old_path: old_path.to_path_buf(),
            new_path,
        });
        Ok(())
    }

    /// Destroy the tree at `path` and retract its forest and graph entries
    /// in the same synchronous step.
    pub fn remove_file(&mut self, path: &Path) {
        debug!("remove {}", path.display());
        self.state.trees.remove(path);

        if self.state.forest.contains(path) {
            self.state.forest.remove(path);
            self.refresh_graph();
            self.emit_forest_outline();
        } else {
            self.refresh_graph();
        }
    }

    // ------------------------------------------------------------------------
    // Forest commands
    // ------------------------------------------------------------------------

    /// Batch build-or-replace of forest member content.
    pub fn update_forest(&mut self, files: Vec<FileEntry>) {
        self.state.forest.update(files);
        self.emit_forest_outline();
    }

    /// Read every eligible path through the collaborator, then apply one
    /// forest batch. A failed read aborts before any member changes.
    pub async fn update_forest_from_paths(
        &mut self,
        paths: &[PathBuf],
    ) -> Result<(), StoreError> {
        let mut files = Vec::new();
        for path in self.state.forest.filter_paths(paths) {
            let content =
                self.io
                    .read_file(&path)
                    .await
                    .map_err(|source| StoreError::Read {
                        path: path.clone(),
                        source,
                    })?;
            files.push(FileEntry { path, content });
        }
        self.update_forest(files);
        Ok(())
    }

    pub fn add_base_to_forest(&mut self, name: &str) {
        self.state.forest.add_base(name);
        self.emit_forest_outline();
    }

    pub fn clear_forest(&mut self) {
        self.state.forest.clear();
        self.emit_forest_outline();
    }

    /// Snapshot of every forest member for the caller to persist.
    pub fn export_all(&self) -> Vec<FileEntry> {
        self.state.forest.export_all()
    }

    // ------------------------------------------------------------------------
    // Graph commands
    // ------------------------------------------------------------------------

    /// Full graph rebuild over the open trees, optionally including the
    /// forest members.
    pub fn build_graph(&mut self, include_forest: bool) {
        self.graph_scope = Some(include_forest);
        self.refresh_graph();
    }

    fn refresh_graph(&mut self) {
        let Some(include_forest) = self.graph_scope else {
            return; // nothing built yet, nothing to retract
        };
        let StoreState {
            trees,
            forest,
            graph,
        } = &mut self.state;
        graph.build_graph(GraphScope {
            manager: trees,
            forest: include_forest.then_some(&*forest),
        });
    }

    pub fn query_node_id(&self, name: &str) -> Result<usize, StoreError> {
        Ok(self.state.graph.query_node_id(name)?)
    }

    // ------------------------------------------------------------------------
    // Read surface (pure projections)
    // ------------------------------------------------------------------------

    pub fn markdown(&self) -> Option<&str> {
        self.state.trees.markdown()
    }

    pub fn mind(&self) -> Option<&MindNode> {
        self.state.trees.mind()
    }

    pub fn outline(&self) -> Option<Vec<OutlineItem>> {
        self.state.trees.outline()
    }

    pub fn tags(&self) -> Option<Vec<&str>> {
        self.state.trees.tags()
    }

    pub fn forest_mind(&self) -> &MindNode {
        self.state.forest.mind()
    }

    pub fn forest_markdown(&self) -> &str {
        self.state.forest.markdown()
    }

    pub fn graph_nodes(&self) -> &[GraphNode] {
        self.state.graph.nodes()
    }

    pub fn graph_links(&self) -> &[GraphLink] {
        self.state.graph.links()
    }
}
