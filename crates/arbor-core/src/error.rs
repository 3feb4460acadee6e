use std::path::PathBuf;
use thiserror::Error;

/// Recoverable logic errors. State is unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A path was referenced that no tree is cached for.
    #[error("no document tree cached for `{}`", .0.display())]
    UnknownPath(PathBuf),

    /// An operation targeted the current document while none is set.
    #[error("no current document")]
    NoCurrentDocument,

    /// A graph query name that is neither an indexed path nor a tag.
    #[error("`{0}` is neither an indexed path nor a tag")]
    UnknownName(String),
}
