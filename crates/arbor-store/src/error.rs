use std::path::PathBuf;
use thiserror::Error;

use arbor_core::CoreError;

/// Failures surfaced by the coordinator. All recoverable by retrying the
/// originating command with corrected input.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file-I/O collaborator failed; the command aborted without
    /// partially building a tree.
    #[error("failed to read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}
