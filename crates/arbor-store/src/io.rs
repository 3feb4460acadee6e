use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Abstract interface for the file-system collaborator.
///
/// The core treats this as the sole source of on-disk content; a path not
/// yet cached is always read through here before a tree is built for it.
#[async_trait]
pub trait FileIo: Send + Sync {
    /// Read the entire contents of a file into a string.
    async fn read_file(&self, path: &Path) -> std::io::Result<String>;

    /// List all files with the given extension under the root directory.
    /// This should be a recursive search.
    fn list_files(&self, root: &Path, extension: &str) -> Vec<PathBuf>;
}

/// Standard implementation of FileIo using tokio::fs and walkdir.
pub struct PhysicalFileIo;

#[async_trait]
impl FileIo for PhysicalFileIo {
    async fn read_file(&self, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    fn list_files(&self, root: &Path, extension: &str) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == extension {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }

        files
    }
}
