#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::errors::{Result, StageError};

/// Asynchronous byte source for model files and their side buffers.
pub trait AssetReader: Send + Sync {
    /// Reads the resource at `uri`, relative to the reader's root.
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Reads from a directory on the local file system.
#[cfg(not(target_arch = "wasm32"))]
pub struct FileAssetReader {
    root_path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileAssetReader {
    /// `path` may be the root directory or a file inside it.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StageError::AssetNotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory asset table, for hosts that fetch bytes themselves and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetReader {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryAssetReader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uri: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(uri.into(), bytes);
    }

    #[must_use]
    pub fn with(mut self, uri: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(uri, bytes);
        self
    }
}

impl AssetReader for MemoryAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        self.entries
            .get(uri)
            .cloned()
            .ok_or_else(|| StageError::AssetNotFound(uri.to_string()))
    }
}

/// File name part of a path or URL.
#[must_use]
pub fn source_filename(source: &str) -> &str {
    source.rsplit(['/', '\\']).next().unwrap_or(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_filename_strips_directories() {
        assert_eq!(source_filename("assets/models/noah.glb"), "noah.glb");
        assert_eq!(source_filename("noah.glb"), "noah.glb");
    }

    #[tokio::test]
    async fn memory_reader_reports_missing_entries() {
        let reader = MemoryAssetReader::new().with("a.bin", vec![1, 2, 3]);
        assert_eq!(reader.read_bytes("a.bin").await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            reader.read_bytes("b.bin").await,
            Err(StageError::AssetNotFound(_))
        ));
    }
}
