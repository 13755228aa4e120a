use std::io;
use std::path::{Path, PathBuf};

/// Paths COLMAP reads from and writes to inside a dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> PathBuf {
        self.root.join("database.db")
    }

    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn sparse(&self) -> PathBuf {
        self.root.join("sparse")
    }

    /// The first model the mapper writes, which the later steps refine and convert.
    pub fn sparse_model(&self) -> PathBuf {
        self.sparse().join("0")
    }

    /// Creates `sparse/` if it is missing. Returns whether it had to be created.
    pub async fn ensure_sparse_dir(&self) -> io::Result<bool> {
        let sparse = self.sparse();
        if tokio::fs::try_exists(&sparse).await? {
            return Ok(false);
        }
        match tokio::fs::create_dir(&sparse).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let layout = DatasetLayout::new("scenes/plane");
        assert_eq!(layout.database(), Path::new("scenes/plane/database.db"));
        assert_eq!(layout.images(), Path::new("scenes/plane/images"));
        assert_eq!(layout.sparse(), Path::new("scenes/plane/sparse"));
        assert_eq!(layout.sparse_model(), Path::new("scenes/plane/sparse/0"));
    }

    #[tokio::test]
    async fn test_sparse_dir_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());

        assert!(layout.ensure_sparse_dir().await.unwrap());
        assert!(layout.sparse().is_dir());
        assert!(!layout.ensure_sparse_dir().await.unwrap());
        assert!(layout.sparse().is_dir());
    }

    #[tokio::test]
    async fn test_existing_sparse_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        std::fs::create_dir_all(layout.sparse_model()).unwrap();
        std::fs::write(layout.sparse_model().join("cameras.bin"), b"x").unwrap();

        assert!(!layout.ensure_sparse_dir().await.unwrap());
        assert!(layout.sparse_model().join("cameras.bin").exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path().join("does-not-exist"));

        let err = layout.ensure_sparse_dir().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
