use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ModelFile {
    Cameras,
    Images,
    Points3D,
}

impl ModelFile {
    pub const ALL: [ModelFile; 3] = [Self::Cameras, Self::Images, Self::Points3D];

    fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "cameras" => Some(Self::Cameras),
            "images" => Some(Self::Images),
            "points3D" => Some(Self::Points3D),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ModelFormat {
    Binary,
    Text,
}

impl ModelFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "bin" => Some(Self::Binary),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Which model files a sparse reconstruction directory holds. Contents are never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseModel {
    pub dir: PathBuf,
    pub files: BTreeMap<ModelFile, Vec<ModelFormat>>,
}

impl SparseModel {
    /// Lists the model files in `dir`. A missing directory yields an empty model.
    pub async fn discover(dir: &Path) -> io::Result<Self> {
        let mut model = Self {
            dir: dir.to_path_buf(),
            files: BTreeMap::new(),
        };

        let mut read_dir = match tokio::fs::read_dir(dir).await {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(model),
            Err(err) => return Err(err),
        };

        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let Some(file) = path.file_stem().and_then(|s| s.to_str()).and_then(ModelFile::from_stem) else {
                continue;
            };
            let Some(format) = path.extension().and_then(|e| e.to_str()).and_then(ModelFormat::from_extension) else {
                continue;
            };
            let formats = model.files.entry(file).or_default();
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        Ok(model)
    }

    pub fn has(&self, file: ModelFile, format: ModelFormat) -> bool {
        self.files.get(&file).is_some_and(|formats| formats.contains(&format))
    }

    /// True when cameras, images and points are all present in `format`.
    pub fn is_complete(&self, format: ModelFormat) -> bool {
        ModelFile::ALL.iter().all(|&file| self.has(file, format))
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_text_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cameras.bin", "images.bin", "points3D.bin", "cameras.txt", "images.txt", "points3D.txt", "project.ini"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let model = SparseModel::discover(dir.path()).await.unwrap();
        assert!(model.is_complete(ModelFormat::Binary));
        assert!(model.is_complete(ModelFormat::Text));
        assert_eq!(model.files.len(), 3);
    }

    #[tokio::test]
    async fn test_discover_partial_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cameras.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("images.txt")).unwrap();

        let model = SparseModel::discover(dir.path()).await.unwrap();
        assert!(model.has(ModelFile::Cameras, ModelFormat::Text));
        assert!(!model.has(ModelFile::Images, ModelFormat::Text));
        assert!(!model.is_complete(ModelFormat::Text));
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let model = SparseModel::discover(&dir.path().join("sparse/0")).await.unwrap();
        assert!(model.is_empty());
    }
}
