use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Reads inputs and writes downloads relative to a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            Path::new(&self.base_path).join(candidate)
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), full_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_nested() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());

        storage.write_file("out/qr-code.png", b"png").await.unwrap();
        let data = storage.read_file("out/qr-code.png").await.unwrap();
        assert_eq!(data, b"png");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_string_lossy().to_string());
        let err = storage.read_file("nope.pdf").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::CalcError::IoError(_)));
    }
}
