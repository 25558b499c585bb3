use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// 以本機目錄作為 key-value 快照儲存
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_path.join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // 先寫暫存檔再改名，避免中途失敗留下半份快照
        let tmp_path = tmp_path_for(&full_path);
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &full_path).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.base_path.join(path))
            .await
            .unwrap_or(false)
    }
}

/// 在原檔名後加上 `.tmp`，不取代副檔名
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        assert!(!storage.exists("nested/orders.json").await);
        storage
            .write_file("nested/orders.json", b"[]")
            .await
            .unwrap();
        assert!(storage.exists("nested/orders.json").await);
        assert_eq!(storage.read_file("nested/orders.json").await.unwrap(), b"[]");
        assert!(!dir.path().join("nested/orders.json.tmp").exists());
    }

    #[test]
    fn test_tmp_path_keeps_full_file_name() {
        assert_eq!(
            tmp_path_for(Path::new("data/a.json")),
            PathBuf::from("data/a.json.tmp")
        );
        assert_ne!(
            tmp_path_for(Path::new("data/a.json")),
            tmp_path_for(Path::new("data/a.yaml"))
        );
        assert_eq!(
            tmp_path_for(Path::new("data/a.tmp")),
            PathBuf::from("data/a.tmp.tmp")
        );
    }

    #[tokio::test]
    async fn test_write_key_ending_in_tmp() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        storage.write_file("orders.tmp", b"[]").await.unwrap();
        assert_eq!(storage.read_file("orders.tmp").await.unwrap(), b"[]");
        assert!(!dir.path().join("orders.tmp.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        let err = storage.read_file("missing.json").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::StoreError::IoError(_)));
    }
}
