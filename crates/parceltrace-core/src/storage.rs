// ── Persistence ──

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::store::PackageMap;

/// Where tracked packages live between runs. The whole map is written
/// atomically from the caller's perspective -- partial updates are
/// never persisted.
pub trait StorageBackend: Send + Sync {
    fn load_all(&self) -> impl Future<Output = Result<PackageMap, CoreError>> + Send;
    fn save_all(&self, packages: &PackageMap) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// JSON-file backend. A missing file reads as an empty map so a first
/// run needs no setup; parent directories are created on first save.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    async fn load_all(&self) -> Result<PackageMap, CoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(PackageMap::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save_all(&self, packages: &PackageMap) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(packages)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::TrackedPackage;

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("packages.json"));
        assert!(storage.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path().join("nested/dir/packages.json"));

        let mut packages = PackageMap::new();
        let mut pkg = TrackedPackage::new("RR1");
        pkg.name = Some("Books".into());
        packages.insert(pkg.tracking_id.clone(), pkg);

        storage.save_all(&packages).await.unwrap();
        let loaded = storage.load_all().await.unwrap();
        assert_eq!(loaded, packages);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packages.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let err = JsonStorage::new(path).load_all().await.unwrap_err();
        assert!(matches!(err, CoreError::StoreDecode(_)));
    }
}
