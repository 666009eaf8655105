use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::warn;
use uuid::Uuid;

/// Stored-file collaborator for complaint/issue images. Paths returned by
/// `store` are opaque references persisted on the record.
pub trait FileStore: Send + Sync {
    fn store(&self, bytes: &[u8]) -> Result<String>;
    fn delete(&self, path: &str) -> Result<()>;
}

/// Local-disk store: one file per upload under a single directory, named
/// by a fresh UUID.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating upload directory {}", root.display()))?;
        Ok(Self { root })
    }
}

impl FileStore for LocalFileStore {
    fn store(&self, bytes: &[u8]) -> Result<String> {
        let name = Uuid::new_v4().to_string();
        let path = self.root.join(&name);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        Ok(name)
    }

    fn delete(&self, path: &str) -> Result<()> {
        // Stored names are always UUIDs; anything else is a traversal attempt.
        if path.parse::<Uuid>().is_err() {
            bail!("invalid stored file name: {path}");
        }
        let full = self.root.join(path);
        fs::remove_file(&full).with_context(|| format!("removing {}", full.display()))?;
        Ok(())
    }
}

/// Image replacement is not transactional with the row update; a failed
/// unlink leaves an orphaned file, which is logged and otherwise ignored.
pub fn remove_best_effort(files: &dyn FileStore, path: &str) {
    if let Err(e) = files.delete(path) {
        warn!("Failed to delete stored file '{}': {:#}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn store_and_delete_round_trip() {
        let dir = tempdir().unwrap();
        let store = LocalFileStore::new(dir.path()).unwrap();

        let name = store.store(b"image bytes").unwrap();
        assert!(dir.path().join(&name).exists());

        store.delete(&name).unwrap();
        assert!(!dir.path().join(&name).exists());
    }

    #[test]
    fn delete_rejects_non_uuid_names() {
        let dir = tempdir().unwrap();
        let store = LocalFileStore::new(dir.path()).unwrap();
        assert!(store.delete("../../etc/passwd").is_err());
    }
}
