//! Document store backed by a directory on the host.
//!
//! Document paths map directly below the root directory, so a simulated card
//! can be inspected (or copied onto a real card) by hand. Like the FAT card,
//! writing does not create missing directories; [`FsStore::provision_slots`]
//! lays out the per-plant directories up front.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error};
use plant_core::plant::PlantId;
use plant_core::storage::{DocumentStore, StorageError};

pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a simulated card at `root`
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the `/plant{id}` directory of every slot
    pub fn provision_slots(&self) -> io::Result<()> {
        for plant_id in PlantId::all() {
            fs::create_dir_all(self.root.join(format!("plant{plant_id}")))?;
        }
        Ok(())
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl DocumentStore for FsStore {
    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        fs::read(self.resolve(path)).map_err(|e| {
            error!("Failed to read {}: {}", path, e);
            StorageError::missing(path)
        })
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        fs::write(self.resolve(path), contents).map_err(|e| {
            error!("Failed to write {}: {}", path, e);
            StorageError::missing(path)
        })?;
        debug!("Wrote {} bytes to {}", contents.len(), path);
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        fs::remove_file(self.resolve(path)).map_err(|e| {
            error!("Failed to remove {}: {}", path, e);
            StorageError::missing(path)
        })
    }

    fn exists(&mut self, path: &str) -> bool {
        self.resolve(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_live_below_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(dir.path()).unwrap();

        store.write("/header.txt", b"{}").unwrap();
        assert!(store.exists("/header.txt"));
        assert_eq!(fs::read(dir.path().join("header.txt")).unwrap(), b"{}");
        assert_eq!(store.read("/header.txt").unwrap(), b"{}");

        store.remove("/header.txt").unwrap();
        assert!(!store.exists("/header.txt"));
        assert_eq!(
            store.read("/header.txt"),
            Err(StorageError::missing("/header.txt"))
        );
    }

    #[test]
    fn test_slot_directories_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsStore::new(dir.path().join("card")).unwrap();

        assert_eq!(
            store.write("/plant1/light.txt", b"[]"),
            Err(StorageError::missing("/plant1/light.txt"))
        );

        store.provision_slots().unwrap();
        store.write("/plant1/light.txt", b"[]").unwrap();
        assert!(store.root().join("plant5").is_dir());
    }
}
