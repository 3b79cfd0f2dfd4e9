use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::{DocumentStore, StorageError};

/// In-memory document store.
///
/// Used by the host-side tests and anywhere a throwaway namespace is handy.
/// Individual paths can be marked as failing to reproduce a card that rejects
/// an open or a write partway through a cycle.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: BTreeMap<String, Vec<u8>>,
    failing_reads: BTreeSet<String>,
    failing_writes: BTreeSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document in place without going through fault injection
    pub fn insert(&mut self, path: &str, contents: &[u8]) {
        self.documents.insert(path.to_string(), contents.to_vec());
    }

    /// Raw contents of a document, if present
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.documents.get(path).map(Vec::as_slice)
    }

    /// Make every subsequent read of `path` fail as if the document could not be opened
    pub fn fail_reads(&mut self, path: &str) {
        self.failing_reads.insert(path.to_string());
    }

    /// Make every subsequent write or removal of `path` fail
    pub fn fail_writes(&mut self, path: &str) {
        self.failing_writes.insert(path.to_string());
    }

    /// Clear any injected failure for `path`
    pub fn heal(&mut self, path: &str) {
        self.failing_reads.remove(path);
        self.failing_writes.remove(path);
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        if self.failing_reads.contains(path) {
            return Err(StorageError::missing(path));
        }
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::missing(path))
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), StorageError> {
        if self.failing_writes.contains(path) {
            return Err(StorageError::missing(path));
        }
        self.documents.insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        if self.failing_writes.contains(path) {
            return Err(StorageError::missing(path));
        }
        self.documents
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::missing(path))
    }

    fn exists(&mut self, path: &str) -> bool {
        !self.failing_reads.contains(path) && self.documents.contains_key(path)
    }
}
