//! Document storage for plant data
//!
//! Everything the appliance persists lives in a single namespace of small
//! documents on the SD card:
//!
//! ```text
//! /header.txt              global header
//! /plantDB.txt             read-only plant catalog
//! /plant{id}/plant.txt     plant record
//! /plant{id}/light.txt     rolling history, one document per metric
//! /plant{id}/water.txt
//! /plant{id}/humidity.txt
//! /plant{id}/temp.txt
//! /plant{id}/dates.txt     newest-first timestamp log
//! /plant{id}/tmp.txt       scratch copy used while rewriting the log
//! ```
//!
//! Backends implement [`DocumentStore`]. There is exactly one writer and no
//! journal, so every document is written independently of the others.

pub mod memory;
pub mod sd_card;

pub use memory::MemoryStore;
pub use sd_card::SdCardStore;

use alloc::vec::Vec;
use core::fmt::Write;

use log::error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror_no_std::Error;

use crate::metrics::Metric;
use crate::plant::PlantId;

/// Longest document path, "/plant5/humidity.txt" plus headroom
pub const MAX_PATH_LEN: usize = 24;

pub type DocumentPath = heapless::String<MAX_PATH_LEN>;

pub const HEADER_PATH: &str = "/header.txt";
pub const CATALOG_PATH: &str = "/plantDB.txt";

const PLANT_FILE: &str = "plant.txt";
const DATES_FILE: &str = "dates.txt";
const DATES_SCRATCH_FILE: &str = "tmp.txt";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The document could not be opened, created or written
    #[error("Document missing or unwritable: {0}")]
    DocumentMissing(DocumentPath),
    /// The document exists but its contents are malformed
    #[error("Malformed document: {0}")]
    ParseFailure(DocumentPath),
}

impl StorageError {
    pub fn missing(path: &str) -> Self {
        Self::DocumentMissing(to_document_path(path))
    }

    pub fn parse(path: &str) -> Self {
        Self::ParseFailure(to_document_path(path))
    }

    /// Path of the document the error refers to
    pub fn path(&self) -> &str {
        match self {
            Self::DocumentMissing(path) | Self::ParseFailure(path) => path.as_str(),
        }
    }
}

/// A flat namespace of whole documents.
///
/// Reads and writes are synchronous and always cover an entire document. There
/// is no rename and no partial write, so callers needing a two-step update go
/// through a scratch document.
pub trait DocumentStore {
    /// Read the complete contents of a document
    fn read(&mut self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Create the document if needed and replace its contents
    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), StorageError>;

    /// Delete a document
    fn remove(&mut self, path: &str) -> Result<(), StorageError>;

    /// Check whether a document exists
    fn exists(&mut self, path: &str) -> bool;
}

/// Copy `s` into a bounded string, truncating at a character boundary if it does not fit
pub fn truncate_into<const N: usize>(s: &str) -> heapless::String<N> {
    let mut bounded = heapless::String::new();
    for c in s.chars() {
        if bounded.push(c).is_err() {
            break;
        }
    }
    bounded
}

/// Copy a path into a bounded [`DocumentPath`], truncating if it does not fit
pub fn to_document_path(path: &str) -> DocumentPath {
    truncate_into(path)
}

fn plant_document(plant_id: PlantId, file_name: &str) -> DocumentPath {
    let mut path = DocumentPath::new();
    // 8.3 file names always fit
    let _ = write!(path, "/plant{}/{}", plant_id, file_name);
    path
}

/// Path of a metric's rolling history document
pub fn metric_path(plant_id: PlantId, metric: Metric) -> DocumentPath {
    plant_document(plant_id, metric.file_name())
}

pub fn plant_record_path(plant_id: PlantId) -> DocumentPath {
    plant_document(plant_id, PLANT_FILE)
}

pub fn timestamp_log_path(plant_id: PlantId) -> DocumentPath {
    plant_document(plant_id, DATES_FILE)
}

pub fn timestamp_scratch_path(plant_id: PlantId) -> DocumentPath {
    plant_document(plant_id, DATES_SCRATCH_FILE)
}

/// Load a JSON document
pub fn load_json<T, S>(store: &mut S, path: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    let contents = store.read(path)?;
    serde_json::from_slice(&contents).map_err(|e| {
        error!("Failed to parse {}: {}", path, e);
        StorageError::parse(path)
    })
}

/// Serialize a value as JSON and write it as a whole document
pub fn save_json<T, S>(store: &mut S, path: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: DocumentStore + ?Sized,
{
    let contents = serde_json::to_vec(value).map_err(|e| {
        error!("Failed to serialize {}: {}", path, e);
        StorageError::parse(path)
    })?;
    store.write(path, &contents)
}
