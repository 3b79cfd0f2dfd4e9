//! Newest-first log of cycle timestamps (`/plant{id}/dates.txt`)
//!
//! The document is a JSON header line followed by raw CRLF-terminated lines:
//!
//! ```text
//! {"numReadings":3}
//! 2025-11-03 09:00:00
//! 2025-11-03 08:00:00
//! 2025-11-03 07:00:00
//! ```
//!
//! The card cannot insert at the head of a file or rename one, so an append
//! builds the new document in memory, writes it to `/plant{id}/tmp.txt`, then
//! copies that back over the original and removes the scratch copy. The copy
//! back is not atomic.
//!
//! `numReadings` stops growing at [`TIMESTAMP_LOG_CAPACITY`], but the existing
//! entries are all carried over on every append. Once the log is full there is
//! therefore one trailing line past `numReadings` that is never read.

use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::TIMESTAMP_LOG_CAPACITY;
use crate::plant::PlantId;
use crate::storage::{DocumentStore, StorageError, timestamp_log_path, timestamp_scratch_path};
use crate::timestamp::Timestamp;

const LINE_END: &str = "\r\n";

#[derive(Serialize, Deserialize)]
struct LogHeader {
    #[serde(rename = "numReadings")]
    count: usize,
}

/// A parsed log document borrowing its entry lines
struct LogContents<'a> {
    count: usize,
    entries: Vec<&'a str>,
}

fn parse_log<'a>(path: &str, bytes: &'a [u8]) -> Result<LogContents<'a>, StorageError> {
    let text = core::str::from_utf8(bytes).map_err(|_| StorageError::parse(path))?;
    let header_end = text.find('}').ok_or_else(|| StorageError::parse(path))?;
    let (header, rest) = text.split_at(header_end + 1);

    let LogHeader { count } = serde_json::from_str(header).map_err(|e| {
        error!("Failed to parse {} header: {}", path, e);
        StorageError::parse(path)
    })?;
    if count > TIMESTAMP_LOG_CAPACITY {
        error!("{} claims {} entries", path, count);
        return Err(StorageError::parse(path));
    }

    let body = rest
        .strip_prefix(LINE_END)
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);
    let entries: Vec<&str> = body.lines().take(count).collect();
    if entries.len() < count || entries.iter().any(|e| e.is_empty()) {
        error!("{} holds fewer than {} entries", path, count);
        return Err(StorageError::parse(path));
    }

    Ok(LogContents { count, entries })
}

fn encode_log<'a>(count: usize, entries: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    let mut doc = String::new();
    // A single usize field always serializes
    if let Ok(header) = serde_json::to_string(&LogHeader { count }) {
        doc.push_str(&header);
    }
    doc.push_str(LINE_END);
    for entry in entries {
        doc.push_str(entry);
        doc.push_str(LINE_END);
    }
    doc.into_bytes()
}

/// Timestamp log operations over a document store
pub struct TimestampLog<'a, S: DocumentStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: DocumentStore + ?Sized> TimestampLog<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Put `timestamp` at the head of the plant's log.
    ///
    /// A failure before the copy back leaves the original untouched.
    pub fn append(&mut self, plant_id: PlantId, timestamp: &Timestamp) -> Result<(), StorageError> {
        let path = timestamp_log_path(plant_id);
        let scratch = timestamp_scratch_path(plant_id);

        let result = self.rewrite(&path, &scratch, timestamp);
        if result.is_err() {
            self.discard_scratch(&scratch);
            return result;
        }

        if let Err(e) = self.store.remove(&scratch) {
            warn!("Could not remove {}: {}", scratch, e);
        }
        result
    }

    fn rewrite(
        &mut self,
        path: &str,
        scratch: &str,
        timestamp: &Timestamp,
    ) -> Result<(), StorageError> {
        let original = self.store.read(path)?;
        let existing = parse_log(path, &original)?;

        let count = (existing.count + 1).min(TIMESTAMP_LOG_CAPACITY);
        let updated = encode_log(
            count,
            core::iter::once(timestamp.as_str()).chain(existing.entries.iter().copied()),
        );

        self.store.write(scratch, &updated)?;
        let staged = self.store.read(scratch)?;
        self.store.write(path, &staged)?;

        info!("Logged {} to {} ({} entries)", timestamp, path, count);
        Ok(())
    }

    fn discard_scratch(&mut self, scratch: &str) {
        if self.store.exists(scratch) {
            if let Err(e) = self.store.remove(scratch) {
                warn!("Could not remove {}: {}", scratch, e);
            }
        }
    }

    /// The readable entries, newest first
    pub fn read(&mut self, plant_id: PlantId) -> Result<Vec<Timestamp>, StorageError> {
        let path = timestamp_log_path(plant_id);
        let contents = self.store.read(&path)?;
        let parsed = parse_log(&path, &contents)?;

        parsed
            .entries
            .iter()
            .map(|entry| {
                Timestamp::parse(entry).map_err(|e| {
                    error!("Bad entry {:?} in {}: {}", entry, path, e);
                    StorageError::parse(&path)
                })
            })
            .collect()
    }

    /// Number of readable entries
    pub fn count(&mut self, plant_id: PlantId) -> Result<usize, StorageError> {
        let path = timestamp_log_path(plant_id);
        let contents = self.store.read(&path)?;
        parse_log(&path, &contents).map(|parsed| parsed.count)
    }

    /// Replace the plant's log with an empty one
    pub fn reset(&mut self, plant_id: PlantId) -> Result<(), StorageError> {
        let path = timestamp_log_path(plant_id);
        debug!("Resetting {}", path);
        self.store.write(&path, &encode_log(0, core::iter::empty()))
    }
}
