//! Device-wide configuration: compile-time limits and the global header document

use serde::{Deserialize, Serialize};

use crate::plant::{PlantId, bounded_string};
use crate::storage::{DocumentStore, HEADER_PATH, StorageError, load_json, save_json};
use crate::timestamp::Timestamp;

/// Readings kept per metric before the oldest is overwritten
pub const HISTORY_CAPACITY: usize = 200;

/// Cap on the timestamp log's `count` field
pub const TIMESTAMP_LOG_CAPACITY: usize = 200;

/// Number of user plant slots (ids 1 through 5)
pub const MAX_PLANTS: u8 = 5;

/// Catalog entries loaded for plant selection
pub const MAX_CATALOG_PLANTS: usize = 10;

/// Longest common or scientific name
pub const NAME_LEN: usize = 49;

/// Longest cultivation fact
pub const FACT_LEN: usize = 99;

/// Longest date string kept in the header
pub const DATE_LEN: usize = 24;

/// Global header stored at `/header.txt`.
///
/// Missing fields read as zero or empty, matching documents written by older
/// firmware. The thresholds are opaque to the core and only carried through.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Header {
    /// Number of plants in the read-only catalog
    #[serde(rename = "numDBPlants")]
    pub num_db_plants: i32,
    /// Self id of the active plant, 0 when no plant has been set up
    #[serde(rename = "activePlantID")]
    pub active_plant_id: i32,
    /// Time the header was last saved
    #[serde(deserialize_with = "bounded_string")]
    pub date: heapless::String<DATE_LEN>,
    pub light_threshold: i32,
    pub temp_threshold: i32,
    pub water_threshold: i32,
    pub humidity_threshold: i32,
}

impl Header {
    pub fn load<S: DocumentStore + ?Sized>(store: &mut S) -> Result<Self, StorageError> {
        load_json(store, HEADER_PATH)
    }

    pub fn save<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, HEADER_PATH, self)
    }

    /// Active plant slot, `None` if the stored id is not a valid slot
    pub fn active_plant(&self) -> Option<PlantId> {
        u8::try_from(self.active_plant_id)
            .ok()
            .and_then(PlantId::new)
    }

    pub fn set_active_plant(&mut self, plant_id: PlantId) {
        self.active_plant_id = i32::from(plant_id.get());
    }

    /// Parse the stored shutdown date
    pub fn last_shutdown(&self) -> Option<Timestamp> {
        Timestamp::parse(&self.date).ok()
    }

    /// Record `now` as the shutdown date
    pub fn stamp(&mut self, now: &Timestamp) {
        self.date.clear();
        // A timestamp is always shorter than DATE_LEN
        let _ = self.date.push_str(now.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const STORED_HEADER: &str = r#"{"numDBPlants":42,"activePlantID":2,"date":"2025-10-01 18:30:00","lightThreshold":5,"tempThreshold":6,"waterThreshold":7,"humidityThreshold":8}"#;

    #[test]
    fn test_load_existing_header() {
        let mut store = MemoryStore::new();
        store.insert(HEADER_PATH, STORED_HEADER.as_bytes());

        let header = Header::load(&mut store).unwrap();
        assert_eq!(header.num_db_plants, 42);
        assert_eq!(header.active_plant(), PlantId::new(2));
        assert_eq!(header.humidity_threshold, 8);
        assert_eq!(
            header.last_shutdown().unwrap().as_str(),
            "2025-10-01 18:30:00"
        );
    }

    #[test]
    fn test_save_uses_card_field_names() {
        let mut store = MemoryStore::new();
        store.insert(HEADER_PATH, STORED_HEADER.as_bytes());
        let header = Header::load(&mut store).unwrap();
        header.save(&mut store).unwrap();

        let written = core::str::from_utf8(store.get(HEADER_PATH).unwrap()).unwrap();
        assert_eq!(written, STORED_HEADER);
    }

    #[test]
    fn test_missing_fields_default() {
        let mut store = MemoryStore::new();
        store.insert(HEADER_PATH, br#"{"numDBPlants":3}"#);
        let header = Header::load(&mut store).unwrap();
        assert_eq!(header.num_db_plants, 3);
        assert_eq!(header.active_plant(), None);
        assert_eq!(header.last_shutdown(), None);
    }

    #[test]
    fn test_long_date_is_truncated() {
        let mut store = MemoryStore::new();
        store.insert(
            HEADER_PATH,
            br#"{"numDBPlants":3,"date":"Monday 3 November 2025, 08:00:00 UTC"}"#,
        );
        let header = Header::load(&mut store).unwrap();
        assert_eq!(header.num_db_plants, 3);
        assert_eq!(header.date.len(), DATE_LEN);
        assert_eq!(header.last_shutdown(), None);
    }

    #[test]
    fn test_stamp_and_activate() {
        let mut header = Header::default();
        header.set_active_plant(PlantId::new(5).unwrap());
        header.stamp(&Timestamp::parse("2026-03-04 05:06:07").unwrap());
        assert_eq!(header.active_plant_id, 5);
        assert_eq!(header.date.as_str(), "2026-03-04 05:06:07");
    }
}
