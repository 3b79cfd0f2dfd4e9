//! Session context for the monitoring loop
//!
//! A [`Session`] owns the document store together with everything loaded from
//! it: the header, the active plant and its derived status, plus the error
//! registry. The mode state machine drives it one operation at a time.
//!
//! Storage failures never abort an operation's caller. They are raised in the
//! registry for the status indicator and the session carries on with what it
//! has.

use log::{info, warn};

use crate::catalog::{Catalog, CatalogPlant};
use crate::config::Header;
use crate::errors::ErrorRegistry;
use crate::metrics::SensorReading;
use crate::plant::{PlantId, PlantRecord, PlantStatus};
use crate::sensor_history::SensorHistory;
use crate::storage::{DocumentStore, StorageError};
use crate::timestamp::Timestamp;

pub struct Session<S: DocumentStore> {
    store: S,
    header: Header,
    plant: Option<PlantRecord>,
    status: PlantStatus,
    errors: ErrorRegistry,
}

impl<S: DocumentStore> Session<S> {
    /// Load the header and the active plant.
    ///
    /// A missing or malformed document is raised and replaced by defaults.
    pub fn open(mut store: S) -> Self {
        let mut errors = ErrorRegistry::new();

        let header = Header::load(&mut store).unwrap_or_else(|e| {
            errors.raise_storage(&e);
            Header::default()
        });

        let plant = match header.active_plant() {
            Some(plant_id) => match PlantRecord::load(&mut store, plant_id) {
                Ok(record) => Some(record),
                Err(e) => {
                    errors.raise_storage(&e);
                    None
                }
            },
            None => {
                info!("No plant set up yet");
                None
            }
        };

        let status = plant
            .as_ref()
            .map(PlantStatus::evaluate)
            .unwrap_or_default();

        if let Some(record) = &plant {
            info!(
                "Session opened for plant {} ({})",
                record.self_id, record.common_name
            );
        }

        Self {
            store,
            header,
            plant,
            status,
            errors,
        }
    }

    /// Record one reading for the active plant and re-evaluate it.
    ///
    /// The plant record and header are saved even when the history update
    /// failed partway, so the record matches whatever made it to the card.
    /// The header is stamped with `now` before it is saved. Returns `None`
    /// when no plant is active.
    pub fn run_cycle(&mut self, reading: &SensorReading, now: &Timestamp) -> Option<PlantStatus> {
        let Some(plant) = self.plant.as_mut() else {
            warn!("Skipping cycle, no active plant");
            return None;
        };

        let outcome = SensorHistory::new(&mut self.store).record_cycle(
            plant.self_id,
            reading,
            plant.averages(),
            now,
        );
        if let Err(e) = &outcome.result {
            self.errors.raise_storage(e);
        }

        plant.set_averages(outcome.averages);
        self.status = PlantStatus::evaluate(plant);

        if let Err(e) = plant.save(&mut self.store) {
            self.errors.raise_storage(&e);
        }
        self.header.stamp(now);
        if let Err(e) = self.header.save(&mut self.store) {
            self.errors.raise_storage(&e);
        }

        Some(self.status)
    }

    /// Put a catalog plant in `slot` and make it the active plant.
    ///
    /// The slot's previous sensor data is cleared first. On failure the error
    /// is raised and returned, and the previous active plant stays in place.
    pub fn adopt_plant(&mut self, plant: &CatalogPlant, slot: PlantId) -> Result<(), StorageError> {
        let cleared = SensorHistory::new(&mut self.store).clear(slot);
        self.check(cleared)?;

        let record = PlantRecord::adopt(plant, slot);
        let saved = record.save(&mut self.store);
        self.check(saved)?;

        self.header.set_active_plant(slot);
        let saved = self.header.save(&mut self.store);

        info!("Plant {} is now {}", slot, record.common_name);
        self.status = PlantStatus::evaluate(&record);
        self.plant = Some(record);
        self.check(saved)
    }

    /// Load the catalog for plant selection
    pub fn load_catalog(&mut self) -> Result<Catalog, StorageError> {
        Catalog::load(&mut self.store).inspect_err(|e| self.errors.raise_storage(e))
    }

    /// Stamp the header with the shutdown time and save it
    pub fn shutdown(&mut self, now: &Timestamp) -> Result<(), StorageError> {
        self.header.stamp(now);
        let saved = self.header.save(&mut self.store);
        self.check(saved)
    }

    fn check(&mut self, result: Result<(), StorageError>) -> Result<(), StorageError> {
        if let Err(e) = &result {
            self.errors.raise_storage(e);
        }
        result
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn plant(&self) -> Option<&PlantRecord> {
        self.plant.as_ref()
    }

    pub fn status(&self) -> PlantStatus {
        self.status
    }

    pub fn errors(&self) -> &ErrorRegistry {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorRegistry {
        &mut self.errors
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::evaluation::{RequirementRange, Verdict};
    use crate::storage::{CATALOG_PATH, HEADER_PATH, MemoryStore};
    use crate::timestamp_log::TimestampLog;

    const CATALOG: &str = r#"{"plants":[{"id":17,"name":"Snake Plant","scientific_name":"Dracaena trifasciata","cultivation_fact":"Tolerates neglect.","data":[{"value":[10,11]},{"value":[1,2]},{"value":[4]}]}]}"#;

    fn now() -> Timestamp {
        Timestamp::parse("2025-11-03 08:00:00").unwrap()
    }

    fn slot(id: u8) -> PlantId {
        PlantId::new(id).unwrap()
    }

    fn provisioned_session() -> Session<MemoryStore> {
        let mut store = MemoryStore::new();
        store.insert(HEADER_PATH, br#"{"numDBPlants":1,"activePlantID":0,"date":""}"#);
        store.insert(CATALOG_PATH, CATALOG.as_bytes());

        let mut session = Session::open(store);
        let catalog = session.load_catalog().unwrap();
        session.adopt_plant(&catalog.plants()[0], slot(2)).unwrap();
        session
    }

    #[test]
    fn test_open_empty_card_raises_and_continues() {
        let mut session = Session::open(MemoryStore::new());
        assert_eq!(session.errors().highest_priority(), Some(ErrorKind::FileOperation));
        assert!(session.plant().is_none());
        assert_eq!(session.header(), &Header::default());

        let reading = SensorReading::new(500.0, 3000.0, 45.0, 70.0);
        assert_eq!(session.run_cycle(&reading, &now()), None);
    }

    #[test]
    fn test_open_malformed_header_raises_json() {
        let mut store = MemoryStore::new();
        store.insert(HEADER_PATH, b"{\"numDBPlants\":");
        let session = Session::open(store);
        assert!(session.errors().is_raised(ErrorKind::Json));
    }

    #[test]
    fn test_adopt_then_cycle() {
        let mut session = provisioned_session();
        assert!(session.errors().is_empty());
        assert_eq!(session.header().active_plant(), Some(slot(2)));

        let record = session.plant().unwrap();
        assert_eq!(record.base_id, 17);
        assert_eq!(record.hardiness, RequirementRange::new(10, 11));

        let status = session
            .run_cycle(&SensorReading::new(500.0, 3000.0, 45.0, 70.0), &now())
            .unwrap();
        assert!(status.all_ok());
        assert!(session.errors().is_empty());

        let status = session
            .run_cycle(&SensorReading::new(50_000.0, 3000.0, 45.0, 70.0), &now())
            .unwrap();
        assert_eq!(status.light, Verdict::High);
        assert_eq!(session.status(), status);

        // Reopening picks up the persisted record and averages
        let mut store = session.into_store();
        assert_eq!(TimestampLog::new(&mut store).count(slot(2)).unwrap(), 2);
        let reopened = Session::open(store);
        assert_eq!(reopened.plant().unwrap().avg_light, 25_250.0);
        assert_eq!(reopened.status().light, Verdict::High);
    }

    #[test]
    fn test_cycle_stamps_header() {
        let mut session = provisioned_session();
        session
            .run_cycle(&SensorReading::new(500.0, 3000.0, 45.0, 70.0), &now())
            .unwrap();
        assert_eq!(session.header().last_shutdown(), Some(now()));

        let mut store = session.into_store();
        let header = Header::load(&mut store).unwrap();
        assert_eq!(header.last_shutdown(), Some(now()));
        assert_eq!(header.active_plant(), Some(slot(2)));
    }

    #[test]
    fn test_failed_sensor_read_keeps_plant_loadable() {
        let mut session = provisioned_session();
        session
            .run_cycle(&SensorReading::new(500.0, 3000.0, 45.0, 70.0), &now())
            .unwrap();
        let status = session
            .run_cycle(&SensorReading::new(500.0, 3000.0, f32::NAN, 70.0), &now())
            .unwrap();
        assert_eq!(status.humidity, Verdict::Ok);
        assert_eq!(session.plant().unwrap().avg_humidity, 45.0);

        let reopened = Session::open(session.into_store());
        assert!(reopened.errors().is_empty());
        let plant = reopened.plant().unwrap();
        assert_eq!(plant.self_id, slot(2));
        assert_eq!(plant.avg_humidity, 45.0);
    }

    #[test]
    fn test_partial_cycle_is_saved_and_raised() {
        let mut session = provisioned_session();
        session.store_mut().fail_reads("/plant2/water.txt");

        let status = session
            .run_cycle(&SensorReading::new(20_000.0, 3000.0, 45.0, 70.0), &now())
            .unwrap();
        assert_eq!(status.light, Verdict::High);
        assert_eq!(session.errors().highest_priority(), Some(ErrorKind::FileOperation));

        let mut store = session.into_store();
        store.heal("/plant2/water.txt");
        let saved = PlantRecord::load(&mut store, slot(2)).unwrap();
        assert_eq!(saved.avg_light, 20_000.0);
        assert_eq!(saved.avg_water, 0.0);
    }

    #[test]
    fn test_adopt_failure_keeps_previous_plant() {
        let mut session = provisioned_session();
        let catalog = session.load_catalog().unwrap();
        session.store_mut().fail_writes("/plant3/light.txt");

        let result = session.adopt_plant(&catalog.plants()[0], slot(3));
        assert_eq!(result, Err(StorageError::missing("/plant3/light.txt")));
        assert_eq!(session.plant().unwrap().self_id, slot(2));
        assert_eq!(session.header().active_plant(), Some(slot(2)));
        assert!(session.errors().is_raised(ErrorKind::FileOperation));
    }

    #[test]
    fn test_shutdown_stamps_header() {
        let mut session = provisioned_session();
        session.shutdown(&now()).unwrap();

        let mut store = session.into_store();
        let header = Header::load(&mut store).unwrap();
        assert_eq!(header.last_shutdown(), Some(now()));
        assert_eq!(header.num_db_plants, 1);
    }
}
