//! Per-plant sensor history
//!
//! Each metric has its own rolling store document. A cycle updates them one
//! at a time in [`Metric::ALL`] order, so only one store is in memory at once.
//! There is no journal: when a later document fails, the earlier ones keep
//! the reading they were just given.

use log::{debug, error, info};

use crate::history::{self, RollingAverage};
use crate::metrics::{Averages, Metric, SensorReading};
use crate::plant::PlantId;
use crate::storage::{DocumentStore, StorageError, load_json, metric_path, save_json};
use crate::timestamp::Timestamp;
use crate::timestamp_log::TimestampLog;

/// Result of one recording cycle.
///
/// `averages` holds the recomputed average of every metric that was written
/// before any failure, and the caller's previous average for the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub averages: Averages,
    pub result: Result<(), StorageError>,
}

/// Sensor history operations over a document store
pub struct SensorHistory<'a, S: DocumentStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: DocumentStore + ?Sized> SensorHistory<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Append one reading per metric, then log the cycle's timestamp.
    ///
    /// Stops at the first document that cannot be read, parsed or written.
    pub fn record_cycle(
        &mut self,
        plant_id: PlantId,
        reading: &SensorReading,
        previous: Averages,
        timestamp: &Timestamp,
    ) -> CycleOutcome {
        let mut averages = previous;

        for metric in Metric::ALL {
            match self.append_reading(plant_id, metric, reading.get(metric)) {
                Ok(average) => averages.set(metric, average),
                Err(e) => {
                    error!(
                        "Cycle for plant {} stopped at {}: {}",
                        plant_id,
                        metric.label(),
                        e
                    );
                    return CycleOutcome {
                        averages,
                        result: Err(e),
                    };
                }
            }
        }

        let result = TimestampLog::new(&mut *self.store).append(plant_id, timestamp);
        match &result {
            Ok(()) => info!("Recorded cycle for plant {} at {}", plant_id, timestamp),
            Err(e) => error!("Cycle for plant {} not logged: {}", plant_id, e),
        }

        CycleOutcome { averages, result }
    }

    fn append_reading(
        &mut self,
        plant_id: PlantId,
        metric: Metric,
        value: f32,
    ) -> Result<f32, StorageError> {
        let path = metric_path(plant_id, metric);
        let mut store: RollingAverage = load_json(&mut *self.store, &path)?;
        store.push(value);
        save_json(&mut *self.store, &path, &store)?;

        let average = store.average();
        debug!(
            "{}: {} {} ({} readings, average {})",
            path,
            value,
            metric.unit(),
            store.len(),
            average
        );
        Ok(average)
    }

    /// Load one metric's persisted store
    pub fn load_store(
        &mut self,
        plant_id: PlantId,
        metric: Metric,
    ) -> Result<RollingAverage, StorageError> {
        load_json(&mut *self.store, &metric_path(plant_id, metric))
    }

    /// Empty every metric store and the timestamp log of a slot
    pub fn clear(&mut self, plant_id: PlantId) -> Result<(), StorageError> {
        for metric in Metric::ALL {
            self.store
                .write(&metric_path(plant_id, metric), &history::empty_document())?;
        }
        TimestampLog::new(&mut *self.store).reset(plant_id)?;
        info!("Cleared sensor data for plant {}", plant_id);
        Ok(())
    }
}
