//! Plant identity, requirements and rolling averages
//!
//! [`PlantRecord`] is what gets persisted to `/plant{id}/plant.txt`.
//! [`PlantStatus`] holds the verdicts derived from a record and is recomputed
//! every cycle, never written to the card.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::CatalogPlant;
use crate::config::{FACT_LEN, MAX_PLANTS, NAME_LEN};
use crate::evaluation::{
    RequirementRange, Verdict, evaluate_humidity, evaluate_light, evaluate_temperature,
    evaluate_water,
};
use crate::metrics::{Averages, Metric};
use crate::storage::{DocumentStore, StorageError, load_json, plant_record_path, save_json, truncate_into};

/// User plant slot, 1 through [`MAX_PLANTS`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlantId(u8);

impl PlantId {
    pub const fn new(id: u8) -> Option<Self> {
        if id >= 1 && id <= MAX_PLANTS {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Every slot in ascending order
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=MAX_PLANTS).map(Self)
    }
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for PlantId {
    type Error = InvalidPlantId;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id).ok_or(InvalidPlantId(id))
    }
}

impl From<PlantId> for u8 {
    fn from(id: PlantId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidPlantId(pub u8);

impl fmt::Display for InvalidPlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant id {} outside 1..={}", self.0, MAX_PLANTS)
    }
}

/// Read a string field, truncating it to the field's capacity
pub(crate) fn bounded_string<'de, D, const N: usize>(
    deserializer: D,
) -> Result<heapless::String<N>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = alloc::string::String::deserialize(deserializer)?;
    Ok(truncate_into(&raw))
}

/// Read an average, treating `null` or a non-finite value as 0
fn finite_or_zero<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f32>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

fn finite(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Persisted state of the plant occupying a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    #[serde(rename = "selfID")]
    pub self_id: PlantId,
    /// Catalog id of the plant type
    #[serde(rename = "baseID")]
    pub base_id: i32,
    #[serde(deserialize_with = "bounded_string")]
    pub common_name: heapless::String<NAME_LEN>,
    #[serde(deserialize_with = "bounded_string")]
    pub scientific_name: heapless::String<NAME_LEN>,
    #[serde(deserialize_with = "bounded_string")]
    pub fact: heapless::String<FACT_LEN>,
    pub light_req: RequirementRange,
    pub water_req: RequirementRange,
    pub hardiness: RequirementRange,
    #[serde(deserialize_with = "finite_or_zero")]
    pub avg_light: f32,
    #[serde(deserialize_with = "finite_or_zero")]
    pub avg_water: f32,
    #[serde(deserialize_with = "finite_or_zero")]
    pub avg_humidity: f32,
    #[serde(deserialize_with = "finite_or_zero")]
    pub avg_temp: f32,
}

impl PlantRecord {
    /// Fresh record for a slot, copied from a catalog entry with zeroed averages
    pub fn adopt(plant: &CatalogPlant, self_id: PlantId) -> Self {
        Self {
            self_id,
            base_id: plant.id,
            common_name: plant.common_name.clone(),
            scientific_name: plant.scientific_name.clone(),
            fact: plant.fact.clone(),
            light_req: plant.light_req,
            water_req: plant.water_req,
            hardiness: plant.hardiness,
            avg_light: 0.0,
            avg_water: 0.0,
            avg_humidity: 0.0,
            avg_temp: 0.0,
        }
    }

    pub fn load<S: DocumentStore + ?Sized>(
        store: &mut S,
        plant_id: PlantId,
    ) -> Result<Self, StorageError> {
        load_json(store, &plant_record_path(plant_id))
    }

    pub fn save<S: DocumentStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        save_json(store, &plant_record_path(self.self_id), self)
    }

    pub fn averages(&self) -> Averages {
        Averages {
            light: self.avg_light,
            water: self.avg_water,
            humidity: self.avg_humidity,
            temperature: self.avg_temp,
        }
    }

    pub fn set_averages(&mut self, averages: Averages) {
        self.avg_light = finite(averages.light);
        self.avg_water = finite(averages.water);
        self.avg_humidity = finite(averages.humidity);
        self.avg_temp = finite(averages.temperature);
    }
}

/// Verdicts for the active plant, derived from its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlantStatus {
    pub light: Verdict,
    pub water: Verdict,
    pub humidity: Verdict,
    pub temperature: Verdict,
}

impl PlantStatus {
    /// Classify each of the record's averages against its requirements
    pub fn evaluate(record: &PlantRecord) -> Self {
        Self {
            light: evaluate_light(record.light_req, record.avg_light),
            water: evaluate_water(record.water_req, record.avg_water),
            humidity: evaluate_humidity(record.avg_humidity),
            temperature: evaluate_temperature(record.hardiness, record.avg_temp),
        }
    }

    pub const fn get(&self, metric: Metric) -> Verdict {
        match metric {
            Metric::Light => self.light,
            Metric::Water => self.water,
            Metric::Humidity => self.humidity,
            Metric::Temperature => self.temperature,
        }
    }

    /// True when every metric is within range
    pub fn all_ok(&self) -> bool {
        Metric::ALL.iter().all(|&m| self.get(m) == Verdict::Ok)
    }
}
