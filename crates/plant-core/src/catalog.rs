//! Read-only plant catalog (`/plantDB.txt`)
//!
//! The catalog is generated off-device. Each entry carries requirement values
//! as arrays under `data`, in the order hardiness, light, water:
//!
//! ```text
//! {"plants":[{"id":17,"name":"Snake Plant","scientific_name":"...",
//!   "cultivation_fact":"...","data":[{"value":[10,11]},{"value":[1,2]},{"value":[4]}]}]}
//! ```
//!
//! Only the first and last value of each array are kept.

use alloc::string::String;
use alloc::vec::Vec;

use log::{info, warn};
use serde::Deserialize;

use crate::config::{FACT_LEN, MAX_CATALOG_PLANTS, NAME_LEN};
use crate::evaluation::RequirementRange;
use crate::storage::{CATALOG_PATH, DocumentStore, StorageError, load_json, truncate_into};

const HARDINESS_INDEX: usize = 0;
const LIGHT_INDEX: usize = 1;
const WATER_INDEX: usize = 2;

/// A plant type the user can choose for a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPlant {
    pub id: i32,
    pub common_name: heapless::String<NAME_LEN>,
    pub scientific_name: heapless::String<NAME_LEN>,
    pub fact: heapless::String<FACT_LEN>,
    pub hardiness: RequirementRange,
    pub light_req: RequirementRange,
    pub water_req: RequirementRange,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    plants: Vec<RawPlant>,
}

#[derive(Deserialize)]
struct RawPlant {
    #[serde(default)]
    id: i32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    scientific_name: String,
    #[serde(default)]
    cultivation_fact: String,
    #[serde(default)]
    data: Vec<RawRequirement>,
}

#[derive(Deserialize, Default)]
struct RawRequirement {
    #[serde(default)]
    value: Vec<i32>,
}

/// Reduce a value array to `(first, last)`, with `last = 0` for a single value
fn first_and_last(values: &[i32]) -> RequirementRange {
    match values {
        [] => RequirementRange::default(),
        [only] => RequirementRange::single(*only),
        [first, .., last] => RequirementRange::new(*first, *last),
    }
}

impl From<RawPlant> for CatalogPlant {
    fn from(raw: RawPlant) -> Self {
        let requirement = |index: usize| {
            raw.data
                .get(index)
                .map(|r| first_and_last(&r.value))
                .unwrap_or_default()
        };

        Self {
            id: raw.id,
            common_name: truncate_into(&raw.name),
            scientific_name: truncate_into(&raw.scientific_name),
            fact: truncate_into(&raw.cultivation_fact),
            hardiness: requirement(HARDINESS_INDEX),
            light_req: requirement(LIGHT_INDEX),
            water_req: requirement(WATER_INDEX),
        }
    }
}

/// The plants offered for selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    plants: heapless::Vec<CatalogPlant, MAX_CATALOG_PLANTS>,
}

impl Catalog {
    /// Load the first [`MAX_CATALOG_PLANTS`] entries of the catalog document
    pub fn load<S: DocumentStore + ?Sized>(store: &mut S) -> Result<Self, StorageError> {
        let raw: RawCatalog = load_json(store, CATALOG_PATH)?;
        let total = raw.plants.len();

        let mut plants = heapless::Vec::new();
        for plant in raw.plants.into_iter().take(MAX_CATALOG_PLANTS) {
            // Bounded by the take above
            let _ = plants.push(CatalogPlant::from(plant));
        }

        if total > MAX_CATALOG_PLANTS {
            warn!(
                "Catalog holds {} plants, only the first {} are offered",
                total, MAX_CATALOG_PLANTS
            );
        }
        info!("Loaded {} catalog plants", plants.len());

        Ok(Self { plants })
    }

    pub fn plants(&self) -> &[CatalogPlant] {
        &self.plants
    }

    pub fn get(&self, index: usize) -> Option<&CatalogPlant> {
        self.plants.get(index)
    }

    /// Find a plant by catalog id
    pub fn find(&self, id: i32) -> Option<&CatalogPlant> {
        self.plants.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const CATALOG: &str = r#"{"plants":[
        {"id":17,"name":"Snake Plant","scientific_name":"Dracaena trifasciata",
         "cultivation_fact":"Tolerates neglect.",
         "data":[{"value":[10,11,12]},{"value":[1,2]},{"value":[4]}]},
        {"id":3,"name":"Fern","scientific_name":"Nephrolepis exaltata",
         "cultivation_fact":"Likes humidity.",
         "data":[{"value":[9]},{"value":[1]},{"value":[2,3]}]}
    ]}"#;

    #[test]
    fn test_load_reduces_value_arrays() {
        let mut store = MemoryStore::new();
        store.insert(CATALOG_PATH, CATALOG.as_bytes());
        let catalog = Catalog::load(&mut store).unwrap();

        assert_eq!(catalog.len(), 2);
        let snake = catalog.find(17).unwrap();
        assert_eq!(snake.common_name.as_str(), "Snake Plant");
        assert_eq!(snake.hardiness, RequirementRange::new(10, 12));
        assert_eq!(snake.light_req, RequirementRange::new(1, 2));
        assert_eq!(snake.water_req, RequirementRange::single(4));

        let fern = catalog.get(1).unwrap();
        assert_eq!(fern.id, 3);
        assert_eq!(fern.hardiness, RequirementRange::single(9));
        assert_eq!(fern.water_req, RequirementRange::new(2, 3));
    }

    #[test]
    fn test_load_caps_plant_count() {
        let entry = r#"{"id":1,"name":"A","scientific_name":"B","cultivation_fact":"C","data":[]}"#;
        let entries: Vec<&str> = core::iter::repeat(entry).take(14).collect();
        let json = alloc::format!("{{\"plants\":[{}]}}", entries.join(","));

        let mut store = MemoryStore::new();
        store.insert(CATALOG_PATH, json.as_bytes());
        let catalog = Catalog::load(&mut store).unwrap();
        assert_eq!(catalog.len(), MAX_CATALOG_PLANTS);
        assert_eq!(catalog.plants()[0].light_req, RequirementRange::default());
    }

    #[test]
    fn test_load_errors() {
        let mut store = MemoryStore::new();
        assert_eq!(
            Catalog::load(&mut store),
            Err(StorageError::missing(CATALOG_PATH))
        );

        store.insert(CATALOG_PATH, b"{\"plants\":[{\"id\":\"x\"}]}");
        assert_eq!(
            Catalog::load(&mut store),
            Err(StorageError::parse(CATALOG_PATH))
        );
    }
}
