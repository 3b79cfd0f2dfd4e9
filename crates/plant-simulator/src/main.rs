//! Host simulator for the plant-saver monitoring core.
//!
//! Runs monitoring cycles with synthetic sensor readings against a directory
//! that stands in for the SD card. An empty directory is provisioned with a
//! header, a small catalog and the per-plant slot directories, and the first
//! catalog plant is adopted into slot 1.
//!
//! # Usage
//! ```bash
//! RUST_LOG=info plant-simulator --cycles 48 --interval-minutes 30 ./sim-card
//! ```

mod fs_store;

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::{info, warn};

use plant_core::config::Header;
use plant_core::metrics::{Metric, SensorReading};
use plant_core::plant::{PlantId, PlantStatus};
use plant_core::session::Session;
use plant_core::storage::{CATALOG_PATH, DocumentStore, HEADER_PATH};
use plant_core::timestamp::{Clock, Timestamp};

use fs_store::FsStore;

/// Catalog written to a fresh simulated card
const SAMPLE_CATALOG: &str = r#"{"plants":[
{"id":1,"name":"Snake Plant","scientific_name":"Dracaena trifasciata","cultivation_fact":"Stores water in its leaves and tolerates weeks without watering.","data":[{"value":[10,11]},{"value":[1,2]},{"value":[4]}]},
{"id":2,"name":"Boston Fern","scientific_name":"Nephrolepis exaltata","cultivation_fact":"Prefers consistently damp soil and high humidity.","data":[{"value":[9,10,11]},{"value":[1]},{"value":[2,3]}]},
{"id":3,"name":"Jade Plant","scientific_name":"Crassula ovata","cultivation_fact":"Needs bright light and should dry out between waterings.","data":[{"value":[10,11]},{"value":[2,3]},{"value":[4]}]}
]}"#;

const SAMPLE_CATALOG_SIZE: i32 = 3;

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "plant-simulator")]
#[command(about = "Run plant-saver monitoring cycles against a simulated SD card")]
#[command(version)]
struct Args {
    /// Directory standing in for the SD card
    #[arg(env = "PLANT_SIM_DIR", default_value = "sim-card")]
    data_dir: PathBuf,

    /// Number of monitoring cycles to run
    #[arg(short, long, default_value = "24")]
    cycles: u32,

    /// Simulated minutes between cycles
    #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..=1440))]
    interval_minutes: u64,

    /// Slot the sample plant is adopted into on a fresh card
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=5))]
    slot: u8,

    /// Catalog entry adopted on a fresh card
    #[arg(long, default_value = "0")]
    catalog_index: usize,
}

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic readings following a day/night cycle.
struct MockSensorGenerator {
    /// Simulated hours since the first reading
    elapsed_hours: f64,
}

impl MockSensorGenerator {
    fn new() -> Self {
        Self { elapsed_hours: 0.0 }
    }

    /// Advance the internal clock and return a new reading.
    fn next_reading(&mut self, dt_hours: f64) -> SensorReading {
        self.elapsed_hours += dt_hours;
        let t = self.elapsed_hours;
        let day_phase = (t / 24.0) * std::f64::consts::TAU;

        // Light: dark at night, up to ~9000 lux around midday
        let light = (9000.0 * day_phase.sin()).max(0.0) + 20.0 * (t / 3.0).cos().abs();

        // Soil dries out between waterings every 4 days (higher raw = drier)
        let water = 1200.0 + 2400.0 * ((t / 96.0).fract());

        // Humidity: 35-65 %RH, lowest in the afternoon
        let humidity = 50.0 - 15.0 * day_phase.sin();

        // Temperature: 62-78 °F
        let temperature = 70.0 + 8.0 * (day_phase - 1.0).sin();

        SensorReading::new(
            light as f32,
            water as f32,
            humidity as f32,
            temperature as f32,
        )
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Wall clock that jumps forward a fixed step per cycle.
struct SimulatedClock {
    unix_secs: u64,
    step_secs: u64,
    current: Timestamp,
}

impl SimulatedClock {
    fn starting_now(step_secs: u64) -> Result<Self> {
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(Self {
            unix_secs,
            step_secs,
            current: to_timestamp(unix_secs)?,
        })
    }

    fn advance(&mut self) -> Result<()> {
        self.unix_secs += self.step_secs;
        self.current = to_timestamp(self.unix_secs)?;
        Ok(())
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Timestamp {
        self.current.clone()
    }
}

fn to_timestamp(unix_secs: u64) -> Result<Timestamp> {
    Timestamp::from_unix_seconds(unix_secs).map_err(|e| anyhow!("clock out of range: {e}"))
}

// ---------------------------------------------------------------------------
// Card setup
// ---------------------------------------------------------------------------

/// Write the header and catalog to an empty card
fn provision_card(store: &mut FsStore) -> Result<()> {
    store
        .provision_slots()
        .with_context(|| format!("creating slot directories in {}", store.root().display()))?;

    let header = Header {
        num_db_plants: SAMPLE_CATALOG_SIZE,
        ..Header::default()
    };
    header
        .save(store)
        .map_err(|e| anyhow!("writing header: {e}"))?;
    store
        .write(CATALOG_PATH, SAMPLE_CATALOG.as_bytes())
        .map_err(|e| anyhow!("writing catalog: {e}"))?;

    info!("Provisioned a fresh card in {}", store.root().display());
    Ok(())
}

fn format_status(session: &Session<FsStore>, status: &PlantStatus) -> String {
    let Some(plant) = session.plant() else {
        return String::new();
    };
    let averages = plant.averages();
    Metric::ALL
        .iter()
        .map(|&metric| {
            format!(
                "{} {:.0} {} {}",
                metric.label(),
                averages.get(metric),
                metric.unit(),
                status.get(metric).indicator()
            )
        })
        .collect::<Vec<_>>()
        .join("  ")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut store = FsStore::new(&args.data_dir)
        .with_context(|| format!("opening {}", args.data_dir.display()))?;
    if !store.exists(HEADER_PATH) {
        provision_card(&mut store)?;
    }

    let mut session = Session::open(store);

    if session.plant().is_none() {
        let slot = PlantId::new(args.slot).ok_or_else(|| anyhow!("invalid slot {}", args.slot))?;
        let catalog = session
            .load_catalog()
            .map_err(|e| anyhow!("loading catalog: {e}"))?;
        let plant = catalog
            .get(args.catalog_index)
            .ok_or_else(|| anyhow!("catalog has no entry {}", args.catalog_index))?;
        session
            .adopt_plant(plant, slot)
            .map_err(|e| anyhow!("adopting {}: {e}", plant.common_name))?;
    }

    if let Some(plant) = session.plant() {
        info!(
            "Monitoring {} ({}) in slot {}",
            plant.common_name, plant.scientific_name, plant.self_id
        );
    }

    let mut sensors = MockSensorGenerator::new();
    let mut clock = SimulatedClock::starting_now(args.interval_minutes * 60)?;
    let dt_hours = args.interval_minutes as f64 / 60.0;

    for cycle in 1..=args.cycles {
        let reading = sensors.next_reading(dt_hours);
        let now = clock.now();

        if let Some(status) = session.run_cycle(&reading, &now) {
            info!("[{}] {}  {}", cycle, now, format_status(&session, &status));
        }
        if let Some(kind) = session.errors().highest_priority() {
            warn!("Outstanding error: {} (code {})", kind.label(), kind.code());
        }

        clock.advance()?;
    }

    session
        .shutdown(&clock.now())
        .map_err(|e| anyhow!("saving header: {e}"))?;
    info!("Simulator exiting");
    Ok(())
}
