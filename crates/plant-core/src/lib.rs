//! Hardware-independent core library for plant-saver
//!
//! This crate contains the platform-agnostic logic of the plant monitoring
//! appliance: requirement thresholds and verdicts, the per-metric rolling
//! average stores, the sensor history manager, the newest-first timestamp log,
//! and the documents (plant record, header, catalog) that live on the SD card.
//!
//! It is `no_std` with `extern crate alloc` so it compiles on both the
//! embedded target and desktop hosts (for the simulator and tests). Unit tests
//! link `std` so the test harness and `proptest` are available.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod catalog;
pub mod config;
pub mod errors;
pub mod evaluation;
pub mod history;
pub mod metrics;
pub mod plant;
pub mod sensor_history;
pub mod session;
pub mod storage;
pub mod thresholds;
pub mod timestamp;
pub mod timestamp_log;
