#![cfg_attr(not(test), no_std)]

//! # pico-weather
//! ## A Pi Pico temperature station in Rust
//!
//! Features:
//! - SHT40 temperature and humidity readings over I2C
//! - Tri-color LED showing the current temperature band
//! - Tab-separated readings over serial every 30 seconds
//! - Optional CRC checking of sensor frames

// Must come first so the logging macros are visible to the other modules.
#[macro_use]
mod fmt;

pub mod config;
pub mod indicator;
pub mod reading;
pub mod report;
pub mod sensors;
pub mod station;
pub mod timer;

pub use config::StationConfig;
pub use indicator::{classify, Indicator, LedState};
pub use reading::{convert, PhysicalReading, RawReading};
pub use sensors::{SensorConfig, SensorError, Sht40};
pub use station::{Station, StationError};
