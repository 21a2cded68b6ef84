//! adsb-core: baseband-to-position decode pipeline for Mode S / ADS-B DF17.
//!
//! No async, no I/O — just the algorithm chain from raw IQ bytes to resolved
//! aircraft positions. This crate is the shared core used by the `adsb1090`
//! CLI binary.

pub mod config;
pub mod cpr;
pub mod crc;
pub mod decode;
pub mod frame;
pub mod magnitude;
pub mod ppm;
pub mod preamble;
pub mod types;

pub use config::{AltitudeQ0Policy, DecodeConfig};
pub use decode::decode;
pub use frame::{CprFormat, Df17Frame};
pub use types::{icao_to_string, icao_to_u32, AdsbError, DecodeStats, Icao, PositionFix, Result};
