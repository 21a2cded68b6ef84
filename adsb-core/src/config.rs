//! Decode-time configuration for the core pipeline.
//!
//! Unlike the receiver/dashboard config of a long-running service, this is a
//! small, validated value constructed once per `decode()` call — there is no
//! persisted state (spec §6: "Persisted state: none. Each invocation is
//! independent.").

use crate::types::{AdsbError, Result};

/// How to handle DF17 airborne-position altitude when the Q-bit is 0
/// (100-ft Gillham gray code rather than 25-ft binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeQ0Policy {
    /// Report `None` for Q=0 altitudes (spec default).
    Skip,
    /// Decode the Gillham gray code into feet.
    Gillham,
}

impl Default for AltitudeQ0Policy {
    fn default() -> Self {
        AltitudeQ0Policy::Skip
    }
}

/// Tunables for one `decode()` invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeConfig {
    /// Preamble pulse/noise-floor ratio `alpha` in `T = alpha * mu` (spec §4.2).
    pub preamble_threshold_ratio: f64,
    /// Whether a nonzero CRC-24 residue rejects a DF17 frame.
    pub enforce_crc: bool,
    /// Q=0 altitude handling.
    pub altitude_q0_policy: AltitudeQ0Policy,
    /// Maximum sample-index gap between an even/odd CPR pair (spec §4.6).
    pub cpr_staleness_samples: u64,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig {
            preamble_threshold_ratio: 5.0,
            enforce_crc: true,
            altitude_q0_policy: AltitudeQ0Policy::Skip,
            cpr_staleness_samples: 20_000_000,
        }
    }
}

impl DecodeConfig {
    /// Validate the configuration (spec §7.4: threshold ratio <= 0 or
    /// staleness <= 0 are fatal at startup).
    pub fn validate(&self) -> Result<()> {
        if self.preamble_threshold_ratio <= 0.0 {
            return Err(AdsbError::InvalidConfig(format!(
                "preamble_threshold_ratio must be > 0, got {}",
                self.preamble_threshold_ratio
            )));
        }
        if self.cpr_staleness_samples == 0 {
            return Err(AdsbError::InvalidConfig(
                "cpr_staleness_samples must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
