//! Compact Position Reporting — global even/odd CPR decode and the
//! per-ICAO pending-pair state machine (spec §4.6).
//!
//! Grounded on the teacher's `cpr.rs` global-decode algorithm (NL-zone
//! arithmetic unchanged), with the teacher's wall-clock `local_decode` path
//! dropped — this core never holds a receiver reference position, so local
//! decode has no caller — and `MAX_PAIR_AGE` reworked from a 10-second
//! wall-clock bound into a sample-count bound supplied by
//! [`crate::config::DecodeConfig::cpr_staleness_samples`], since nothing in
//! this pipeline has a wall clock: every timestamp is a raw sample index.

use std::collections::HashMap;

use crate::frame::CprFormat;
use crate::types::{icao_to_u32, Icao};

/// Number of latitude zones per hemisphere.
const NZ: f64 = 15.0;

/// Bits per CPR coordinate.
const NB: u32 = 17;

/// Maximum CPR value (2^17 = 131072).
const CPR_MAX: f64 = (1u32 << NB) as f64;

/// Number of longitude zones at a given latitude (NL function).
pub fn nl(lat: f64) -> i32 {
    if lat.abs() >= 87.0 {
        return 1;
    }

    let a = 1.0 - (std::f64::consts::PI / (2.0 * NZ)).cos();
    let b = (std::f64::consts::PI / 180.0 * lat.abs()).cos().powi(2);
    let nl_val = (2.0 * std::f64::consts::PI / (1.0 - a / b).acos()).floor() as i32;
    nl_val.max(1)
}

fn modulo(x: f64, y: f64) -> f64 {
    x - y * (x / y).floor()
}

fn round6(val: f64) -> f64 {
    (val * 1_000_000.0).round() / 1_000_000.0
}

/// Global CPR decode from an even/odd frame pair.
///
/// `t_even`/`t_odd` are sample indices; the pair is rejected if they are
/// more than `staleness_samples` apart. Returns `None` on a stale pair or a
/// zone-boundary (NL) mismatch.
pub fn global_decode(
    lat_even: u32,
    lon_even: u32,
    lat_odd: u32,
    lon_odd: u32,
    t_even: u64,
    t_odd: u64,
    staleness_samples: u64,
) -> Option<(f64, f64)> {
    if t_even.abs_diff(t_odd) > staleness_samples {
        return None;
    }

    let dlat_even = 360.0 / (4.0 * NZ);
    let dlat_odd = 360.0 / (4.0 * NZ - 1.0);

    let lat_even_cpr = lat_even as f64 / CPR_MAX;
    let lon_even_cpr = lon_even as f64 / CPR_MAX;
    let lat_odd_cpr = lat_odd as f64 / CPR_MAX;
    let lon_odd_cpr = lon_odd as f64 / CPR_MAX;

    let j = (59.0 * lat_even_cpr - 60.0 * lat_odd_cpr + 0.5).floor();

    let mut lat_e = dlat_even * (modulo(j, 60.0) + lat_even_cpr);
    let mut lat_o = dlat_odd * (modulo(j, 59.0) + lat_odd_cpr);

    if lat_e >= 270.0 {
        lat_e -= 360.0;
    }
    if lat_o >= 270.0 {
        lat_o -= 360.0;
    }

    if nl(lat_e) != nl(lat_o) {
        return None;
    }

    let (lat, lon) = if t_even >= t_odd {
        let nl_val = nl(lat_e);
        let n_lon = nl_val.max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_even_cpr);
        (lat_e, lon)
    } else {
        let nl_val = nl(lat_o);
        let n_lon = (nl_val - 1).max(1);
        let dlon = 360.0 / n_lon as f64;
        let m = (lon_even_cpr * (nl_val - 1) as f64 - lon_odd_cpr * nl_val as f64 + 0.5).floor();
        let lon = dlon * (modulo(m, n_lon as f64) + lon_odd_cpr);
        (lat_o, lon)
    };

    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };

    Some((round6(lat), round6(lon)))
}

// ---------------------------------------------------------------------------
// Per-ICAO pending-pair state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    lat_raw: u32,
    lon_raw: u32,
    timestamp: u64,
}

/// Pending even/odd slots for one ICAO address. Either, both, or neither may
/// be populated; a slot is simply overwritten on every frame of matching
/// parity, regardless of whether a pairing attempt already succeeded (spec
/// §4.6's `Paired` state: "any event -> Paired, replace same-parity slot,
/// attempt decode").
#[derive(Debug, Clone, Copy, Default)]
struct IcaoSlots {
    even: Option<PendingFrame>,
    odd: Option<PendingFrame>,
}

/// Outcome of feeding one frame into the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CprOutcome {
    /// Stored, waiting for the opposite parity.
    Pending,
    /// Completed a pair and resolved a position.
    Fixed(f64, f64),
    /// The opposite-parity frame on hand was too old to pair with.
    Stale,
    /// The pair's even/odd latitudes fell in different NL zones.
    NlMismatch,
}

/// Tracks one pending even/odd frame per ICAO address (spec §4.6).
///
/// Both slots are retained across decode attempts: a failed pairing (stale
/// or NL-mismatched) leaves both pending frames in place for future frames
/// to pair against, and a successful decode does not clear either slot —
/// the next frame of either parity simply replaces its own slot and the
/// most recent pair is re-attempted (spec §4.6: "retain both pending
/// records; subsequent updates overwrite by parity").
pub struct CprResolver {
    staleness_samples: u64,
    slots: HashMap<u32, IcaoSlots>,
}

impl CprResolver {
    pub fn new(staleness_samples: u64) -> Self {
        CprResolver {
            staleness_samples,
            slots: HashMap::new(),
        }
    }

    /// Feed one DF17 airborne-position frame for `icao`.
    pub fn observe(
        &mut self,
        icao: &Icao,
        format: CprFormat,
        lat_raw: u32,
        lon_raw: u32,
        timestamp: u64,
    ) -> CprOutcome {
        let key = icao_to_u32(icao);
        let incoming = PendingFrame {
            lat_raw,
            lon_raw,
            timestamp,
        };
        let entry = self.slots.entry(key).or_default();

        match format {
            CprFormat::Even => entry.even = Some(incoming),
            CprFormat::Odd => entry.odd = Some(incoming),
        }

        let (Some(even), Some(odd)) = (entry.even, entry.odd) else {
            return CprOutcome::Pending;
        };

        if even.timestamp.abs_diff(odd.timestamp) > self.staleness_samples {
            return CprOutcome::Stale;
        }

        match global_decode(
            even.lat_raw,
            even.lon_raw,
            odd.lat_raw,
            odd.lon_raw,
            even.timestamp,
            odd.timestamp,
            self.staleness_samples,
        ) {
            Some((lat, lon)) => CprOutcome::Fixed(lat, lon),
            None => CprOutcome::NlMismatch,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
