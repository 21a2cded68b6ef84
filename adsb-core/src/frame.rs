//! Structural parsing of DF17 extended squitter frames (spec §4.5).
//!
//! Grounded on the teacher's `frame.rs` bit-field extraction, narrowed to a
//! fixed 112-bit layout and a single Downlink Format. Everything the teacher
//! used to dispatch on DF (0/4/5/11/16/18/20/21) and on Type Code outside
//! 9..=18 (identification, velocity) is rejected at the door instead of
//! being parsed, since this decoder only produces airborne-position fixes.

use crate::types::Icao;

/// Bytes in a DF17 frame (112 bits).
pub const FRAME_BYTES: usize = 14;

/// CPR frame parity (spec §4.6): even and odd frames encode the same
/// position at different longitude zone counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CprFormat {
    Even,
    Odd,
}

/// A parsed DF17 airborne-position extended squitter (Type Code 9-18).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Df17Frame {
    pub icao: Icao,
    pub type_code: u8,
    /// Raw 12-bit altitude field (spec §4.5), undecoded.
    pub alt_field: u16,
    pub cpr_format: CprFormat,
    /// Raw 17-bit CPR latitude.
    pub cpr_lat_raw: u32,
    /// Raw 17-bit CPR longitude.
    pub cpr_lon_raw: u32,
}

/// Parse a 112-bit frame, keeping only DF17 airborne-position messages.
///
/// Returns `None` for any other Downlink Format or Type Code — the caller
/// is expected to tally the rejection reason (spec §7's `DecodeStats`).
pub fn parse(raw: &[u8; FRAME_BYTES]) -> Option<Df17Frame> {
    let df = raw[0] >> 3;
    if df != 17 {
        return None;
    }

    let icao: Icao = [raw[1], raw[2], raw[3]];
    let type_code = raw[4] >> 3;
    if !(9..=18).contains(&type_code) {
        return None;
    }

    let alt_field: u16 = (raw[5] as u16) << 4 | (raw[6] >> 4) as u16;
    let cpr_format = if (raw[6] >> 2) & 0x01 == 0 {
        CprFormat::Even
    } else {
        CprFormat::Odd
    };

    let cpr_lat_raw: u32 =
        ((raw[6] & 0x03) as u32) << 15 | (raw[7] as u32) << 7 | (raw[8] >> 1) as u32;
    let cpr_lon_raw: u32 =
        ((raw[8] & 0x01) as u32) << 16 | (raw[9] as u32) << 8 | raw[10] as u32;

    Some(Df17Frame {
        icao,
        type_code,
        alt_field,
        cpr_format,
        cpr_lat_raw,
        cpr_lon_raw,
    })
}

/// Downlink Format field alone, for rejection-reason tallying before a full
/// parse is attempted.
pub fn downlink_format(raw: &[u8; FRAME_BYTES]) -> u8 {
    raw[0] >> 3
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
