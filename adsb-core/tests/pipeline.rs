//! Whole-pipeline tests: synthetic IQ bytes in, `PositionFix`es out.
//!
//! Each test builds a DF17 frame field-by-field (mirroring `frame::parse`'s
//! bit layout in reverse), stamps it with a real CRC-24 via `adsb_core::crc`
//! so the default CRC-enforcing config accepts it, then renders it as a
//! preamble + PPM-modulated IQ byte sequence the way a 2 Msps capture would.
//! This exercises `adsb_core::decode` end to end rather than any single
//! stage in isolation (spec scenarios: single unpaired frame, a paired
//! even/odd frame, a stale pair, and input-doubling monotonicity).

use adsb_core::{crc, AltitudeQ0Policy, DecodeConfig};
use assert_approx_eq::assert_approx_eq;

const PREAMBLE_SAMPLES: usize = 16;
const SAMPLES_PER_BIT: usize = 2;
const FRAME_BITS: usize = 112;
const PULSE_POSITIONS: [usize; 4] = [0, 2, 7, 9];

/// Build a 14-byte DF17 airborne-position frame with a valid CRC-24.
fn build_df17_frame(icao: [u8; 3], type_code: u8, alt_field: u16, odd: bool, cpr_lat: u32, cpr_lon: u32) -> [u8; 14] {
    let mut frame = [0u8; 14];
    frame[0] = (17 << 3) | 0b101; // DF=17, CA=5 (airborne)
    frame[1] = icao[0];
    frame[2] = icao[1];
    frame[3] = icao[2];
    frame[4] = type_code << 3;
    frame[5] = (alt_field >> 4) as u8;
    let cpr_bit: u8 = if odd { 1 } else { 0 };
    frame[6] = (((alt_field & 0x0F) as u8) << 4) | (cpr_bit << 2) | (((cpr_lat >> 15) & 0x03) as u8);
    frame[7] = ((cpr_lat >> 7) & 0xFF) as u8;
    frame[8] = (((cpr_lat & 0x7F) as u8) << 1) | (((cpr_lon >> 16) & 0x01) as u8);
    frame[9] = ((cpr_lon >> 8) & 0xFF) as u8;
    frame[10] = (cpr_lon & 0xFF) as u8;

    // CRC-24 of an 11-byte payload with a zero parity field is the parity
    // field value that makes the whole 14-byte frame's residue zero.
    let remainder = crc::crc24(&frame);
    frame[11] = ((remainder >> 16) & 0xFF) as u8;
    frame[12] = ((remainder >> 8) & 0xFF) as u8;
    frame[13] = (remainder & 0xFF) as u8;
    frame
}

/// Altitude field (Q=1 path) encoding the 25ft-resolution count `n`.
fn encode_alt_field(n: u16) -> u16 {
    let top7 = (n >> 4) & 0x7F;
    let bottom4 = n & 0x0F;
    (top7 << 5) | (1 << 4) | bottom4
}

fn quiet_iq(n_samples: usize) -> Vec<u8> {
    vec![127u8; n_samples * 2]
}

/// One IQ sample pair loud enough to clear the default 5x preamble ratio.
fn pulse_iq() -> [u8; 2] {
    [255, 127]
}

fn quiet_iq_pair() -> [u8; 2] {
    [127, 127]
}

/// Render a 14-byte frame as preamble + PPM-modulated IQ bytes.
fn encode_candidate(frame: &[u8; 14]) -> Vec<u8> {
    let mut out = Vec::with_capacity((PREAMBLE_SAMPLES + FRAME_BITS * SAMPLES_PER_BIT) * 2);

    for sample in 0..PREAMBLE_SAMPLES {
        if PULSE_POSITIONS.contains(&sample) {
            out.extend_from_slice(&pulse_iq());
        } else {
            out.extend_from_slice(&quiet_iq_pair());
        }
    }

    for bit_idx in 0..FRAME_BITS {
        let byte = frame[bit_idx / 8];
        let bit = (byte >> (7 - (bit_idx % 8))) & 1;
        if bit == 1 {
            out.extend_from_slice(&pulse_iq());
            out.extend_from_slice(&quiet_iq_pair());
        } else {
            out.extend_from_slice(&quiet_iq_pair());
            out.extend_from_slice(&pulse_iq());
        }
    }

    out
}

const TEST_ICAO: [u8; 3] = [0x4B, 0x12, 0x34];

#[test]
fn test_empty_input_is_error() {
    let config = DecodeConfig::default();
    assert!(adsb_core::decode(&[], &config).is_err());
}

#[test]
fn test_single_unpaired_frame_emits_no_fix() {
    let alt_field = encode_alt_field(1440); // 25*1440 - 1000 = 35000 ft
    let frame = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);

    let mut bytes = quiet_iq(50);
    bytes.extend(encode_candidate(&frame));
    bytes.extend(quiet_iq(50));

    let config = DecodeConfig::default();
    let (fixes, stats) = adsb_core::decode(&bytes, &config).expect("decode should succeed");
    assert!(fixes.is_empty());
    assert!(stats.candidates_seen >= 1);
}

#[test]
fn test_paired_even_odd_frames_emit_one_fix() {
    let alt_field = encode_alt_field(1440);
    let even = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);
    let odd = build_df17_frame(TEST_ICAO, 11, alt_field, true, 74158, 50194);

    let mut bytes = quiet_iq(50);
    bytes.extend(encode_candidate(&even));
    bytes.extend(quiet_iq(50));
    bytes.extend(encode_candidate(&odd));
    bytes.extend(quiet_iq(50));

    let config = DecodeConfig::default();
    let (fixes, stats) = adsb_core::decode(&bytes, &config).expect("decode should succeed");

    assert_eq!(fixes.len(), 1);
    let fix = fixes[0];
    assert_eq!(fix.icao, TEST_ICAO);
    assert_eq!(fix.alt_ft, Some(35000));
    assert_approx_eq!(fix.lat, 52.2572, 1e-3);
    assert_approx_eq!(fix.lon, 3.9194, 1e-3);
    assert!(fix.lat > -90.0 && fix.lat <= 90.0);
    assert!(fix.lon > -180.0 && fix.lon <= 180.0);
    assert_eq!(stats.fixes_emitted, 1);
}

#[test]
fn test_stale_pair_emits_no_fix() {
    let alt_field = encode_alt_field(1440);
    let even = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);
    let odd = build_df17_frame(TEST_ICAO, 11, alt_field, true, 74158, 50194);

    let mut bytes = encode_candidate(&even);
    bytes.extend(quiet_iq(50));
    bytes.extend(encode_candidate(&odd));

    // The even/odd candidates are naturally hundreds of samples apart
    // (skip-ahead + payload length); a staleness bound of 50 samples must
    // reject the pair even though both parities are present.
    let config = DecodeConfig {
        cpr_staleness_samples: 50,
        ..DecodeConfig::default()
    };
    let (fixes, stats) = adsb_core::decode(&bytes, &config).expect("decode should succeed");
    assert!(fixes.is_empty());
    assert!(stats.stale_pairs >= 1);
}

#[test]
fn test_decode_is_deterministic() {
    let alt_field = encode_alt_field(1440);
    let even = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);
    let odd = build_df17_frame(TEST_ICAO, 11, alt_field, true, 74158, 50194);

    let mut bytes = quiet_iq(50);
    bytes.extend(encode_candidate(&even));
    bytes.extend(quiet_iq(50));
    bytes.extend(encode_candidate(&odd));

    let config = DecodeConfig::default();
    let (fixes_a, _) = adsb_core::decode(&bytes, &config).unwrap();
    let (fixes_b, _) = adsb_core::decode(&bytes, &config).unwrap();
    assert_eq!(fixes_a, fixes_b);
}

#[test]
fn test_doubling_input_does_not_decrease_fix_count() {
    let alt_field = encode_alt_field(1440);
    let even = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);
    let odd = build_df17_frame(TEST_ICAO, 11, alt_field, true, 74158, 50194);

    let mut bytes = quiet_iq(50);
    bytes.extend(encode_candidate(&even));
    bytes.extend(quiet_iq(50));
    bytes.extend(encode_candidate(&odd));
    bytes.extend(quiet_iq(50));

    let config = DecodeConfig::default();
    let (fixes_once, _) = adsb_core::decode(&bytes, &config).unwrap();

    let mut doubled = bytes.clone();
    doubled.extend(bytes.clone());
    let (fixes_doubled, _) = adsb_core::decode(&doubled, &config).unwrap();

    assert!(fixes_doubled.len() >= fixes_once.len());
}

#[test]
fn test_gillham_policy_flag_decodes_q0_altitude_end_to_end() {
    // bit10 (C2) set, Q-bit (bit4) clear: c_digit=2 -> c_bin=3, ab_gray=0 -> ab_bin=0,
    // altitude = 0*500 + 3*100 - 1200 = -900 ft.
    let alt_field: u16 = 0x400;
    let even = build_df17_frame(TEST_ICAO, 11, alt_field, false, 93000, 51372);
    let odd = build_df17_frame(TEST_ICAO, 11, alt_field, true, 74158, 50194);

    let mut bytes = quiet_iq(50);
    bytes.extend(encode_candidate(&even));
    bytes.extend(quiet_iq(50));
    bytes.extend(encode_candidate(&odd));

    let config = DecodeConfig {
        altitude_q0_policy: AltitudeQ0Policy::Gillham,
        ..DecodeConfig::default()
    };
    let (fixes, _) = adsb_core::decode(&bytes, &config).unwrap();
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].alt_ft, Some(-900));
}
