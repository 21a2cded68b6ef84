//! Output collaborators: CSV, JSON, and KML renderers for a decoded fix list.
//!
//! These are the external collaborators spec §6 explicitly places outside
//! the core decode pipeline — `adsb-core` never formats output, it only
//! returns `Vec<PositionFix>`. The wider retrieved pack reaches for the
//! `csv` crate (`other_examples/manifests/hut8-soar`, `ODIN-fire-odin-rs`,
//! `ccustine-airjedi-desktop`, `jgraef-rtlsdr-async`,
//! `Sequal32-vrclivetraffic`) and the `kml` crate (`hut8-soar`) for exactly
//! this kind of fixed-schema row/record and KML output, so `to_csv` and
//! `to_kml` use those rather than hand-rolled string building. `serde_json`
//! is used for JSON since every teacher crate that emits JSON already
//! depends on it (`adsb-core/src/types.rs`'s `#[derive(Serialize)]` types).

use kml::types::{AltitudeMode, Coord, Geometry, Kml, KmlDocument, KmlVersion, Placemark, Point};
use kml::KmlWriter;

use adsb_core::{icao_to_u32, PositionFix};

/// Lowercase `0x`-prefixed hex ICAO, per spec §6's CSV/JSON formatting rule.
fn icao_hex(fix: &PositionFix) -> String {
    format!("0x{:06x}", icao_to_u32(&fix.icao))
}

/// Header-less CSV rows: `lat,lon,alt,icao`. Missing altitude is an empty
/// field (spec §6).
pub fn to_csv(fixes: &[PositionFix]) -> String {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for fix in fixes {
        let alt = fix.alt_ft.map(|a| a.to_string()).unwrap_or_default();
        wtr.write_record([fix.lat.to_string(), fix.lon.to_string(), alt, icao_hex(fix)])
            .expect("writing a record to an in-memory buffer cannot fail");
    }

    let bytes = wtr.into_inner().expect("in-memory CSV writer always flushes");
    String::from_utf8(bytes).expect("CSV fields are all valid UTF-8")
}

/// JSON array of `{lat, lon, alt, icao}` objects; missing altitude is JSON
/// `null` (spec §6).
pub fn to_json(fixes: &[PositionFix]) -> String {
    let records: Vec<serde_json::Value> = fixes
        .iter()
        .map(|fix| {
            serde_json::json!({
                "lat": fix.lat,
                "lon": fix.lon,
                "alt": fix.alt_ft,
                "icao": icao_hex(fix),
            })
        })
        .collect();
    serde_json::to_string_pretty(&records).expect("Vec<Value> always serializes")
}

/// One `<Placemark>` per fix, `lon,lat,alt` coordinate order (KML
/// convention), altitude converted feet -> meters (spec §6).
pub fn to_kml(fixes: &[PositionFix]) -> String {
    const FEET_TO_METERS: f64 = 0.3048;

    let placemarks: Vec<Kml> = fixes
        .iter()
        .map(|fix| {
            let alt_m = fix.alt_ft.map(|a| a as f64 * FEET_TO_METERS).unwrap_or(0.0);
            Kml::Placemark(Placemark {
                name: Some(icao_hex(fix)),
                geometry: Some(Geometry::Point(Point {
                    coord: Coord {
                        x: fix.lon,
                        y: fix.lat,
                        z: Some(alt_m),
                    },
                    extrude: false,
                    altitude_mode: AltitudeMode::Absolute,
                    attrs: Default::default(),
                })),
                ..Default::default()
            })
        })
        .collect();

    let doc = Kml::KmlDocument(KmlDocument {
        version: KmlVersion::V23,
        attrs: Default::default(),
        elements: vec![Kml::Document {
            attrs: Default::default(),
            elements: placemarks,
        }],
    });

    let mut buf = Vec::new();
    KmlWriter::from_writer(&mut buf)
        .write(&doc)
        .expect("writing KML to an in-memory buffer cannot fail");
    String::from_utf8(buf).expect("KML output is always valid UTF-8")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
