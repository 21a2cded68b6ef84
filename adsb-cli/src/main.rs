//! adsb1090: thin CLI front-end over `adsb-core`'s decode pipeline.
//!
//! Reads a raw 2 Msps IQ recording, runs it through `adsb_core::decode`, and
//! writes the resulting position fixes as CSV, JSON, or KML. All decode
//! logic lives in `adsb-core`; this crate only does argument parsing, file
//! I/O, output formatting, and diagnostic logging (spec §6's CLI surface).
//!
//! Grounded on `adsb-feeder/src/main.rs`'s `clap::Parser` shape, generalized
//! from a subcommand enum to the spec's fixed positional `<input> <format>`
//! surface.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use adsb_core::{AdsbError, AltitudeQ0Policy, DecodeConfig};

mod writer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Csv,
    Json,
    Kml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "kml" => Ok(OutputFormat::Kml),
            other => Err(format!("unsupported format '{other}' (want csv, json, or kml)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Kml => "kml",
        };
        write!(f, "{s}")
    }
}

/// Decode a raw IQ recording into aircraft position fixes.
#[derive(Parser, Debug)]
#[command(name = "adsb1090", version, about = "Mode S / ADS-B DF17 baseband decoder")]
struct Cli {
    /// Raw 2 Msps interleaved IQ binary recording.
    input: PathBuf,

    /// Output format: csv, json, or kml (leading dot accepted, e.g. `.csv`).
    format: OutputFormat,

    /// Preamble pulse/noise-floor ratio (spec §4.2 default 5.0).
    #[arg(long, default_value_t = DecodeConfig::default().preamble_threshold_ratio)]
    preamble_threshold_ratio: f64,

    /// Disable CRC-24 enforcement (accept frames with a nonzero residue).
    #[arg(long)]
    skip_crc: bool,

    /// Decode Q=0 (100-ft Gillham) altitudes instead of reporting them as null.
    #[arg(long)]
    decode_gillham: bool,

    /// Maximum sample-index gap between an even/odd CPR pair.
    #[arg(long, default_value_t = DecodeConfig::default().cpr_staleness_samples)]
    staleness_samples: u64,

    /// Print per-candidate/per-pair rejection counters to stderr on exit.
    #[arg(short, long)]
    verbose: bool,

    /// Write output to this path instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = DecodeConfig {
        preamble_threshold_ratio: cli.preamble_threshold_ratio,
        enforce_crc: !cli.skip_crc,
        altitude_q0_policy: if cli.decode_gillham {
            AltitudeQ0Policy::Gillham
        } else {
            AltitudeQ0Policy::Skip
        },
        cpr_staleness_samples: cli.staleness_samples,
    };

    run(&cli, &config)
}

fn run(cli: &Cli, config: &DecodeConfig) -> ExitCode {
    let bytes = match fs::read(&cli.input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("input error: {} ({e})", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(path = %cli.input.display(), bytes = bytes.len(), "read input");

    let (fixes, stats) = match adsb_core::decode(&bytes, config) {
        Ok(result) => result,
        Err(AdsbError::EmptyInput) => {
            eprintln!("input error: empty input");
            return ExitCode::FAILURE;
        }
        Err(AdsbError::InvalidConfig(msg)) => {
            eprintln!("configuration error: {msg}");
            return ExitCode::FAILURE;
        }
        Err(AdsbError::Io(e)) => {
            eprintln!("input error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(fixes = fixes.len(), "decode complete");

    let rendered = match cli.format {
        OutputFormat::Csv => writer::to_csv(&fixes),
        OutputFormat::Json => writer::to_json(&fixes),
        OutputFormat::Kml => writer::to_kml(&fixes),
    };

    let write_result = match &cli.output {
        Some(path) => fs::write(path, rendered),
        None => {
            print!("{rendered}");
            Ok(())
        }
    };

    if let Err(e) = write_result {
        eprintln!("output error: {e}");
        return ExitCode::FAILURE;
    }

    if cli.verbose {
        eprintln!(
            "candidates={} ppm_ambiguous={} crc_rejected={} df_rejected={} tc_rejected={} nl_mismatch={} stale_pairs={} fixes_emitted={}",
            stats.candidates_seen,
            stats.ppm_ambiguous,
            stats.crc_rejected,
            stats.df_rejected,
            stats.tc_rejected,
            stats.nl_mismatch,
            stats.stale_pairs,
            stats.fixes_emitted,
        );
    }

    ExitCode::SUCCESS
}
