#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the rollcall attendance evaluator.
//!
//! Every subcommand prints JSON to stdout so its output can be piped into
//! other tools. Logging goes to stderr and is controlled by `RUST_LOG`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rollcall_attendance::{AttendancePolicy, evaluate_encoded};
use rollcall_geofence::{Coordinate, decode, inspect::inspect_polygon};
use rollcall_server::{ServerConfig, run_server};

#[derive(Parser)]
#[command(name = "rollcall", about = "Geofenced attendance evaluator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of location samples against a session polygon
    Evaluate {
        /// JSON file holding the polygon (`[lat, lng]` pairs or `GeoJSON`)
        #[arg(long)]
        polygon: PathBuf,
        /// JSON file holding an array of location samples
        #[arg(long)]
        samples: PathBuf,
        /// Policy TOML (overrides `ROLLCALL_POLICY`)
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// Describe a polygon and optionally test probe points against it
    Inspect {
        /// JSON file holding the polygon
        #[arg(long)]
        polygon: PathBuf,
        /// Probe point as `lat,lng`. May be repeated.
        #[arg(long = "point", value_parser = parse_point)]
        points: Vec<Coordinate>,
    },
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides `BIND_ADDR`)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides `PORT`)
        #[arg(long)]
        port: Option<u16>,
        /// Policy TOML (overrides `ROLLCALL_POLICY`)
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// Print the effective policy as TOML
    Policy {
        /// Policy TOML (overrides `ROLLCALL_POLICY`)
        #[arg(long)]
        policy: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            polygon,
            samples,
            policy,
        } => {
            let policy = AttendancePolicy::load(policy.as_deref())?;
            let encoded = read_file(&polygon)?;
            let samples = read_samples(&samples)?;

            let evaluation = evaluate_encoded(&encoded, &samples, &policy)?;
            println!("{}", serde_json::to_string_pretty(&evaluation)?);
        }
        Commands::Inspect { polygon, points } => {
            let polygon = decode::parse_polygon(&read_file(&polygon)?)?;
            let summary = inspect_polygon(&polygon, &points);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Serve { bind, port, policy } => {
            let mut config = ServerConfig::from_env_with_policy(policy.as_deref())?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }

            actix_web::rt::System::new().block_on(run_server(config))?;
        }
        Commands::Policy { policy } => {
            let policy = AttendancePolicy::load(policy.as_deref())?;
            print!("{}", policy.to_toml_string()?);
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    log::debug!("Reading {}", path.display());
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()).into())
}

fn read_samples(path: &Path) -> Result<Vec<serde_json::Value>, Box<dyn std::error::Error>> {
    let value: serde_json::Value = serde_json::from_str(&read_file(path)?)?;
    match value {
        serde_json::Value::Array(samples) => Ok(samples),
        _ => Err(format!("{} must contain a JSON array of samples", path.display()).into()),
    }
}

fn parse_point(s: &str) -> Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lng`, got `{s}`"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude `{lat}`: {e}"))?;
    let longitude: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude `{lng}`: {e}"))?;
    Ok(Coordinate::new(latitude, longitude))
}
