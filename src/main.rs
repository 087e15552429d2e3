mod cancel;
mod ephemeris;
mod geodesy;
mod report;
mod search;
mod zone;

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};

use crate::cancel::CancelToken;
use crate::ephemeris::{Body, SolarLunarEphemeris};
use crate::geodesy::{parse_dms, GeoPoint};
use crate::search::{find_alignments, SearchParams};
use crate::zone::{GeoZoneResolver, ZoneResolver};

#[derive(Parser)]
#[command(name = "align-o-mat")]
#[command(about = "Find when a celestial body lines up with a point of interest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a time window for azimuth/elevation alignments
    Search(SearchArgs),
    /// Convert a DMS coordinate string to a decimal 'lat,lon,elev' triplet
    Convert { coordinate: String },
}

#[derive(Args)]
struct SearchArgs {
    /// Celestial body to track (Sun or Moon)
    #[arg(long, value_parser = Body::from_str)]
    body: Body,

    /// Observer as 'lat,lon,elev' (decimal degrees, meters)
    #[arg(long, value_parser = GeoPoint::from_coordinates)]
    observer: GeoPoint,

    /// Point of interest as 'lat,lon,elev' (decimal degrees, meters)
    #[arg(long, value_parser = GeoPoint::from_coordinates)]
    poi: GeoPoint,

    /// Search window in days
    #[arg(long, default_value_t = 30)]
    days: i64,

    /// Azimuth tolerance in degrees
    #[arg(long = "az-tol", default_value_t = 0.5)]
    az_tol: f64,

    /// Elevation tolerance in degrees
    #[arg(long = "el-tol", default_value_t = 0.5)]
    el_tol: f64,

    /// Coarse scan step, e.g. 5m or 90s
    #[arg(long, default_value = "5m", value_parser = parse_step)]
    step: Duration,

    /// Search start instant, RFC 3339 (defaults to now)
    #[arg(long, value_parser = parse_start)]
    start: Option<DateTime<Utc>>,

    /// Write matches to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also report local times resolved from the observer coordinates
    #[arg(long = "local-time")]
    local_time: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => run_search(args),
        Commands::Convert { coordinate } => run_convert(&coordinate),
    }
}

fn run_search(args: SearchArgs) -> ExitCode {
    let params = SearchParams {
        observer: args.observer,
        poi: args.poi,
        body: args.body,
        start: args.start.unwrap_or_else(Utc::now),
        search_days: args.days,
        az_tolerance_deg: args.az_tol,
        el_tolerance_deg: args.el_tol,
        coarse_step: args.step,
    };

    let zone = if args.local_time {
        let resolver = GeoZoneResolver::new();
        let zone = resolver.zone_for(args.observer.latitude_deg, args.observer.longitude_deg);
        if zone.is_none() {
            log::warn!("could not resolve a timezone for the observer; reporting UTC only");
        }
        zone
    } else {
        None
    };

    let oracle = SolarLunarEphemeris::new();
    let result = find_alignments(&oracle, &params, &CancelToken::new());

    if args.json {
        match report::to_json(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing result: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        report::print_report(&result, zone, args.days);
    }

    if let Some(path) = &args.output {
        if let Err(e) = report::write_csv(path, &result, zone) {
            eprintln!("Error writing {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        println!("CSV written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn run_convert(coordinate: &str) -> ExitCode {
    match parse_dms(coordinate) {
        Ok(point) => {
            println!(
                "{:.6},{:.6},{:.1}",
                point.latitude_deg, point.longitude_deg, point.elevation_m
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn parse_step(s: &str) -> Result<Duration, String> {
    let parsed = humantime::parse_duration(s.trim()).map_err(|e| e.to_string())?;
    if parsed.is_zero() {
        return Err("step must be positive".to_string());
    }
    Duration::from_std(parsed).map_err(|e| e.to_string())
}

fn parse_start(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
}
