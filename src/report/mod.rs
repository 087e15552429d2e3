use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono_tz::Tz;

use crate::search::{RefinedMatch, SearchResult};

/// Print the target geometry, the window and one line per match.
pub fn print_report(result: &SearchResult, zone: Option<Tz>, search_days: i64) {
    println!("POI azimuth: {:.4}°", result.target.bearing_deg);
    println!(
        "POI elevation angle: {:.4}°",
        result.target.elevation_angle_deg
    );
    println!(
        "POI surface distance: {:.3} km",
        result.target.surface_distance_m / 1000.0
    );
    println!(
        "Search window: {} to {} (UTC)",
        result.window_start.to_rfc3339(),
        result.window_end.to_rfc3339()
    );
    if let Some(tz) = zone {
        println!("Observer timezone (detected): {}", tz);
    }

    if result.matches.is_empty() {
        println!("No alignments found within {} days.", search_days);
        return;
    }

    println!("Found {} alignment(s):", result.matches.len());
    for (index, m) in result.matches.iter().enumerate() {
        let local = zone
            .map(|tz| format!(" | Local: {}", m.instant.with_timezone(&tz).to_rfc3339()))
            .unwrap_or_default();
        let illum = m
            .illumination_pct
            .map(|p| format!("{:.2}%", p))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:2}: UTC {}{} | az={:.3}° (Δ={:.3}°) | el={:.3}° (Δ={:.3}°) | illum={}",
            index + 1,
            m.instant.to_rfc3339(),
            local,
            m.azimuth_deg,
            m.az_error_deg,
            m.altitude_deg,
            m.el_error_deg,
            illum
        );
    }
}

/// Write the matches as CSV, numeric fields at 6 decimal places.
pub fn write_csv(path: &Path, result: &SearchResult, zone: Option<Tz>) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(
        file,
        "utc_iso,local_iso,az_deg,el_deg,az_diff_deg,el_diff_deg,illum_pct"
    )?;
    for m in &result.matches {
        writeln!(file, "{}", csv_line(m, zone))?;
    }
    Ok(())
}

fn csv_line(m: &RefinedMatch, zone: Option<Tz>) -> String {
    let local_iso = zone
        .map(|tz| m.instant.with_timezone(&tz).to_rfc3339())
        .unwrap_or_default();
    let illum = m
        .illumination_pct
        .map(|p| format!("{:.6}", p))
        .unwrap_or_default();
    format!(
        "{},{},{:.6},{:.6},{:.6},{:.6},{}",
        m.instant.to_rfc3339(),
        local_iso,
        m.azimuth_deg,
        m.altitude_deg,
        m.az_error_deg,
        m.el_error_deg,
        illum
    )
}

/// Serialize the full result as pretty-printed JSON.
pub fn to_json(result: &SearchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}
