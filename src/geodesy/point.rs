use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("expected 'lat,lon,elev' with three comma-separated values")]
    MalformedTriplet,
    #[error("invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("invalid DMS coordinate (expected e.g. 41°02'38\"N 111°56'45\"W 1331 m)")]
    MalformedDms,
}

/// A fixed ground point: geodetic latitude/longitude in decimal degrees and
/// elevation above sea level in meters. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

impl GeoPoint {
    pub fn new(
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
    ) -> Result<Self, CoordinateError> {
        if !latitude_deg.is_finite() || !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(CoordinateError::OutOfRange {
                field: "latitude",
                value: latitude_deg,
            });
        }
        if !longitude_deg.is_finite() || !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(CoordinateError::OutOfRange {
                field: "longitude",
                value: longitude_deg,
            });
        }
        if !elevation_m.is_finite() {
            return Err(CoordinateError::OutOfRange {
                field: "elevation",
                value: elevation_m,
            });
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        })
    }

    /// Parses a `lat,lon,elev` triplet in decimal degrees and meters, e.g.
    /// `41.035,-111.938,1300`.
    pub fn from_coordinates(coordinates: &str) -> Result<Self, CoordinateError> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 3 {
            return Err(CoordinateError::MalformedTriplet);
        }
        let latitude = parse_field(parts[0], "latitude")?;
        let longitude = parse_field(parts[1], "longitude")?;
        let elevation = parse_field(parts[2], "elevation")?;
        Self::new(latitude, longitude, elevation)
    }
}

fn parse_field(raw: &str, field: &'static str) -> Result<f64, CoordinateError> {
    raw.parse().map_err(|_| CoordinateError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Parses a DMS coordinate string such as `41°02'38"N 111°56'45"W 1,331 m`.
///
/// Typographic minute/second marks are accepted and the elevation suffix is
/// optional (defaults to 0 m). Latitude comes first with an N/S hemisphere,
/// longitude second with E/W.
pub fn parse_dms(input: &str) -> Result<GeoPoint, CoordinateError> {
    let normalized = input
        .replace(['’', '′'], "'")
        .replace(['”', '″'], "\"");

    let (lat_abs, lat_hemi, rest) = parse_dms_component(&normalized, &['N', 'S'])?;
    let (lon_abs, lon_hemi, rest) = parse_dms_component(rest, &['E', 'W'])?;
    let elevation = parse_dms_elevation(rest)?;

    let latitude = if lat_hemi == 'S' { -lat_abs } else { lat_abs };
    let longitude = if lon_hemi == 'W' { -lon_abs } else { lon_abs };
    GeoPoint::new(latitude, longitude, elevation)
}

fn parse_dms_component<'a>(
    input: &'a str,
    hemispheres: &[char],
) -> Result<(f64, char, &'a str), CoordinateError> {
    let s = input.trim_start();
    let (degrees, s) = take_number(s)?;
    let s = expect_marker(s, '°')?;
    let (minutes, s) = take_number(s)?;
    let s = expect_marker(s, '\'')?;
    let (seconds, s) = take_number(s)?;
    let s = expect_marker(s, '"')?;

    let s = s.trim_start();
    let hemi = s
        .chars()
        .next()
        .filter(|c| hemispheres.contains(c))
        .ok_or(CoordinateError::MalformedDms)?;

    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    Ok((value, hemi, &s[hemi.len_utf8()..]))
}

fn take_number(s: &str) -> Result<(f64, &str), CoordinateError> {
    let end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    if end == 0 {
        return Err(CoordinateError::MalformedDms);
    }
    let value = s[..end]
        .parse()
        .map_err(|_| CoordinateError::MalformedDms)?;
    Ok((value, &s[end..]))
}

fn expect_marker(s: &str, marker: char) -> Result<&str, CoordinateError> {
    s.strip_prefix(marker).ok_or(CoordinateError::MalformedDms)
}

fn parse_dms_elevation(input: &str) -> Result<f64, CoordinateError> {
    let trimmed = input.trim().trim_end_matches('m').trim_end();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned
        .trim()
        .parse()
        .map_err(|_| CoordinateError::MalformedDms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parses_decimal_triplet() {
        let p = GeoPoint::from_coordinates("41.035,-111.938,1300").unwrap();
        assert_abs_diff_eq!(p.latitude_deg, 41.035);
        assert_abs_diff_eq!(p.longitude_deg, -111.938);
        assert_abs_diff_eq!(p.elevation_m, 1300.0);
    }

    #[test]
    fn triplet_allows_spaces() {
        let p = GeoPoint::from_coordinates(" 41.0328 , -111.8386 , 2866 ").unwrap();
        assert_abs_diff_eq!(p.elevation_m, 2866.0);
    }

    #[test]
    fn rejects_wrong_arity() {
        assert_eq!(
            GeoPoint::from_coordinates("41.0,-111.9"),
            Err(CoordinateError::MalformedTriplet)
        );
    }

    #[test]
    fn rejection_names_the_offending_field() {
        let err = GeoPoint::from_coordinates("41.0,west,1300").unwrap_err();
        assert_eq!(
            err,
            CoordinateError::InvalidNumber {
                field: "longitude",
                value: "west".to_string()
            }
        );

        let err = GeoPoint::from_coordinates("95.0,-111.9,1300").unwrap_err();
        assert_eq!(
            err,
            CoordinateError::OutOfRange {
                field: "latitude",
                value: 95.0
            }
        );
    }

    #[test]
    fn parses_dms_with_elevation() {
        let p = parse_dms("41°02'38\"N 111°56'45\"W1,331 m").unwrap();
        assert_abs_diff_eq!(p.latitude_deg, 41.0 + 2.0 / 60.0 + 38.0 / 3600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            p.longitude_deg,
            -(111.0 + 56.0 / 60.0 + 45.0 / 3600.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(p.elevation_m, 1331.0);
    }

    #[test]
    fn parses_dms_typographic_marks_and_no_elevation() {
        let p = parse_dms("41°02′38″N 111°56′45″E").unwrap();
        assert!(p.longitude_deg > 0.0);
        assert_abs_diff_eq!(p.elevation_m, 0.0);
    }

    #[test]
    fn southern_and_western_hemispheres_negate() {
        let p = parse_dms("33°52'04\"S 151°12'26\"E 58 m").unwrap();
        assert!(p.latitude_deg < 0.0);
        assert!(p.longitude_deg > 0.0);
        assert_abs_diff_eq!(p.elevation_m, 58.0);
    }

    #[test]
    fn rejects_garbage_dms() {
        assert_eq!(parse_dms("not a coordinate"), Err(CoordinateError::MalformedDms));
        assert_eq!(parse_dms("41°02'38\"X 111°56'45\"W"), Err(CoordinateError::MalformedDms));
    }
}
