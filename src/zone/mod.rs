use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

/// Maps observer coordinates to an IANA time zone.
///
/// Resolution failure is non-fatal; callers fall back to UTC-only output.
pub trait ZoneResolver {
    fn zone_for(&self, latitude_deg: f64, longitude_deg: f64) -> Option<Tz>;
}

/// Resolver backed by the bundled timezone polygon set. Construct one per
/// run and pass it where needed.
pub struct GeoZoneResolver {
    finder: DefaultFinder,
}

impl GeoZoneResolver {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for GeoZoneResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneResolver for GeoZoneResolver {
    fn zone_for(&self, latitude_deg: f64, longitude_deg: f64) -> Option<Tz> {
        let name = self.finder.get_tz_name(longitude_deg, latitude_deg);
        if name.is_empty() {
            return None;
        }
        match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                log::warn!(
                    "unrecognized zone name '{}' for ({}, {})",
                    name,
                    latitude_deg,
                    longitude_deg
                );
                None
            }
        }
    }
}
