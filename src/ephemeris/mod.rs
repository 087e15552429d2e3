mod body;
mod error;
mod solar_lunar;

pub use body::Body;
pub use error::EphemerisError;
pub use solar_lunar::SolarLunarEphemeris;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::geodesy::GeoPoint;

/// Topocentric state of a body at one instant.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BodyState {
    /// Degrees clockwise from north, [0, 360).
    pub azimuth_deg: f64,
    /// Degrees above the local horizontal plane, [-90, 90].
    pub altitude_deg: f64,
    /// Illuminated fraction of the disk, percent, when the body has one.
    pub illumination_pct: Option<f64>,
}

/// Source of topocentric body positions.
///
/// Implementations must be pure functions of their inputs: the search
/// engine re-resolves the full body identity at every instant and relies on
/// no state carried between queries. `None` means the oracle has no valid
/// reading for that instant and the sample is skipped.
pub trait Ephemeris {
    fn position_at(
        &self,
        body: Body,
        observer: &GeoPoint,
        instant: DateTime<Utc>,
    ) -> Option<BodyState>;
}
