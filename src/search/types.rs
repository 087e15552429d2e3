use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::ephemeris::Body;
use crate::geodesy::{self, GeoPoint};

/// Fixed azimuth/elevation the body must match, derived once per search.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetGeometry {
    pub bearing_deg: f64,
    pub elevation_angle_deg: f64,
    pub surface_distance_m: f64,
}

impl TargetGeometry {
    pub fn between(observer: &GeoPoint, poi: &GeoPoint) -> Self {
        let look = geodesy::look_angle(observer, poi);
        Self {
            bearing_deg: geodesy::bearing(observer, poi),
            elevation_angle_deg: look.elevation_deg,
            surface_distance_m: look.surface_distance_m,
        }
    }
}

/// A coarse-granularity sample that passed the tolerance test.
#[derive(Debug, Clone, Copy)]
pub struct CoarseHit {
    pub instant: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
}

/// Best instant within one local refinement window.
#[derive(Debug, Clone, Serialize)]
pub struct RefinedMatch {
    pub instant: DateTime<Utc>,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub az_error_deg: f64,
    pub el_error_deg: f64,
    pub illumination_pct: Option<f64>,
}

/// Deduplicated, time-ordered outcome of one alignment search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub target: TargetGeometry,
    pub matches: Vec<RefinedMatch>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Inputs for one alignment search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub observer: GeoPoint,
    pub poi: GeoPoint,
    pub body: Body,
    pub start: DateTime<Utc>,
    pub search_days: i64,
    pub az_tolerance_deg: f64,
    pub el_tolerance_deg: f64,
    pub coarse_step: Duration,
}
