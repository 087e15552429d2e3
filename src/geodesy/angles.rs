use crate::geodesy::GeoPoint;

/// Mean Earth radius of the spherical model, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Elevation angle and great-circle surface distance to a ground target.
#[derive(Debug, Clone, Copy)]
pub struct LookAngle {
    pub elevation_deg: f64,
    pub surface_distance_m: f64,
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from
/// north, normalized to [0, 360).
///
/// Identical points have no defined bearing; the degenerate case reports 0.
pub fn bearing(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude_deg.to_radians();
    let lat2 = to.latitude_deg.to_radians();
    let delta_lon = (to.longitude_deg - from.longitude_deg).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();
    if x == 0.0 && y == 0.0 {
        return 0.0;
    }
    x.atan2(y).to_degrees().rem_euclid(360.0)
}

/// Look angle from `from` to `to`: haversine surface distance combined with
/// the elevation difference as `atan2(Δelevation, distance)`.
///
/// This is a flat-line-of-sight approximation. Earth-curvature drop-off and
/// atmospheric refraction along the sight line are not modeled.
pub fn look_angle(from: &GeoPoint, to: &GeoPoint) -> LookAngle {
    let lat1 = from.latitude_deg.to_radians();
    let lat2 = to.latitude_deg.to_radians();
    let d_lat = (to.latitude_deg - from.latitude_deg).to_radians();
    let d_lon = (to.longitude_deg - from.longitude_deg).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let surface_distance_m = 2.0 * EARTH_RADIUS_M * a.sqrt().asin();

    let elevation_deg = (to.elevation_m - from.elevation_m)
        .atan2(surface_distance_m)
        .to_degrees();

    LookAngle {
        elevation_deg,
        surface_distance_m,
    }
}

/// Smallest unsigned angular separation between two bearings, in [0, 180].
pub fn circular_difference(a_deg: f64, b_deg: f64) -> f64 {
    let diff = (a_deg - b_deg).rem_euclid(360.0);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
