use chrono::{DateTime, Datelike, Timelike, Utc};
use practical_astronomy_rust::{moon as pa_moon, sun as pa_sun};

use super::{Body, BodyState, Ephemeris};
use crate::geodesy::GeoPoint;

/// Sun/Moon oracle backed by the practical-astronomy position series.
///
/// Geocentric RA/Dec is converted to topocentric azimuth and altitude
/// through Greenwich mean sidereal time and the local hour angle. No
/// atmospheric refraction or parallax correction is applied.
pub struct SolarLunarEphemeris;

impl SolarLunarEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SolarLunarEphemeris {
    fn default() -> Self {
        Self::new()
    }
}

impl Ephemeris for SolarLunarEphemeris {
    fn position_at(
        &self,
        body: Body,
        observer: &GeoPoint,
        instant: DateTime<Utc>,
    ) -> Option<BodyState> {
        let (ra_deg, dec_deg) = match body {
            Body::Sun => sun_ra_dec(instant),
            Body::Moon => moon_ra_dec(instant),
        };
        let (azimuth_deg, altitude_deg) = horizon_from_equatorial(
            ra_deg,
            dec_deg,
            observer.latitude_deg,
            observer.longitude_deg,
            instant,
        );
        let illumination_pct = match body {
            // pyephem convention: the Sun is always fully illuminated
            Body::Sun => Some(100.0),
            Body::Moon => Some(moon_illumination_pct(instant)),
        };
        Some(BodyState {
            azimuth_deg,
            altitude_deg,
            illumination_pct,
        })
    }
}

fn civil_time(instant: DateTime<Utc>) -> (f64, f64, f64, f64, u32, u32) {
    let seconds =
        instant.second() as f64 + instant.timestamp_subsec_micros() as f64 / 1.0e6;
    (
        instant.hour() as f64,
        instant.minute() as f64,
        seconds,
        instant.day() as f64,
        instant.month(),
        instant.year() as u32,
    )
}

fn sun_ra_dec(instant: DateTime<Utc>) -> (f64, f64) {
    let (hh, mm, ss, day, month, year) = civil_time(instant);
    let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s) =
        pa_sun::precise_position_of_sun(hh, mm, ss, day, month, year, false, 0);
    (hms_to_deg(ra_h, ra_m, ra_s), dms_to_deg(dec_d, dec_m, dec_s))
}

fn moon_ra_dec(instant: DateTime<Utc>) -> (f64, f64) {
    let (hh, mm, ss, day, month, year) = civil_time(instant);
    let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s, _ecl_lon, _hor_parallax) =
        pa_moon::precise_position_of_moon(hh, mm, ss, false, 0, day, month, year);
    (hms_to_deg(ra_h, ra_m, ra_s), dms_to_deg(dec_d, dec_m, dec_s))
}

/// Illuminated fraction of the lunar disk, percent, from the Sun-Moon
/// elongation: k = (1 - cos ψ) / 2.
fn moon_illumination_pct(instant: DateTime<Utc>) -> f64 {
    let (sun_ra, sun_dec) = sun_ra_dec(instant);
    let (moon_ra, moon_dec) = moon_ra_dec(instant);
    let elongation = angular_separation_deg(sun_ra, sun_dec, moon_ra, moon_dec);
    (1.0 - elongation.to_radians().cos()) / 2.0 * 100.0
}

/// Converts equatorial RA/Dec (degrees) to azimuth (north-clockwise) and
/// altitude for the given observer and instant.
fn horizon_from_equatorial(
    ra_deg: f64,
    dec_deg: f64,
    lat_deg: f64,
    lon_deg: f64,
    instant: DateTime<Utc>,
) -> (f64, f64) {
    // LST ≈ GMST + east longitude
    let lst = (gmst_deg(instant) + lon_deg).rem_euclid(360.0);
    let hour_angle = (lst - ra_deg).rem_euclid(360.0).to_radians();

    let lat = lat_deg.to_radians();
    let dec = dec_deg.to_radians();

    let altitude = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * hour_angle.cos())
        .asin()
        .to_degrees();

    // Meeus azimuth is measured westward from south; shift to north-clockwise.
    let meridian_az = hour_angle
        .sin()
        .atan2(hour_angle.cos() * lat.sin() - dec.tan() * lat.cos())
        .to_degrees();
    let azimuth = (meridian_az + 180.0).rem_euclid(360.0);

    (azimuth, altitude)
}

/// Greenwich mean sidereal time in degrees.
fn gmst_deg(instant: DateTime<Utc>) -> f64 {
    let year = instant.year();
    let month = instant.month() as i32;
    let day = instant.day() as i32;

    // Julian day number of the civil date (valid at 12:00 UT)
    let a = (14 - month) / 12;
    let y = year + 4800 - a;
    let m = month + 12 * a - 3;
    let jdn = day + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045;

    let day_fraction = (instant.hour() as f64
        + instant.minute() as f64 / 60.0
        + (instant.second() as f64 + instant.timestamp_subsec_micros() as f64 / 1.0e6) / 3600.0)
        / 24.0;
    let jd = jdn as f64 - 0.5 + day_fraction;

    let d = jd - 2451545.0;
    let t = d / 36525.0;
    let gmst = 280.46061837 + 360.98564736629 * d + 0.000387933 * t * t - t * t * t / 38710000.0;
    gmst.rem_euclid(360.0)
}

fn angular_separation_deg(ra1_deg: f64, dec1_deg: f64, ra2_deg: f64, dec2_deg: f64) -> f64 {
    let ra1 = ra1_deg.to_radians();
    let ra2 = ra2_deg.to_radians();
    let dec1 = dec1_deg.to_radians();
    let dec2 = dec2_deg.to_radians();

    let cos_sep = dec1.sin() * dec2.sin() + dec1.cos() * dec2.cos() * (ra1 - ra2).cos();
    cos_sep.clamp(-1.0, 1.0).acos().to_degrees()
}

fn hms_to_deg(hours: f64, minutes: f64, seconds: f64) -> f64 {
    (hours + minutes / 60.0 + seconds / 3600.0) * 15.0
}

fn dms_to_deg(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    let sign = if degrees < 0.0 { -1.0 } else { 1.0 };
    sign * (degrees.abs() + minutes / 60.0 + seconds / 3600.0)
}
