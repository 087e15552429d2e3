mod angles;
mod point;

pub use angles::{bearing, circular_difference, look_angle, LookAngle};
pub use point::{parse_dms, CoordinateError, GeoPoint};
