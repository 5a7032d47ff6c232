//! Geographic coordinates and their projection onto the unit sphere.
//!
//! Coordinates are plain degrees. The projection convention places
//! latitude 90 on +Y and (lat 0, lon 0) on +Z, so that a globe model whose
//! north pole points up renders events at the right spot.

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres. Depths are divided by this value so
/// they share the unit-sphere scale of the event directions.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, -90 to 90.
    pub lat: f64,
    /// Longitude in degrees, -180 to 180.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new coordinate pair.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Project onto the unit sphere.
    ///
    /// `x = cos(lat)·sin(lon)`, `y = sin(lat)`, `z = cos(lat)·cos(lon)`.
    /// The result is normalized so rounding never pushes it off the sphere.
    pub fn unit_direction(&self) -> DVec3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        DVec3::new(lat.cos() * lon.sin(), lat.sin(), lat.cos() * lon.cos()).normalize_or_zero()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(a.abs_diff_eq(b, 1e-12), "{a:?} != {b:?}");
    }

    #[test]
    fn origin_projects_to_positive_z() {
        assert_close(GeoPoint::new(0.0, 0.0).unit_direction(), DVec3::Z);
    }

    #[test]
    fn north_pole_projects_to_positive_y() {
        assert_close(GeoPoint::new(90.0, 0.0).unit_direction(), DVec3::Y);
    }

    #[test]
    fn east_quarter_projects_to_positive_x() {
        assert_close(GeoPoint::new(0.0, 90.0).unit_direction(), DVec3::X);
    }

    #[test]
    fn projections_are_unit_length() {
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let len = GeoPoint::new(lat, lon).unit_direction().length();
                assert!((len - 1.0).abs() < 1e-12, "({lat}, {lon}) has length {len}");
                lon += 7.5;
            }
            lat += 7.5;
        }
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(GeoPoint::new(-90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(90.5, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -181.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn display_matches_label_format() {
        assert_eq!(GeoPoint::new(35.0, 135.0).to_string(), "(35, 135)");
        assert_eq!(GeoPoint::new(-19.235, -177.935).to_string(), "(-19.235, -177.935)");
    }
}
