//! Plane-free geometry used by the business search.
//!
//! Distances follow the haversine formula on a spherical earth with the
//! WGS-84 equatorial radius, reported in statute miles rounded to two
//! decimals. Bounding boxes use the flat "69 miles per degree" rule and are
//! only a pre-filter; the exact radius check happens on the haversine value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;
pub const METERS_PER_MILE: f64 = 1609.34;
pub const MILES_PER_DEGREE: f64 = 69.0;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude must be a finite number between -90 and 90, got {0}")]
    InvalidLatitude(f64),

    #[error("longitude must be a finite number between -180 and 180, got {0}")]
    InvalidLongitude(f64),
}

/// A validated point in decimal degrees. Always (latitude, longitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance to `other` in miles, rounded to 2 decimals.
    #[must_use]
    pub fn miles_to(&self, other: &Self) -> f64 {
        meters_to_miles(haversine_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ))
    }
}

/// Axis-aligned search window around a center point.
///
/// Does not wrap across the antimeridian: a window that would cross ±180°
/// is clamped instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn around(center: Coordinate, radius_miles: f64) -> Self {
        let lat_offset = radius_miles / MILES_PER_DEGREE;
        let min_latitude = (center.latitude - lat_offset).max(-90.0);
        let max_latitude = (center.latitude + lat_offset).min(90.0);

        let cos_lat = center.latitude.to_radians().cos();
        let lng_offset = if cos_lat.abs() < 1e-9 {
            f64::INFINITY
        } else {
            (radius_miles / (MILES_PER_DEGREE * cos_lat)).abs()
        };

        // A window that reaches a pole or is wider than the globe covers
        // every longitude, including points on the far side of the pole.
        let (min_longitude, max_longitude) =
            if lng_offset >= 180.0 || max_latitude >= 90.0 || min_latitude <= -90.0 {
                (-180.0, 180.0)
            } else {
                (
                    (center.longitude - lng_offset).max(-180.0),
                    (center.longitude + lng_offset).min(180.0),
                )
            };

        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Haversine distance in meters between two (lat, lon) pairs.
#[must_use]
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[must_use]
pub fn meters_to_miles(meters: f64) -> f64 {
    round2(meters / METERS_PER_MILE)
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A coordinate rounded to one decimal place, stored as integer tenths so
/// it can key a counter row without float equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationBucket {
    pub lat_tenths: i32,
    pub lng_tenths: i32,
}

impl LocationBucket {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_coordinate(point: Coordinate) -> Self {
        // Bounded by the coordinate ranges, so the casts cannot overflow.
        Self {
            lat_tenths: (point.latitude * 10.0).round() as i32,
            lng_tenths: (point.longitude * 10.0).round() as i32,
        }
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        f64::from(self.lat_tenths) / 10.0
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        f64::from(self.lng_tenths) / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_haversine_known_distances() {
        let origin = point(40.0, -74.8);
        let target = point(40.0, -74.0);
        let miles = origin.miles_to(&target);
        assert!((42.0..43.0).contains(&miles), "got {miles}");

        let far = point(40.0, -75.0);
        let miles = far.miles_to(&target);
        assert!(miles > 50.0, "got {miles}");

        assert!(origin.miles_to(&origin).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = point(40.7128, -74.0060);
        let b = point(40.7306, -73.9352);
        assert!((a.miles_to(&b) - b.miles_to(&a)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounding_box_offsets() {
        let bbox = BoundingBox::around(point(0.0, 0.0), 69.0);
        assert!((bbox.max_latitude - 1.0).abs() < 1e-9);
        assert!((bbox.max_longitude - 1.0).abs() < 1e-9);

        let bbox = BoundingBox::around(point(40.0, -74.8), 50.0);
        assert!(bbox.contains(point(40.0, -74.0)));
        assert!(!bbox.contains(point(41.0, -74.8)));
    }

    #[test]
    fn test_bounding_box_at_pole_spans_all_longitudes() {
        let bbox = BoundingBox::around(point(90.0, 10.0), 50.0);
        assert!((bbox.min_longitude + 180.0).abs() < f64::EPSILON);
        assert!((bbox.max_longitude - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounding_box_reaching_pole_covers_far_side() {
        let center = point(89.9, 0.0);
        let across = point(89.9, 180.0);
        assert!(center.miles_to(&across) < 50.0);

        let bbox = BoundingBox::around(center, 50.0);
        assert!(bbox.contains(across));

        let south = BoundingBox::around(point(-89.5, 45.0), 50.0);
        assert!(south.contains(point(-89.8, -135.0)));
    }

    #[test]
    fn test_bounding_box_away_from_poles_stays_narrow() {
        let bbox = BoundingBox::around(point(60.0, 20.0), 50.0);
        assert!(bbox.min_longitude > 18.0 && bbox.max_longitude < 22.0);
    }

    #[test]
    fn test_location_bucket_rounding() {
        let a = LocationBucket::from_coordinate(point(40.7128, -74.0060));
        let b = LocationBucket::from_coordinate(point(40.74, -74.01));
        assert_eq!(a, b);
        assert_eq!(a.lat_tenths, 407);
        assert_eq!(a.lng_tenths, -740);
        assert!((a.latitude() - 40.7).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert!((round2(42.3456) - 42.35).abs() < 1e-9);
        assert!((round2(0.004) - 0.0).abs() < 1e-9);
    }
}
