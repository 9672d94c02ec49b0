//! Validated geographic points.

use geo::Coord;

use crate::error::{ClusterError, CoordinateError};

/// An immutable latitude/longitude pair in decimal degrees.
///
/// Points are identified by their index in the caller's input slice and are
/// never mutated after construction. Conversions to and from [`geo::Coord`]
/// follow the WGS84 convention `x = longitude`, `y = latitude`.
///
/// # Examples
///
/// ```
/// use geocluster_core::GeoPoint;
///
/// # fn main() -> Result<(), geocluster_core::CoordinateError> {
/// let san_francisco = GeoPoint::new(37.7749, -122.4194)?;
/// assert_eq!(san_francisco.latitude(), 37.7749);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPoint", into = "RawPoint"))]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Validate and construct a point.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] when either value is NaN, infinite or
    /// outside its range (`[-90, 90]` for latitude, `[-180, 180]` for
    /// longitude).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude { latitude });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude { longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        crate::distance::haversine(self, other)
    }

    /// Validate a slice of `(latitude, longitude)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::InvalidCoordinate`] naming the first invalid
    /// pair.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Vec<Self>, ClusterError> {
        pairs
            .iter()
            .enumerate()
            .map(|(index, &(latitude, longitude))| {
                Self::new(latitude, longitude)
                    .map_err(|source| ClusterError::InvalidCoordinate { index, source })
            })
            .collect()
    }
}

impl From<GeoPoint> for Coord<f64> {
    fn from(point: GeoPoint) -> Self {
        Self {
            x: point.longitude,
            y: point.latitude,
        }
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Self(Coord::from(point))
    }
}

impl TryFrom<Coord<f64>> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(coord: Coord<f64>) -> Result<Self, Self::Error> {
        Self::new(coord.y, coord.x)
    }
}

/// Unvalidated wire form used by serde.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawPoint {
    latitude: f64,
    longitude: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPoint> for GeoPoint {
    type Error = CoordinateError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

#[cfg(feature = "serde")]
impl From<GeoPoint> for RawPoint {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
        }
    }
}
