//! Great-circle distances and per-call distance matrices.
//!
//! Every distance in the crate flows through [`haversine`], which uses the
//! fixed mean Earth radius [`EARTH_RADIUS_KM`]. The two endpoints are put in
//! a canonical order before evaluation so `d(a, b)` and `d(b, a)` are
//! bitwise identical.

use std::cmp::Ordering;

use crate::error::CoordinateError;
use crate::point::GeoPoint;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two raw coordinate pairs.
///
/// # Errors
///
/// Returns [`CoordinateError`] when any coordinate is NaN, infinite or out of
/// range.
///
/// # Examples
///
/// ```
/// use geocluster_core::haversine_km;
///
/// # fn main() -> Result<(), geocluster_core::CoordinateError> {
/// let sf_to_la = haversine_km(37.7749, -122.4194, 34.0522, -118.2437)?;
/// assert!((sf_to_la - 559.0).abs() < 11.0);
/// # Ok(())
/// # }
/// ```
pub fn haversine_km(
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
) -> Result<f64, CoordinateError> {
    let from = GeoPoint::new(lat1, lon1)?;
    let to = GeoPoint::new(lat2, lon2)?;
    Ok(haversine(&from, &to))
}

/// Great-circle distance in kilometres between two validated points.
#[must_use]
pub fn haversine(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (first, second) = if canonical_order(a, b) == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    };

    let lat1 = first.latitude().to_radians();
    let lat2 = second.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (second.longitude() - first.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `h` marginally above 1 for antipodal pairs.
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

fn canonical_order(a: &GeoPoint, b: &GeoPoint) -> Ordering {
    a.latitude()
        .total_cmp(&b.latitude())
        .then_with(|| a.longitude().total_cmp(&b.longitude()))
}

/// Dense, symmetric matrix of pairwise haversine distances.
///
/// A matrix is built for one invocation and passed explicitly to whatever
/// needs it; nothing caches it across calls. With the `parallel` feature the
/// rows are computed on the `rayon` thread pool; results are bitwise
/// identical to the sequential build.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Compute all pairwise distances for `points`.
    #[must_use]
    pub fn from_points(points: &[GeoPoint]) -> Self {
        let size = points.len();
        Self {
            data: compute(points),
            size,
        }
    }

    /// Number of points covered by the matrix.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between points `i` and `j`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size || j >= self.size {
            return None;
        }
        self.data.get(i * self.size + j).copied()
    }

    /// Distances from point `i` to every point.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.size {
            return None;
        }
        self.data.get(i * self.size..(i + 1) * self.size)
    }

    /// Largest distance between any two of `members`.
    ///
    /// Returns `0.0` for fewer than two members. Out-of-range indices are
    /// ignored.
    #[must_use]
    pub fn max_pairwise(&self, members: &[usize]) -> f64 {
        members
            .iter()
            .enumerate()
            .flat_map(|(pos, &i)| {
                members
                    .iter()
                    .skip(pos + 1)
                    .filter_map(move |&j| self.get(i, j))
            })
            .fold(0.0, f64::max)
    }
}

#[cfg(not(feature = "parallel"))]
fn compute(points: &[GeoPoint]) -> Vec<f64> {
    let n = points.len();
    let mut data = vec![0.0; n * n];
    for (i, a) in points.iter().enumerate() {
        for (j, b) in points.iter().enumerate().skip(i + 1) {
            let d = haversine(a, b);
            if let Some(cell) = data.get_mut(i * n + j) {
                *cell = d;
            }
            if let Some(cell) = data.get_mut(j * n + i) {
                *cell = d;
            }
        }
    }
    data
}

#[cfg(feature = "parallel")]
fn compute(points: &[GeoPoint]) -> Vec<f64> {
    use rayon::prelude::*;

    let n = points.len();
    let mut data = vec![0.0; n * n];
    if n == 0 {
        return data;
    }
    data.par_chunks_mut(n).enumerate().for_each(|(i, row)| {
        if let Some(a) = points.get(i) {
            for (j, (cell, b)) in row.iter_mut().zip(points).enumerate() {
                if i != j {
                    *cell = haversine(a, b);
                }
            }
        }
    });
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).expect("valid point")
    }

    #[fixture]
    fn triangle() -> Vec<GeoPoint> {
        vec![
            point(37.7749, -122.4194),
            point(37.8044, -122.2712),
            point(37.3382, -121.8863),
        ]
    }

    #[rstest]
    fn same_location_is_zero() {
        let d = haversine_km(37.7749, -122.4194, 37.7749, -122.4194).expect("valid input");
        assert!(d.abs() < 1e-10);
    }

    #[rstest]
    #[case((37.7749, -122.4194), (34.0522, -118.2437), 559.0)]
    #[case((40.7128, -74.0060), (51.5074, -0.1278), 5570.0)]
    fn known_city_distances_within_two_percent(
        #[case] from: (f64, f64),
        #[case] to: (f64, f64),
        #[case] expected_km: f64,
    ) {
        let d = haversine_km(from.0, from.1, to.0, to.1).expect("valid input");
        assert!(
            (d - expected_km).abs() <= expected_km * 0.02,
            "expected about {expected_km} km, got {d}"
        );
    }

    #[rstest]
    fn small_distance_is_about_one_and_a_half_km() {
        let d = haversine_km(37.7749, -122.4194, 37.7849, -122.4294).expect("valid input");
        assert!(1.0 < d && d < 2.0, "got {d}");
    }

    #[rstest]
    fn symmetry_is_exact() {
        let a = point(37.7749, -122.4194);
        let b = point(34.0522, -118.2437);
        assert_eq!(haversine(&a, &b).to_bits(), haversine(&b, &a).to_bits());
    }

    #[rstest]
    fn antipodal_points_are_half_the_circumference() {
        let d = haversine(&point(0.0, 0.0), &point(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[rstest]
    #[case(95.0, 0.0)]
    #[case(0.0, 190.0)]
    #[case(f64::NAN, 0.0)]
    fn raw_coordinates_are_validated(#[case] latitude: f64, #[case] longitude: f64) {
        assert!(haversine_km(latitude, longitude, 0.0, 0.0).is_err());
        assert!(haversine_km(0.0, 0.0, latitude, longitude).is_err());
    }

    #[rstest]
    fn matrix_is_symmetric_with_zero_diagonal(triangle: Vec<GeoPoint>) {
        let matrix = DistanceMatrix::from_points(&triangle);
        assert_eq!(matrix.len(), 3);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), Some(0.0));
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(
            matrix.get(0, 2),
            triangle.first().zip(triangle.get(2)).map(|(a, b)| haversine(a, b))
        );
    }

    #[rstest]
    fn matrix_cells_match_haversine_bitwise() {
        // Large enough to span several parallel row chunks.
        let points = crate::test_support::uniform_points(40, 9);
        let matrix = DistanceMatrix::from_points(&points);
        for (i, a) in points.iter().enumerate() {
            for (j, b) in points.iter().enumerate() {
                let expected = if i == j { 0.0 } else { haversine(a, b) };
                assert_eq!(
                    matrix.get(i, j).map(f64::to_bits),
                    Some(expected.to_bits()),
                    "cell ({i}, {j})"
                );
            }
        }
    }

    #[rstest]
    fn matrix_lookups_out_of_range_are_none(triangle: Vec<GeoPoint>) {
        let matrix = DistanceMatrix::from_points(&triangle);
        assert_eq!(matrix.get(3, 0), None);
        assert!(matrix.row(3).is_none());
        assert_eq!(matrix.row(1).map(<[f64]>::len), Some(3));
    }

    #[rstest]
    fn max_pairwise_covers_all_members(triangle: Vec<GeoPoint>) {
        let matrix = DistanceMatrix::from_points(&triangle);
        let expected = [(0, 1), (0, 2), (1, 2)]
            .iter()
            .filter_map(|&(i, j)| matrix.get(i, j))
            .fold(0.0, f64::max);
        assert_eq!(matrix.max_pairwise(&[0, 1, 2]), expected);
        assert_eq!(matrix.max_pairwise(&[1]), 0.0);
    }

    #[rstest]
    fn empty_matrix() {
        let matrix = DistanceMatrix::from_points(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.max_pairwise(&[]), 0.0);
    }
}
