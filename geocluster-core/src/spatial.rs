//! R\*-tree index over points embedded on the unit sphere.
//!
//! Points are stored as 3-D unit vectors so Euclidean (chord) distance in the
//! tree is monotonic in great-circle distance. Radius and nearest queries
//! are answered by the tree on chord length and then refined with
//! [`haversine`], which keeps query results consistent with every other
//! distance comparison in the crate.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::distance::{EARTH_RADIUS_KM, haversine};
use crate::point::GeoPoint;

/// Relative slack applied to chord radii so tree pruning never drops a
/// point that haversine places on the boundary.
const CHORD_SLACK: f64 = 1e-9;

/// Entry stored in the R\*-tree: an input index and its unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPoint {
    index: usize,
    xyz: [f64; 3],
}

impl IndexedPoint {
    fn new(index: usize, point: &GeoPoint) -> Self {
        Self {
            index,
            xyz: unit_vector(point),
        }
    }
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.xyz)
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        self.xyz
            .iter()
            .zip(point)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

pub(crate) fn unit_vector(point: &GeoPoint) -> [f64; 3] {
    let lat = point.latitude().to_radians();
    let lon = point.longitude().to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Chord length on the unit sphere subtending `distance_km` of arc.
fn chord_for(distance_km: f64) -> f64 {
    let angle = (distance_km / EARTH_RADIUS_KM).min(std::f64::consts::PI);
    2.0 * (angle / 2.0).sin()
}

/// Spatial index over a borrowed point set.
///
/// The index answers queries in terms of input indices. Entries can be
/// removed as they are assigned to clusters so later queries only see the
/// remaining points.
///
/// # Examples
///
/// ```
/// use geocluster_core::{GeoPoint, SpatialIndex};
///
/// # fn main() -> Result<(), geocluster_core::CoordinateError> {
/// let points = vec![
///     GeoPoint::new(37.7749, -122.4194)?,
///     GeoPoint::new(37.8044, -122.2712)?,
///     GeoPoint::new(37.3382, -121.8863)?,
/// ];
/// let index = SpatialIndex::build(&points);
/// let near_sf = index.within_radius(&points[0], 20.0);
/// assert_eq!(near_sf, vec![0, 1]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SpatialIndex<'a> {
    points: &'a [GeoPoint],
    tree: RTree<IndexedPoint>,
}

impl<'a> SpatialIndex<'a> {
    /// Bulk-load an index over every point.
    #[must_use]
    pub fn build(points: &'a [GeoPoint]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(index, point)| IndexedPoint::new(index, point))
            .collect();
        Self {
            points,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of points still held by the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether every point has been removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Indices of indexed points within `radius_km` of `center`, ascending.
    ///
    /// Boundary points (distance exactly `radius_km`) are included.
    #[must_use]
    pub fn within_radius(&self, center: &GeoPoint, radius_km: f64) -> Vec<usize> {
        let chord = chord_for(radius_km) * (1.0 + CHORD_SLACK) + CHORD_SLACK;
        let mut found: Vec<usize> = self
            .tree
            .locate_within_distance(unit_vector(center), chord * chord)
            .map(|entry| entry.index)
            .filter(|&index| {
                self.points
                    .get(index)
                    .is_some_and(|point| haversine(center, point) <= radius_km)
            })
            .collect();
        found.sort_unstable();
        found
    }

    /// Index of the indexed point nearest to `point`.
    ///
    /// Ties resolve to whichever entry the tree reports first.
    #[must_use]
    pub fn nearest(&self, point: &GeoPoint) -> Option<usize> {
        self.tree
            .nearest_neighbor(&unit_vector(point))
            .map(|entry| entry.index)
    }

    /// Remove a point from the index. Returns `false` when it was not held.
    pub fn remove(&mut self, index: usize) -> bool {
        let Some(point) = self.points.get(index) else {
            return false;
        };
        self.tree.remove(&IndexedPoint::new(index, point)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).expect("valid point")
    }

    #[fixture]
    fn bay_area() -> Vec<GeoPoint> {
        vec![
            point(37.7749, -122.4194), // San Francisco
            point(37.3382, -121.8863), // San Jose
            point(37.8044, -122.2712), // Oakland
            point(37.8715, -122.2730), // Berkeley
        ]
    }

    #[rstest]
    fn radius_query_matches_linear_scan(bay_area: Vec<GeoPoint>) {
        let index = SpatialIndex::build(&bay_area);
        for center in &bay_area {
            for radius in [1.0, 10.0, 20.0, 70.0] {
                let expected: Vec<usize> = bay_area
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| haversine(center, p) <= radius)
                    .map(|(i, _)| i)
                    .collect();
                assert_eq!(index.within_radius(center, radius), expected);
            }
        }
    }

    #[rstest]
    fn removed_points_are_not_returned(bay_area: Vec<GeoPoint>) {
        let mut index = SpatialIndex::build(&bay_area);
        assert!(index.remove(2));
        assert!(!index.remove(2));
        assert!(!index.remove(99));
        assert_eq!(index.len(), 3);
        let sf = bay_area.first().expect("fixture has points");
        assert_eq!(index.within_radius(sf, 20.0), vec![0, 3]);
    }

    #[rstest]
    fn nearest_returns_closest_point(bay_area: Vec<GeoPoint>) {
        let index = SpatialIndex::build(&bay_area);
        let near_oakland = point(37.81, -122.27);
        assert_eq!(index.nearest(&near_oakland), Some(2));
    }

    #[rstest]
    fn boundary_point_is_included(bay_area: Vec<GeoPoint>) {
        let index = SpatialIndex::build(&bay_area);
        let sf = bay_area.first().expect("fixture has points");
        let oakland = bay_area.get(2).expect("fixture has points");
        let exact = haversine(sf, oakland);
        assert!(index.within_radius(sf, exact).contains(&2));
    }

    #[rstest]
    fn empty_index() {
        let index = SpatialIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(&point(0.0, 0.0)), None);
    }
}
