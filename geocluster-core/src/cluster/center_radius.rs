//! Greedy farthest-first clustering under a center-radius bound.

use log::{debug, info};

use super::{ClusterMode, Clustering, check_input, claim, finish};
use crate::distance::haversine;
use crate::error::ClusterError;
use crate::point::GeoPoint;
use crate::spatial::SpatialIndex;

/// Cluster `points` so every member lies within `max_distance_km` of its
/// cluster center.
///
/// The first center is point 0. Each following center is the unclustered
/// point farthest from all centers chosen so far (ties go to the lowest
/// index). Every unclustered point within the bound of a new center joins
/// its cluster; the spatial index only holds unclustered points, so each
/// radius query touches the remaining set alone. Centers are input points,
/// and because a new center was still unclustered when every earlier center
/// claimed its neighbourhood, centers are pairwise farther apart than the
/// bound.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidParameter`] for an empty point set or a
/// bound that is not a positive, finite number.
///
/// # Examples
///
/// ```
/// use geocluster_core::{GeoPoint, cluster_by_center_radius};
///
/// # fn main() -> Result<(), geocluster_core::ClusterError> {
/// let points = GeoPoint::from_pairs(&[(37.7749, -122.4194), (34.0522, -118.2437)])?;
/// let clustering = cluster_by_center_radius(&points, 100.0)?;
/// assert_eq!(clustering.labels(), &[0, 1]);
/// # Ok(())
/// # }
/// ```
pub fn cluster_by_center_radius(
    points: &[GeoPoint],
    max_distance_km: f64,
) -> Result<Clustering, ClusterError> {
    check_input(points, max_distance_km)?;

    let mut index = SpatialIndex::build(points);
    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    // Distance from each point to its nearest chosen center.
    let mut nearest_center = vec![f64::INFINITY; points.len()];
    let mut centers = Vec::new();
    let mut next_seed = Some(0);

    while let Some(seed) = next_seed {
        let Some(center) = points.get(seed).copied() else {
            break;
        };
        let cluster = centers.len();
        centers.push(center);

        claim(&mut labels, seed, cluster);
        index.remove(seed);
        let mut size = 1_usize;
        for member in index.within_radius(&center, max_distance_km) {
            if claim(&mut labels, member, cluster) {
                index.remove(member);
                size += 1;
            }
        }
        debug!("center-radius cluster {cluster} seeded at point {seed} with {size} members");

        next_seed = farthest_unclustered(points, &labels, &mut nearest_center, &center);
    }

    info!(
        "center-radius clustering of {} points at {max_distance_km} km produced {} clusters",
        points.len(),
        centers.len()
    );
    Ok(Clustering::new(finish(labels), centers, ClusterMode::CenterRadius))
}

/// Fold `center` into the running nearest-center distances and return the
/// unclustered point that is now farthest from every center.
fn farthest_unclustered(
    points: &[GeoPoint],
    labels: &[Option<usize>],
    nearest_center: &mut [f64],
    center: &GeoPoint,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for ((index, point), (label, nearest)) in points
        .iter()
        .enumerate()
        .zip(labels.iter().zip(nearest_center.iter_mut()))
    {
        if label.is_some() {
            continue;
        }
        *nearest = nearest.min(haversine(center, point));
        // Strict comparison keeps the lowest index on ties.
        if best.is_none_or(|(_, distance)| *nearest > distance) {
            best = Some((index, *nearest));
        }
    }
    best.map(|(index, _)| index)
}
