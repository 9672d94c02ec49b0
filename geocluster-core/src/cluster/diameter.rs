//! Greedy clustering under a pairwise-diameter bound.

use log::{debug, info};

use super::{ClusterMode, Clustering, check_input, claim, finish};
use crate::distance::DistanceMatrix;
use crate::error::ClusterError;
use crate::point::GeoPoint;
use crate::spatial::unit_vector;

/// Cluster `points` so no two members of a cluster are more than
/// `max_distance_km` apart.
///
/// Each cluster is seeded by the lowest-index unclustered point. It then
/// grows by the unclustered candidate whose farthest distance to the current
/// members is smallest (ties to the lowest index), for as long as that
/// distance stays within the bound. Every candidate is checked against all
/// members, not just the seed, using a distance matrix built for this call.
/// Centers are spherical centroids: the normalised mean of the members' unit
/// vectors, so clusters straddling the antimeridian keep a center among
/// their members.
///
/// # Errors
///
/// Returns [`ClusterError::InvalidParameter`] for an empty point set or a
/// bound that is not a positive, finite number.
///
/// # Examples
///
/// ```
/// use geocluster_core::{GeoPoint, cluster_by_diameter};
///
/// # fn main() -> Result<(), geocluster_core::ClusterError> {
/// // Each outer point is 20 km from the middle one but 40 km from the other.
/// let points = GeoPoint::from_pairs(&[(0.0, -0.1799), (0.0, 0.0), (0.0, 0.1799)])?;
/// let clustering = cluster_by_diameter(&points, 30.0)?;
/// assert_eq!(clustering.num_clusters(), 2);
/// # Ok(())
/// # }
/// ```
pub fn cluster_by_diameter(
    points: &[GeoPoint],
    max_distance_km: f64,
) -> Result<Clustering, ClusterError> {
    check_input(points, max_distance_km)?;

    let matrix = DistanceMatrix::from_points(points);
    let mut labels: Vec<Option<usize>> = vec![None; points.len()];
    let mut centers = Vec::new();

    while let Some(seed) = labels.iter().position(Option::is_none) {
        let cluster = centers.len();
        claim(&mut labels, seed, cluster);
        let members = grow(&matrix, &mut labels, seed, cluster, max_distance_km);
        debug!(
            "diameter cluster {cluster} seeded at point {seed} with {} members",
            members.len()
        );
        centers.push(centroid(points, &members)?);
    }

    info!(
        "diameter clustering of {} points at {max_distance_km} km produced {} clusters",
        points.len(),
        centers.len()
    );
    Ok(Clustering::new(finish(labels), centers, ClusterMode::Diameter))
}

/// Grow a cluster from `seed` and return its members in insertion order.
fn grow(
    matrix: &DistanceMatrix,
    labels: &mut [Option<usize>],
    seed: usize,
    cluster: usize,
    max_distance_km: f64,
) -> Vec<usize> {
    let mut members = vec![seed];
    // Farthest distance from each remaining candidate to the current members.
    let mut candidates: Vec<(usize, f64)> = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.is_none())
        .filter_map(|(index, _)| matrix.get(seed, index).map(|d| (index, d)))
        .collect();

    loop {
        let next = candidates
            .iter()
            .enumerate()
            .filter(|(_, (_, spread))| *spread <= max_distance_km)
            .min_by(|(_, (a_index, a)), (_, (b_index, b))| {
                a.total_cmp(b).then_with(|| a_index.cmp(b_index))
            })
            .map(|(slot, &(index, _))| (slot, index));
        let Some((slot, joined)) = next else {
            break;
        };
        candidates.swap_remove(slot);
        claim(labels, joined, cluster);
        members.push(joined);
        for (index, spread) in &mut candidates {
            if let Some(d) = matrix.get(joined, *index) {
                *spread = spread.max(d);
            }
        }
    }
    members
}

/// Spherical centroid of `members`, falling back to the first member when
/// the mean vector vanishes.
fn centroid(points: &[GeoPoint], members: &[usize]) -> Result<GeoPoint, ClusterError> {
    let Some(seed) = members.first().and_then(|&index| points.get(index)) else {
        return Err(crate::error::ParameterError::EmptyInput.into());
    };
    let [x, y, z] = members
        .iter()
        .filter_map(|&index| points.get(index))
        .map(unit_vector)
        .fold([0.0; 3], |[sx, sy, sz], [px, py, pz]| {
            [sx + px, sy + py, sz + pz]
        });
    let norm = (x * x + y * y + z * z).sqrt();
    if norm < 1e-9 {
        return Ok(*seed);
    }
    let latitude = (z / norm).clamp(-1.0, 1.0).asin().to_degrees();
    let longitude = y.atan2(x).to_degrees().clamp(-180.0, 180.0);
    Ok(GeoPoint::new(latitude, longitude)?)
}
