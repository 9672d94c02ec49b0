//! Fixtures shared by unit tests, integration tests and benchmarks.
//!
//! Available under `cfg(test)` and the `test-support` feature.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::point::GeoPoint;

/// Six Bay Area cities with their coordinates.
///
/// The order matters to several tests: San Francisco comes first so it seeds
/// the first center-radius cluster, and San Jose is the farthest city from it.
pub const BAY_AREA_CITIES: [(&str, f64, f64); 6] = [
    ("San Francisco", 37.7749, -122.4194),
    ("San Jose", 37.3382, -121.8863),
    ("Oakland", 37.8044, -122.2712),
    ("Berkeley", 37.8715, -122.2730),
    ("Palo Alto", 37.4419, -122.1430),
    ("Fremont", 37.5485, -121.9886),
];

/// Bay Area cities as validated points, in [`BAY_AREA_CITIES`] order.
#[must_use]
pub fn bay_area_points() -> Vec<GeoPoint> {
    BAY_AREA_CITIES
        .iter()
        .filter_map(|&(_, latitude, longitude)| GeoPoint::new(latitude, longitude).ok())
        .collect()
}

/// `count` points drawn uniformly from a one-degree box around the Bay Area.
///
/// The generator is seeded so every call with the same arguments returns the
/// same points.
#[must_use]
pub fn uniform_points(count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .filter_map(|_| {
            let latitude = rng.gen_range(37.0..38.0);
            let longitude = rng.gen_range(-123.0..-122.0);
            GeoPoint::new(latitude, longitude).ok()
        })
        .collect()
}
