//! Temporary workspaces holding point and trip fixtures.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tempfile::TempDir;

/// Six Bay Area stores; at 30 km they split into a northern and a southern
/// cluster.
pub(super) const BAY_AREA_POINTS: &str = r#"[
    { "id": "sf", "latitude": 37.7749, "longitude": -122.4194 },
    { "id": "sj", "latitude": 37.3382, "longitude": -121.8863 },
    { "id": "oak", "latitude": 37.8044, "longitude": -122.2712 },
    { "id": "berk", "latitude": 37.8715, "longitude": -122.2730 },
    { "id": "pa", "latitude": 37.4419, "longitude": -122.1430 },
    { "id": "fre", "latitude": 37.5485, "longitude": -121.9886 }
]"#;

/// A tour visiting every store once, driven in three hours.
pub(super) const BAY_AREA_TRIPS: &str = r#"{
    "budget_minutes": 180.0,
    "legs": [[0, 2], [2, 3], [3, 5], [5, 1], [1, 4]]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture");
}

pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn file(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        write_utf8(&path, contents.as_bytes());
        path
    }

    pub(super) fn bay_area(&self) -> Utf8PathBuf {
        self.file("stores.json", BAY_AREA_POINTS)
    }

    pub(super) fn trips(&self) -> Utf8PathBuf {
        self.file("trips.json", BAY_AREA_TRIPS)
    }
}
