//! Capability-scoped file access and JSON inputs for the CLI.

use std::io::{self, BufReader, Write};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use geocluster_core::GeoPoint;
use geocluster_matrix::ObservedTrips;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::CliError;

/// One store record in a points file.
///
/// `id` is optional; records without one are named by their position.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PointRecord {
    #[serde(default)]
    pub(crate) id: Option<String>,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

/// Validated points with their store identifiers, in file order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PointSet {
    pub(crate) points: Vec<GeoPoint>,
    pub(crate) ids: Vec<String>,
}

/// Open a UTF-8 file path using ambient authority.
pub(crate) fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Resolve the parent directory of `path` and return it with the file name.
fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Return whether a path exists and is a regular file.
pub(crate) fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create (or truncate) the file at `path` inside its parent directory.
pub(crate) fn create_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.create(name.as_str())
}

/// Fail with a descriptive error unless `path` names an existing file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a JSON array of `{ "id"?, "latitude", "longitude" }` records.
pub(crate) fn load_points(path: &Utf8Path) -> Result<PointSet, CliError> {
    let records: Vec<PointRecord> = load_json(path)?;
    let mut points = Vec::with_capacity(records.len());
    let mut ids = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let point = GeoPoint::new(record.latitude, record.longitude).map_err(|source| {
            CliError::InvalidPoint {
                path: path.to_path_buf(),
                index,
                source,
            }
        })?;
        points.push(point);
        ids.push(record.id.unwrap_or_else(|| index.to_string()));
    }
    Ok(PointSet { points, ids })
}

/// Load the observed tour for the time matrix.
pub(crate) fn load_trips(path: &Utf8Path) -> Result<ObservedTrips, CliError> {
    load_json(path)
}

/// Write `payload` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: serde::Serialize>(
    writer: &mut dyn Write,
    payload: &T,
) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(payload).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(text.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}
