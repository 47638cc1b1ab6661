//! core::manifest
//!
//! Manifest document load and save.
//!
//! A manifest is the JSON form of an [`ExpectedTopology`]:
//!
//! ```json
//! {
//!     "project": {
//!         "origin": {
//!             "fetch": "https://example.com/project.git",
//!             "push": "git@example.com:project.git"
//!         }
//!     }
//! }
//! ```
//!
//! Object keys are sorted on export (the maps are `BTreeMap`s) and the
//! document is written with a 4-space indent, so exports are stable and
//! diff-friendly. Saving refuses to replace an existing file unless
//! overwrite is explicitly requested.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::types::ExpectedTopology;

/// Errors from manifest load/save.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened or read.
    #[error("can't open '{path}': {source}")]
    Read {
        /// The manifest path
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },

    /// The manifest file is not a valid topology document.
    #[error("can't decode JSON from '{path}': {source}")]
    Decode {
        /// The manifest path
        path: PathBuf,
        /// The underlying decode error
        source: serde_json::Error,
    },

    /// The export destination already exists and overwrite was not requested.
    #[error("'{path}' already exists")]
    AlreadyExists {
        /// The destination path
        path: PathBuf,
    },

    /// The export destination could not be created or written.
    #[error("can't write '{path}': {source}")]
    Write {
        /// The destination path
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },
}

/// Load an expected topology from a manifest file.
///
/// # Errors
///
/// - [`ManifestError::Read`] if the file cannot be opened
/// - [`ManifestError::Decode`] if it is not a valid topology document
///   (including unknown mode keys)
pub fn load(path: &Path) -> Result<ExpectedTopology, ManifestError> {
    let file = File::open(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ManifestError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Save an expected topology as a manifest file.
///
/// Refuses to replace an existing file unless `overwrite` is set.
///
/// # Errors
///
/// - [`ManifestError::AlreadyExists`] if the destination exists and
///   `overwrite` is false
/// - [`ManifestError::Write`] on any other I/O failure
pub fn save(path: &Path, topology: &ExpectedTopology, overwrite: bool) -> Result<(), ManifestError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let file = options.open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            ManifestError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            ManifestError::Write {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    topology
        .serialize(&mut serializer)
        .map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source: io::Error::from(source),
        })?;
    writeln!(writer).and_then(|_| writer.flush()).map_err(|source| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::both_modes;
    use tempfile::TempDir;

    fn sample() -> ExpectedTopology {
        let mut topology = ExpectedTopology::new();
        let mut remotes = crate::core::types::RemoteMap::new();
        remotes.insert("origin".into(), both_modes("https://example.com/a.git"));
        topology.insert("a".into(), remotes);
        topology
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let topology = sample();

        save(&path, &topology, false).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, topology);
    }

    #[test]
    fn save_uses_four_space_indent_and_sorted_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        let mut topology = sample();
        let mut remotes = crate::core::types::RemoteMap::new();
        remotes.insert("upstream".into(), both_modes("u"));
        remotes.insert("fork".into(), both_modes("f"));
        topology.insert("b".into(), remotes);

        save(&path, &topology, false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("    \"a\""));
        // "fork" sorts before "upstream".
        assert!(text.find("\"fork\"").unwrap() < text.find("\"upstream\"").unwrap());
    }

    #[test]
    fn save_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{}").unwrap();

        let err = save(&path, &sample(), false).unwrap_err();
        assert!(matches!(err, ManifestError::AlreadyExists { .. }));
    }

    #[test]
    fn save_overwrite_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "stale").unwrap();

        save(&path, &sample(), true).unwrap();
        assert_eq!(load(&path).unwrap(), sample());
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Decode { .. }));
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let err = load(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }
}
