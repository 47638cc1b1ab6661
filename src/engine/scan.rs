//! engine::scan
//!
//! Observation of the projects root: the state-query half of the engine.
//!
//! Scanning is read-only. Every directory entry under the projects root is
//! a project name; each is queried once for its remote configuration. A
//! query failure (plain file, directory that is not a repository, any
//! client error) becomes [`ObservedProject::QueryFailed`] data rather than
//! an error - only an unreadable root itself is fatal, at the process
//! boundary.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{ObservedProject, ObservedTopology};
use crate::git::GitClient;

/// Errors from observing the projects root.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The projects root could not be listed.
    #[error("can't list '{path}': {source}")]
    UnreadableRoot {
        /// The projects root path
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },
}

/// Query one project's live remote configuration.
///
/// Never fails: any client error is folded into the returned value.
pub fn observe_project<C: GitClient>(client: &C, path: &Path) -> ObservedProject {
    match client.list_remotes(path) {
        Ok(remotes) => ObservedProject::Remotes(remotes),
        Err(err) => ObservedProject::QueryFailed(err.to_string()),
    }
}

/// Observe every project under the projects root.
///
/// Each entry name under `root` is taken as a project name, exactly as it
/// appears on disk. The returned map is the observed topology snapshot the
/// reconciler starts from.
///
/// # Errors
///
/// [`ScanError::UnreadableRoot`] if `root` cannot be listed.
pub fn observe_projects<C: GitClient>(
    client: &C,
    root: &Path,
) -> Result<ObservedTopology, ScanError> {
    let entries = fs::read_dir(root).map_err(|source| ScanError::UnreadableRoot {
        path: root.to_path_buf(),
        source,
    })?;

    let mut observed = ObservedTopology::new();
    for entry in entries {
        let entry = entry.map_err(|source| ScanError::UnreadableRoot {
            path: root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        tracing::debug!("[{}] observing {}", name, root.join(&name).display());
        observed.insert(name.clone(), observe_project(client, &root.join(&name)));
    }
    Ok(observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Git;
    use tempfile::TempDir;

    #[test]
    fn missing_root_is_fatal() {
        let err = observe_projects(&Git::new(), Path::new("/nonexistent/projects")).unwrap_err();
        assert!(matches!(err, ScanError::UnreadableRoot { .. }));
    }

    #[test]
    fn empty_root_observes_nothing() {
        let root = TempDir::new().unwrap();
        let observed = observe_projects(&Git::new(), root.path()).unwrap();
        assert!(observed.is_empty());
    }

    #[test]
    fn repositories_plain_directories_and_files_are_all_observed() {
        let root = TempDir::new().unwrap();
        git2::Repository::init(root.path().join("repo")).unwrap();
        std::fs::create_dir(root.path().join("plain")).unwrap();
        std::fs::write(root.path().join("stray.txt"), "x").unwrap();

        let observed = observe_projects(&Git::new(), root.path()).unwrap();
        assert_eq!(observed.len(), 3);
        assert!(!observed["repo"].is_query_failed());
        assert!(observed["plain"].is_query_failed());
        assert!(observed["stray.txt"].is_query_failed());
    }
}
