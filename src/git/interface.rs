//! git::interface
//!
//! Git client implementation using git2.
//!
//! This module is the single doorway to all Git operations in gitfleet.
//! No other module imports `git2` directly. The [`GitClient`] trait is the
//! capability contract the reconciliation engine consumes; [`Git`] is its
//! production implementation. The trait exists so the engine can be
//! exercised against an in-memory client in unit tests.
//!
//! # Failure modes
//!
//! Each operation maps to one failure policy in the engine:
//!
//! - `list_remotes` failure becomes `QueryFailed` data for that project
//! - `clone_project` failure moves on to the next clone candidate
//! - `add_remote` / `set_url` failures are logged at their scope
//! - `fetch_all` and the listing operations are best-effort and never fatal

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{both_modes, Mode, RemoteMap};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The path is not a git repository.
    ///
    /// Unlike `git -C`, no parent-directory search is performed: a project
    /// is its own directory under the projects root or it is nothing.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// A named remote does not exist.
    #[error("remote not found: {message}")]
    RemoteNotFound {
        /// The error message
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RemoteNotFound {
                message: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

/// The version-control capability contract consumed by the engine.
///
/// Every operation is local and blocking, so the trait is synchronous.
/// Mutating operations return `()` on success; the engine derives the new
/// observed snapshot itself, which keeps reconciliation decisions pure.
pub trait GitClient {
    /// Read the configured remotes of the repository at `path`.
    fn list_remotes(&self, path: &Path) -> Result<RemoteMap, GitError>;

    /// Clone `url` into `dest`, binding the origin remote to `origin`.
    fn clone_project(&self, url: &str, origin: &str, dest: &Path) -> Result<(), GitError>;

    /// Add remote `name` bound to `url` (fetch and push).
    fn add_remote(&self, path: &Path, name: &str, url: &str) -> Result<(), GitError>;

    /// Rewrite the URL of remote `name`; only the push URL when `push_only`.
    fn set_url(&self, path: &Path, name: &str, url: &str, push_only: bool)
        -> Result<(), GitError>;

    /// Fetch every remote with pruning and full tag download.
    ///
    /// Returns human-readable transfer summaries, one per remote that
    /// actually received objects.
    fn fetch_all(&self, path: &Path) -> Result<Vec<String>, GitError>;

    /// List local branch names.
    fn local_branches(&self, path: &Path) -> Result<Vec<String>, GitError>;

    /// List stash entries, newest first, in `git stash list` form.
    fn stash_entries(&self, path: &Path) -> Result<Vec<String>, GitError>;

    /// List untracked paths, honouring standard ignore rules, with
    /// untracked directories collapsed to a single entry.
    fn untracked_paths(&self, path: &Path) -> Result<Vec<String>, GitError>;
}

/// The git2-backed client.
///
/// Stateless: every call opens the repository at the given path, so the
/// client can be shared across the whole run while each project stays
/// independent.
#[derive(Debug, Default)]
pub struct Git;

impl Git {
    /// Create a client.
    pub fn new() -> Self {
        Git
    }

    /// Open the repository at `path` without parent-directory search.
    fn open(&self, path: &Path) -> Result<git2::Repository, GitError> {
        git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })
    }
}

impl GitClient for Git {
    fn list_remotes(&self, path: &Path) -> Result<RemoteMap, GitError> {
        let repo = self.open(path)?;
        let names = repo.remotes()?;

        let mut remotes = RemoteMap::new();
        for name in names.iter().flatten() {
            let remote = repo.find_remote(name)?;
            // A remote without a URL cannot occur through normal git
            // configuration; skip rather than invent an entry.
            let Some(url) = remote.url() else { continue };
            let mut modes = both_modes(url);
            if let Some(push_url) = remote.pushurl() {
                modes.insert(Mode::Push, push_url.to_string());
            }
            remotes.insert(name.to_string(), modes);
        }
        Ok(remotes)
    }

    fn clone_project(&self, url: &str, origin: &str, dest: &Path) -> Result<(), GitError> {
        let label = origin.to_string();
        let mut builder = git2::build::RepoBuilder::new();
        builder.remote_create(move |repo, _default, url| repo.remote(&label, url));
        builder.clone(url, dest)?;
        Ok(())
    }

    fn add_remote(&self, path: &Path, name: &str, url: &str) -> Result<(), GitError> {
        let repo = self.open(path)?;
        repo.remote(name, url)?;
        Ok(())
    }

    fn set_url(
        &self,
        path: &Path,
        name: &str,
        url: &str,
        push_only: bool,
    ) -> Result<(), GitError> {
        let repo = self.open(path)?;
        if push_only {
            repo.remote_set_pushurl(name, Some(url))?;
        } else {
            repo.remote_set_url(name, url)?;
        }
        Ok(())
    }

    fn fetch_all(&self, path: &Path) -> Result<Vec<String>, GitError> {
        let repo = self.open(path)?;
        let names: Vec<String> = repo
            .remotes()?
            .iter()
            .flatten()
            .map(String::from)
            .collect();

        let mut summaries = Vec::new();
        for name in names {
            let mut remote = repo.find_remote(&name)?;
            let mut options = git2::FetchOptions::new();
            options.prune(git2::FetchPrune::On);
            options.download_tags(git2::AutotagOption::All);
            remote
                .fetch::<&str>(&[], Some(&mut options), None)
                .map_err(|err| GitError::Internal {
                    message: format!("fetch '{}': {}", name, err.message()),
                })?;
            let stats = remote.stats();
            if stats.received_objects() > 0 {
                summaries.push(format!(
                    "{}: received {} objects",
                    name,
                    stats.received_objects()
                ));
            }
        }
        Ok(summaries)
    }

    fn local_branches(&self, path: &Path) -> Result<Vec<String>, GitError> {
        let repo = self.open(path)?;
        let mut branches = Vec::new();
        for entry in repo.branches(Some(git2::BranchType::Local))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                branches.push(name.to_string());
            }
        }
        Ok(branches)
    }

    fn stash_entries(&self, path: &Path) -> Result<Vec<String>, GitError> {
        let mut repo = self.open(path)?;
        let mut entries = Vec::new();
        repo.stash_foreach(|index, message, _oid| {
            entries.push(format!("stash@{{{}}}: {}", index, message));
            true
        })?;
        Ok(entries)
    }

    fn untracked_paths(&self, path: &Path) -> Result<Vec<String>, GitError> {
        let repo = self.open(path)?;
        let mut options = git2::StatusOptions::new();
        options.include_untracked(true);
        options.exclude_submodules(true);
        let statuses = repo.statuses(Some(&mut options))?;

        let mut paths = Vec::new();
        for entry in statuses.iter() {
            if entry.status().contains(git2::Status::WT_NEW) {
                paths.push(String::from_utf8_lossy(entry.path_bytes()).into_owned());
            }
        }
        Ok(paths)
    }
}
