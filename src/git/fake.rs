//! git::fake
//!
//! In-memory [`GitClient`] for engine unit tests.
//!
//! Holds a fleet of fake repositories keyed by path, supports scripted
//! failures per clone URL / remote name, and records every mutation so
//! tests can assert "nothing was touched" directly.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::core::types::{both_modes, Mode, RemoteMap};

use super::interface::{GitClient, GitError};

#[derive(Debug, Default)]
pub struct FakeGit {
    repos: RefCell<BTreeMap<PathBuf, RemoteMap>>,
    branches: RefCell<BTreeMap<PathBuf, Vec<String>>>,
    stashes: RefCell<BTreeMap<PathBuf, Vec<String>>>,
    untracked: RefCell<BTreeMap<PathBuf, Vec<String>>>,
    failing_clone_urls: RefCell<HashSet<String>>,
    failing_remote_adds: RefCell<HashSet<String>>,
    failing_set_urls: RefCell<HashSet<String>>,
    mutations: RefCell<Vec<String>>,
    fetched: RefCell<Vec<PathBuf>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing repository with the given remotes.
    pub fn add_repo(&self, path: impl Into<PathBuf>, remotes: RemoteMap) {
        self.repos.borrow_mut().insert(path.into(), remotes);
    }

    /// Make every clone of `url` fail.
    pub fn fail_clone_of(&self, url: &str) {
        self.failing_clone_urls.borrow_mut().insert(url.to_string());
    }

    /// Make adding the remote `name` fail.
    pub fn fail_add_of(&self, name: &str) {
        self.failing_remote_adds.borrow_mut().insert(name.to_string());
    }

    /// Make URL writes on the remote `name` fail.
    pub fn fail_set_url_of(&self, name: &str) {
        self.failing_set_urls.borrow_mut().insert(name.to_string());
    }

    /// Script a local branch listing for `path`.
    pub fn set_branches(&self, path: impl Into<PathBuf>, names: Vec<String>) {
        self.branches.borrow_mut().insert(path.into(), names);
    }

    /// Script a stash listing for `path`.
    pub fn set_stashes(&self, path: impl Into<PathBuf>, entries: Vec<String>) {
        self.stashes.borrow_mut().insert(path.into(), entries);
    }

    /// Script an untracked-path listing for `path`.
    pub fn set_untracked(&self, path: impl Into<PathBuf>, paths: Vec<String>) {
        self.untracked.borrow_mut().insert(path.into(), paths);
    }

    /// The remotes currently configured at `path`, if it exists.
    pub fn remotes_at(&self, path: &Path) -> Option<RemoteMap> {
        self.repos.borrow().get(path).cloned()
    }

    /// Every mutation performed, in order, as human-readable entries.
    pub fn mutations(&self) -> Vec<String> {
        self.mutations.borrow().clone()
    }

    /// Paths that were fetch-refreshed, in order.
    pub fn fetched(&self) -> Vec<PathBuf> {
        self.fetched.borrow().clone()
    }

    fn listing(
        &self,
        table: &RefCell<BTreeMap<PathBuf, Vec<String>>>,
        path: &Path,
    ) -> Result<Vec<String>, GitError> {
        if !self.repos.borrow().contains_key(path) {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }
        Ok(table.borrow().get(path).cloned().unwrap_or_default())
    }
}

impl GitClient for FakeGit {
    fn list_remotes(&self, path: &Path) -> Result<RemoteMap, GitError> {
        self.repos
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| GitError::NotARepo {
                path: path.to_path_buf(),
            })
    }

    fn clone_project(&self, url: &str, origin: &str, dest: &Path) -> Result<(), GitError> {
        if self.failing_clone_urls.borrow().contains(url) {
            return Err(GitError::Internal {
                message: format!("could not connect to '{}'", url),
            });
        }
        let mut remotes = RemoteMap::new();
        remotes.insert(origin.to_string(), both_modes(url));
        self.repos.borrow_mut().insert(dest.to_path_buf(), remotes);
        self.mutations
            .borrow_mut()
            .push(format!("clone {} as {} into {}", url, origin, dest.display()));
        Ok(())
    }

    fn add_remote(&self, path: &Path, name: &str, url: &str) -> Result<(), GitError> {
        if self.failing_remote_adds.borrow().contains(name) {
            return Err(GitError::Internal {
                message: format!("could not add remote '{}'", name),
            });
        }
        let mut repos = self.repos.borrow_mut();
        let remotes = repos.get_mut(path).ok_or_else(|| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        if remotes.contains_key(name) {
            return Err(GitError::Internal {
                message: format!("remote '{}' already exists", name),
            });
        }
        remotes.insert(name.to_string(), both_modes(url));
        self.mutations
            .borrow_mut()
            .push(format!("add-remote {} {} in {}", name, url, path.display()));
        Ok(())
    }

    fn set_url(
        &self,
        path: &Path,
        name: &str,
        url: &str,
        push_only: bool,
    ) -> Result<(), GitError> {
        if self.failing_set_urls.borrow().contains(name) {
            return Err(GitError::Internal {
                message: format!("could not rewrite remote '{}'", name),
            });
        }
        let mut repos = self.repos.borrow_mut();
        let remotes = repos.get_mut(path).ok_or_else(|| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        let modes = remotes
            .get_mut(name)
            .ok_or_else(|| GitError::RemoteNotFound {
                message: name.to_string(),
            })?;
        let mode = if push_only { Mode::Push } else { Mode::Fetch };
        modes.insert(mode, url.to_string());
        self.mutations.borrow_mut().push(format!(
            "set-url{} {} {} in {}",
            if push_only { " --push" } else { "" },
            name,
            url,
            path.display()
        ));
        Ok(())
    }

    fn fetch_all(&self, path: &Path) -> Result<Vec<String>, GitError> {
        if !self.repos.borrow().contains_key(path) {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }
        self.fetched.borrow_mut().push(path.to_path_buf());
        Ok(Vec::new())
    }

    fn local_branches(&self, path: &Path) -> Result<Vec<String>, GitError> {
        self.listing(&self.branches, path)
    }

    fn stash_entries(&self, path: &Path) -> Result<Vec<String>, GitError> {
        self.listing(&self.stashes, path)
    }

    fn untracked_paths(&self, path: &Path) -> Result<Vec<String>, GitError> {
        self.listing(&self.untracked, path)
    }
}
