//! core::types
//!
//! Topology types for expected and observed project state.
//!
//! # Types
//!
//! - [`Mode`] - Remote transfer direction (fetch or push)
//! - [`ModeMap`] - Mode to URL bindings for one remote
//! - [`RemoteMap`] - Remote name to mode bindings for one project
//! - [`ObservedProject`] - Query result for one local project
//! - [`ExpectedTopology`] / [`ObservedTopology`] - Per-project maps
//!
//! # Ordering
//!
//! All maps are `BTreeMap`s. The reconciler visits projects, remotes, and
//! modes in lexicographic key order so runs are reproducible, and the map
//! types carry that guarantee instead of the call sites re-sorting.
//!
//! # Failure as data
//!
//! A project whose remote configuration cannot be queried is not an error
//! that aborts the run. It is an [`ObservedProject::QueryFailed`] value
//! that the reconciler branches on like any other observation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote transfer direction.
///
/// Unique within a remote. `Fetch` orders before `Push`, which matches the
/// lexicographic order of the serialized keys.
///
/// # Example
///
/// ```
/// use gitfleet::core::types::Mode;
///
/// assert!(Mode::Fetch < Mode::Push);
/// assert_eq!(Mode::Fetch.to_string(), "fetch");
/// assert_eq!(serde_json::to_string(&Mode::Push).unwrap(), "\"push\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// URL used for fetch operations.
    Fetch,
    /// URL used for push operations.
    Push,
}

impl Mode {
    /// The serialized name, as it appears in manifest documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fetch => "fetch",
            Mode::Push => "push",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A remote URL.
///
/// Opaque and compared byte-exact; no normalization is ever applied.
pub type Url = String;

/// A project directory name under the projects root.
pub type ProjectName = String;

/// A configured remote name.
pub type RemoteName = String;

/// Mode to URL bindings for one remote.
pub type ModeMap = BTreeMap<Mode, Url>;

/// Remote name to mode bindings for one project.
pub type RemoteMap = BTreeMap<RemoteName, ModeMap>;

/// The declared topology: what each project's remotes should look like.
pub type ExpectedTopology = BTreeMap<ProjectName, RemoteMap>;

/// The discovered topology: what each local project actually looks like.
pub type ObservedTopology = BTreeMap<ProjectName, ObservedProject>;

/// The result of querying one local project's remote configuration.
///
/// # Example
///
/// ```
/// use gitfleet::core::types::{ObservedProject, RemoteMap};
///
/// let ok = ObservedProject::Remotes(RemoteMap::new());
/// assert!(ok.remotes().is_some());
///
/// let failed = ObservedProject::QueryFailed("not a git repository".into());
/// assert!(failed.remotes().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedProject {
    /// The project exists and its remotes were read.
    Remotes(RemoteMap),
    /// The project path could not be queried; the diagnostic explains why.
    QueryFailed(String),
}

impl ObservedProject {
    /// The remote map, if the query succeeded.
    pub fn remotes(&self) -> Option<&RemoteMap> {
        match self {
            ObservedProject::Remotes(map) => Some(map),
            ObservedProject::QueryFailed(_) => None,
        }
    }

    /// Whether the query failed.
    pub fn is_query_failed(&self) -> bool {
        matches!(self, ObservedProject::QueryFailed(_))
    }
}

/// Build a [`ModeMap`] binding both fetch and push to one URL.
///
/// This is what a fresh `git clone` or `git remote add` leaves behind: the
/// push URL falls back to the fetch URL until a push-only URL is set.
pub fn both_modes(url: &str) -> ModeMap {
    let mut modes = ModeMap::new();
    modes.insert(Mode::Fetch, url.to_string());
    modes.insert(Mode::Push, url.to_string());
    modes
}
