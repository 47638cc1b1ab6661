//! engine::capabilities
//!
//! Capability flags gating corrective actions.
//!
//! # Design
//!
//! A capability is a run-time permission for one class of corrective
//! action. It is binary: granted or not, fixed for the whole run. The
//! reconciler never mutates anything a capability does not cover; a needed
//! but ungranted action is reported as a skip naming the flag that would
//! unlock it.
//!
//! # Example
//!
//! ```
//! use gitfleet::engine::capabilities::{Capability, CapabilitySet};
//!
//! let caps = CapabilitySet::with([Capability::Clone]);
//! assert!(caps.has(Capability::Clone));
//! assert!(!caps.has(Capability::SetUrls));
//! assert_eq!(Capability::SetUrls.flag(), "--set-urls");
//! ```

use std::collections::HashSet;

/// A run-time permission for one class of corrective action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Clone projects that exist in the expected topology but not locally.
    Clone,

    /// Fetch all remotes (with pruning and tag update) after reconciling.
    Fetch,

    /// Add missing remotes and rewrite URLs that do not match.
    SetUrls,
}

impl Capability {
    /// The command-line flag that grants this capability.
    ///
    /// Used in skip warnings so the report says exactly how to rerun.
    pub fn flag(&self) -> &'static str {
        match self {
            Capability::Clone => "--clone",
            Capability::Fetch => "--fetch",
            Capability::SetUrls => "--set-urls",
        }
    }

    /// A human-readable description of what the capability permits.
    pub fn description(&self) -> &'static str {
        match self {
            Capability::Clone => "clone missing projects",
            Capability::Fetch => "update all remotes",
            Capability::SetUrls => "add remotes and overwrite mismatched URLs",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// The set of capabilities granted for a run.
///
/// Read-only configuration: built once from the command line, then only
/// queried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    capabilities: HashSet<Capability>,
}

impl CapabilitySet {
    /// Create an empty set (report-only run; nothing is mutated).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set with the given capabilities.
    pub fn with<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }

    /// Build the set from the command-line grants.
    ///
    /// `sync` is the combined alias: it grants all three.
    pub fn from_flags(clone: bool, fetch: bool, set_urls: bool, sync: bool) -> Self {
        let mut caps = Self::new();
        if clone || sync {
            caps.insert(Capability::Clone);
        }
        if fetch || sync {
            caps.insert(Capability::Fetch);
        }
        if set_urls || sync {
            caps.insert(Capability::SetUrls);
        }
        caps
    }

    /// Insert a capability into the set.
    pub fn insert(&mut self, cap: Capability) {
        self.capabilities.insert(cap);
    }

    /// Check if a capability is granted.
    pub fn has(&self, cap: Capability) -> bool {
        self.capabilities.contains(&cap)
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}
