//! engine
//!
//! The reconciliation engine: expected topology vs observed topology.
//!
//! # Architecture
//!
//! One run is a strictly sequential pass over the project universe (the
//! union of expected and observed names, lexicographic order):
//!
//! ```text
//! Observe -> Filter -> Reconcile (project -> remote -> mode) -> Refresh -> Post-checks -> Export
//! ```
//!
//! The same decision primitive ([`matrix::reconcile`]) drives all three
//! reconciliation scopes; only the create/correct actions differ. Every
//! decision derives purely from the current expected-vs-observed diff, so
//! rerunning after a partial or interrupted run converges without cleanup:
//! keys that already match are no-ops.
//!
//! # Invariants
//!
//! - Nothing is mutated without its capability grant
//! - Observed state is never mutated in place; successful actions return
//!   new snapshots that later scopes (and the export) see
//! - No failure propagates past its scope: a project, remote, or mode that
//!   fails is abandoned while its siblings proceed
//!
//! # Modules
//!
//! - [`capabilities`] - Run-time permission flags
//! - [`matrix`] - The generic three-state decision primitive
//! - [`clone`] - Multi-candidate fallback clone
//! - [`scan`] - Observation of the projects root
//! - [`report`] - Typed event stream

pub mod capabilities;
pub mod clone;
pub mod matrix;
pub mod report;
pub mod scan;

pub use capabilities::{Capability, CapabilitySet};
pub use report::{Event, Report, Severity};
pub use scan::{observe_project, observe_projects, ScanError};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::core::types::{
    both_modes, ExpectedTopology, Mode, ModeMap, ObservedProject, ObservedTopology, RemoteMap,
    RemoteName, Url,
};
use crate::git::GitClient;
use matrix::{Decision, Step};

/// Fixed, read-only configuration for one run.
#[derive(Debug)]
pub struct RunConfig {
    /// The directory holding the project directories.
    pub projects_root: PathBuf,
    /// Which corrective actions are permitted.
    pub capabilities: CapabilitySet,
    /// Name filter; non-matching projects are ignored (search, not full
    /// match). Compiled at the process boundary so an invalid pattern is
    /// fatal before any project is touched.
    pub filter: Regex,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// The full event stream.
    pub report: Report,
    /// The final observed topology, updated with each action's snapshot.
    pub observed: ObservedTopology,
}

impl RunOutcome {
    /// Build the export snapshot: expected per project, falling back to the
    /// final observed state for projects absent from expected, excluding
    /// projects whose query failed.
    pub fn export_snapshot(&self, expected: &ExpectedTopology) -> ExpectedTopology {
        let mut snapshot = expected.clone();
        for (name, observed) in &self.observed {
            if let ObservedProject::Remotes(remotes) = observed {
                snapshot
                    .entry(name.clone())
                    .or_insert_with(|| remotes.clone());
            }
        }
        snapshot
    }
}

/// The no-drift baseline used when no manifest was given: expected is
/// defined as the successfully-queried part of observed.
pub fn baseline_from_observed(observed: &ObservedTopology) -> ExpectedTopology {
    observed
        .iter()
        .filter_map(|(name, obs)| obs.remotes().map(|map| (name.clone(), map.clone())))
        .collect()
}

/// The sequential reconciliation driver.
pub struct Reconciler<'a, C: GitClient> {
    client: &'a C,
    config: &'a RunConfig,
}

impl<'a, C: GitClient> Reconciler<'a, C> {
    /// Create a reconciler over a git client and a run configuration.
    pub fn new(client: &'a C, config: &'a RunConfig) -> Self {
        Self { client, config }
    }

    /// Reconcile every project in the universe.
    ///
    /// Consumes the observed topology snapshot and returns it updated with
    /// the result of every successful action.
    pub fn run(&self, expected: &ExpectedTopology, mut observed: ObservedTopology) -> RunOutcome {
        let mut report = Report::new();

        let universe: BTreeSet<String> = expected
            .keys()
            .cloned()
            .chain(observed.keys().cloned())
            .collect();

        for name in &universe {
            if !self.config.filter.is_match(name) {
                report.record(Event::Ignored {
                    project: name.clone(),
                });
                continue;
            }

            let path = self.config.projects_root.join(name);
            let current = observed.get(name).cloned();
            let baseline =
                self.project_pass(&mut report, name, &path, expected.get(name), current.as_ref());

            // A usable baseline means the project directory exists now:
            // refresh it, run the informational checks, and publish the
            // new observed snapshot.
            if let Some(remotes) = baseline {
                self.refresh(&mut report, name, &path);
                self.post_checks(&mut report, name, &path);
                observed.insert(name.clone(), ObservedProject::Remotes(remotes));
            }
        }

        RunOutcome { report, observed }
    }

    /// Project-scope pass. Returns the project's usable observed remote
    /// map, or `None` when the project was abandoned for this run (query
    /// failure, clone skipped or failed, or nothing observed at all).
    fn project_pass(
        &self,
        report: &mut Report,
        project: &str,
        path: &Path,
        expected: Option<&RemoteMap>,
        observed: Option<&ObservedProject>,
    ) -> Option<RemoteMap> {
        // Query failure isolates the project: report and abandon.
        if let Some(ObservedProject::QueryFailed(diagnostic)) = observed {
            report.record(Event::QueryFailed {
                project: project.to_string(),
                diagnostic: diagnostic.clone(),
            });
            return None;
        }
        let observed = observed.and_then(|o| o.remotes());

        let Some(expected) = expected else {
            // Not declared: never touched, but drift is surfaced and the
            // informational checks still run.
            return match observed {
                Some(remotes) => {
                    report.record(Event::UnexpectedProject {
                        project: project.to_string(),
                    });
                    Some(remotes.clone())
                }
                None => None,
            };
        };

        let decision = matrix::reconcile(
            report,
            Some(expected),
            observed,
            |report| {
                if !self.config.capabilities.has(Capability::Clone) {
                    return Step::Denied(Capability::Clone);
                }
                match clone::clone_fallback(self.client, report, project, path, expected) {
                    Some(seeded) => Step::Done(self.reconcile_remotes(
                        report, project, path, expected, &seeded,
                    )),
                    None => Step::Failed,
                }
            },
            |report, current| {
                // A changed project is never "corrected" wholesale; it
                // always recurses into remote-scope reconciliation.
                Step::Done(self.reconcile_remotes(report, project, path, expected, current))
            },
        );

        match decision {
            Decision::Unchanged => Some(expected.clone()),
            Decision::Applied(remotes) => Some(remotes),
            Decision::Skipped(_) => {
                report.record(Event::CloneSkipped {
                    project: project.to_string(),
                });
                None
            }
            // Clone fallback already reported its failure.
            Decision::Failed => None,
            // Expected is present here, so these rows cannot be reached.
            Decision::Unexpected | Decision::Vacant => None,
        }
    }

    /// Remote-scope pass over the union of expected and observed remotes.
    /// Returns the new observed remote map.
    fn reconcile_remotes(
        &self,
        report: &mut Report,
        project: &str,
        path: &Path,
        expected: &RemoteMap,
        observed: &RemoteMap,
    ) -> RemoteMap {
        let mut result = observed.clone();
        let names: Vec<&RemoteName> = expected
            .keys()
            .chain(observed.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        for name in names {
            let decision = matrix::reconcile(
                report,
                expected.get(name),
                observed.get(name),
                |report| self.add_remote(report, project, path, name, &expected[name]),
                |report, current| {
                    Step::Done(self.reconcile_modes(
                        report,
                        project,
                        path,
                        name,
                        &expected[name],
                        current,
                    ))
                },
            );

            match decision {
                Decision::Unexpected => report.record(Event::UnexpectedRemote {
                    project: project.to_string(),
                    remote: name.clone(),
                }),
                Decision::Skipped(_) => report.record(Event::RemoteAddSkipped {
                    project: project.to_string(),
                    remote: name.clone(),
                }),
                Decision::Applied(modes) => {
                    result.insert(name.clone(), modes);
                }
                Decision::Unchanged | Decision::Vacant | Decision::Failed => {}
            }
        }
        result
    }

    /// Create a missing remote, binding both modes to whichever expected
    /// URL is available, then recurse into mode scope so an asymmetric
    /// expected push URL converges in the same pass.
    fn add_remote(
        &self,
        report: &mut Report,
        project: &str,
        path: &Path,
        name: &RemoteName,
        expected: &ModeMap,
    ) -> Step<ModeMap> {
        if !self.config.capabilities.has(Capability::SetUrls) {
            return Step::Denied(Capability::SetUrls);
        }
        let Some(url) = expected.values().next() else {
            report.record(Event::RemoteAddFailed {
                project: project.to_string(),
                remote: name.clone(),
                error: "no URL available in expected modes".to_string(),
            });
            return Step::Failed;
        };
        match self.client.add_remote(path, name, url) {
            Ok(()) => {
                report.record(Event::RemoteAdded {
                    project: project.to_string(),
                    remote: name.clone(),
                    url: url.clone(),
                });
                let seeded = both_modes(url);
                Step::Done(self.reconcile_modes(report, project, path, name, expected, &seeded))
            }
            Err(err) => {
                report.record(Event::RemoteAddFailed {
                    project: project.to_string(),
                    remote: name.clone(),
                    error: err.to_string(),
                });
                Step::Failed
            }
        }
    }

    /// Mode-scope pass over the union of expected and observed modes.
    /// Returns the new observed mode map.
    fn reconcile_modes(
        &self,
        report: &mut Report,
        project: &str,
        path: &Path,
        remote: &RemoteName,
        expected: &ModeMap,
        observed: &ModeMap,
    ) -> ModeMap {
        let mut result = observed.clone();
        let modes: BTreeSet<Mode> = expected
            .keys()
            .chain(observed.keys())
            .copied()
            .collect();

        for mode in modes {
            let decision = matrix::reconcile(
                report,
                expected.get(&mode),
                observed.get(&mode),
                |report| self.write_url(report, project, path, remote, mode, &expected[&mode], None),
                |report, current| {
                    self.write_url(
                        report,
                        project,
                        path,
                        remote,
                        mode,
                        &expected[&mode],
                        Some(current),
                    )
                },
            );

            match decision {
                Decision::Unexpected => report.record(Event::UnexpectedMode {
                    project: project.to_string(),
                    remote: remote.clone(),
                    mode,
                }),
                Decision::Skipped(_) => report.record(Event::SetUrlSkipped {
                    project: project.to_string(),
                    remote: remote.clone(),
                    mode,
                }),
                Decision::Applied(url) => {
                    result.insert(mode, url);
                }
                Decision::Unchanged | Decision::Vacant | Decision::Failed => {}
            }
        }
        result
    }

    /// Write one remote URL (first write and correction both land here;
    /// push mode uses the push-only variant).
    fn write_url(
        &self,
        report: &mut Report,
        project: &str,
        path: &Path,
        remote: &RemoteName,
        mode: Mode,
        url: &Url,
        old: Option<&Url>,
    ) -> Step<Url> {
        if !self.config.capabilities.has(Capability::SetUrls) {
            return Step::Denied(Capability::SetUrls);
        }
        match self.client.set_url(path, remote, url, mode == Mode::Push) {
            Ok(()) => {
                report.record(Event::UrlSet {
                    project: project.to_string(),
                    remote: remote.clone(),
                    mode,
                    old: old.cloned(),
                    new: url.clone(),
                });
                Step::Done(url.clone())
            }
            Err(err) => {
                report.record(Event::SetUrlFailed {
                    project: project.to_string(),
                    remote: remote.clone(),
                    mode,
                    error: err.to_string(),
                });
                Step::Failed
            }
        }
    }

    /// Fetch all remotes with pruning and tag update, when granted.
    /// Never fatal.
    fn refresh(&self, report: &mut Report, project: &str, path: &Path) {
        if !self.config.capabilities.has(Capability::Fetch) {
            return;
        }
        tracing::debug!("[{}] fetching all remotes...", project);
        match self.client.fetch_all(path) {
            Ok(summaries) if !summaries.is_empty() => report.record(Event::Fetched {
                project: project.to_string(),
                summaries,
            }),
            Ok(_) => {}
            Err(err) => report.record(Event::FetchFailed {
                project: project.to_string(),
                error: err.to_string(),
            }),
        }
    }

    /// Informational post-checks: branches, stashes, untracked paths.
    /// Each is independently best-effort.
    fn post_checks(&self, report: &mut Report, project: &str, path: &Path) {
        match self.client.local_branches(path) {
            Ok(names) if !names.is_empty() => report.record(Event::Branches {
                project: project.to_string(),
                names,
            }),
            Ok(_) => {}
            Err(err) => report.record(Event::PostCheckFailed {
                project: project.to_string(),
                check: "local branches",
                error: err.to_string(),
            }),
        }
        match self.client.stash_entries(path) {
            Ok(entries) if !entries.is_empty() => report.record(Event::Stashes {
                project: project.to_string(),
                entries,
            }),
            Ok(_) => {}
            Err(err) => report.record(Event::PostCheckFailed {
                project: project.to_string(),
                check: "stashed changes",
                error: err.to_string(),
            }),
        }
        match self.client.untracked_paths(path) {
            Ok(paths) if !paths.is_empty() => report.record(Event::Untracked {
                project: project.to_string(),
                paths,
            }),
            Ok(_) => {}
            Err(err) => report.record(Event::PostCheckFailed {
                project: project.to_string(),
                check: "untracked files",
                error: err.to_string(),
            }),
        }
    }
}
