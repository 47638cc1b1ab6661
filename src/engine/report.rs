//! engine::report
//!
//! Typed event stream for one reconciliation run.
//!
//! # Design
//!
//! Every observation the reconciler makes - drift, skips, actions,
//! failures, informational post-checks - is an [`Event`] value appended to
//! a [`Report`]. Events are data first: tests assert on them directly
//! (count corrective actions, find a specific skip) instead of scraping
//! log output. Recording an event also emits it through `tracing` at its
//! severity, so the report stream and the log stream always agree.
//!
//! Every message carries the stable `[project]`, `[project] [remote]`, or
//! `[project] [remote] [mode]` prefix identifying its scope.

use std::fmt;

use crate::core::types::{Mode, ProjectName, RemoteName, Url};
use crate::engine::capabilities::Capability;

/// How serious an event is; maps one-to-one onto `tracing` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Bookkeeping detail (filtered projects, sync-needed notices).
    Debug,
    /// A completed action or an informational listing.
    Info,
    /// Drift that was not (or could not be) corrected; the run continues.
    Warning,
    /// A failure that abandoned its scope; the run continues.
    Error,
}

/// One observation from a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The project name did not match the filter pattern.
    Ignored { project: ProjectName },

    /// The project's remote configuration could not be queried.
    QueryFailed {
        project: ProjectName,
        diagnostic: String,
    },

    /// The project exists locally but not in the expected topology.
    UnexpectedProject { project: ProjectName },

    /// The remote exists locally but not in the expected topology.
    UnexpectedRemote {
        project: ProjectName,
        remote: RemoteName,
    },

    /// The mode is bound locally but not in the expected topology.
    UnexpectedMode {
        project: ProjectName,
        remote: RemoteName,
        mode: Mode,
    },

    /// A missing project was not cloned because `--clone` was not given.
    CloneSkipped { project: ProjectName },

    /// A missing remote was not added because `--set-urls` was not given.
    RemoteAddSkipped {
        project: ProjectName,
        remote: RemoteName,
    },

    /// A mismatched URL was not rewritten because `--set-urls` was not given.
    SetUrlSkipped {
        project: ProjectName,
        remote: RemoteName,
        mode: Mode,
    },

    /// One clone candidate failed; the next will be tried.
    CloneCandidateFailed {
        project: ProjectName,
        remote: RemoteName,
        url: Url,
        error: String,
    },

    /// The project was cloned from this candidate.
    Cloned {
        project: ProjectName,
        remote: RemoteName,
        url: Url,
    },

    /// Every clone candidate failed; the project was abandoned this pass.
    CloneFailed { project: ProjectName },

    /// A missing remote was added, binding both modes to one URL.
    RemoteAdded {
        project: ProjectName,
        remote: RemoteName,
        url: Url,
    },

    /// Adding a missing remote failed.
    RemoteAddFailed {
        project: ProjectName,
        remote: RemoteName,
        error: String,
    },

    /// A remote URL was written (`old` is absent on first write).
    UrlSet {
        project: ProjectName,
        remote: RemoteName,
        mode: Mode,
        old: Option<Url>,
        new: Url,
    },

    /// Writing a remote URL failed.
    SetUrlFailed {
        project: ProjectName,
        remote: RemoteName,
        mode: Mode,
        error: String,
    },

    /// Fetch-all received updates.
    Fetched {
        project: ProjectName,
        summaries: Vec<String>,
    },

    /// Fetch-all failed; never fatal.
    FetchFailed {
        project: ProjectName,
        error: String,
    },

    /// Local branches exist.
    Branches {
        project: ProjectName,
        names: Vec<String>,
    },

    /// Stashed changes exist.
    Stashes {
        project: ProjectName,
        entries: Vec<String>,
    },

    /// Untracked paths exist.
    Untracked {
        project: ProjectName,
        paths: Vec<String>,
    },

    /// One informational post-check could not run; the others still do.
    PostCheckFailed {
        project: ProjectName,
        check: &'static str,
        error: String,
    },
}

impl Event {
    /// The severity this event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::Ignored { .. } => Severity::Debug,

            Event::Cloned { .. }
            | Event::RemoteAdded { .. }
            | Event::UrlSet { .. }
            | Event::Fetched { .. }
            | Event::Branches { .. }
            | Event::Stashes { .. }
            | Event::Untracked { .. } => Severity::Info,

            Event::UnexpectedProject { .. }
            | Event::UnexpectedRemote { .. }
            | Event::UnexpectedMode { .. }
            | Event::CloneSkipped { .. }
            | Event::RemoteAddSkipped { .. }
            | Event::SetUrlSkipped { .. }
            | Event::CloneCandidateFailed { .. }
            | Event::FetchFailed { .. }
            | Event::PostCheckFailed { .. } => Severity::Warning,

            Event::QueryFailed { .. }
            | Event::CloneFailed { .. }
            | Event::RemoteAddFailed { .. }
            | Event::SetUrlFailed { .. } => Severity::Error,
        }
    }

    /// Whether this event records a completed corrective action
    /// (clone, add-remote, or set-url).
    ///
    /// Idempotence means a rerun with an unchanged expected topology
    /// records zero of these.
    pub fn is_corrective(&self) -> bool {
        matches!(
            self,
            Event::Cloned { .. } | Event::RemoteAdded { .. } | Event::UrlSet { .. }
        )
    }

    /// The project this event belongs to.
    pub fn project(&self) -> &str {
        match self {
            Event::Ignored { project }
            | Event::QueryFailed { project, .. }
            | Event::UnexpectedProject { project }
            | Event::UnexpectedRemote { project, .. }
            | Event::UnexpectedMode { project, .. }
            | Event::CloneSkipped { project }
            | Event::RemoteAddSkipped { project, .. }
            | Event::SetUrlSkipped { project, .. }
            | Event::CloneCandidateFailed { project, .. }
            | Event::Cloned { project, .. }
            | Event::CloneFailed { project }
            | Event::RemoteAdded { project, .. }
            | Event::RemoteAddFailed { project, .. }
            | Event::UrlSet { project, .. }
            | Event::SetUrlFailed { project, .. }
            | Event::Fetched { project, .. }
            | Event::FetchFailed { project, .. }
            | Event::Branches { project, .. }
            | Event::Stashes { project, .. }
            | Event::Untracked { project, .. }
            | Event::PostCheckFailed { project, .. } => project,
        }
    }
}

fn listing(lines: &[String]) -> String {
    lines.join("\n")
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Ignored { project } => write!(f, "[{}] ignoring...", project),
            Event::QueryFailed {
                project,
                diagnostic,
            } => write!(f, "[{}] {}", project, diagnostic),
            Event::UnexpectedProject { project } => {
                write!(f, "[{}] unexpected project", project)
            }
            Event::UnexpectedRemote { project, remote } => {
                write!(f, "[{}] [{}] unexpected remote", project, remote)
            }
            Event::UnexpectedMode {
                project,
                remote,
                mode,
            } => write!(f, "[{}] [{}] [{}] unexpected mode", project, remote, mode),
            Event::CloneSkipped { project } => write!(
                f,
                "[{}] skipping (rerun with {})...",
                project,
                Capability::Clone.flag()
            ),
            Event::RemoteAddSkipped { project, remote } => write!(
                f,
                "[{}] [{}] skipping (rerun with {})...",
                project,
                remote,
                Capability::SetUrls.flag()
            ),
            Event::SetUrlSkipped {
                project,
                remote,
                mode,
            } => write!(
                f,
                "[{}] [{}] [{}] skipping (rerun with {})...",
                project, remote, mode,
                Capability::SetUrls.flag()
            ),
            Event::CloneCandidateFailed {
                project,
                remote,
                url,
                error,
            } => write!(
                f,
                "[{}] [{}] clone from '{}' failed: {}",
                project, remote, url, error
            ),
            Event::Cloned {
                project,
                remote,
                url,
            } => write!(f, "[{}] [{}] clone from '{}' complete", project, remote, url),
            Event::CloneFailed { project } => {
                write!(f, "[{}] unable to clone from expected remotes", project)
            }
            Event::RemoteAdded {
                project,
                remote,
                url,
            } => write!(f, "[{}] [{}] added with '{}'", project, remote, url),
            Event::RemoteAddFailed {
                project,
                remote,
                error,
            } => write!(f, "[{}] [{}] unable to add remote: {}", project, remote, error),
            Event::UrlSet {
                project,
                remote,
                mode,
                old,
                new,
            } => match old {
                Some(old) => write!(
                    f,
                    "[{}] [{}] [{}] changing '{}' to '{}'...",
                    project, remote, mode, old, new
                ),
                None => write!(
                    f,
                    "[{}] [{}] [{}] setting '{}'...",
                    project, remote, mode, new
                ),
            },
            Event::SetUrlFailed {
                project,
                remote,
                mode,
                error,
            } => write!(
                f,
                "[{}] [{}] [{}] unable to set URL: {}",
                project, remote, mode, error
            ),
            Event::Fetched { project, summaries } => {
                write!(f, "[{}] fetched updates:\n{}", project, listing(summaries))
            }
            Event::FetchFailed { project, error } => {
                write!(f, "[{}] fetch failed: {}", project, error)
            }
            Event::Branches { project, names } => {
                write!(f, "[{}] local branches:\n{}", project, listing(names))
            }
            Event::Stashes { project, entries } => {
                write!(f, "[{}] stashed changes:\n{}", project, listing(entries))
            }
            Event::Untracked { project, paths } => {
                write!(f, "[{}] untracked files:\n{}", project, listing(paths))
            }
            Event::PostCheckFailed {
                project,
                check,
                error,
            } => write!(f, "[{}] can't list {}: {}", project, check, error),
        }
    }
}

/// Append-only record of everything a run observed and did.
#[derive(Debug, Default)]
pub struct Report {
    events: Vec<Event>,
}

impl Report {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event and emit it through `tracing` at its severity.
    pub fn record(&mut self, event: Event) {
        match event.severity() {
            Severity::Debug => tracing::debug!("{}", event),
            Severity::Info => tracing::info!("{}", event),
            Severity::Warning => tracing::warn!("{}", event),
            Severity::Error => tracing::error!("{}", event),
        }
        self.events.push(event);
    }

    /// All recorded events, in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// The completed corrective actions (clones, remote adds, URL writes).
    pub fn corrective_actions(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_corrective())
    }

    /// Events at warning severity or above.
    pub fn warnings(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| e.severity() >= Severity::Warning)
    }
}
