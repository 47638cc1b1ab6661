//! engine::clone
//!
//! Multi-candidate fallback clone for projects missing locally.
//!
//! The candidate set is every expected remote that carries a fetch URL, in
//! lexicographic remote order. Candidates are tried one at a time; the
//! first success binds that remote's name as the clone's origin label and
//! wins. Each failure is reported and the next candidate tried; when all
//! fail, the project is abandoned for this pass.

use std::path::Path;

use crate::core::types::{both_modes, Mode, RemoteMap, RemoteName, Url};
use crate::engine::report::{Event, Report};
use crate::git::GitClient;

/// The clone candidates of an expected remote map: every remote with a
/// fetch URL, in lexicographic remote order.
///
/// # Example
///
/// ```
/// use gitfleet::core::types::{Mode, ModeMap, RemoteMap};
/// use gitfleet::engine::clone::candidates;
///
/// let mut remotes = RemoteMap::new();
/// remotes.insert("b".into(), ModeMap::from([(Mode::Fetch, "u2".into())]));
/// remotes.insert("a".into(), ModeMap::from([(Mode::Fetch, "u1".into())]));
/// remotes.insert("push-only".into(), ModeMap::from([(Mode::Push, "u3".into())]));
///
/// let order: Vec<_> = candidates(&remotes)
///     .map(|(name, url)| (name.as_str(), url.as_str()))
///     .collect();
/// assert_eq!(order, vec![("a", "u1"), ("b", "u2")]);
/// ```
pub fn candidates(expected: &RemoteMap) -> impl Iterator<Item = (&RemoteName, &Url)> {
    expected
        .iter()
        .filter_map(|(name, modes)| modes.get(&Mode::Fetch).map(|url| (name, url)))
}

/// Clone a missing project from the first workable candidate.
///
/// On success the returned map is the project's new observed state:
/// exactly one remote, both modes bound to the URL it was cloned from.
/// Returns `None` when every candidate failed (already reported); the
/// caller abandons the project for this pass.
pub fn clone_fallback<C: GitClient>(
    client: &C,
    report: &mut Report,
    project: &str,
    dest: &Path,
    expected: &RemoteMap,
) -> Option<RemoteMap> {
    for (remote, url) in candidates(expected) {
        match client.clone_project(url, remote, dest) {
            Ok(()) => {
                report.record(Event::Cloned {
                    project: project.to_string(),
                    remote: remote.clone(),
                    url: url.clone(),
                });
                let mut observed = RemoteMap::new();
                observed.insert(remote.clone(), both_modes(url));
                return Some(observed);
            }
            Err(err) => {
                report.record(Event::CloneCandidateFailed {
                    project: project.to_string(),
                    remote: remote.clone(),
                    url: url.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    report.record(Event::CloneFailed {
        project: project.to_string(),
    });
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ModeMap;
    use crate::git::fake::FakeGit;
    use std::path::PathBuf;

    fn expected_two_candidates() -> RemoteMap {
        let mut remotes = RemoteMap::new();
        remotes.insert("a".into(), ModeMap::from([(Mode::Fetch, "u1".into())]));
        remotes.insert("b".into(), ModeMap::from([(Mode::Fetch, "u2".into())]));
        remotes
    }

    #[test]
    fn first_candidate_wins() {
        let git = FakeGit::new();
        let mut report = Report::new();
        let observed = clone_fallback(
            &git,
            &mut report,
            "proj",
            &PathBuf::from("/fleet/proj"),
            &expected_two_candidates(),
        )
        .unwrap();

        assert_eq!(observed, RemoteMap::from([("a".into(), both_modes("u1"))]));
        assert_eq!(report.corrective_actions().count(), 1);
    }

    #[test]
    fn falls_back_in_lexicographic_order() {
        let git = FakeGit::new();
        git.fail_clone_of("u1");
        let mut report = Report::new();
        let observed = clone_fallback(
            &git,
            &mut report,
            "proj",
            &PathBuf::from("/fleet/proj"),
            &expected_two_candidates(),
        )
        .unwrap();

        assert_eq!(observed, RemoteMap::from([("b".into(), both_modes("u2"))]));
        assert!(report
            .events()
            .iter()
            .any(|e| matches!(e, Event::CloneCandidateFailed { remote, .. } if remote == "a")));
    }

    #[test]
    fn all_candidates_failing_abandons_the_project() {
        let git = FakeGit::new();
        git.fail_clone_of("u1");
        git.fail_clone_of("u2");
        let mut report = Report::new();
        let observed = clone_fallback(
            &git,
            &mut report,
            "proj",
            &PathBuf::from("/fleet/proj"),
            &expected_two_candidates(),
        );

        assert!(observed.is_none());
        assert!(report
            .events()
            .iter()
            .any(|e| matches!(e, Event::CloneFailed { .. })));
        assert_eq!(report.corrective_actions().count(), 0);
    }

    #[test]
    fn push_only_remotes_are_not_candidates() {
        let mut remotes = RemoteMap::new();
        remotes.insert("mirror".into(), ModeMap::from([(Mode::Push, "p".into())]));
        let git = FakeGit::new();
        let mut report = Report::new();

        let observed = clone_fallback(
            &git,
            &mut report,
            "proj",
            &PathBuf::from("/fleet/proj"),
            &remotes,
        );
        assert!(observed.is_none());
    }
}
