//! engine::matrix
//!
//! The generic expected-vs-observed decision primitive.
//!
//! # Design
//!
//! The same four-way comparison recurs at project, remote, and mode scope:
//!
//! | expected | observed | equal | decision |
//! |----------|----------|-------|-------------------------------|
//! | absent   | absent   | -     | vacant (defensive)            |
//! | absent   | present  | -     | unexpected, report only       |
//! | present  | absent   | -     | create, if permitted          |
//! | present  | present  | no    | correct, if permitted         |
//! | present  | present  | yes   | no-op                         |
//!
//! Rather than three duplicated loop bodies, [`reconcile`] is one function
//! parameterized by the value type and by create/correct callbacks. The
//! callbacks perform whatever action their scope needs (clone, add-remote,
//! set-url, or recursing a scope deeper) and return a [`Step`]: the new
//! observed snapshot on success, the denied capability when the grant is
//! missing, or a failure marker. At most one callback runs per call.
//!
//! The caller's report is threaded through as a context value handed to
//! whichever callback runs, so the decision itself stays a pure function
//! of (expected, observed) and the callbacks' results.
//!
//! # Example
//!
//! ```
//! use gitfleet::engine::matrix::{reconcile, Decision, Step};
//! use gitfleet::engine::capabilities::Capability;
//!
//! let mut log: Vec<&str> = Vec::new();
//!
//! // Expected URL present, nothing observed, capability granted:
//! let decision = reconcile(
//!     &mut log,
//!     Some(&"url".to_string()),
//!     None,
//!     |log| {
//!         log.push("created");
//!         Step::Done("url".to_string())
//!     },
//!     |_log, _old| unreachable!("correct is not consulted on create"),
//! );
//! assert_eq!(decision, Decision::Applied("url".to_string()));
//! assert_eq!(log, vec!["created"]);
//!
//! // Same, but the capability is missing:
//! let decision: Decision<String> = reconcile(
//!     &mut log,
//!     Some(&"url".to_string()),
//!     None,
//!     |_log| Step::Denied(Capability::SetUrls),
//!     |_log, _old| unreachable!(),
//! );
//! assert_eq!(decision, Decision::Skipped(Capability::SetUrls));
//! ```

use crate::engine::capabilities::Capability;

/// The outcome of one create or correct callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<V> {
    /// The action would be needed but its capability is not granted.
    Denied(Capability),
    /// The action succeeded; the value is the new observed snapshot.
    Done(V),
    /// The action was attempted and failed (already reported at its scope).
    Failed,
}

/// The decision for one key at one scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<V> {
    /// Neither expected nor observed. Cannot occur when keys come from the
    /// union of both maps; handled so the primitive is total.
    Vacant,
    /// Observed but not expected: report, never act.
    Unexpected,
    /// Expected equals observed: nothing to do.
    Unchanged,
    /// An action was needed but its capability is missing.
    Skipped(Capability),
    /// Create or correct succeeded; carries the new observed snapshot.
    Applied(V),
    /// Create or correct was attempted and failed.
    Failed,
}

impl<V> Decision<V> {
    /// The new observed snapshot, if the decision produced one.
    pub fn into_applied(self) -> Option<V> {
        match self {
            Decision::Applied(v) => Some(v),
            _ => None,
        }
    }

    /// Whether this decision leaves the branch converged (equal or made
    /// equal), as opposed to skipped, failed, or unexpected.
    pub fn is_converged(&self) -> bool {
        matches!(self, Decision::Unchanged | Decision::Applied(_))
    }
}

/// Decide what to do about one key given its expected and observed values.
///
/// `create` runs when the key is expected but not observed; `correct` runs
/// when both are present but differ, receiving the current observed value.
/// The context `ctx` is handed to whichever callback runs.
pub fn reconcile<Ctx, V, C, R>(
    ctx: &mut Ctx,
    expected: Option<&V>,
    observed: Option<&V>,
    create: C,
    correct: R,
) -> Decision<V>
where
    V: PartialEq,
    C: FnOnce(&mut Ctx) -> Step<V>,
    R: FnOnce(&mut Ctx, &V) -> Step<V>,
{
    match (expected, observed) {
        (None, None) => Decision::Vacant,
        (None, Some(_)) => Decision::Unexpected,
        (Some(_), None) => match create(ctx) {
            Step::Denied(cap) => Decision::Skipped(cap),
            Step::Done(v) => Decision::Applied(v),
            Step::Failed => Decision::Failed,
        },
        (Some(exp), Some(obs)) if exp == obs => Decision::Unchanged,
        (Some(_), Some(obs)) => match correct(ctx, obs) {
            Step::Denied(cap) => Decision::Skipped(cap),
            Step::Done(v) => Decision::Applied(v),
            Step::Failed => Decision::Failed,
        },
    }
}
