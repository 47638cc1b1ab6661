//! Gitfleet - Declarative reconciliation for a directory of git projects
//!
//! Gitfleet compares an expected remote topology (which projects exist,
//! which remotes each has, which fetch/push URLs those remotes use) against
//! what is actually on disk, reports every difference, and - only where a
//! capability flag permits - corrects it by cloning, adding remotes, or
//! rewriting URLs.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Observe → Reconcile → Refresh → Export lifecycle
//! - [`core`] - Topology types and the manifest document
//! - [`git`] - Single interface for all Git operations
//!
//! # Correctness Invariants
//!
//! Gitfleet maintains the following invariants:
//!
//! 1. Nothing is mutated without its capability grant; a report-only run
//!    never touches a repository
//! 2. A run visits projects strictly sequentially, in lexicographic order
//! 3. No per-project failure propagates past that project
//! 4. Rerunning with the same expected topology converges: a clean second
//!    run performs zero corrective actions

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
