//! git
//!
//! Single interface for all Git operations.
//!
//! # Responsibilities
//!
//! - Define the [`GitClient`](interface::GitClient) capability contract
//! - Implement it on git2 ([`interface::Git`])
//! - Normalize git2 errors into typed [`interface::GitError`] values
//!
//! No module outside this one imports `git2` (tests excepted, for fixture
//! setup).

pub mod interface;

#[cfg(test)]
pub(crate) mod fake;

pub use interface::{Git, GitClient, GitError};
