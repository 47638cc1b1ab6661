//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Capability Flags
//!
//! By default a run only reports: it compares the expected topology with
//! what is on disk and logs the drift. Each corrective action must be
//! permitted explicitly:
//! - `--clone`: clone missing projects
//! - `--fetch`: update all remotes
//! - `--set-urls`: add remotes and overwrite mismatched URLs
//! - `--sync`: all three

use clap::Parser;
use std::path::PathBuf;

use crate::engine::CapabilitySet;

/// Reconcile a directory of git projects against a declared remote topology
#[derive(Parser, Debug)]
#[command(name = "gitfleet")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Clone projects that are expected but missing
    #[arg(long)]
    pub clone: bool,

    /// Update all remotes (tags and pruning included)
    #[arg(long)]
    pub fetch: bool,

    /// Add missing remotes and overwrite URLs that do not match
    #[arg(long)]
    pub set_urls: bool,

    /// Shorthand for --clone --fetch --set-urls
    #[arg(long)]
    pub sync: bool,

    /// Directory holding the project directories
    #[arg(long, env = "PROJECTS", value_name = "DIR")]
    pub projects: PathBuf,

    /// Manifest file declaring the expected topology; without it the
    /// observed state is its own baseline and only local drift is reported
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Write the topology this run converged on to a manifest file
    #[arg(long, value_name = "FILE")]
    pub manifest_create: Option<PathBuf>,

    /// Let --manifest-create replace an existing file
    #[arg(long)]
    pub manifest_create_overwrite: bool,

    /// No terminal output (a --log-file still receives everything)
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write the log to this file, without ANSI colour
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Only consider projects whose name matches this regex
    #[arg(value_name = "PATTERN", default_value = ".*")]
    pub pattern: String,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// The capability grants this invocation carries.
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_flags(self.clone, self.fetch, self.set_urls, self.sync)
    }
}
