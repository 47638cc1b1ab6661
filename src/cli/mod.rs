//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse arguments and initialize logging
//! - Load (or default) the expected topology, observe the projects root
//! - Run the reconciler and write the export manifest if requested
//!
//! The layer is thin: everything it does is wiring. Per-project outcomes
//! never surface here as errors; they live in the run's report and its log
//! stream. Only boundary failures (bad pattern, unreadable root, manifest
//! I/O) propagate, and those abort with a non-zero exit.

pub mod args;

pub use args::Args;

use std::fs::File;
use std::sync::Mutex;

use anyhow::{Context, Result};
use regex::Regex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::manifest;
use crate::engine::{self, Reconciler, RunConfig};
use crate::git::Git;

/// Run the application. This is the entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let args = Args::parse_args();
    init_logging(&args)?;

    // An invalid pattern is a usage error; fail before touching anything.
    let filter = Regex::new(&args.pattern)
        .with_context(|| format!("invalid project pattern '{}'", args.pattern))?;

    let client = Git::new();
    let observed = engine::observe_projects(&client, &args.projects)?;

    let expected = match &args.manifest {
        Some(path) => manifest::load(path)?,
        None => engine::baseline_from_observed(&observed),
    };

    let config = RunConfig {
        projects_root: args.projects.clone(),
        capabilities: args.capabilities(),
        filter,
    };
    let outcome = Reconciler::new(&client, &config).run(&expected, observed);

    if let Some(path) = &args.manifest_create {
        let snapshot = outcome.export_snapshot(&expected);
        manifest::save(path, &snapshot, args.manifest_create_overwrite)?;
        tracing::info!("wrote manifest to '{}'", path.display());
    }

    Ok(())
}

/// Initialize the `tracing` subscriber.
///
/// `RUST_LOG` overrides `--log-level`. `--quiet` drops the stderr layer;
/// a `--log-file` layer writes without ANSI colour.
fn init_logging(args: &Args) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let stderr_layer = (!args.quiet).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
    });

    let file_layer = args
        .log_file
        .as_deref()
        .map(|path| -> Result<_> {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Ok(fmt::layer()
                .with_writer(Mutex::new(file))
                .with_target(false)
                .with_ansi(false))
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
