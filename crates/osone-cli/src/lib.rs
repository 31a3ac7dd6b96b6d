//! # osone-cli
//!
//! Shared plumbing for the `osone-download` and `osone-convert` binaries:
//! configuration, logging, progress output and the two pipelines.

use std::path::PathBuf;

use clap::Args;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod commands;
pub mod config;
pub mod report;

/// Flags accepted by both binaries.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Path to a custom configuration file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log format: "pretty" (default) or "json".
    #[arg(long, default_value = "pretty", value_name = "FORMAT", value_parser = ["pretty", "json"])]
    pub log_format: String,
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr and default to `warn` so they do not interleave with the
/// progress report on stdout; raise with `RUST_LOG=info`.
pub fn init_tracing(log_format: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if log_format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
