//! Tracing subscriber setup for the server binary.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber filtered by `directive`.
///
/// Falls back to `info` when the directive does not parse.
pub fn init(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")
}
