//! objmove CLI library
//!
//! Shared pieces of the `cleanup` and `transfer` binaries, exported for the
//! integration tests.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub mod commands;
pub mod exit_code;
pub mod output;

/// Install the tracing subscriber.
///
/// Logs go to stderr. `RUST_LOG` selects the filter unless `debug` is set.
pub fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")
}
