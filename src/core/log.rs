//! Logging setup for the CLI

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

pub const LOG_TARGET: &str = "xrate";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "off" }
}

/// In verbose mode debug output is scoped to this crate; dependencies only
/// report warnings.
fn app_targets(verbose: bool) -> Option<Targets> {
    verbose.then(|| {
        Targets::new()
            .with_target(LOG_TARGET, LevelFilter::DEBUG)
            .with_default(LevelFilter::WARN)
    })
}

/// Installs the global subscriber writing to stderr, keeping stdout for the
/// converter output. Silent unless `verbose` is set or `RUST_LOG` is given.
pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_targets(verbose))
        .with(env_filter)
        .try_init()
        .context("Failed to initialize logging")
}
