//! Tracing setup for EcoGuardian binaries.
//!
//! [`init_tracing`] installs one global subscriber writing to stderr, so
//! command output on stdout stays machine-readable. `RUST_LOG` overrides the
//! level passed in.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Install the global subscriber: human-readable lines, or JSON lines when `json` is set.
///
/// Only the first call in a process takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let output = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let output = if json {
        output.json().boxed()
    } else {
        output.boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(level_filter(level))
        .with(output)
        .try_init();
    if installed.is_err() {
        tracing::debug!(event = "telemetry.already_initialized");
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
