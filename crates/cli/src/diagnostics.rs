//! crates/cli/src/diagnostics.rs
//! Tracing subscriber setup for the self-test binary.

use std::io;

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV: &str = "RUST_LOG";

/// Installs the process-wide subscriber.
///
/// A `fmt` layer writes to standard error, filtered by [`LOG_ENV`] and
/// silent when the variable is unset. With the `tracing` feature the
/// verbosity bridge is installed alongside it, unfiltered, so events are
/// also gated by the verbosity levels. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn install_diagnostics() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(filter);

    if try_install(fmt_layer).is_err() {
        tracing::debug!("diagnostics subscriber already installed");
    }
}

#[cfg(feature = "tracing")]
fn try_install<L>(layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    verbosity::try_init_tracing_with_filter(layer)
}

#[cfg(not(feature = "tracing"))]
fn try_install<L>(layer: L) -> Result<(), TryInitError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry().with(layer).try_init()
}
