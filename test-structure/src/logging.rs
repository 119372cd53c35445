//! Diagnostics for the store and the stage runner.
//!
//! # Separation of Concerns
//!
//! - **Tracing subscriber ([`init`])**: dev diagnostics via `RUST_LOG`, output
//!   to stderr.
//! - **Log sinks ([`LogSink`])**: the operator-facing lines ("skipping stage",
//!   "storing test data in ..."). Components receive a sink through their
//!   constructor; tests swap in a capturing sink instead of touching global
//!   state.
//!
//! Sinks only ever receive keys, paths and stage names. Persisted values are
//! never formatted into a log line because some of them are credentials.

use std::fmt;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn,test_structure=info";

/// Destination for operator-facing log lines.
pub trait LogSink: Send + Sync {
    fn logf(&self, args: fmt::Arguments<'_>);
}

/// Forwards log lines to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn logf(&self, args: fmt::Arguments<'_>) {
        info!(target: "test_structure", "{}", args);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn logf(&self, _args: fmt::Arguments<'_>) {}
}

/// The sink used when a component is built without an explicit one.
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingSink)
}

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. If unset, stage and store lines from
/// [`TracingSink`] are shown and everything else is limited to `warn`.
/// Output: stderr, compact format. Safe to call from every test.
///
/// # Example
/// ```bash
/// RUST_LOG=test_structure=debug cargo test --test staged_pipeline
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
