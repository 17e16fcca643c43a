//! Diagnostic logging setup.
//!
//! Progress output goes to stdout through [`crate::output`]; diagnostics
//! (skipped records, failed lookups, fallbacks) go through `tracing` to
//! stderr. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for a verbosity level.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "headless_press=debug,info"
    } else {
        "headless_press=info,warn"
    }
}

pub fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
