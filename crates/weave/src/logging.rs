//! Logging bootstrap.
//!
//! Weave emits `tracing` events: registration, wiring and save steps at
//! `debug`, connection failures at `warn`. Nothing is printed unless a
//! subscriber is installed, either by the application or through [`init`].
//!
//! The `WEAVE_LOG` environment variable holds an `EnvFilter` directive, for
//! example `WEAVE_LOG=weave=debug,weave_core=debug`. It defaults to `warn`.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Default filter when `WEAVE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

/// Returns the filter directive configured through `WEAVE_LOG`.
pub fn filter_directive() -> String {
    env::var("WEAVE_LOG")
        .ok()
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs a formatting subscriber filtered by `WEAVE_LOG`.
///
/// Subsequent calls are no-ops, as is calling it after the application set
/// up its own global subscriber.
pub fn init() {
    INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directive = filter_directive();
        let filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!(filter = %directive, "weave logging initialized");
        }
    });
}
