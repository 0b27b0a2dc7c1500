//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, LOG_ENV_VAR};

static INIT: Once = Once::new();

/// Initialize the callkit tracing/logging system.
///
/// Reads the `CALLKIT_LOG` environment variable for per-crate log levels.
/// Format: `CALLKIT_LOG=callkit_engine=debug,callkit_synth=info`
///
/// Falls back to `callkit=info` if `CALLKIT_LOG` is not set or is invalid.
/// Calling it more than once is a no-op, and an already installed global
/// subscriber is left in place.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .with(filter)
            .try_init();
    });
}
