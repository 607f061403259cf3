//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the archgraph tracing/logging system.
///
/// Reads the `ARCHGRAPH_LOG` environment variable for per-subsystem log levels.
/// Format: `ARCHGRAPH_LOG=archgraph_analysis::scanner=debug,archgraph_storage=warn`
///
/// Falls back to `archgraph=info` if `ARCHGRAPH_LOG` is not set or is invalid.
///
/// Idempotent: calling it multiple times is safe.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new("archgraph=info"));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_line_number(true))
            .with(filter)
            .try_init();
    });
}
