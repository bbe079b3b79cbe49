//! Walk collection utilities.

use mib_expose::{MibRegistry, OidSequence, Result, VarBind};

/// Collect a walk below `base`, up to a limit.
pub fn collect_walk(registry: &MibRegistry, base: OidSequence, limit: usize) -> Vec<Result<VarBind>> {
    registry.walk_from(base).take(limit).collect()
}

/// Route crate logs to the test harness output. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
