//! Tests for the archgraph tracing setup.

use std::sync::Mutex;

use archgraph_core::tracing::init_tracing;

/// Serializes tests that touch ARCHGRAPH_LOG.
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn init_with_per_subsystem_filter() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("ARCHGRAPH_LOG", "archgraph_analysis=debug,archgraph_storage=warn");
    init_tracing();
    tracing::debug!("filter accepted");
    std::env::remove_var("ARCHGRAPH_LOG");
}

#[test]
fn init_is_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}
