#![allow(dead_code)]
//! Shared integration test utilities.

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Initializes a test-writer tracing subscriber once per process.
///
/// Verbosity is controlled through `RUST_LOG`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
