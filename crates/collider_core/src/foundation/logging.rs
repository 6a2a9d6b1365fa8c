//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize logging for tests, routing output through the test harness
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
