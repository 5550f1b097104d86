//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize logging, tolerating an already-installed logger
///
/// `RUST_LOG` wins when set; otherwise records at `info` and above are shown.
/// Hosts embedded in a larger application may find a logger already in place;
/// in that case the existing one is kept and `false` is returned.
pub fn try_init() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}

/// Route log output through the test harness capture
#[cfg(test)]
pub(crate) fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
