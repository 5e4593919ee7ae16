//! Public surface for strata.
//!
//! Re-exports the config resolver and provides a small initialization helper
//! to keep binary setup consistent.

/// Re-export for convenience.
pub use strata_rs_config as config;

/// Default config file read by the `strata` binary.
pub const DEFAULT_CONFIG_PATH: &str = "env/config.yaml";

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
