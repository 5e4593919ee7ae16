//! Configuration models and two-phase config resolution.
//!
//! A config file is decoded strictly into a typed schema, flattened back into
//! dotted keys, and every key is then re-exposed to environment overrides
//! before a second strict decode produces the final value.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Resolver, formats and environment sources.
pub use loader::{
    ConfigFormat, ConfigResolver, ConfigSchema, EnvOverride, EnvSource, FlatConfig, LoadPhase,
    ProcessEnv, Resolved, load,
};
/// Configuration schema models.
pub use model::*;
