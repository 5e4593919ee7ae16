//! Configuration schema for the strata service.

use serde::{Deserialize, Serialize};

/// Root config for the service.
///
/// Keys map one-to-one to file keys and, via [`crate::ConfigResolver::env_keys`],
/// to environment variables (`name` -> `NAME`, `runtime.environment` ->
/// `RUNTIME_ENVIRONMENT`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Runtime settings.
    pub runtime: RuntimeConfig,
    /// Service name reported to clients.
    pub name: String,
}

impl ServiceConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::new()
    }
}

/// Builder for assembling a `ServiceConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    /// Set the service name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Replace the runtime configuration.
    pub fn runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.config.runtime = runtime;
        self
    }

    /// Set the runtime environment label.
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.config.runtime.environment = environment.into();
        self
    }

    /// Finalize and return the built `ServiceConfig`.
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

/// Runtime settings for the service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Deployment environment label (e.g. `prod`, `staging`).
    pub environment: String,
}
