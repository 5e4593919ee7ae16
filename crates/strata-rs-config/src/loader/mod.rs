//! Two-phase config resolution with environment overrides.
//!
//! A document is decoded strictly into the target schema (file pass), the
//! decoded value is flattened into dotted keys (flatten pass) and rebuilt
//! into an intermediate document (remarshal), then every key is offered to
//! the environment before a second strict decode (override pass).
//!
//! Precedence (low -> high): target defaults, file, environment.

mod env;
mod flatten;
mod format;
mod merge;
mod schema;


pub use env::{EnvSource, ProcessEnv};
pub use flatten::FlatConfig;
pub use format::ConfigFormat;

use crate::ConfigError;
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Label used for documents that were not read from disk.
const MEMORY_ORIGIN: &str = "config";

/// Types that can be resolved from config documents.
///
/// Field names double as document keys and, once dotted and uppercased, as
/// environment variable names, so they should be lowercase and contain no
/// dots. Fields skipped during serialization are invisible to the schema and
/// rejected when a document sets them.
pub trait ConfigSchema: Serialize + DeserializeOwned {}

impl<T: Serialize + DeserializeOwned> ConfigSchema for T {}

/// Phase of a load, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadPhase {
    /// Reading the file from disk.
    FileRead,
    /// Parsing the file and decoding it into the schema.
    FileParse,
    /// Flattening the decoded config into dotted keys.
    Flatten,
    /// Rebuilding the intermediate document from dotted keys.
    Remarshal,
    /// Applying environment overrides and decoding the result.
    OverrideParse,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FileRead => "file-read",
            Self::FileParse => "file-parse",
            Self::Flatten => "flatten",
            Self::Remarshal => "remarshal",
            Self::OverrideParse => "override-parse",
        };
        f.write_str(name)
    }
}

/// A config key whose value came from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    /// Dotted config key.
    pub key: String,
    /// Environment variable that supplied the value.
    pub var: String,
}

/// Resolved config plus metadata about where it came from.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The validated config.
    pub config: T,
    /// File the config was read from, if any.
    pub source: Option<PathBuf>,
    /// Keys overridden by environment variables, in key order.
    pub overrides: Vec<EnvOverride>,
}

/// Resolves typed configs from a document plus environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver<E = ProcessEnv> {
    env: E,
    env_prefix: Option<String>,
    allow_empty_env: bool,
}

impl ConfigResolver<ProcessEnv> {
    /// Resolver reading overrides from the process environment.
    pub fn new() -> Self {
        Self::with_env(ProcessEnv)
    }
}

impl<E: EnvSource> ConfigResolver<E> {
    /// Resolver reading overrides from `env`.
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            env_prefix: None,
            allow_empty_env: false,
        }
    }

    /// Require environment variables to start with `PREFIX_`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Treat variables that are set but empty as overrides.
    ///
    /// Off by default: an empty variable counts as unset and the file value
    /// stays.
    pub fn allow_empty_env(mut self, allow: bool) -> Self {
        self.allow_empty_env = allow;
        self
    }

    /// Load a config file, starting from `T::default()`.
    pub fn load<T: ConfigSchema + Default>(
        &self,
        path: impl AsRef<Path>,
        format: ConfigFormat,
    ) -> Result<Resolved<T>, ConfigError> {
        let path = path.as_ref();
        let mut config = T::default();
        let overrides = self.load_file(&mut config, path, format)?;
        Ok(Resolved {
            config,
            source: Some(path.to_path_buf()),
            overrides,
        })
    }

    /// Load a config file into `target`.
    ///
    /// Keys the file omits keep the target's current values. `target` is only
    /// written when every phase succeeds.
    pub fn load_into<T: ConfigSchema>(
        &self,
        target: &mut T,
        path: impl AsRef<Path>,
        format: ConfigFormat,
    ) -> Result<(), ConfigError> {
        self.load_file(target, path.as_ref(), format).map(|_| ())
    }

    /// Resolve a config from in-memory contents, starting from `T::default()`.
    pub fn load_str<T: ConfigSchema + Default>(
        &self,
        contents: &str,
        format: ConfigFormat,
    ) -> Result<Resolved<T>, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let (config, overrides) = self.resolve(&T::default(), contents, format, MEMORY_ORIGIN)?;
        Ok(Resolved {
            config,
            source: None,
            overrides,
        })
    }

    /// Dotted keys of `T` paired with the environment variables that override them.
    pub fn env_keys<T: ConfigSchema + Default>(
        &self,
    ) -> Result<Vec<(String, String)>, ConfigError> {
        let flat = FlatConfig::from_config(&T::default())?;
        Ok(flat
            .keys()
            .map(|key| (key.to_string(), self.env_var_name(key)))
            .collect())
    }

    fn load_file<T: ConfigSchema>(
        &self,
        target: &mut T,
        path: &Path,
        format: ConfigFormat,
    ) -> Result<Vec<EnvOverride>, ConfigError> {
        info!("loading config from path: {} (format={format})", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            phase: LoadPhase::FileRead,
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();
        let (config, overrides) = self.resolve(target, &contents, format, &origin)?;
        *target = config;
        Ok(overrides)
    }

    fn resolve<T: ConfigSchema>(
        &self,
        base: &T,
        contents: &str,
        format: ConfigFormat,
        origin: &str,
    ) -> Result<(T, Vec<EnvOverride>), ConfigError> {
        let phase = LoadPhase::FileParse;
        let document = format.parse(contents, origin, phase)?;
        let template = schema::template_of(base, phase)?;
        let file_config: T = decode_strict(&template, &document, origin, phase)?;
        debug!("config file parsed (origin={origin})");

        let flat = FlatConfig::from_config(&file_config)?;
        debug!("config flattened (keys={})", flat.len());

        let mut document = flat.to_document()?;
        debug!("config remarshaled (origin={origin})");

        let phase = LoadPhase::OverrideParse;
        let mut overrides = Vec::new();
        for (key, current) in flat.iter() {
            let var = self.env_var_name(key);
            let Some(raw) = self.env.var(&var) else {
                continue;
            };
            if raw.is_empty() && !self.allow_empty_env {
                continue;
            }
            flatten::set_path(&mut document, key, env::coerce(&raw, current))
                .map_err(|message| ConfigError::serialization(phase, message))?;
            debug!("config key overridden from environment (key={key}, var={var})");
            overrides.push(EnvOverride {
                key: key.to_string(),
                var,
            });
        }

        let template = schema::template_of(&file_config, phase)?;
        let config = decode_strict(&template, &document, origin, phase)?;
        info!(
            "config resolved (origin={origin}, keys={}, overrides={})",
            flat.len(),
            overrides.len()
        );
        Ok((config, overrides))
    }

    fn env_var_name(&self, key: &str) -> String {
        env::env_var_name(self.env_prefix.as_deref(), key)
    }
}

/// Load a config file with overrides from the process environment.
pub fn load<T: ConfigSchema + Default>(
    path: impl AsRef<Path>,
    format: ConfigFormat,
) -> Result<T, ConfigError> {
    ConfigResolver::new()
        .load(path, format)
        .map(|resolved| resolved.config)
}

/// Validate `document` against `template`, overlay it, and decode the result.
fn decode_strict<T: ConfigSchema>(
    template: &Value,
    document: &Value,
    origin: &str,
    phase: LoadPhase,
) -> Result<T, ConfigError> {
    schema::ensure_known_keys(document, template, origin, phase)?;
    let mut merged = template.clone();
    merge::overlay(&mut merged, document);
    serde_json::from_value(merged).map_err(|source| ConfigError::InvalidValue {
        phase,
        origin: origin.to_string(),
        source,
    })
}
