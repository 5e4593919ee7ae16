//! Error types for config loading and validation.

use crate::{ConfigFormat, LoadPhase};
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while resolving a config.
///
/// Every variant produced during a load carries the [`LoadPhase`] it failed in.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file is missing or unreadable.
    #[error("{phase}: failed to read config {}: {source}", .path.display())]
    FileRead {
        phase: LoadPhase,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid for its declared format.
    #[error("{phase}: malformed {format} config in {origin}: {message}")]
    Malformed {
        phase: LoadPhase,
        format: ConfigFormat,
        origin: String,
        message: String,
    },
    /// A key has no corresponding schema field.
    #[error("{phase}: unknown key `{key}` in {origin}")]
    SchemaMismatch {
        phase: LoadPhase,
        origin: String,
        key: String,
    },
    /// A known key holds a value the schema cannot decode.
    #[error("{phase}: invalid value in {origin}: {source}")]
    InvalidValue {
        phase: LoadPhase,
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    /// Re-encoding the resolved config failed.
    #[error("{phase}: failed to serialize config: {message}")]
    Serialization { phase: LoadPhase, message: String },
    /// The requested format is not supported.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    /// Phase the load failed in, if the error came from a load.
    pub fn phase(&self) -> Option<LoadPhase> {
        match self {
            Self::FileRead { phase, .. }
            | Self::Malformed { phase, .. }
            | Self::SchemaMismatch { phase, .. }
            | Self::InvalidValue { phase, .. }
            | Self::Serialization { phase, .. } => Some(*phase),
            Self::UnsupportedFormat(_) => None,
        }
    }

    /// True when an input key was rejected by the schema.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }

    pub(crate) fn serialization(phase: LoadPhase, message: impl Into<String>) -> Self {
        Self::Serialization {
            phase,
            message: message.into(),
        }
    }
}
