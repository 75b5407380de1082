use std::path::PathBuf;

use pubsync_core::SyncError;
use thiserror::Error;

/// Errors that can occur when loading configuration or the exclusion list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid table name '{value}': expected 'table' or 'schema.table'")]
    InvalidTableName { value: String },

    #[error("at least one schema must be listed under [replication]")]
    NoSchemas,
}

impl From<ConfigError> for SyncError {
    fn from(e: ConfigError) -> Self {
        SyncError::Config(e.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
