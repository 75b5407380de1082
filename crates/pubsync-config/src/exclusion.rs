use std::fs;
use std::path::{Path, PathBuf};

use pubsync_core::{ExcludeProvider, SyncResult, TableId, TableSet};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Exclusion list as parsed from TOML.
///
/// ```toml
/// exclude_tables = ["sessions", "audit.events"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ExclusionList {
    /// Tables that must never be published.
    #[serde(default)]
    pub exclude_tables: Vec<String>,
}

impl ExclusionList {
    /// Parse an exclusion list from a TOML string.
    pub fn parse(toml_str: &str) -> ConfigResult<Self> {
        let list: ExclusionList = toml::from_str(toml_str)?;
        Ok(list)
    }

    /// Validate every entry and convert to a table set.
    pub fn to_table_set(&self) -> ConfigResult<TableSet> {
        self.exclude_tables
            .iter()
            .map(|entry| validate_table_name(entry).map(TableId::parse))
            .collect()
    }
}

fn validate_table_name(value: &str) -> ConfigResult<&str> {
    let valid = !value.is_empty()
        && value.split('.').count() <= 2
        && value.split('.').all(|part| !part.trim().is_empty());

    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidTableName {
            value: value.to_string(),
        })
    }
}

/// An exclusion list stored in a TOML file.
///
/// The file is read again on every call so operator edits take effect on the
/// next reconciliation.
#[derive(Debug, Clone)]
pub struct ExclusionFile {
    path: PathBuf,
}

impl ExclusionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the file.
    pub fn load(&self) -> ConfigResult<TableSet> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;

        let tables = ExclusionList::parse(&content)?.to_table_set()?;
        debug!(path = %self.path.display(), tables = tables.len(), "Loaded exclusion list");
        Ok(tables)
    }
}

impl ExcludeProvider for ExclusionFile {
    fn configured_excludes(&self) -> SyncResult<TableSet> {
        Ok(self.load()?)
    }
}
