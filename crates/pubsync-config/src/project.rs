use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::exclusion::ExclusionFile;

/// Project configuration from pubsync.toml.
#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub replication: ReplicationConfig,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub connection_string: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplicationConfig {
    /// Path to the TOML exclusion list.
    #[serde(default = "default_exclude_file")]
    pub exclude_file: PathBuf,
    /// Schemas whose tables are candidates for publication.
    #[serde(default = "default_schemas")]
    pub schemas: Vec<String>,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            exclude_file: default_exclude_file(),
            schemas: default_schemas(),
        }
    }
}

fn default_exclude_file() -> PathBuf {
    PathBuf::from("config/replication_exclude_tables.toml")
}

fn default_schemas() -> Vec<String> {
    vec!["public".to_string()]
}

impl SyncConfig {
    /// Parse and validate a config from a TOML string.
    pub fn parse(toml_str: &str) -> ConfigResult<Self> {
        let config: SyncConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.postgres.connection_string.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "postgres.connection_string".to_string(),
            });
        }
        if self.replication.schemas.is_empty() {
            return Err(ConfigError::NoSchemas);
        }
        Ok(())
    }

    /// Resolve environment variables in a string.
    ///
    /// Supports `${VAR_NAME}` syntax; unset variables resolve to "".
    /// Substituted values are copied as-is, so a `${` inside a value is
    /// never expanded again. An unterminated `${` is kept literally.
    pub fn resolve_env(&self, s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut rest = s;

        while let Some(start) = rest.find("${") {
            let Some(len) = rest[start + 2..].find('}') else {
                break;
            };
            let var_name = &rest[start + 2..start + 2 + len];
            result.push_str(&rest[..start]);
            result.push_str(&std::env::var(var_name).unwrap_or_default());
            rest = &rest[start + 2 + len + 1..];
        }

        result.push_str(rest);
        result
    }

    /// Get the resolved Postgres connection string.
    pub fn postgres_connection_string(&self) -> ConfigResult<String> {
        let resolved = self.resolve_env(&self.postgres.connection_string);
        if resolved.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "postgres.connection_string".to_string(),
            });
        }
        Ok(resolved)
    }

    pub fn exclusion_file(&self) -> ExclusionFile {
        ExclusionFile::new(&self.replication.exclude_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config = SyncConfig::parse(
            r#"
[postgres]
connection_string = "postgres://localhost/app"
"#,
        )
        .unwrap();

        assert_eq!(config.replication.schemas, vec!["public"]);
        assert_eq!(
            config.exclusion_file().path(),
            Path::new("config/replication_exclude_tables.toml")
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config = SyncConfig::parse(
            r#"
[postgres]
connection_string = "${DATABASE_URL}"

[replication]
exclude_file = "/etc/pubsync/excludes.toml"
schemas = ["public", "billing"]
"#,
        )
        .unwrap();

        assert_eq!(config.replication.schemas, vec!["public", "billing"]);
        assert_eq!(
            config.replication.exclude_file,
            PathBuf::from("/etc/pubsync/excludes.toml")
        );
    }

    #[test]
    fn test_rejects_empty_schema_list() {
        let err = SyncConfig::parse(
            r#"
[postgres]
connection_string = "postgres://localhost/app"

[replication]
schemas = []
"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::NoSchemas));
    }

    #[test]
    fn test_rejects_missing_postgres_section() {
        assert!(matches!(
            SyncConfig::parse("[replication]\nschemas = [\"public\"]"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_resolve_env() {
        std::env::set_var("PUBSYNC_TEST_VAR", "hello");

        let config = SyncConfig::parse(
            r#"
[postgres]
connection_string = "postgres://${PUBSYNC_TEST_VAR}@db/app"
"#,
        )
        .unwrap();

        assert_eq!(config.resolve_env("${PUBSYNC_TEST_VAR}"), "hello");
        assert_eq!(
            config.resolve_env("prefix_${PUBSYNC_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(config.resolve_env("no_vars"), "no_vars");
        assert_eq!(
            config.postgres_connection_string().unwrap(),
            "postgres://hello@db/app"
        );

        std::env::remove_var("PUBSYNC_TEST_VAR");
    }

    #[test]
    #[serial]
    fn test_resolved_values_are_not_expanded_again() {
        std::env::set_var("PUBSYNC_TEST_HOME", "/root");
        std::env::set_var("PUBSYNC_TEST_PW_URL", "postgres://u:pa${PUBSYNC_TEST_HOME}x@db/app");
        std::env::set_var("PUBSYNC_TEST_SELF", "${PUBSYNC_TEST_SELF}");

        let config = SyncConfig::parse(
            r#"
[postgres]
connection_string = "${PUBSYNC_TEST_PW_URL}"
"#,
        )
        .unwrap();

        assert_eq!(
            config.postgres_connection_string().unwrap(),
            "postgres://u:pa${PUBSYNC_TEST_HOME}x@db/app"
        );
        assert_eq!(
            config.resolve_env("a${PUBSYNC_TEST_SELF}b"),
            "a${PUBSYNC_TEST_SELF}b"
        );
        assert_eq!(
            config.resolve_env("${PUBSYNC_TEST_HOME}/${PUBSYNC_TEST_HOME}"),
            "/root//root"
        );
        assert_eq!(config.resolve_env("tail ${UNTERMINATED"), "tail ${UNTERMINATED");

        std::env::remove_var("PUBSYNC_TEST_HOME");
        std::env::remove_var("PUBSYNC_TEST_PW_URL");
        std::env::remove_var("PUBSYNC_TEST_SELF");
    }

    #[test]
    #[serial]
    fn test_unset_connection_string_is_missing() {
        std::env::remove_var("PUBSYNC_UNSET_URL");

        let config = SyncConfig::parse(
            r#"
[postgres]
connection_string = "${PUBSYNC_UNSET_URL}"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.postgres_connection_string(),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pubsync.toml");
        fs::write(
            &path,
            "[postgres]\nconnection_string = \"postgres://localhost/app\"\n",
        )
        .unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.postgres.connection_string, "postgres://localhost/app");

        assert!(matches!(
            SyncConfig::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
