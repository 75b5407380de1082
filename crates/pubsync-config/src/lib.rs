mod error;
mod exclusion;
mod project;

pub use error::{ConfigError, ConfigResult};
pub use exclusion::{ExclusionFile, ExclusionList};
pub use project::{PostgresConfig, ReplicationConfig, SyncConfig};
