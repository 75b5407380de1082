//! Postgres adapters for publication synchronization.

pub mod catalog;
pub mod client;
mod connect;
mod error;
pub mod monitor;
pub mod publication;

use pubsync_config::{ExclusionFile, SyncConfig};
use pubsync_core::{PublicationSynchronizer, SyncResult};

pub use catalog::PgCatalog;
pub use client::{PgConnector, PgReplicationClient};
pub use connect::connect_postgres;
pub use publication::{quote_ident, quote_table};

/// Synchronizer wired to Postgres and a TOML exclusion file.
pub type PgSynchronizer = PublicationSynchronizer<PgConnector, PgCatalog, ExclusionFile>;

/// Build a synchronizer from project configuration.
///
/// No connection is opened until the first operation.
pub fn build_synchronizer(config: &SyncConfig) -> SyncResult<PgSynchronizer> {
    let connection_string = config.postgres_connection_string()?;

    Ok(PublicationSynchronizer::new(
        PgConnector::new(connection_string.clone()),
        PgCatalog::new(connection_string, config.replication.schemas.clone()),
        config.exclusion_file(),
    ))
}
