use std::future::Future;

use pubsync_core::{ReplicationClient, ReplicationConnector, SyncResult, TableSet};
use tokio_postgres::Client;

use crate::connect::connect_postgres;
use crate::monitor;
use crate::publication;

/// Opens a new Postgres session for every replication client it builds.
#[derive(Debug, Clone)]
pub struct PgConnector {
    connection_string: String,
}

impl PgConnector {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }
}

impl ReplicationConnector for PgConnector {
    type Client = PgReplicationClient;

    fn connect(&self) -> impl Future<Output = SyncResult<Self::Client>> + Send {
        let connection_string = self.connection_string.clone();
        async move {
            let client = connect_postgres(&connection_string).await?;
            Ok(PgReplicationClient::new(client))
        }
    }
}

/// Replication control client over a single Postgres session, using native
/// publications.
pub struct PgReplicationClient {
    client: Client,
}

impl PgReplicationClient {
    /// Wrap an existing client (for testing or connection pooling).
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

impl ReplicationClient for PgReplicationClient {
    fn publishes(&self, name: &str) -> impl Future<Output = SyncResult<bool>> + Send {
        publication::publication_exists(&self.client, name)
    }

    fn create_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send {
        publication::create_publication(&self.client, name)
    }

    fn drop_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send {
        publication::drop_publication(&self.client, name)
    }

    fn list_published_tables(
        &self,
        name: &str,
    ) -> impl Future<Output = SyncResult<TableSet>> + Send {
        publication::get_publication_tables(&self.client, name)
    }

    fn set_published_tables(
        &self,
        name: &str,
        tables: &TableSet,
    ) -> impl Future<Output = SyncResult<()>> + Send {
        publication::set_publication_tables(&self.client, name, tables)
    }

    fn lag_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send {
        monitor::lag_bytes(&self.client)
    }

    fn wal_retained_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send {
        monitor::wal_retained_bytes(&self.client)
    }

    fn is_subscriber(&self) -> impl Future<Output = SyncResult<bool>> + Send {
        monitor::has_subscriptions(&self.client)
    }
}
