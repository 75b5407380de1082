//! Table catalog lookups.

use std::future::Future;

use pubsync_core::{CatalogLister, SyncResult, TableId, TableSet};
use tokio::sync::Mutex;
use tokio_postgres::Client;
use tracing::debug;

use crate::connect::connect_postgres;
use crate::error::query_error;

/// List the base tables in the given schemas.
pub async fn list_tables(client: &Client, schemas: &[String]) -> SyncResult<TableSet> {
    let rows = client
        .query(
            r#"
            SELECT table_schema, table_name
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE' AND table_schema = ANY($1)
            "#,
            &[&schemas],
        )
        .await
        .map_err(query_error)?;

    let tables: TableSet = rows
        .iter()
        .map(|r| {
            let schema: String = r.get(0);
            let table: String = r.get(1);
            TableId::new(schema, table)
        })
        .collect();

    debug!(schemas = ?schemas, tables = tables.len(), "Listed catalog tables");
    Ok(tables)
}

/// Catalog lister with its own session, reopened when it has closed.
pub struct PgCatalog {
    connection_string: String,
    schemas: Vec<String>,
    client: Mutex<Option<Client>>,
}

impl PgCatalog {
    pub fn new(connection_string: impl Into<String>, schemas: Vec<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            schemas,
            client: Mutex::new(None),
        }
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }
}

impl CatalogLister for PgCatalog {
    fn list_all_catalog_tables(&self) -> impl Future<Output = SyncResult<TableSet>> + Send {
        async move {
            let mut slot = self.client.lock().await;
            let client = match slot.take() {
                Some(client) if !client.is_closed() => client,
                _ => connect_postgres(&self.connection_string).await?,
            };

            let result = list_tables(&client, &self.schemas).await;
            *slot = Some(client);
            result
        }
    }
}
