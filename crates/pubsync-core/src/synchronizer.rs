//! Publication lifecycle and membership reconciliation.
//!
//! Every remote call goes through [`ReplicationHandle::guarded`], so a lost
//! control connection is rebuilt and the call retried once.

use tracing::{debug, info};

use crate::client::{CatalogLister, ExcludeProvider, ReplicationClient, ReplicationConnector};
use crate::error::SyncResult;
use crate::excludes::{desired_tables, effective_excludes};
use crate::handle::ReplicationHandle;
use crate::table::TableSet;

/// Name of the publication this crate manages.
pub const PUBLICATION_NAME: &str = "pubsync";

/// Keeps the `pubsync` publication aligned with the catalog and the
/// exclusion list.
///
/// Operations take `&mut self`; share an instance across tasks behind a
/// mutex.
pub struct PublicationSynchronizer<C: ReplicationConnector, L, E> {
    handle: ReplicationHandle<C>,
    catalog: L,
    excludes: E,
}

impl<C, L, E> PublicationSynchronizer<C, L, E>
where
    C: ReplicationConnector,
    L: CatalogLister,
    E: ExcludeProvider,
{
    pub fn new(connector: C, catalog: L, excludes: E) -> Self {
        Self {
            handle: ReplicationHandle::new(connector),
            catalog,
            excludes,
        }
    }

    /// Number of replication clients built so far, including rebuilds.
    pub fn connects(&self) -> u64 {
        self.handle.connects()
    }

    /// Whether a replication client is currently held.
    pub fn is_connected(&self) -> bool {
        self.handle.is_connected()
    }

    /// Check if this node publishes the `pubsync` publication.
    pub async fn is_provider(&mut self) -> SyncResult<bool> {
        self.handle
            .guarded(|client| async move { client.publishes(PUBLICATION_NAME).await })
            .await
    }

    /// Create and populate the publication unless it already exists.
    pub async fn configure_provider(&mut self) -> SyncResult<()> {
        if self.is_provider().await? {
            debug!(publication = PUBLICATION_NAME, "Publication already exists");
            return Ok(());
        }
        self.create_replication_set().await
    }

    /// Drop the publication if it exists.
    pub async fn destroy_provider(&mut self) -> SyncResult<()> {
        if !self.is_provider().await? {
            debug!(publication = PUBLICATION_NAME, "No publication to drop");
            return Ok(());
        }

        info!(publication = PUBLICATION_NAME, "Dropping publication");
        self.handle
            .guarded(|client| async move { client.drop_publication(PUBLICATION_NAME).await })
            .await
    }

    /// List the tables currently being replicated.
    ///
    /// Returns an empty set when the publication doesn't exist.
    pub async fn included_tables(&mut self) -> SyncResult<TableSet> {
        self.handle
            .guarded(|client| async move { client.list_published_tables(PUBLICATION_NAME).await })
            .await
    }

    /// Create the publication and populate it from the exclusion list.
    ///
    /// Fails with `AlreadyExists` if the publication is already there; use
    /// [`configure_provider`](Self::configure_provider) for the idempotent form.
    pub async fn create_replication_set(&mut self) -> SyncResult<()> {
        info!(publication = PUBLICATION_NAME, "Creating publication");
        self.handle
            .guarded(|client| async move { client.create_publication(PUBLICATION_NAME).await })
            .await?;
        self.refresh_excludes().await
    }

    /// Replace the publication's tables with every catalog table that isn't
    /// excluded.
    ///
    /// The desired set is recomputed from scratch on every call. Catalog and
    /// exclusion reads happen inside the guarded call, so they are repeated
    /// along with the update if the connection is rebuilt.
    pub async fn refresh_excludes(&mut self) -> SyncResult<()> {
        let catalog = &self.catalog;
        let excludes = &self.excludes;

        self.handle
            .guarded(|client| async move {
                let full_tables = catalog.list_all_catalog_tables().await?;
                let excluded = effective_excludes(excludes.configured_excludes()?);
                let desired = desired_tables(&full_tables, &excluded);

                info!(
                    publication = PUBLICATION_NAME,
                    catalog = full_tables.len(),
                    excluded = excluded.len(),
                    published = desired.len(),
                    "Refreshing published tables"
                );

                client
                    .set_published_tables(PUBLICATION_NAME, &desired)
                    .await
            })
            .await
    }

    /// The exclusion list in effect: configured tables plus the built-ins.
    pub fn excludes(&self) -> SyncResult<TableSet> {
        Ok(effective_excludes(self.excludes.configured_excludes()?))
    }

    /// Bytes of WAL not yet flushed by the slowest subscriber.
    pub async fn replication_lag(&mut self) -> SyncResult<i64> {
        self.handle
            .guarded(|client| async move { client.lag_bytes().await })
            .await
    }

    /// Bytes of WAL retained on this node for subscribers.
    pub async fn replication_wal_retained(&mut self) -> SyncResult<i64> {
        self.handle
            .guarded(|client| async move { client.wal_retained_bytes().await })
            .await
    }

    pub async fn is_subscriber(&mut self) -> SyncResult<bool> {
        self.handle
            .guarded(|client| async move { client.is_subscriber().await })
            .await
    }
}
