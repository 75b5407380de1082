use std::future::Future;

use crate::error::SyncResult;
use crate::table::TableSet;

/// Control-plane operations against one live replication connection.
///
/// Every operation fails with [`SyncError::ConnectionLost`] once the
/// underlying connection has dropped. Implementations are never repaired in
/// place; the synchronizer builds a new one through a [`ReplicationConnector`].
///
/// [`SyncError::ConnectionLost`]: crate::SyncError::ConnectionLost
pub trait ReplicationClient: Send + Sync {
    /// Check if a publication with this name exists.
    fn publishes(&self, name: &str) -> impl Future<Output = SyncResult<bool>> + Send;

    /// Create an empty publication. Fails with `AlreadyExists` if present.
    fn create_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send;

    /// Drop a publication. Fails with `NotFound` if absent.
    fn drop_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send;

    /// List the tables currently in a publication.
    fn list_published_tables(
        &self,
        name: &str,
    ) -> impl Future<Output = SyncResult<TableSet>> + Send;

    /// Replace the publication's membership with exactly `tables`.
    ///
    /// Either the whole set is applied or the call fails and the prior
    /// membership is left untouched.
    fn set_published_tables(
        &self,
        name: &str,
        tables: &TableSet,
    ) -> impl Future<Output = SyncResult<()>> + Send;

    /// Bytes of WAL the slowest subscriber has yet to flush.
    fn lag_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send;

    /// Bytes of WAL retained on this node for subscribers.
    fn wal_retained_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send;

    /// Check if this node consumes a publication from elsewhere.
    fn is_subscriber(&self) -> impl Future<Output = SyncResult<bool>> + Send;
}

/// Builds fresh replication clients.
pub trait ReplicationConnector: Send + Sync {
    type Client: ReplicationClient;

    fn connect(&self) -> impl Future<Output = SyncResult<Self::Client>> + Send;
}

/// Enumerates every table the database knows about.
pub trait CatalogLister: Send + Sync {
    fn list_all_catalog_tables(&self) -> impl Future<Output = SyncResult<TableSet>> + Send;
}

/// Supplies the operator-maintained exclusion list.
///
/// Read on every reconciliation; implementations must not cache.
pub trait ExcludeProvider: Send + Sync {
    fn configured_excludes(&self) -> SyncResult<TableSet>;
}
