//! Replication lag and role queries.

use pubsync_core::SyncResult;
use tokio_postgres::Client;
use tracing::debug;

use crate::error::query_error;

/// Bytes between the current WAL position and the slowest subscriber's flush
/// position. Zero when nothing is streaming.
pub async fn lag_bytes(client: &Client) -> SyncResult<i64> {
    let lag: i64 = client
        .query_one(
            r#"
            SELECT COALESCE(MAX(pg_wal_lsn_diff(pg_current_wal_lsn(), flush_lsn)), 0)::bigint
            FROM pg_stat_replication
            "#,
            &[],
        )
        .await
        .map_err(query_error)?
        .get(0);

    debug!(lag_bytes = lag, "Queried replication lag");
    Ok(lag)
}

/// Bytes of WAL held back by pgoutput slots.
pub async fn wal_retained_bytes(client: &Client) -> SyncResult<i64> {
    let retained: i64 = client
        .query_one(
            r#"
            SELECT COALESCE(SUM(pg_wal_lsn_diff(pg_current_wal_lsn(), restart_lsn)), 0)::bigint
            FROM pg_replication_slots
            WHERE plugin = 'pgoutput'
            "#,
            &[],
        )
        .await
        .map_err(query_error)?
        .get(0);

    debug!(wal_retained_bytes = retained, "Queried retained WAL");
    Ok(retained)
}

/// Check if this database has any subscriptions.
pub async fn has_subscriptions(client: &Client) -> SyncResult<bool> {
    let subscribed: bool = client
        .query_one(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pg_subscription s
                JOIN pg_database d ON d.oid = s.subdbid
                WHERE d.datname = current_database()
            )
            "#,
            &[],
        )
        .await
        .map_err(query_error)?
        .get(0);

    Ok(subscribed)
}
