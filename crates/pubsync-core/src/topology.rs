//! Region role and subscription bookkeeping.
//!
//! Persistence lives behind [`TopologyRegistrar`]; this module only fixes the
//! order in which a node is promoted to the global role.

use std::future::Future;

use tracing::info;

use crate::error::SyncResult;

/// Replication role of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicationRole {
    /// Not replicating.
    #[default]
    None,
    /// Publishes its tables to a global region.
    Remote,
    /// Subscribes to remote regions.
    Global,
}

impl ReplicationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationRole::None => "none",
            ReplicationRole::Remote => "remote",
            ReplicationRole::Global => "global",
        }
    }
}

/// A subscription from this node to a remote region's publication.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRecord {
    /// Subscription name, unique per node.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    /// Region number of the publishing node.
    pub provider_region: i64,
}

/// Persists region role and subscription records.
pub trait TopologyRegistrar: Send + Sync {
    fn set_replication_role(
        &self,
        role: ReplicationRole,
    ) -> impl Future<Output = SyncResult<()>> + Send;

    fn delete_subscriptions(
        &self,
        subscriptions: &[SubscriptionRecord],
    ) -> impl Future<Output = SyncResult<()>> + Send;

    fn save_subscriptions(
        &self,
        subscriptions: &[SubscriptionRecord],
    ) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Mark this node as the global region, then delete `to_remove` and save
/// `to_save`. Stops at the first failure.
pub async fn save_global_region<R: TopologyRegistrar>(
    registrar: &R,
    to_save: &[SubscriptionRecord],
    to_remove: &[SubscriptionRecord],
) -> SyncResult<()> {
    info!(
        saving = to_save.len(),
        removing = to_remove.len(),
        "Configuring global region"
    );

    registrar.set_replication_role(ReplicationRole::Global).await?;
    registrar.delete_subscriptions(to_remove).await?;
    registrar.save_subscriptions(to_save).await
}
