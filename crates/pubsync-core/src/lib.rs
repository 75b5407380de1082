mod client;
mod error;
mod excludes;
mod handle;
pub mod mock;
mod synchronizer;
mod table;
pub mod topology;

pub use client::{CatalogLister, ExcludeProvider, ReplicationClient, ReplicationConnector};
pub use error::{SyncError, SyncResult};
pub use excludes::{
    builtin_excludes, desired_tables, effective_excludes, is_builtin_excluded,
    BUILTIN_EXCLUDED_TABLES,
};
pub use handle::ReplicationHandle;
pub use synchronizer::{PublicationSynchronizer, PUBLICATION_NAME};
pub use table::{table_set, TableId, TableSet, DEFAULT_SCHEMA};
pub use topology::{save_global_region, ReplicationRole, SubscriptionRecord, TopologyRegistrar};
