//! In-memory collaborators for testing.

use std::collections::HashMap;
use std::future::{ready, Future};
use std::sync::{Arc, Mutex};

use crate::client::{CatalogLister, ExcludeProvider, ReplicationClient, ReplicationConnector};
use crate::error::{SyncError, SyncResult};
use crate::table::TableSet;
use crate::topology::{ReplicationRole, SubscriptionRecord, TopologyRegistrar};

/// An in-memory replication control plane.
///
/// Clones share state, so a test can keep a copy while the synchronizer owns
/// the connector.
#[derive(Clone, Default)]
pub struct MockReplicationServer {
    state: Arc<Mutex<ServerState>>,
}

#[derive(Default)]
struct ServerState {
    /// Publications by name with their member tables.
    publications: HashMap<String, TableSet>,
    subscriber: bool,
    lag_bytes: i64,
    wal_retained_bytes: i64,
    /// Operation calls by name, including failed ones.
    calls: HashMap<&'static str, usize>,
    connects: usize,
    /// Operations left to fail with a lost connection.
    dropped_calls: usize,
    /// Connects left to refuse.
    refused_connects: usize,
    /// If set, the next operation fails with this error.
    fail_next: Option<String>,
}

impl MockReplicationServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` operations with `ConnectionLost`.
    pub fn drop_connections(&self, n: usize) {
        self.state.lock().unwrap().dropped_calls = n;
    }

    /// Refuse the next `n` connection attempts with `ConnectionLost`.
    pub fn refuse_connections(&self, n: usize) {
        self.state.lock().unwrap().refused_connects = n;
    }

    /// Fail the next operation with `RemoteOperationFailed`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.state.lock().unwrap().fail_next = Some(message.into());
    }

    /// Pre-create a publication.
    pub fn create_publication_with(&self, name: impl Into<String>, tables: TableSet) {
        let mut state = self.state.lock().unwrap();
        state.publications.insert(name.into(), tables);
    }

    /// Current members of a publication, if it exists.
    pub fn publication(&self, name: &str) -> Option<TableSet> {
        self.state.lock().unwrap().publications.get(name).cloned()
    }

    pub fn set_subscriber(&self, subscriber: bool) {
        self.state.lock().unwrap().subscriber = subscriber;
    }

    pub fn set_lag_bytes(&self, bytes: i64) {
        self.state.lock().unwrap().lag_bytes = bytes;
    }

    pub fn set_wal_retained_bytes(&self, bytes: i64) {
        self.state.lock().unwrap().wal_retained_bytes = bytes;
    }

    /// Number of times an operation was called.
    pub fn calls(&self, operation: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.calls.get(operation).copied().unwrap_or_default()
    }

    /// Number of successful connects.
    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    fn connect(&self) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.refused_connects > 0 {
            state.refused_connects -= 1;
            return Err(SyncError::ConnectionLost("connection refused".into()));
        }
        state.connects += 1;
        Ok(())
    }

    fn call<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut ServerState) -> SyncResult<T>,
    ) -> SyncResult<T> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_default() += 1;

        if state.dropped_calls > 0 {
            state.dropped_calls -= 1;
            return Err(SyncError::ConnectionLost(
                "server closed the connection unexpectedly".into(),
            ));
        }
        if let Some(message) = state.fail_next.take() {
            return Err(SyncError::RemoteOperationFailed(message));
        }

        f(&mut state)
    }
}

/// Connector producing clients bound to a [`MockReplicationServer`].
#[derive(Clone)]
pub struct MockConnector {
    server: MockReplicationServer,
}

impl MockConnector {
    pub fn new(server: MockReplicationServer) -> Self {
        Self { server }
    }
}

impl ReplicationConnector for MockConnector {
    type Client = MockReplicationClient;

    fn connect(&self) -> impl Future<Output = SyncResult<Self::Client>> + Send {
        let server = self.server.clone();
        ready(server.connect().map(|()| MockReplicationClient { server }))
    }
}

/// A replication client backed by a [`MockReplicationServer`].
pub struct MockReplicationClient {
    server: MockReplicationServer,
}

impl ReplicationClient for MockReplicationClient {
    fn publishes(&self, name: &str) -> impl Future<Output = SyncResult<bool>> + Send {
        ready(
            self.server
                .call("publishes", |s| Ok(s.publications.contains_key(name))),
        )
    }

    fn create_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send {
        ready(self.server.call("create_publication", |s| {
            if s.publications.contains_key(name) {
                return Err(SyncError::AlreadyExists(name.to_string()));
            }
            s.publications.insert(name.to_string(), TableSet::new());
            Ok(())
        }))
    }

    fn drop_publication(&self, name: &str) -> impl Future<Output = SyncResult<()>> + Send {
        ready(self.server.call("drop_publication", |s| {
            s.publications
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| SyncError::NotFound(name.to_string()))
        }))
    }

    fn list_published_tables(
        &self,
        name: &str,
    ) -> impl Future<Output = SyncResult<TableSet>> + Send {
        // Missing publications list as empty, like pg_publication_tables.
        ready(self.server.call("list_published_tables", |s| {
            Ok(s.publications.get(name).cloned().unwrap_or_default())
        }))
    }

    fn set_published_tables(
        &self,
        name: &str,
        tables: &TableSet,
    ) -> impl Future<Output = SyncResult<()>> + Send {
        ready(self.server.call("set_published_tables", |s| {
            match s.publications.get_mut(name) {
                Some(members) => {
                    *members = tables.clone();
                    Ok(())
                }
                None => Err(SyncError::NotFound(name.to_string())),
            }
        }))
    }

    fn lag_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send {
        ready(self.server.call("lag_bytes", |s| Ok(s.lag_bytes)))
    }

    fn wal_retained_bytes(&self) -> impl Future<Output = SyncResult<i64>> + Send {
        ready(
            self.server
                .call("wal_retained_bytes", |s| Ok(s.wal_retained_bytes)),
        )
    }

    fn is_subscriber(&self) -> impl Future<Output = SyncResult<bool>> + Send {
        ready(self.server.call("is_subscriber", |s| Ok(s.subscriber)))
    }
}

/// A catalog with a fixed, replaceable table list.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    state: Arc<Mutex<CatalogState>>,
}

#[derive(Default)]
struct CatalogState {
    tables: TableSet,
    calls: usize,
}

impl StaticCatalog {
    pub fn new(tables: TableSet) -> Self {
        let catalog = Self::default();
        catalog.set_tables(tables);
        catalog
    }

    pub fn set_tables(&self, tables: TableSet) {
        self.state.lock().unwrap().tables = tables;
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

impl CatalogLister for StaticCatalog {
    fn list_all_catalog_tables(&self) -> impl Future<Output = SyncResult<TableSet>> + Send {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        ready(Ok(state.tables.clone()))
    }
}

/// An exclusion list held in memory.
#[derive(Clone, Default)]
pub struct StaticExcludes {
    state: Arc<Mutex<ExcludesState>>,
}

#[derive(Default)]
struct ExcludesState {
    tables: TableSet,
    fail_with: Option<String>,
}

impl StaticExcludes {
    pub fn new(tables: TableSet) -> Self {
        let excludes = Self::default();
        excludes.set_tables(tables);
        excludes
    }

    /// An exclusion list that can never be loaded.
    pub fn failing(message: impl Into<String>) -> Self {
        let excludes = Self::default();
        excludes.state.lock().unwrap().fail_with = Some(message.into());
        excludes
    }

    pub fn set_tables(&self, tables: TableSet) {
        self.state.lock().unwrap().tables = tables;
    }
}

impl ExcludeProvider for StaticExcludes {
    fn configured_excludes(&self) -> SyncResult<TableSet> {
        let state = self.state.lock().unwrap();
        match &state.fail_with {
            Some(message) => Err(SyncError::Config(message.clone())),
            None => Ok(state.tables.clone()),
        }
    }
}

/// A step recorded by [`RecordingRegistrar`].
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrarEvent {
    SetRole(ReplicationRole),
    Delete(Vec<String>),
    Save(Vec<String>),
}

/// Topology registrar that records every call.
#[derive(Clone, Default)]
pub struct RecordingRegistrar {
    state: Arc<Mutex<RegistrarState>>,
}

#[derive(Default)]
struct RegistrarState {
    events: Vec<RegistrarEvent>,
    fail_deletes: Option<String>,
}

impl RecordingRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every delete with `RemoteOperationFailed`.
    pub fn failing_deletes(message: impl Into<String>) -> Self {
        let registrar = Self::new();
        registrar.state.lock().unwrap().fail_deletes = Some(message.into());
        registrar
    }

    pub fn events(&self) -> Vec<RegistrarEvent> {
        self.state.lock().unwrap().events.clone()
    }
}

fn names(subscriptions: &[SubscriptionRecord]) -> Vec<String> {
    subscriptions.iter().map(|s| s.name.clone()).collect()
}

impl TopologyRegistrar for RecordingRegistrar {
    fn set_replication_role(
        &self,
        role: ReplicationRole,
    ) -> impl Future<Output = SyncResult<()>> + Send {
        let mut state = self.state.lock().unwrap();
        state.events.push(RegistrarEvent::SetRole(role));
        ready(Ok(()))
    }

    fn delete_subscriptions(
        &self,
        subscriptions: &[SubscriptionRecord],
    ) -> impl Future<Output = SyncResult<()>> + Send {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.fail_deletes.clone() {
            return ready(Err(SyncError::RemoteOperationFailed(message)));
        }
        state.events.push(RegistrarEvent::Delete(names(subscriptions)));
        ready(Ok(()))
    }

    fn save_subscriptions(
        &self,
        subscriptions: &[SubscriptionRecord],
    ) -> impl Future<Output = SyncResult<()>> + Send {
        let mut state = self.state.lock().unwrap();
        state.events.push(RegistrarEvent::Save(names(subscriptions)));
        ready(Ok(()))
    }
}
