//! Lazily built replication client with one-shot reconnect.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::client::ReplicationConnector;
use crate::error::SyncResult;

/// Owns the replication client for one synchronizer.
///
/// The client is built on first use and replaced wholesale after a lost
/// connection; it is never repaired in place or shared with another handle.
pub struct ReplicationHandle<C: ReplicationConnector> {
    connector: C,
    client: Option<Arc<C::Client>>,
    connects: u64,
}

impl<C: ReplicationConnector> ReplicationHandle<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            client: None,
            connects: 0,
        }
    }

    /// Whether a client is currently held.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Number of clients successfully built so far.
    pub fn connects(&self) -> u64 {
        self.connects
    }

    async fn client(&mut self) -> SyncResult<Arc<C::Client>> {
        if let Some(client) = &self.client {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(self.connector.connect().await?);
        self.connects += 1;
        self.client = Some(Arc::clone(&client));
        Ok(client)
    }

    fn invalidate(&mut self) {
        self.client = None;
    }

    /// Run `op` against the client, reconnecting and retrying once if the
    /// connection was lost.
    ///
    /// A second `ConnectionLost` within the same call is returned to the
    /// caller, and the dead client is dropped so the next call reconnects.
    /// Every other error is returned immediately. A failed connect counts as
    /// a failed attempt.
    pub async fn guarded<T, F, Fut>(&mut self, op: F) -> SyncResult<T>
    where
        F: Fn(Arc<C::Client>) -> Fut,
        Fut: Future<Output = SyncResult<T>>,
    {
        let mut retry_attempted = false;

        loop {
            let result = match self.client().await {
                Ok(client) => op(client).await,
                Err(e) => Err(e),
            };

            match result {
                Err(e) if e.is_connection_lost() => {
                    self.invalidate();
                    if retry_attempted {
                        return Err(e);
                    }
                    debug!(error = %e, "Replication connection lost, rebuilding client");
                    retry_attempted = true;
                }
                other => return other,
            }
        }
    }
}
