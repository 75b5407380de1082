//! Postgres connections with TLS support.

use std::future::Future;
use std::sync::Arc;

use pubsync_core::{SyncError, SyncResult};
use rustls::ClientConfig;
use tokio_postgres::{Client, NoTls};
use tokio_postgres_rustls_improved::MakeRustlsConnect;
use tracing::{debug, error};

use crate::error::query_error;

/// Connect to Postgres with TLS settings taken from the connection string's
/// sslmode. Spawns the connection task and returns only the client.
///
/// Failures to reach the server are reported as `ConnectionLost`.
pub async fn connect_postgres(connection_string: &str) -> SyncResult<Client> {
    let client = match tls_config(connection_string)? {
        Some(config) => {
            let (client, connection) =
                tokio_postgres::connect(connection_string, MakeRustlsConnect::new(config))
                    .await
                    .map_err(query_error)?;
            spawn_connection(connection);
            client
        }
        None => {
            let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
                .await
                .map_err(query_error)?;
            spawn_connection(connection);
            client
        }
    };

    debug!(tls = requires_tls(connection_string), "Connected to Postgres");
    Ok(client)
}

/// Drive the connection in the background. Once it ends, the client reports
/// itself closed and the next call surfaces `ConnectionLost`.
fn spawn_connection<F>(connection: F)
where
    F: Future<Output = Result<(), tokio_postgres::Error>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "Postgres connection error");
        }
    });
}

/// rustls config for connection strings that ask for TLS, `None` otherwise.
fn tls_config(connection_string: &str) -> SyncResult<Option<ClientConfig>> {
    if !requires_tls(connection_string) {
        return Ok(None);
    }

    let config =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| SyncError::RemoteOperationFailed(format!("TLS config error: {}", e)))?
            .with_root_certificates(root_certs())
            .with_no_client_auth();
    Ok(Some(config))
}

fn root_certs() -> rustls::RootCertStore {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    roots
}

/// Check if the connection string requires TLS.
fn requires_tls(connection_string: &str) -> bool {
    connection_string.contains("sslmode=require")
        || connection_string.contains("sslmode=verify-ca")
        || connection_string.contains("sslmode=verify-full")
}
