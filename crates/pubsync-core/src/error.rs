use thiserror::Error;

/// Errors from publication synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("replication connection lost: {0}")]
    ConnectionLost(String),

    #[error("publication '{0}' already exists")]
    AlreadyExists(String),

    #[error("publication '{0}' does not exist")]
    NotFound(String),

    #[error("remote operation failed: {0}")]
    RemoteOperationFailed(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Check if this error means the control connection dropped.
    ///
    /// This is the only error the synchronizer recovers from.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, SyncError::ConnectionLost(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_lost_is_recoverable() {
        assert!(SyncError::ConnectionLost("reset by peer".into()).is_connection_lost());
        assert!(!SyncError::AlreadyExists("pubsync".into()).is_connection_lost());
        assert!(!SyncError::NotFound("pubsync".into()).is_connection_lost());
        assert!(!SyncError::RemoteOperationFailed("permission denied".into()).is_connection_lost());
        assert!(!SyncError::Config("missing file".into()).is_connection_lost());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SyncError::AlreadyExists("pubsync".into()).to_string(),
            "publication 'pubsync' already exists"
        );
        assert_eq!(
            SyncError::NotFound("pubsync".into()).to_string(),
            "publication 'pubsync' does not exist"
        );
    }
}
