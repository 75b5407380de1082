//! Classification of Postgres errors into synchronizer errors.

use std::error::Error as _;

use pubsync_core::SyncError;
use tokio_postgres::error::SqlState;

/// Convert a failed query into a [`SyncError`].
///
/// Dropped sockets, I/O failures and connection-class SQLSTATEs become
/// `ConnectionLost`; everything else is a `RemoteOperationFailed`.
pub(crate) fn query_error(e: tokio_postgres::Error) -> SyncError {
    if is_connection_lost(&e) {
        return SyncError::ConnectionLost(e.to_string());
    }

    if let Some(db_err) = e.as_db_error() {
        SyncError::RemoteOperationFailed(format!(
            "{}: {} (code: {})",
            db_err.severity(),
            db_err.message(),
            db_err.code().code()
        ))
    } else {
        SyncError::RemoteOperationFailed(e.to_string())
    }
}

/// Like [`query_error`], but maps duplicate and undefined objects to
/// `AlreadyExists` and `NotFound` for the named publication.
pub(crate) fn publication_error(e: tokio_postgres::Error, publication: &str) -> SyncError {
    match e.code() {
        Some(code) if *code == SqlState::DUPLICATE_OBJECT => {
            SyncError::AlreadyExists(publication.to_string())
        }
        Some(code) if *code == SqlState::UNDEFINED_OBJECT => {
            SyncError::NotFound(publication.to_string())
        }
        _ => query_error(e),
    }
}

fn is_connection_lost(e: &tokio_postgres::Error) -> bool {
    if e.is_closed() {
        return true;
    }
    if let Some(code) = e.code() {
        return is_connection_sqlstate(code);
    }
    e.source()
        .map_or(false, |source| source.is::<std::io::Error>())
}

/// SQLSTATEs that mean the session is gone: class 08 plus server shutdowns.
fn is_connection_sqlstate(code: &SqlState) -> bool {
    code.code().starts_with("08")
        || *code == SqlState::ADMIN_SHUTDOWN
        || *code == SqlState::CRASH_SHUTDOWN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_sqlstates() {
        assert!(is_connection_sqlstate(&SqlState::CONNECTION_FAILURE));
        assert!(is_connection_sqlstate(&SqlState::CONNECTION_EXCEPTION));
        assert!(is_connection_sqlstate(&SqlState::ADMIN_SHUTDOWN));
        assert!(is_connection_sqlstate(&SqlState::from_code("08006")));
    }

    #[test]
    fn test_other_sqlstates() {
        assert!(!is_connection_sqlstate(&SqlState::DUPLICATE_OBJECT));
        assert!(!is_connection_sqlstate(&SqlState::UNDEFINED_OBJECT));
        assert!(!is_connection_sqlstate(&SqlState::INSUFFICIENT_PRIVILEGE));
        assert!(!is_connection_sqlstate(&SqlState::SYNTAX_ERROR));
    }
}
