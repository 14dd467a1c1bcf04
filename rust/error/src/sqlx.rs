use crate::{ErrorCodes, SeekdbError};
use sqlx::error::ErrorKind;

// SQLSTATE values reported by MySQL-compatible servers.
const SQLSTATE_TABLE_EXISTS: &str = "42S01";
const SQLSTATE_TABLE_NOT_FOUND: &str = "42S02";
const SQLSTATE_ACCESS_DENIED: &str = "28000";
const SQLSTATE_SYNTAX_OR_ACCESS: &str = "42000";

fn database_error_code(err: &dyn sqlx::error::DatabaseError) -> ErrorCodes {
    match err.kind() {
        ErrorKind::UniqueViolation => return ErrorCodes::AlreadyExists,
        ErrorKind::ForeignKeyViolation | ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            return ErrorCodes::InvalidArgument
        }
        _ => {}
    }
    match err.code().as_deref() {
        Some(SQLSTATE_TABLE_EXISTS) => return ErrorCodes::AlreadyExists,
        Some(SQLSTATE_TABLE_NOT_FOUND) => return ErrorCodes::NotFound,
        Some(SQLSTATE_ACCESS_DENIED) => return ErrorCodes::Unauthenticated,
        Some(SQLSTATE_SYNTAX_OR_ACCESS) => return ErrorCodes::InvalidArgument,
        _ => {}
    }
    // SQLite only reports generic result codes for these.
    let message = err.message();
    if message.contains("already exists") {
        ErrorCodes::AlreadyExists
    } else if message.contains("no such table") {
        ErrorCodes::NotFound
    } else {
        ErrorCodes::Internal
    }
}

impl SeekdbError for sqlx::Error {
    fn code(&self) -> ErrorCodes {
        match self {
            sqlx::Error::Configuration(_) => ErrorCodes::InvalidArgument,
            sqlx::Error::Database(err) => database_error_code(err.as_ref()),
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => ErrorCodes::Unavailable,
            sqlx::Error::PoolTimedOut => ErrorCodes::DeadlineExceeded,
            sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => ErrorCodes::Unavailable,
            sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::TypeNotFound { .. } => ErrorCodes::NotFound,
            sqlx::Error::ColumnIndexOutOfBounds { .. } => ErrorCodes::OutOfRange,
            _ => ErrorCodes::Internal,
        }
    }
}
