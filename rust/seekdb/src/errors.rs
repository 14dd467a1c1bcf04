use seekdb_error::{ErrorCodes, SeekdbError};
use thiserror::Error;

/// The supplied connection parameters do not select exactly one backend.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Both `path` and `host` are set; choose either an embedded store or a server")]
    AmbiguousTarget,
    #[error("Neither `path` nor `host` is set")]
    MissingTarget,
    #[error("Missing required parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("Parameter `{0}` is not supported in {1} mode")]
    UnsupportedParameter(&'static str, &'static str),
    #[error("Database name `{0}` must not contain path separators or be `.` or `..`")]
    InvalidDatabaseName(String),
    #[error("Could not load client configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl SeekdbError for ConfigurationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }

    fn should_trace_error(&self) -> bool {
        false
    }
}

/// Opening the connection on first use failed.
#[derive(Error, Debug)]
#[error("Could not connect to {target}: {source}")]
pub struct ConnectionError {
    /// Address or path of the backend, never including credentials.
    pub target: String,
    #[source]
    pub source: sqlx::Error,
}

impl SeekdbError for ConnectionError {
    fn code(&self) -> ErrorCodes {
        match self.source.code() {
            ErrorCodes::Unauthenticated | ErrorCodes::InvalidArgument => self.source.code(),
            _ => ErrorCodes::Unavailable,
        }
    }
}

/// Arguments to a collection operation were rejected before any I/O.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Collection name must not be empty")]
    EmptyName,
    #[error("Collection dimension must be a positive integer, got {0}")]
    InvalidDimension(u32),
}

impl SeekdbError for ValidationError {
    fn code(&self) -> ErrorCodes {
        ErrorCodes::InvalidArgument
    }

    fn should_trace_error(&self) -> bool {
        false
    }
}

/// The backend rejected a query or statement.
#[derive(Error, Debug)]
#[error("Error executing `{statement}`: {source}")]
pub struct BackendError {
    pub statement: String,
    #[source]
    pub source: sqlx::Error,
}

impl SeekdbError for BackendError {
    fn code(&self) -> ErrorCodes {
        self.source.code()
    }
}

/// Errors returned by [`SeekdbClient`](crate::SeekdbClient) operations.
#[derive(Error, Debug)]
pub enum SeekdbClientError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SeekdbError for SeekdbClientError {
    fn code(&self) -> ErrorCodes {
        match self {
            SeekdbClientError::Configuration(err) => err.code(),
            SeekdbClientError::Connection(err) => err.code(),
            SeekdbClientError::Validation(err) => err.code(),
            SeekdbClientError::Backend(err) => err.code(),
        }
    }

    fn should_trace_error(&self) -> bool {
        match self {
            SeekdbClientError::Configuration(err) => err.should_trace_error(),
            SeekdbClientError::Validation(err) => err.should_trace_error(),
            SeekdbClientError::Connection(_) | SeekdbClientError::Backend(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: SeekdbClientError = ValidationError::InvalidDimension(0).into();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);
        assert!(!err.should_trace_error());

        let err: SeekdbClientError = ConnectionError {
            target: "localhost:1".to_string(),
            source: sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            )),
        }
        .into();
        assert_eq!(err.code(), ErrorCodes::Unavailable);
        assert!(err.to_string().contains("localhost:1"));
        assert!(err.should_trace_error());
    }

    #[test]
    fn test_configuration_errors_are_not_traced() {
        let err: SeekdbClientError =
            ConfigurationError::InvalidDatabaseName("../x".to_string()).into();
        assert_eq!(err.code(), ErrorCodes::InvalidArgument);
        assert!(!err.should_trace_error());
        assert!(err.to_string().contains("../x"));
    }
}
