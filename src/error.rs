use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database errors
    #[error("SQL error: {0}")]
    Sqlx(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed request input (e.g. empty credential)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Profile update carried no fields
    #[error("No fields to update")]
    NoFieldsProvided,

    /// A credential is already bound to another user row
    #[error("Duplicate credential: {0}")]
    DuplicateCredential(String),

    /// One of the bootstrap resources could not be loaded
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Whether the user database could not be reached at all
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            AppError::Database(DatabaseError::PoolCreation(_))
                | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }

    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) | AppError::NoFieldsProvided => 400,
            AppError::NotFound(_) => 404,
            AppError::DuplicateCredential(_) => 409,
            AppError::Fetch(_) => 502,
            _ => 500,
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Unique constraint on a credential value was violated
    #[error("Duplicate credential: {0}")]
    DuplicateCredential(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for credential store operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Sqlx(e),
            RepositoryError::DuplicateCredential(msg) => AppError::DuplicateCredential(msg),
            RepositoryError::ConstraintViolation(msg) => AppError::InvalidInput(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Check for common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => {
                        RepositoryError::DuplicateCredential(db_err.message().to_string())
                    }
                    // Foreign key / check violation
                    Some("23503") | Some("23514") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// The bootstrap resources loaded for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Pots,
    Friends,
    Activities,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Pots => "pots",
            Resource::Friends => "friends",
            Resource::Activities => "activities",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single fetch endpoint
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or other transport-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// The endpoint answered with a non-success status
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// A failed bootstrap fetch, tagged with the resource it was loading.
///
/// Cheap to clone so it can be published through the session state; the
/// underlying cause is shared, not copied.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub resource: Resource,
    pub source: Arc<FetchError>,
}

impl FetchFailure {
    pub fn new(resource: Resource, source: FetchError) -> Self {
        Self {
            resource,
            source: Arc::new(source),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to load {}: {}", self.resource, self.source)
    }
}

impl std::error::Error for FetchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
