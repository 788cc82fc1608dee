//! Error types for the review manager

use std::time::Duration;

use thiserror::Error;
use tonic::Status;

/// Error type for review operations
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Malformed identifier, empty required field, unsupported operator,
    /// undefined enum value or missing rejection message.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No row matched an operation that expects exactly one
    #[error("Not found: {0}")]
    NotFound(String),

    /// More than one row matched an operation that expects exactly one
    #[error("Expected a single review, found {count}")]
    MultipleRows { count: usize },

    /// Database connection or statement error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// The configured request timeout expired before the operation finished.
    ///
    /// A caller's `grpc-timeout` that is stricter than the configured one is
    /// enforced by tonic instead and reaches the caller as `Cancelled`.
    ///
    /// For single statement writes (create, delete) the statement may already
    /// have committed when the deadline fires; callers cannot tell the two
    /// cases apart. Transactional writes (bulk create, update) roll back.
    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),
}

impl ReviewError {
    /// Creates an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Returns true for failures detected before any storage interaction.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns true for failures that surface as `Internal`.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::MultipleRows { .. } | Self::Database(_))
    }
}

impl From<ReviewError> for Status {
    fn from(err: ReviewError) -> Self {
        let message = err.to_string();
        match err {
            ReviewError::InvalidArgument(_) => Status::invalid_argument(message),
            ReviewError::NotFound(_) => Status::not_found(message),
            ReviewError::MultipleRows { .. } | ReviewError::Database(_) => {
                Status::internal(message)
            }
            ReviewError::DeadlineExceeded(_) => Status::deadline_exceeded(message),
        }
    }
}

/// Result type alias for review operations
pub type Result<T> = std::result::Result<T, ReviewError>;
