//! Core error types for the newsletter scheduler.
//!
//! This module defines storage- and transport-agnostic error types. Adapter
//! crates (SQLite storage, remote event API) convert their own errors into
//! these types at the trait boundary.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the scheduling core.
#[derive(Error, Debug)]
pub enum Error {
    /// No authenticated identity was available for the request.
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Event scheduling failed: {0}")]
    Scheduling(#[from] SchedulingError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Returns true when the error is a "record not found" from the store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Database(DatabaseError::NotFound(_)))
    }
}

/// Validation errors for user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Categories array is required and must not be empty")]
    EmptyCategories,

    #[error("Category identifiers must not be blank")]
    BlankCategory,

    #[error("Valid frequency is required (daily, weekly, biweekly), got '{0}'")]
    UnsupportedFrequency(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

/// Storage-agnostic error type for preference store operations.
///
/// Uses `String` details so the storage layer can convert Diesel, r2d2 or
/// SQLite errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Errors raised while talking to the event-delivery substrate.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// The substrate could not be reached at all.
    #[error("Event substrate unreachable: {0}")]
    Unreachable(String),

    /// The substrate answered with a non-success status.
    #[error("Event substrate rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The substrate answered but the body could not be understood.
    #[error("Invalid response from event substrate: {0}")]
    InvalidResponse(String),

    #[error("Internal scheduler error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = Error::Database(DatabaseError::NotFound("user-1".to_string()));
        assert!(err.is_not_found());

        let err = Error::Database(DatabaseError::QueryFailed("boom".to_string()));
        assert!(!err.is_not_found());
        assert!(!Error::AuthenticationRequired.is_not_found());
    }

    #[test]
    fn test_validation_messages_match_api_wording() {
        let err = Error::from(ValidationError::EmptyCategories);
        assert_eq!(
            err.to_string(),
            "Input validation failed: Categories array is required and must not be empty"
        );

        let err = ValidationError::UnsupportedFrequency("monthly".to_string());
        assert!(err.to_string().contains("monthly"));
    }
}
