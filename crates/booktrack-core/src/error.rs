//! Error types for booktrack.

use thiserror::Error;

/// Result type alias using booktrack's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by the store, the repositories and the search manager.
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Book not found: {0}")]
    BookNotFound(uuid::Uuid),

    #[error("Collection not found: {0}")]
    CollectionNotFound(uuid::Uuid),

    /// Stored JSON (list columns, smart criteria) could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Request rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_not_found_messages_carry_the_id() {
        let id = Uuid::nil();
        assert_eq!(
            Error::BookNotFound(id).to_string(),
            format!("Book not found: {id}")
        );
        assert_eq!(
            Error::CollectionNotFound(id).to_string(),
            format!("Collection not found: {id}")
        );
    }

    #[test]
    fn test_invalid_input_message() {
        let err = Error::InvalidInput("limit must be between 1 and 200".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid input: limit must be between 1 and 200"
        );
    }

    #[test]
    fn test_bad_criteria_json_is_serialization_error() {
        let err: Error = serde_json::from_str::<Vec<String>>("{\"filters\":")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization(ref msg) if !msg.is_empty()));
    }

    #[test]
    fn test_sqlx_errors_convert() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(_)));
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
