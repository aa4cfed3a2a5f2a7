//! Unified error type for the Foodgram core.
//!
//! Every core operation returns [`Result`]. Storage errors are converted through
//! `From<DbErr>`, which folds unique-constraint violations into
//! [`Error::AlreadyExists`] so that a lost insert race looks the same as the
//! explicit existence check that precedes it.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{message}")]
    AlreadyExists { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("You cannot subscribe to yourself")]
    SelfReferenceNotAllowed,

    #[error("Authentication credentials were not provided")]
    AuthenticationRequired,

    #[error("Invalid image: {message}")]
    Image { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a missing record referenced by id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether the error is caused by the caller rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::AlreadyExists { .. }
                | Self::NotFound { .. }
                | Self::SelfReferenceNotAllowed
                | Self::AuthenticationRequired
                | Self::Image { .. }
        )
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => Self::AlreadyExists {
                message: format!("Record already exists ({detail})"),
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    /// Flattens field errors into one message, fields in alphabetical order.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));

        let message = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let detail = err
                        .message
                        .as_ref()
                        .map_or_else(|| err.code.to_string(), ToString::to_string);
                    format!("{field}: {detail}")
                })
            })
            .collect::<Vec<_>>()
            .join("; ");
        Self::validation(message)
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
