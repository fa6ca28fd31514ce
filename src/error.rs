use crate::models::{DateField, RuleScope};
use thiserror::Error;

/// Reasons a plant record (or one of its fields) was rejected.
///
/// Every failure is raised at the point of detection; nothing in the core
/// catches or retries these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    TypeMismatch(String),

    #[error("{0} is required")]
    Required(String),

    #[error("{field} is required for {scope}.")]
    RequiredFor { field: DateField, scope: RuleScope },

    #[error("{field} must be null for {scope}.")]
    ForbiddenFor { field: DateField, scope: RuleScope },

    #[error("unknown plant stage: {0}")]
    UnknownStage(String),

    #[error("unknown plant status: {0}")]
    UnknownStatus(String),

    #[error("invalid {0} date")]
    InvalidDate(DateField),

    #[error("{0} date cannot be in the future")]
    FutureDate(DateField),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} must only contain letters, numbers, and punctuation")]
    InvalidCharacters(&'static str),

    #[error("{field} must not be before {earlier}")]
    OutOfOrder { field: DateField, earlier: DateField },

    #[error("{0} is derived and cannot be set")]
    DerivedField(DateField),

    #[error("{0} date is out of range")]
    DateOutOfRange(DateField),

    #[error("no harvest projection for stage: {0}")]
    ProjectionUnavailable(String),
}

#[derive(Error, Debug)]
pub enum GrowLogError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type Result<T> = std::result::Result<T, GrowLogError>;
