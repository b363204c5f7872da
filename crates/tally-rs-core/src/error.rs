//! Core error types for the tally-rs workspace.
//!
//! This module provides [`ValidationError`] for form- and field-level
//! validation failures, and the workspace-wide [`TallyError`] enum covering
//! request, lookup, configuration, and security errors.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Represents a validation error with optional field-level errors.
///
/// Validation errors can be either simple (a single message) or compound
/// (containing per-field error lists).
///
/// # Examples
///
/// ```
/// use tally_rs_core::error::ValidationError;
///
/// // Simple validation error
/// let err = ValidationError::new("This field is required.", "required");
///
/// // Field-level validation errors
/// let mut field_errors = std::collections::HashMap::new();
/// field_errors.insert(
///     "rate".to_string(),
///     vec![ValidationError::new("Ensure this value is less than or equal to 1.", "max_value")],
/// );
/// let err = ValidationError::with_field_errors(field_errors);
/// ```
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The primary error message.
    pub message: String,
    /// A short code identifying the type of validation failure (e.g. "required", "invalid").
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
    /// Per-field validation errors, keyed by field name.
    pub field_errors: HashMap<String, Vec<Self>>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
            field_errors: HashMap::new(),
        }
    }

    /// Creates a `ValidationError` containing per-field errors.
    pub fn with_field_errors(field_errors: HashMap<String, Vec<Self>>) -> Self {
        Self {
            message: String::new(),
            code: String::new(),
            params: HashMap::new(),
            field_errors,
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            write!(f, "{}", self.message)?;
        } else if !self.field_errors.is_empty() {
            let mut first = true;
            for (field, errors) in &self.field_errors {
                for error in errors {
                    if !first {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}: {error}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the tally-rs workspace.
///
/// Each variant maps to the HTTP status code the surrounding application
/// reports via [`TallyError::status_code`].
#[derive(Error, Debug)]
pub enum TallyError {
    // ── Request errors ───────────────────────────────────────────────

    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(String),

    // ── Lookup errors ────────────────────────────────────────────────

    /// A record lookup matched nothing.
    #[error("{0} matching query does not exist")]
    DoesNotExist(String),

    /// An operation was applied to a model it does not support.
    #[error("Unsupported model: {0}")]
    Unsupported(String),

    // ── Validation ───────────────────────────────────────────────────

    /// A validation failure, possibly with per-field errors.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value was malformed or could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The application is wired together incorrectly.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    // ── Security ─────────────────────────────────────────────────────

    /// An operation was refused because it looks tampered-with.
    #[error("Suspicious operation: {0}")]
    SuspiciousOperation(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An underlying IO failure.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TallyError {
    /// Returns the HTTP status code associated with this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) | Self::SuspiciousOperation(_) => 400,
            Self::NotFound(_) | Self::DoesNotExist(_) => 404,
            Self::Unsupported(_)
            | Self::ConfigurationError(_)
            | Self::ImproperlyConfigured(_)
            | Self::IoError(_) => 500,
        }
    }
}

/// A convenient `Result` alias using [`TallyError`].
pub type TallyResult<T> = Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_simple() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_validation_error_display_field_errors() {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "amount".to_string(),
            vec![ValidationError::new("Enter a number.", "invalid")],
        );
        let err = ValidationError::with_field_errors(field_errors);
        assert_eq!(err.to_string(), "amount: Enter a number.");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Ensure this value has at most 32 characters.", "max_length")
            .with_param("limit_value", "32");
        assert_eq!(err.params.get("limit_value").map(String::as_str), Some("32"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(TallyError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(
            TallyError::SuspiciousOperation("x".into()).status_code(),
            400
        );
        assert_eq!(TallyError::NotFound("x".into()).status_code(), 404);
        assert_eq!(TallyError::DoesNotExist("Invoice".into()).status_code(), 404);
        assert_eq!(TallyError::Unsupported("EstimateLine".into()).status_code(), 500);
        assert_eq!(
            TallyError::ConfigurationError("x".into()).status_code(),
            500
        );
    }

    #[test]
    fn test_does_not_exist_message() {
        let err = TallyError::DoesNotExist("Organization".into());
        assert_eq!(err.to_string(), "Organization matching query does not exist");
    }

    #[test]
    fn test_unsupported_message() {
        let err = TallyError::Unsupported("books.estimateline".into());
        assert_eq!(err.to_string(), "Unsupported model: books.estimateline");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TallyError = io.into();
        assert_eq!(err.status_code(), 500);
        assert!(matches!(err, TallyError::IoError(_)));
    }

    #[test]
    fn test_validation_error_wrapped() {
        let inner = ValidationError::new("Enter a valid date (YYYY-MM-DD).", "invalid");
        let err = TallyError::ValidationError(inner);
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("valid date"));
    }
}
