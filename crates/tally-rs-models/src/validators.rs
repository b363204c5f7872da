//! Field validators.
//!
//! Validators enforce constraints on field values before they are accepted.
//! Forms run them after type conversion, so each validator sees a typed
//! [`Value`] and checks a single constraint.

use crate::value::Value;
use tally_rs_core::{TallyError, ValidationError};
use std::fmt;

/// A trait for validating field values.
///
/// # Examples
///
/// ```
/// use tally_rs_models::validators::{MaxValueValidator, Validator};
/// use tally_rs_models::value::Value;
///
/// // A tax rate is stored as a fraction and may not exceed 1.
/// let v = MaxValueValidator::new(1.0);
/// assert!(v.validate(&Value::Float(0.2)).is_ok());
/// assert!(v.validate(&Value::Float(1.5)).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), TallyError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

#[allow(clippy::cast_precision_loss)]
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Validates that a string value does not exceed a maximum length.
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
    /// The maximum allowed length.
    pub max_length: usize,
}

impl MaxLengthValidator {
    /// Creates a new `MaxLengthValidator` with the given maximum length.
    pub const fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), TallyError> {
        if let Value::String(s) = value {
            if s.chars().count() > self.max_length {
                return Err(TallyError::ValidationError(ValidationError::new(
                    format!(
                        "Ensure this value has at most {} characters (it has {}).",
                        self.max_length,
                        s.chars().count()
                    ),
                    "max_length",
                )));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxLengthValidator"
    }
}

/// Validates that a string value meets a minimum length requirement.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
    /// The minimum required length.
    pub min_length: usize,
}

impl MinLengthValidator {
    /// Creates a new `MinLengthValidator` with the given minimum length.
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &Value) -> Result<(), TallyError> {
        if let Value::String(s) = value {
            if s.chars().count() < self.min_length {
                return Err(TallyError::ValidationError(ValidationError::new(
                    format!(
                        "Ensure this value has at least {} characters (it has {}).",
                        self.min_length,
                        s.chars().count()
                    ),
                    "min_length",
                )));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinLengthValidator"
    }
}

/// Validates that a numeric value does not exceed a maximum.
#[derive(Debug, Clone)]
pub struct MaxValueValidator {
    /// The maximum allowed value.
    pub max_value: f64,
}

impl MaxValueValidator {
    /// Creates a new `MaxValueValidator` with the given maximum.
    pub const fn new(max_value: f64) -> Self {
        Self { max_value }
    }
}

impl Validator for MaxValueValidator {
    fn validate(&self, value: &Value) -> Result<(), TallyError> {
        if let Some(n) = numeric(value) {
            if n > self.max_value {
                return Err(TallyError::ValidationError(ValidationError::new(
                    format!(
                        "Ensure this value is less than or equal to {}.",
                        self.max_value
                    ),
                    "max_value",
                )));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MaxValueValidator"
    }
}

/// Validates that a numeric value meets a minimum requirement.
#[derive(Debug, Clone)]
pub struct MinValueValidator {
    /// The minimum required value.
    pub min_value: f64,
}

impl MinValueValidator {
    /// Creates a new `MinValueValidator` with the given minimum.
    pub const fn new(min_value: f64) -> Self {
        Self { min_value }
    }
}

impl Validator for MinValueValidator {
    fn validate(&self, value: &Value) -> Result<(), TallyError> {
        if let Some(n) = numeric(value) {
            if n < self.min_value {
                return Err(TallyError::ValidationError(ValidationError::new(
                    format!(
                        "Ensure this value is greater than or equal to {}.",
                        self.min_value
                    ),
                    "min_value",
                )));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinValueValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_length() {
        let v = MaxLengthValidator::new(6);
        assert!(v.validate(&Value::String("INV-01".into())).is_ok());
        assert!(v.validate(&Value::String("INV-2026-0001".into())).is_err());
    }

    #[test]
    fn test_max_length_counts_chars_not_bytes() {
        let v = MaxLengthValidator::new(4);
        assert!(v.validate(&Value::String("déjà".into())).is_ok());
    }

    #[test]
    fn test_max_length_ignores_non_strings() {
        let v = MaxLengthValidator::new(3);
        assert!(v.validate(&Value::Int(12345)).is_ok());
    }

    #[test]
    fn test_min_length() {
        let v = MinLengthValidator::new(3);
        assert!(v.validate(&Value::String("Acme".into())).is_ok());
        assert!(v.validate(&Value::String("ab".into())).is_err());
    }

    #[test]
    fn test_rate_range() {
        let floor = MinValueValidator::new(0.0);
        let ceil = MaxValueValidator::new(1.0);
        for rate in [0.0, 0.2, 1.0] {
            assert!(floor.validate(&Value::Float(rate)).is_ok());
            assert!(ceil.validate(&Value::Float(rate)).is_ok());
        }
        assert!(floor.validate(&Value::Float(-0.1)).is_err());
        assert!(ceil.validate(&Value::Float(1.1)).is_err());
    }

    #[test]
    fn test_min_value_accepts_ints() {
        let v = MinValueValidator::new(1.0);
        assert!(v.validate(&Value::Int(1)).is_ok());
        assert!(v.validate(&Value::Int(0)).is_err());
    }

    #[test]
    fn test_error_carries_code() {
        let v = MaxValueValidator::new(1.0);
        let err = v.validate(&Value::Float(2.0)).unwrap_err();
        match err {
            TallyError::ValidationError(e) => assert_eq!(e.code, "max_value"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validator_names() {
        assert_eq!(MaxLengthValidator::new(5).name(), "MaxLengthValidator");
        assert_eq!(MinLengthValidator::new(5).name(), "MinLengthValidator");
        assert_eq!(MaxValueValidator::new(5.0).name(), "MaxValueValidator");
        assert_eq!(MinValueValidator::new(5.0).name(), "MinValueValidator");
    }
}
