//! Validation pipeline for form processing.
//!
//! Validation runs in two stages:
//! 1. Field-level validation (type coercion + per-field validators)
//! 2. Form-level cross-field validation (async, can hit the store)
//!
//! Errors accumulate rather than short-circuiting, so all validation
//! issues are reported at once.

use std::collections::HashMap;

use tally_rs_models::value::Value;

use crate::fields::{clean_field_value, FormFieldDef};
use crate::form::Form;

/// Performs field-level validation for all fields.
///
/// For each field definition:
/// 1. Extracts the raw values from the data map
/// 2. Runs [`clean_field_value`] for type coercion and field-level validation
/// 3. Populates `cleaned_data` on success or `errors` on failure
///
/// Disabled fields skip validation and take their value from
/// `form_initial` (falling back to the field's own initial). Errors
/// accumulate across all fields (no short-circuiting).
pub fn clean_fields(
    field_defs: &[FormFieldDef],
    raw_data: &HashMap<String, Vec<String>>,
    form_initial: &HashMap<String, Value>,
    cleaned_data: &mut HashMap<String, Value>,
    errors: &mut HashMap<String, Vec<String>>,
) {
    for field in field_defs {
        if field.disabled {
            let initial = form_initial
                .get(&field.name)
                .or(field.initial.as_ref());
            if let Some(initial) = initial {
                cleaned_data.insert(field.name.clone(), initial.clone());
            }
            continue;
        }

        let values = raw_data
            .get(&field.name)
            .map_or(&[][..], Vec::as_slice);

        match clean_field_value(field, values) {
            Ok(value) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Err(field_errors) => {
                errors.insert(field.name.clone(), field_errors);
            }
        }
    }
}

/// Performs the full validation pipeline: field-level then form-level.
///
/// This is an async function because form-level cross-field validation
/// (via `form.clean()`) may require store access for uniqueness checks or
/// reference validation.
///
/// # Returns
///
/// - `Ok(())` if all validation passes
/// - `Err(errors)` with a list of `(field_name, error_messages)` tuples
pub async fn full_clean(form: &mut dyn Form) -> Result<(), Vec<(String, Vec<String>)>> {
    // is_valid() runs the full pipeline internally. This entry point
    // returns structured error data instead of a bool.
    if form.is_valid().await {
        Ok(())
    } else {
        let errors: Vec<(String, Vec<String>)> = form
            .errors()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Err(errors)
    }
}
