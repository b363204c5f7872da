//! Form field definitions and type-level validation.
//!
//! Each [`FormFieldDef`] describes a single form field, including its type,
//! validators, widget, and metadata. The [`FormFieldType`] enum defines
//! the type-specific parsing and coercion logic through the
//! [`clean_field_value`] function.
//!
//! Submitted values arrive as a slice of strings because HTML forms post
//! repeated keys for multi-selects. Scalar fields use the last value,
//! matching [`FormData::get`](crate::data::FormData::get).

use std::collections::HashMap;

use tally_rs_core::TallyError;
use tally_rs_models::validators::Validator;
use tally_rs_models::value::Value;

use crate::widgets::WidgetType;

/// Defines the type of a form field, including type-specific parameters.
///
/// Each variant carries the parameters needed for parsing and validating
/// raw string input from form submissions. The [`clean_field_value`] function
/// dispatches on this enum to perform type coercion and built-in validation.
#[derive(Debug, Clone)]
pub enum FormFieldType {
    /// A character (string) field.
    Char {
        /// Minimum length (characters).
        min_length: Option<usize>,
        /// Maximum length (characters).
        max_length: Option<usize>,
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// A floating-point field.
    Float {
        /// Minimum allowed value.
        min_value: Option<f64>,
        /// Maximum allowed value.
        max_value: Option<f64>,
    },
    /// A fixed-precision decimal field.
    Decimal {
        /// Maximum total number of digits.
        max_digits: u32,
        /// Number of digits after the decimal point.
        decimal_places: u32,
    },
    /// A boolean field (true/false).
    Boolean,
    /// A date field (YYYY-MM-DD).
    Date,
    /// A single-choice field.
    Choice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A multiple-choice field.
    MultipleChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
    },
    /// A choice field with a coercion function.
    TypedChoice {
        /// Available choices as `(value, display_label)` pairs.
        choices: Vec<(String, String)>,
        /// A function to coerce the raw string value into a `Value`.
        coerce: fn(&str) -> Result<Value, TallyError>,
    },
}

/// Complete definition of a form field.
///
/// A `FormFieldDef` captures everything needed to render, parse, and validate
/// a single form field. It is the form-layer analog of
/// [`FieldDef`](tally_rs_models::fields::FieldDef) from the model layer.
#[derive(Debug)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute).
    pub name: String,
    /// The field type, controlling parsing and coercion.
    pub field_type: FormFieldType,
    /// Whether this field is required.
    pub required: bool,
    /// Default/initial value.
    pub initial: Option<Value>,
    /// Help text displayed alongside the field.
    pub help_text: String,
    /// Human-readable label.
    pub label: String,
    /// The widget type used for rendering.
    pub widget: WidgetType,
    /// Additional validators applied after type coercion.
    pub validators: Vec<Box<dyn Validator>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
    /// Whether the field is disabled (rendered but not editable).
    pub disabled: bool,
}

impl FormFieldDef {
    /// Creates a new `FormFieldDef` with sensible defaults.
    ///
    /// The field is required by default, uses the default widget for its type,
    /// and has no validators beyond the type-level validation.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let widget = default_widget_for_field_type(&field_type);
        let label = name.replace('_', " ");
        Self {
            name,
            field_type,
            required: true,
            initial: None,
            help_text: String::new(),
            label,
            widget,
            validators: Vec::new(),
            error_messages: HashMap::new(),
            disabled: false,
        }
    }

    /// Sets whether this field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the initial value.
    pub fn initial(mut self, value: Value) -> Self {
        self.initial = Some(value);
        self
    }

    /// Sets the help text.
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the widget type.
    pub fn widget(mut self, widget: WidgetType) -> Self {
        self.widget = widget;
        self
    }

    /// Adds a validator.
    pub fn validator(mut self, validator: Box<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets a custom error message for a given code.
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Sets whether this field is disabled.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Returns the choices for choice-based fields, if any.
    pub fn choices(&self) -> Option<&[(String, String)]> {
        match &self.field_type {
            FormFieldType::Choice { choices }
            | FormFieldType::MultipleChoice { choices }
            | FormFieldType::TypedChoice { choices, .. } => Some(choices),
            _ => None,
        }
    }
}

/// Replaces the choices of a choice-based field in place.
///
/// Has no effect on fields without choices. Used when the valid option set
/// is only known at request time (e.g. narrowing to one organization's
/// clients or tax rates).
pub fn set_choices(field: &mut FormFieldDef, choices: Vec<(String, String)>) {
    match &mut field.field_type {
        FormFieldType::Choice { choices: c }
        | FormFieldType::MultipleChoice { choices: c }
        | FormFieldType::TypedChoice { choices: c, .. } => *c = choices,
        _ => {}
    }
}

/// Coerces a raw choice value into an integer `Value`.
///
/// The standard coercion for model-backed choice fields whose underlying
/// values are primary keys.
pub fn coerce_int(raw: &str) -> Result<Value, TallyError> {
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|e| TallyError::BadRequest(e.to_string()))
}

/// Returns the default widget type for a given form field type.
pub fn default_widget_for_field_type(field_type: &FormFieldType) -> WidgetType {
    match field_type {
        FormFieldType::Char { .. } => WidgetType::TextInput,
        FormFieldType::Integer { .. }
        | FormFieldType::Float { .. }
        | FormFieldType::Decimal { .. } => WidgetType::NumberInput,
        FormFieldType::Boolean => WidgetType::CheckboxInput,
        FormFieldType::Date => WidgetType::DateInput,
        FormFieldType::Choice { .. } | FormFieldType::TypedChoice { .. } => WidgetType::Select,
        FormFieldType::MultipleChoice { .. } => WidgetType::SelectMultiple,
    }
}

/// Cleans (validates and coerces) submitted values into a typed `Value`.
///
/// This performs type-level validation:
/// 1. Required check (if `required` and nothing was submitted)
/// 2. Type coercion (string -> i64, date, etc.)
/// 3. Type-specific constraint validation (min/max, digits, choices)
/// 4. Custom validators
///
/// Scalar fields use the last submitted value; [`FormFieldType::MultipleChoice`]
/// consumes all of them. Returns the cleaned `Value` or a list of error
/// messages.
pub fn clean_field_value(field: &FormFieldDef, values: &[String]) -> Result<Value, Vec<String>> {
    let raw_str = values.last().map_or("", String::as_str);
    let is_empty = match &field.field_type {
        FormFieldType::MultipleChoice { .. } => values.iter().all(String::is_empty),
        _ => raw_str.is_empty(),
    };

    // Required check
    if field.required && is_empty {
        let msg = field
            .error_messages
            .get("required")
            .cloned()
            .unwrap_or_else(|| "This field is required.".to_string());
        return Err(vec![msg]);
    }

    // If not required and empty, fall back to the initial value
    if is_empty {
        return Ok(empty_value(field));
    }

    let mut errors = Vec::new();

    // Type coercion and built-in validation
    let value = match &field.field_type {
        FormFieldType::Char {
            min_length,
            max_length,
            strip,
        } => {
            let s = if *strip { raw_str.trim() } else { raw_str };
            if let Some(min) = min_length {
                if s.chars().count() < *min {
                    errors.push(format!(
                        "Ensure this value has at least {min} characters (it has {}).",
                        s.chars().count()
                    ));
                }
            }
            if let Some(max) = max_length {
                if s.chars().count() > *max {
                    errors.push(format!(
                        "Ensure this value has at most {max} characters (it has {}).",
                        s.chars().count()
                    ));
                }
            }
            Value::String(s.to_string())
        }

        FormFieldType::Integer {
            min_value,
            max_value,
        } => match raw_str.parse::<i64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                }
                Value::Int(n)
            }
            Err(_) => {
                errors.push("Enter a whole number.".to_string());
                Value::Null
            }
        },

        FormFieldType::Float {
            min_value,
            max_value,
        } => match raw_str.parse::<f64>() {
            Ok(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        errors.push(format!(
                            "Ensure this value is greater than or equal to {min}."
                        ));
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        errors.push(format!("Ensure this value is less than or equal to {max}."));
                    }
                }
                Value::Float(n)
            }
            Err(_) => {
                errors.push("Enter a number.".to_string());
                Value::Null
            }
        },

        FormFieldType::Decimal {
            max_digits,
            decimal_places,
        } => match raw_str.parse::<f64>() {
            Ok(n) => {
                let parts: Vec<&str> = raw_str.trim_start_matches('-').split('.').collect();
                let integer_digits = parts[0].len();
                let actual_decimal_places = parts.get(1).map_or(0, |p| p.len());
                let total_digits = integer_digits + actual_decimal_places;

                if total_digits > *max_digits as usize {
                    errors.push(format!(
                        "Ensure that there are no more than {max_digits} digits in total."
                    ));
                }
                if actual_decimal_places > *decimal_places as usize {
                    errors.push(format!(
                        "Ensure that there are no more than {decimal_places} decimal places."
                    ));
                }
                Value::Float(n)
            }
            Err(_) => {
                errors.push("Enter a number.".to_string());
                Value::Null
            }
        },

        FormFieldType::Boolean => {
            let val = matches!(raw_str.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
            Value::Bool(val)
        }

        FormFieldType::Date => match chrono::NaiveDate::parse_from_str(raw_str, "%Y-%m-%d") {
            Ok(d) => Value::Date(d),
            Err(_) => {
                errors.push("Enter a valid date (YYYY-MM-DD).".to_string());
                Value::Null
            }
        },

        FormFieldType::Choice { choices } => {
            let valid = choices.iter().any(|(v, _)| v == raw_str);
            if valid {
                Value::String(raw_str.to_string())
            } else {
                errors.push(format!(
                    "Select a valid choice. {raw_str} is not one of the available choices."
                ));
                Value::String(raw_str.to_string())
            }
        }

        FormFieldType::MultipleChoice { choices } => {
            let mut valid_values = Vec::new();
            for s in values.iter().filter(|v| !v.is_empty()) {
                if choices.iter().any(|(v, _)| v == s) {
                    valid_values.push(Value::String(s.clone()));
                } else {
                    errors.push(format!(
                        "Select a valid choice. {s} is not one of the available choices."
                    ));
                }
            }
            Value::List(valid_values)
        }

        FormFieldType::TypedChoice { choices, coerce } => {
            let valid = choices.iter().any(|(v, _)| v == raw_str);
            if valid {
                match coerce(raw_str) {
                    Ok(v) => v,
                    Err(_) => {
                        errors.push("Invalid value.".to_string());
                        Value::Null
                    }
                }
            } else {
                errors.push(format!(
                    "Select a valid choice. {raw_str} is not one of the available choices."
                ));
                Value::Null
            }
        }
    };

    // Run custom validators on the cleaned value (only if no type errors so far)
    if errors.is_empty() {
        for validator in &field.validators {
            // Surface the bare message; the error-kind prefix belongs to
            // logs, not to rendered field errors.
            match validator.validate(&value) {
                Err(TallyError::ValidationError(e)) => errors.push(e.message),
                Err(e) => errors.push(e.to_string()),
                Ok(()) => {}
            }
        }
    }

    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

/// The cleaned value for an optional field with no submitted data.
fn empty_value(field: &FormFieldDef) -> Value {
    if let Some(initial) = &field.initial {
        return initial.clone();
    }
    match &field.field_type {
        // An unchecked checkbox means false, not absent
        FormFieldType::Boolean => Value::Bool(false),
        FormFieldType::MultipleChoice { .. } => Value::List(Vec::new()),
        _ => Value::Null,
    }
}

/// Returns `true` if the submitted values differ from the field's initial value.
///
/// Used to decide whether a form counts as "filled in": formset rows with
/// `empty_permitted` set are skipped entirely when nothing changed.
pub fn field_has_changed(
    field: &FormFieldDef,
    values: &[String],
    initial: Option<&Value>,
) -> bool {
    match &field.field_type {
        FormFieldType::Boolean => {
            let submitted = values
                .last()
                .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"));
            let before = initial.and_then(Value::as_bool).unwrap_or(false);
            submitted != before
        }
        FormFieldType::MultipleChoice { .. } => {
            let mut submitted: Vec<&str> = values
                .iter()
                .map(String::as_str)
                .filter(|v| !v.is_empty())
                .collect();
            submitted.sort_unstable();
            let mut before: Vec<String> = initial
                .and_then(Value::as_list)
                .map_or_else(Vec::new, |items| {
                    items.iter().map(ToString::to_string).collect()
                });
            before.sort();
            submitted.len() != before.len()
                || submitted.iter().zip(&before).any(|(a, b)| *a != b)
        }
        _ => {
            let submitted = values.last().map_or("", String::as_str);
            let before = initial.map(ToString::to_string).unwrap_or_default();
            submitted != before
        }
    }
}
