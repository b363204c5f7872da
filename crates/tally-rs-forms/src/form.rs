//! Form trait and `BaseForm` implementation.
//!
//! The [`Form`] trait is the core abstraction for all form types in the
//! framework. It supports async validation (for store-backed uniqueness
//! checks and other I/O-bound validation) and data binding from
//! [`FormData`].
//!
//! [`BaseForm`] provides a concrete, general-purpose implementation of the
//! `Form` trait that can be constructed from a list of field definitions.

use std::collections::HashMap;

use async_trait::async_trait;

use tally_rs_models::value::Value;

use crate::bound_field::BoundField;
use crate::data::FormData;
use crate::fields::{field_has_changed, FormFieldDef};
use crate::validation;

/// The core form trait. All form types implement this.
///
/// Forms support async validation to allow hitting a backing store for
/// uniqueness checks and other I/O-bound validation during `is_valid()`.
/// All implementations must be `Send + Sync` to work safely across
/// async task boundaries.
///
/// # Async Design
///
/// `is_valid()` and `clean()` are async because cross-field validation
/// commonly requires store access (e.g. checking that a document number is
/// unique within an organization). Making these operations async-first
/// avoids `block_on` hacks in request handlers.
#[async_trait]
pub trait Form: Send + Sync {
    /// Returns the form's field definitions.
    fn fields(&self) -> &[FormFieldDef];

    /// Returns the initial (default) values for fields.
    fn initial(&self) -> &HashMap<String, Value>;

    /// Returns the form prefix (for namespacing multiple forms on one page).
    fn prefix(&self) -> Option<&str>;

    /// Sets the form prefix.
    ///
    /// Formsets use this to namespace each member form before binding.
    fn set_prefix(&mut self, prefix: &str);

    /// Binds raw form data to this form.
    fn bind(&mut self, data: &FormData);

    /// Returns `true` if this form has been bound to data.
    fn is_bound(&self) -> bool;

    /// Returns `true` if the bound data differs from the initial values.
    ///
    /// Unbound forms have not changed. Disabled fields never count as
    /// changed.
    fn has_changed(&self) -> bool;

    /// Returns `true` if this form may be submitted entirely empty.
    fn empty_permitted(&self) -> bool;

    /// Sets whether this form may be submitted entirely empty.
    ///
    /// When permitted and the form has not changed, `is_valid()` succeeds
    /// without running validation and produces no cleaned data. Formsets
    /// set this on extra rows so untouched rows do not block submission.
    fn set_empty_permitted(&mut self, permitted: bool);

    /// Validates the form asynchronously. Returns `true` if valid.
    ///
    /// This is async because validation may require store access. After
    /// calling this, `errors()` and `cleaned_data()` are populated.
    async fn is_valid(&mut self) -> bool;

    /// Returns per-field validation errors.
    ///
    /// Keys are field names, values are lists of error messages. Form-level
    /// errors are keyed under `"__all__"`.
    fn errors(&self) -> &HashMap<String, Vec<String>>;

    /// Returns the cleaned (validated and coerced) data.
    ///
    /// Only populated after a successful call to `is_valid()`.
    fn cleaned_data(&self) -> &HashMap<String, Value>;

    /// Cross-field validation hook. Override to add form-level validation.
    ///
    /// This is async to support store lookups during validation.
    /// The default implementation does nothing. Returned errors are merged
    /// into the form's error map; use the `"__all__"` key for errors not
    /// tied to a single field.
    async fn clean(&self) -> Result<(), HashMap<String, Vec<String>>> {
        Ok(())
    }
}

/// A general-purpose form implementation.
///
/// `BaseForm` holds a list of field definitions and manages binding,
/// validation, and cleaned data. It is the most common way to create
/// forms without a model backing.
#[derive(Debug)]
pub struct BaseForm {
    field_defs: Vec<FormFieldDef>,
    initial_data: HashMap<String, Value>,
    prefix: Option<String>,
    bound: bool,
    empty_permitted: bool,
    raw_data: HashMap<String, Vec<String>>,
    errors: HashMap<String, Vec<String>>,
    cleaned_data: HashMap<String, Value>,
}

impl BaseForm {
    /// Creates a new `BaseForm` with the given field definitions.
    pub fn new(fields: Vec<FormFieldDef>) -> Self {
        Self {
            field_defs: fields,
            initial_data: HashMap::new(),
            prefix: None,
            bound: false,
            empty_permitted: false,
            raw_data: HashMap::new(),
            errors: HashMap::new(),
            cleaned_data: HashMap::new(),
        }
    }

    /// Sets initial (default) values for fields.
    #[must_use]
    pub fn with_initial(mut self, initial: HashMap<String, Value>) -> Self {
        self.initial_data = initial;
        self
    }

    /// Sets the form prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets whether this form may be submitted entirely empty.
    #[must_use]
    pub fn with_empty_permitted(mut self, permitted: bool) -> Self {
        self.empty_permitted = permitted;
        self
    }

    /// Returns the HTML field name for `name`, applying the prefix if set.
    pub fn add_prefix(&self, name: &str) -> String {
        match &self.prefix {
            Some(p) => format!("{p}-{name}"),
            None => name.to_string(),
        }
    }

    /// Returns bound fields for template iteration.
    pub fn bound_fields(&self) -> Vec<BoundField> {
        self.field_defs
            .iter()
            .map(|field| {
                let data = self
                    .raw_data
                    .get(&field.name)
                    .and_then(|values| values.last().cloned());
                let errors = self.errors.get(&field.name).cloned().unwrap_or_default();
                BoundField::new(field, data, errors, self.prefix.as_deref())
            })
            .collect()
    }

    /// Returns the non-field (form-level) errors.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors.get("__all__").map_or(&[], Vec::as_slice)
    }

    /// Returns the effective initial value for a field.
    ///
    /// Form-level initial data takes precedence over the field's own
    /// initial value.
    fn effective_initial<'a>(&'a self, field: &'a FormFieldDef) -> Option<&'a Value> {
        self.initial_data
            .get(&field.name)
            .or(field.initial.as_ref())
    }
}

#[async_trait]
impl Form for BaseForm {
    fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    fn initial(&self) -> &HashMap<String, Value> {
        &self.initial_data
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = Some(prefix.to_string());
    }

    fn bind(&mut self, data: &FormData) {
        self.bound = true;
        self.raw_data.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let html_name = self.add_prefix(&field.name);
            let values = data.get_list(&html_name).cloned().unwrap_or_default();
            self.raw_data.insert(field.name.clone(), values);
        }
    }

    fn is_bound(&self) -> bool {
        self.bound
    }

    fn has_changed(&self) -> bool {
        if !self.bound {
            return false;
        }
        self.field_defs.iter().any(|field| {
            if field.disabled {
                return false;
            }
            let values = self
                .raw_data
                .get(&field.name)
                .map_or(&[][..], Vec::as_slice);
            field_has_changed(field, values, self.effective_initial(field))
        })
    }

    fn empty_permitted(&self) -> bool {
        self.empty_permitted
    }

    fn set_empty_permitted(&mut self, permitted: bool) {
        self.empty_permitted = permitted;
    }

    async fn is_valid(&mut self) -> bool {
        if !self.bound {
            return false;
        }

        self.errors.clear();
        self.cleaned_data.clear();

        // An untouched optional form validates trivially and yields no data
        if self.empty_permitted && !self.has_changed() {
            return true;
        }

        // Step 1: Field-level validation
        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &self.initial_data,
            &mut self.cleaned_data,
            &mut self.errors,
        );

        // Step 2: Form-level cross-field validation (async)
        if let Err(form_errors) = self.clean().await {
            for (key, msgs) in form_errors {
                self.errors.entry(key).or_default().extend(msgs);
            }
        }

        self.errors.is_empty()
    }

    fn errors(&self) -> &HashMap<String, Vec<String>> {
        &self.errors
    }

    fn cleaned_data(&self) -> &HashMap<String, Value> {
        &self.cleaned_data
    }
}
