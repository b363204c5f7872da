//! Formsets are collections of related forms on a single page.
//!
//! A [`FormSet`] manages multiple instances of the same form, handling the
//! management form data (TOTAL_FORMS, INITIAL_FORMS, etc.) and coordinating
//! validation across all forms.
//!
//! The formset owns a factory closure that produces form instances by row
//! index. On bind it reads the submitted `TOTAL_FORMS` count, rebuilds the
//! forms through the factory, assigns each form the prefix
//! `{prefix}-{index}`, and binds it against the full payload. A row beyond
//! the initial count is permitted to stay empty; untouched permitted rows
//! validate trivially and produce no cleaned data.

use std::collections::HashMap;

use crate::data::FormData;
use crate::form::Form;

/// The default prefix used for formset field names.
const DEFAULT_PREFIX: &str = "form";

/// Default maximum number of forms in a set.
const DEFAULT_MAX_NUM: usize = 1000;

/// Management form field names.
const TOTAL_FORMS: &str = "TOTAL_FORMS";
const INITIAL_FORMS: &str = "INITIAL_FORMS";
const MIN_NUM_FORMS: &str = "MIN_NUM_FORMS";
const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";

/// The error reported when management data is absent or unreadable.
const MANAGEMENT_DATA_ERROR: &str = "ManagementForm data is missing or has been tampered with.";

/// A factory producing the form for a given row index.
///
/// Row indexes below the initial count correspond to existing objects, so
/// the factory typically seeds those forms with initial data.
pub type FormFactory = Box<dyn Fn(usize) -> Box<dyn Form> + Send + Sync>;

/// A collection of related forms managed together.
///
/// Formsets handle:
/// - Building multiple copies of the same form (initial rows + extras)
/// - Management form data (tracking how many forms exist)
/// - Coordinated validation across all forms
/// - Minimum/maximum counts of filled rows
pub struct FormSet {
    factory: FormFactory,
    forms: Vec<Box<dyn Form>>,
    /// Number of extra (blank) forms to display beyond the initial rows.
    extra: usize,
    /// Minimum number of filled forms required.
    min_num: usize,
    /// Maximum number of filled forms allowed.
    max_num: usize,
    /// Number of rows backed by existing objects.
    initial_count: usize,
    /// When set, row 0 must be filled in even though it is an extra row.
    required_first: bool,
    /// The formset prefix for HTML name attributes.
    prefix: String,
    /// Errors specific to the formset (not individual forms).
    non_form_errors: Vec<String>,
    /// Whether the formset has been bound to data.
    is_bound: bool,
    /// Whether the last bind failed to read the management data.
    management_error: bool,
}

impl std::fmt::Debug for FormSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSet")
            .field("forms", &self.forms.len())
            .field("extra", &self.extra)
            .field("min_num", &self.min_num)
            .field("max_num", &self.max_num)
            .field("initial_count", &self.initial_count)
            .field("required_first", &self.required_first)
            .field("prefix", &self.prefix)
            .field("non_form_errors", &self.non_form_errors)
            .field("is_bound", &self.is_bound)
            .field("management_error", &self.management_error)
            .finish_non_exhaustive()
    }
}

impl FormSet {
    /// Creates a new `FormSet` producing forms through `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn Form> + Send + Sync + 'static,
    {
        let mut formset = Self {
            factory: Box::new(factory),
            forms: Vec::new(),
            extra: 1,
            min_num: 0,
            max_num: DEFAULT_MAX_NUM,
            initial_count: 0,
            required_first: false,
            prefix: DEFAULT_PREFIX.to_string(),
            non_form_errors: Vec::new(),
            is_bound: false,
            management_error: false,
        };
        formset.rebuild(formset.unbound_total());
        formset
    }

    /// Sets the number of extra (blank) forms.
    #[must_use]
    pub fn with_extra(mut self, extra: usize) -> Self {
        self.extra = extra;
        self.rebuild(self.unbound_total());
        self
    }

    /// Sets the minimum number of filled forms.
    #[must_use]
    pub fn with_min_num(mut self, min_num: usize) -> Self {
        self.min_num = min_num;
        self.rebuild(self.unbound_total());
        self
    }

    /// Sets the maximum number of filled forms.
    #[must_use]
    pub fn with_max_num(mut self, max_num: usize) -> Self {
        self.max_num = max_num;
        self.rebuild(self.unbound_total());
        self
    }

    /// Sets the number of rows backed by existing objects.
    ///
    /// Initial rows are never permitted to stay empty.
    #[must_use]
    pub fn with_initial_count(mut self, initial_count: usize) -> Self {
        self.initial_count = initial_count;
        self.rebuild(self.unbound_total());
        self
    }

    /// Requires the first row to be filled in even when it is an extra row.
    #[must_use]
    pub fn required_first(mut self) -> Self {
        self.required_first = true;
        self.rebuild(self.unbound_total());
        self
    }

    /// Sets the formset prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.rebuild(self.unbound_total());
        self
    }

    /// Returns the member forms.
    pub fn forms(&self) -> &[Box<dyn Form>] {
        &self.forms
    }

    /// Returns the member forms mutably.
    pub fn forms_mut(&mut self) -> &mut [Box<dyn Form>] {
        &mut self.forms
    }

    /// Returns the formset prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the total number of forms currently built.
    pub fn total_form_count(&self) -> usize {
        self.forms.len()
    }

    /// Returns the number of rows backed by existing objects.
    pub const fn initial_form_count(&self) -> usize {
        self.initial_count
    }

    /// The number of forms an unbound formset displays.
    fn unbound_total(&self) -> usize {
        let total = self.initial_count.max(self.min_num) + self.extra;
        if self.initial_count > self.max_num {
            // Existing rows are always displayed
            self.initial_count
        } else {
            total.min(self.max_num)
        }
    }

    /// Rebuilds the member forms through the factory.
    fn rebuild(&mut self, total: usize) {
        self.forms = (0..total)
            .map(|i| {
                let mut form = (self.factory)(i);
                form.set_prefix(&format!("{}-{i}", self.prefix));
                let mut permitted = i >= self.initial_count;
                if self.required_first && i == 0 {
                    permitted = false;
                }
                form.set_empty_permitted(permitted);
                form
            })
            .collect();
    }

    /// Returns the management form data as a map.
    ///
    /// This data is typically rendered as hidden inputs on the page and
    /// must round-trip with the submission.
    pub fn management_form_data(&self) -> HashMap<String, String> {
        let mut data = HashMap::new();
        let prefix = &self.prefix;
        data.insert(
            format!("{prefix}-{TOTAL_FORMS}"),
            self.total_form_count().to_string(),
        );
        data.insert(
            format!("{prefix}-{INITIAL_FORMS}"),
            self.initial_form_count().to_string(),
        );
        data.insert(
            format!("{prefix}-{MIN_NUM_FORMS}"),
            self.min_num.to_string(),
        );
        data.insert(
            format!("{prefix}-{MAX_NUM_FORMS}"),
            self.max_num.to_string(),
        );
        data
    }

    /// Renders the management form as hidden HTML inputs.
    pub fn management_form_html(&self) -> String {
        let data = self.management_form_data();
        let mut html = String::new();
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort(); // deterministic output for testing
        for key in keys {
            let value = &data[key];
            html.push_str(&format!(
                r#"<input type="hidden" name="{key}" value="{value}" />"#
            ));
        }
        html
    }

    /// Binds submitted data to the formset.
    ///
    /// Reads `TOTAL_FORMS` from the management data to decide how many
    /// forms to build, rebuilds them through the factory, and binds each
    /// one. A missing or unparsable count marks the formset as tampered;
    /// `is_valid` will then fail with a non-form error.
    pub fn bind(&mut self, data: &FormData) {
        self.is_bound = true;
        self.management_error = false;

        let total_key = format!("{}-{TOTAL_FORMS}", self.prefix);
        let Some(total) = data.get(&total_key).and_then(|v| v.parse::<usize>().ok()) else {
            self.management_error = true;
            self.rebuild(self.unbound_total());
            return;
        };

        // Hard cap against hostile TOTAL_FORMS values
        let total = total.min(self.max_num + DEFAULT_MAX_NUM);

        self.rebuild(total);
        for form in &mut self.forms {
            form.bind(data);
        }
    }

    /// Validates all forms in the formset asynchronously.
    ///
    /// A row counts as empty when its data is unchanged and it lies beyond
    /// the initial rows; rows backed by existing objects always count as
    /// submitted. Returns `true` when every form is valid and the number of
    /// filled rows is within `min_num..=max_num`.
    pub async fn is_valid(&mut self) -> bool {
        if !self.is_bound {
            return false;
        }

        self.non_form_errors.clear();
        if self.management_error {
            self.non_form_errors.push(MANAGEMENT_DATA_ERROR.to_string());
            return false;
        }

        let mut all_valid = true;
        let mut empty_extra = 0usize;
        let initial_count = self.initial_count;

        for (i, form) in self.forms.iter_mut().enumerate() {
            if !form.is_valid().await {
                all_valid = false;
            }
            if i >= initial_count && !form.has_changed() {
                empty_extra += 1;
            }
        }
        let filled = self.forms.len() - empty_extra;

        // Formset-level validation on the filled-row count
        if filled < self.min_num {
            self.non_form_errors
                .push(format!("Please submit at least {} forms.", self.min_num));
            all_valid = false;
        }
        if filled > self.max_num {
            self.non_form_errors
                .push(format!("Please submit at most {} forms.", self.max_num));
            all_valid = false;
        }

        all_valid
    }

    /// Returns formset-level (non-form) errors.
    pub fn non_form_errors(&self) -> &[String] {
        &self.non_form_errors
    }

    /// Returns `true` if the formset has been bound to data.
    pub const fn is_bound(&self) -> bool {
        self.is_bound
    }
}
