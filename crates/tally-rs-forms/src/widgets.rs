//! Widget system for rendering HTML form elements.
//!
//! Widgets are the bridge between form fields and their HTML representation.
//! Each widget knows how to render itself as HTML, extract a value from
//! submitted form data, and generate an appropriate `id` attribute for
//! its `<label>` element.

use std::collections::HashMap;
use std::fmt;

use crate::data::FormData;

/// Page size hint rendered by autocomplete widgets when none is configured.
pub const DEFAULT_AUTOCOMPLETE_PAGE_SIZE: usize = 20;

/// Enumerates all built-in widget types.
///
/// Each variant corresponds to a distinct HTML form element or input type.
/// Widgets are matched by this enum for default widget selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<textarea>`.
    Textarea,
    /// `<input type="checkbox">`.
    CheckboxInput,
    /// `<select>`.
    Select,
    /// `<select multiple>`.
    SelectMultiple,
    /// `<input type="date">`.
    DateInput,
    /// A `<select>` backed by client-side autocomplete.
    AutocompleteSelect,
    /// A `<select multiple>` backed by client-side autocomplete.
    AutocompleteSelectMultiple,
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::NumberInput => "NumberInput",
            Self::HiddenInput => "HiddenInput",
            Self::Textarea => "Textarea",
            Self::CheckboxInput => "CheckboxInput",
            Self::Select => "Select",
            Self::SelectMultiple => "SelectMultiple",
            Self::DateInput => "DateInput",
            Self::AutocompleteSelect => "AutocompleteSelect",
            Self::AutocompleteSelectMultiple => "AutocompleteSelectMultiple",
        };
        write!(f, "{name}")
    }
}

/// A trait for HTML form widgets.
///
/// Widgets are responsible for:
/// - Rendering an HTML element for a given field name and value
/// - Extracting the raw value from submitted [`FormData`]
/// - Generating the `id` attribute for an associated `<label>` element
pub trait Widget: Send + Sync + fmt::Debug {
    /// Returns the widget type enum variant.
    fn widget_type(&self) -> WidgetType;

    /// Renders the widget as an HTML string.
    ///
    /// # Arguments
    /// - `name` - The HTML `name` attribute
    /// - `value` - The current value to display (if any)
    /// - `attrs` - Additional HTML attributes
    fn render(&self, name: &str, value: &Option<String>, attrs: &HashMap<String, String>)
        -> String;

    /// Extracts a raw string value from the submitted form data.
    ///
    /// Returns `None` if no value was submitted for this field name.
    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String>;

    /// Returns the HTML `id` attribute value for a label targeting this widget.
    fn id_for_label(&self, id: &str) -> String;
}

/// Formats an HTML attributes map into a string like ` key="value" key2="value2"`.
fn render_attrs(attrs: &HashMap<String, String>) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let mut parts: Vec<String> = attrs
        .iter()
        .map(|(k, v)| format!(r#" {k}="{v}""#))
        .collect();
    parts.sort(); // deterministic output for testing
    parts.join("")
}

fn render_options(choices: &[(String, String)], selected_values: &[&str]) -> String {
    let mut options = String::new();
    for (val, label) in choices {
        let selected = if selected_values.contains(&val.as_str()) {
            " selected"
        } else {
            ""
        };
        options.push_str(&format!(
            r#"<option value="{val}"{selected}>{label}</option>"#
        ));
    }
    options
}

// ---------------------------------------------------------------------------
// Built-in widgets
// ---------------------------------------------------------------------------

/// A basic `<input type="text">` widget.
#[derive(Debug, Clone)]
pub struct TextInput;

impl Widget for TextInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::TextInput
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let val = value.as_deref().unwrap_or("");
        format!(
            r#"<input type="text" name="{name}" value="{val}"{} />"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<input type="number">` widget.
#[derive(Debug, Clone)]
pub struct NumberInput;

impl Widget for NumberInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::NumberInput
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let val = value.as_deref().unwrap_or("");
        format!(
            r#"<input type="number" name="{name}" value="{val}"{} />"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<input type="hidden">` widget.
#[derive(Debug, Clone)]
pub struct HiddenInput;

impl Widget for HiddenInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::HiddenInput
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let val = value.as_deref().unwrap_or("");
        format!(
            r#"<input type="hidden" name="{name}" value="{val}"{} />"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<textarea>` widget.
#[derive(Debug, Clone)]
pub struct Textarea;

impl Widget for Textarea {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Textarea
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let val = value.as_deref().unwrap_or("");
        format!(
            r#"<textarea name="{name}"{}>{val}</textarea>"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<input type="checkbox">` widget.
///
/// For a boolean field. The value in form data is typically "on" or absent.
#[derive(Debug, Clone)]
pub struct CheckboxInput;

impl Widget for CheckboxInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::CheckboxInput
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let checked = value
            .as_deref()
            .is_some_and(|v| v == "true" || v == "on" || v == "1");
        let checked_attr = if checked { " checked" } else { "" };
        format!(
            r#"<input type="checkbox" name="{name}"{checked_attr}{} />"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        // Checkbox: presence means "on", absence means not checked
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<select>` widget.
#[derive(Debug, Clone)]
pub struct Select {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
}

impl Select {
    /// Creates a new `Select` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }
}

impl Widget for Select {
    fn widget_type(&self) -> WidgetType {
        WidgetType::Select
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let current = value.as_deref().unwrap_or("");
        let options = render_options(&self.choices, &[current]);
        format!(
            r#"<select name="{name}"{}>{options}</select>"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<select multiple>` widget.
#[derive(Debug, Clone)]
pub struct SelectMultiple {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
}

impl SelectMultiple {
    /// Creates a new `SelectMultiple` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self { choices }
    }
}

impl Widget for SelectMultiple {
    fn widget_type(&self) -> WidgetType {
        WidgetType::SelectMultiple
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        // value is a comma-separated list of selected values
        let selected_values: Vec<&str> = value
            .as_deref()
            .map_or_else(Vec::new, |v| v.split(',').collect());
        let options = render_options(&self.choices, &selected_values);
        format!(
            r#"<select name="{name}" multiple{}>{options}</select>"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get_list(name).map(|vals| vals.join(","))
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<input type="date">` widget.
#[derive(Debug, Clone)]
pub struct DateInput;

impl Widget for DateInput {
    fn widget_type(&self) -> WidgetType {
        WidgetType::DateInput
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let val = value.as_deref().unwrap_or("");
        format!(
            r#"<input type="date" name="{name}" value="{val}"{} />"#,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<select>` enhanced with client-side autocomplete.
///
/// Renders `data-autocomplete` and `data-page-size` attributes that the
/// front-end picks up to turn the element into a searchable dropdown.
/// Large choice sets (client lists, user lists) use this instead of a
/// plain [`Select`].
#[derive(Debug, Clone)]
pub struct AutocompleteSelect {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
    /// How many suggestions the front-end fetches per page.
    pub page_size: usize,
}

impl AutocompleteSelect {
    /// Creates a new `AutocompleteSelect` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self {
            choices,
            page_size: DEFAULT_AUTOCOMPLETE_PAGE_SIZE,
        }
    }

    /// Sets the suggestion page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Widget for AutocompleteSelect {
    fn widget_type(&self) -> WidgetType {
        WidgetType::AutocompleteSelect
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let current = value.as_deref().unwrap_or("");
        let options = render_options(&self.choices, &[current]);
        format!(
            r#"<select name="{name}" data-autocomplete="on" data-page-size="{}"{}>{options}</select>"#,
            self.page_size,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get(name).map(String::from)
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// A `<select multiple>` enhanced with client-side autocomplete.
#[derive(Debug, Clone)]
pub struct AutocompleteSelectMultiple {
    /// The available choices as `(value, display_label)` pairs.
    pub choices: Vec<(String, String)>,
    /// How many suggestions the front-end fetches per page.
    pub page_size: usize,
}

impl AutocompleteSelectMultiple {
    /// Creates a new `AutocompleteSelectMultiple` widget with the given choices.
    pub fn new(choices: Vec<(String, String)>) -> Self {
        Self {
            choices,
            page_size: DEFAULT_AUTOCOMPLETE_PAGE_SIZE,
        }
    }

    /// Sets the suggestion page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Widget for AutocompleteSelectMultiple {
    fn widget_type(&self) -> WidgetType {
        WidgetType::AutocompleteSelectMultiple
    }

    fn render(
        &self,
        name: &str,
        value: &Option<String>,
        attrs: &HashMap<String, String>,
    ) -> String {
        let selected_values: Vec<&str> = value
            .as_deref()
            .map_or_else(Vec::new, |v| v.split(',').collect());
        let options = render_options(&self.choices, &selected_values);
        format!(
            r#"<select name="{name}" multiple data-autocomplete="on" data-page-size="{}"{}>{options}</select>"#,
            self.page_size,
            render_attrs(attrs)
        )
    }

    fn value_from_data(&self, data: &FormData, name: &str) -> Option<String> {
        data.get_list(name).map(|vals| vals.join(","))
    }

    fn id_for_label(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Creates a boxed widget from a `WidgetType` enum.
///
/// For choice-based widgets, empty choices are used; callers should
/// use [`create_widget_with_choices`] when the choices are known.
pub fn create_widget(widget_type: &WidgetType) -> Box<dyn Widget> {
    match widget_type {
        WidgetType::TextInput => Box::new(TextInput),
        WidgetType::NumberInput => Box::new(NumberInput),
        WidgetType::HiddenInput => Box::new(HiddenInput),
        WidgetType::Textarea => Box::new(Textarea),
        WidgetType::CheckboxInput => Box::new(CheckboxInput),
        WidgetType::Select => Box::new(Select::new(vec![])),
        WidgetType::SelectMultiple => Box::new(SelectMultiple::new(vec![])),
        WidgetType::DateInput => Box::new(DateInput),
        WidgetType::AutocompleteSelect => Box::new(AutocompleteSelect::new(vec![])),
        WidgetType::AutocompleteSelectMultiple => {
            Box::new(AutocompleteSelectMultiple::new(vec![]))
        }
    }
}

/// Creates a boxed widget from a `WidgetType`, populating choices if applicable.
pub fn create_widget_with_choices(
    widget_type: &WidgetType,
    choices: &[(String, String)],
) -> Box<dyn Widget> {
    match widget_type {
        WidgetType::Select => Box::new(Select::new(choices.to_vec())),
        WidgetType::SelectMultiple => Box::new(SelectMultiple::new(choices.to_vec())),
        WidgetType::AutocompleteSelect => Box::new(AutocompleteSelect::new(choices.to_vec())),
        WidgetType::AutocompleteSelectMultiple => {
            Box::new(AutocompleteSelectMultiple::new(choices.to_vec()))
        }
        other => create_widget(other),
    }
}
