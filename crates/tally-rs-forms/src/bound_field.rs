//! Bound fields are form fields populated with data and errors.
//!
//! A [`BoundField`] represents the combination of a form field definition,
//! its current data value, any validation errors, and the widget used for
//! rendering. It is the primary type used when iterating over a form's
//! fields for display.

use std::collections::HashMap;

use crate::fields::FormFieldDef;
use crate::widgets::{self, Widget};

/// A form field bound to data and validation state.
///
/// `BoundField` is created during form rendering to pair a field definition
/// with its current value, errors, and widget.
pub struct BoundField {
    /// The field's HTML name attribute (prefix applied).
    pub name: String,
    /// Field definition snapshot (owned to avoid lifetime issues).
    pub field: BoundFieldDef,
    /// The raw data value submitted for this field.
    pub data: Option<String>,
    /// Validation error messages for this field.
    pub errors: Vec<String>,
    /// The widget instance used for rendering.
    pub widget: Box<dyn Widget>,
}

/// Minimal field definition snapshot stored in a `BoundField`.
#[derive(Debug, Clone)]
pub struct BoundFieldDef {
    /// The field name (without prefix).
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Help text.
    pub help_text: String,
    /// Whether the field is required.
    pub required: bool,
    /// Whether the field is disabled.
    pub disabled: bool,
}

impl BoundField {
    /// Creates a new `BoundField` from a field definition and current state.
    ///
    /// Choice-based fields get a widget carrying their choices so rendered
    /// `<select>` elements list the actual options.
    pub fn new(
        field_def: &FormFieldDef,
        data: Option<String>,
        errors: Vec<String>,
        prefix: Option<&str>,
    ) -> Self {
        let html_name = match prefix {
            Some(p) => format!("{p}-{}", field_def.name),
            None => field_def.name.clone(),
        };

        let widget = match field_def.choices() {
            Some(choices) => widgets::create_widget_with_choices(&field_def.widget, choices),
            None => widgets::create_widget(&field_def.widget),
        };

        Self {
            name: html_name,
            field: BoundFieldDef {
                name: field_def.name.clone(),
                label: field_def.label.clone(),
                help_text: field_def.help_text.clone(),
                required: field_def.required,
                disabled: field_def.disabled,
            },
            data,
            errors,
            widget,
        }
    }

    /// Renders the widget HTML for this bound field.
    pub fn render(&self, extra_attrs: &HashMap<String, String>) -> String {
        let mut attrs = extra_attrs.clone();
        let id = self.auto_id();
        if !id.is_empty() {
            attrs.entry("id".to_string()).or_insert(id);
        }
        if self.field.disabled {
            attrs.insert("disabled".to_string(), "disabled".to_string());
        }
        self.widget.render(&self.name, &self.data, &attrs)
    }

    /// Renders a `<label>` element for this field.
    pub fn label_tag(&self) -> String {
        let id = self.auto_id();
        let label_id = self.widget.id_for_label(&id);
        if label_id.is_empty() {
            format!("<label>{}</label>", self.field.label)
        } else {
            format!(r#"<label for="{label_id}">{}</label>"#, self.field.label)
        }
    }

    /// Returns the auto-generated HTML `id` for this field.
    pub fn auto_id(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Returns `true` if this field has any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Renders the error list as an HTML `<ul>` element.
    pub fn errors_as_ul(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        let items: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("<li>{e}</li>"))
            .collect();
        format!(r#"<ul class="errorlist">{}</ul>"#, items.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{coerce_int, FormFieldDef, FormFieldType};
    use crate::widgets::WidgetType;

    fn make_char_field(name: &str) -> FormFieldDef {
        FormFieldDef::new(
            name,
            FormFieldType::Char {
                min_length: None,
                max_length: None,
                strip: false,
            },
        )
    }

    #[test]
    fn test_bound_field_new() {
        let field_def = make_char_field("number");
        let bf = BoundField::new(&field_def, Some("INV-0042".into()), vec![], None);
        assert_eq!(bf.name, "number");
        assert_eq!(bf.data, Some("INV-0042".to_string()));
        assert!(bf.errors.is_empty());
    }

    #[test]
    fn test_bound_field_with_prefix() {
        let field_def = make_char_field("label");
        let bf = BoundField::new(&field_def, None, vec![], Some("lines-0"));
        assert_eq!(bf.name, "lines-0-label");
    }

    #[test]
    fn test_bound_field_render() {
        let field_def = make_char_field("number");
        let bf = BoundField::new(&field_def, Some("INV-0042".into()), vec![], None);
        let html = bf.render(&HashMap::new());
        assert!(html.contains(r#"name="number""#));
        assert!(html.contains(r#"value="INV-0042""#));
        assert!(html.contains(r#"id="id_number""#));
    }

    #[test]
    fn test_bound_field_label_tag() {
        let field_def = make_char_field("date_issued").label("Issue date");
        let bf = BoundField::new(&field_def, None, vec![], None);
        let label = bf.label_tag();
        assert!(label.contains(r#"for="id_date_issued""#));
        assert!(label.contains("Issue date"));
    }

    #[test]
    fn test_bound_field_auto_id() {
        let field_def = make_char_field("reference");
        let bf = BoundField::new(&field_def, None, vec![], None);
        assert_eq!(bf.auto_id(), "id_reference");
    }

    #[test]
    fn test_bound_field_has_errors() {
        let field_def = make_char_field("reference");
        let bf_no_errors = BoundField::new(&field_def, None, vec![], None);
        assert!(!bf_no_errors.has_errors());

        let bf_errors = BoundField::new(
            &field_def,
            None,
            vec!["This field is required.".to_string()],
            None,
        );
        assert!(bf_errors.has_errors());
    }

    #[test]
    fn test_bound_field_errors_as_ul() {
        let field_def = make_char_field("amount");
        let bf = BoundField::new(
            &field_def,
            None,
            vec![
                "This field is required.".to_string(),
                "Enter a number.".to_string(),
            ],
            None,
        );
        let html = bf.errors_as_ul();
        assert!(html.contains(r#"class="errorlist""#));
        assert!(html.contains("<li>This field is required.</li>"));
        assert!(html.contains("<li>Enter a number.</li>"));
    }

    #[test]
    fn test_bound_field_errors_as_ul_empty() {
        let field_def = make_char_field("amount");
        let bf = BoundField::new(&field_def, None, vec![], None);
        assert_eq!(bf.errors_as_ul(), "");
    }

    #[test]
    fn test_bound_field_disabled() {
        let field_def = make_char_field("number").disabled(true);
        let bf = BoundField::new(&field_def, Some("INV-0001".into()), vec![], None);
        let html = bf.render(&HashMap::new());
        assert!(html.contains(r#"disabled="disabled""#));
    }

    #[test]
    fn test_bound_field_textarea_widget() {
        let field_def = make_char_field("detail").widget(WidgetType::Textarea);
        let bf = BoundField::new(&field_def, Some("Paid by wire".into()), vec![], None);
        let html = bf.render(&HashMap::new());
        assert!(html.contains("<textarea"));
        assert!(html.contains("Paid by wire"));
    }

    #[test]
    fn test_bound_field_select_renders_choices() {
        let field_def = FormFieldDef::new(
            "tax_rate",
            FormFieldType::TypedChoice {
                choices: vec![
                    ("4".into(), "VAT 20%".into()),
                    ("5".into(), "Reduced 5%".into()),
                ],
                coerce: coerce_int,
            },
        );
        let bf = BoundField::new(&field_def, Some("5".into()), vec![], None);
        let html = bf.render(&HashMap::new());
        assert!(html.contains(r#"<option value="4">VAT 20%</option>"#));
        assert!(html.contains(r#"<option value="5" selected>Reduced 5%</option>"#));
    }
}
