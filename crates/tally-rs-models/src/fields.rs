//! Model field definitions.
//!
//! [`FieldDef`] describes a single model field (its type, nullability,
//! default, and presentation metadata). Field definitions are pure metadata:
//! they drive form generation and carry no storage behavior of their own.

use crate::value::Value;

/// What happens to dependent rows when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// Delete dependent rows.
    Cascade,
    /// Refuse the deletion while dependents exist.
    Protect,
    /// Null out the reference.
    SetNull,
}

/// The type of a model field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Auto-incrementing 64-bit primary key.
    BigAutoField,
    /// A short string (pair with [`FieldDef::max_length`]).
    CharField,
    /// A long free-text string.
    TextField,
    /// A 64-bit signed integer.
    IntegerField,
    /// A fixed-precision decimal number.
    DecimalField {
        /// Total number of digits allowed.
        max_digits: u8,
        /// Number of digits after the decimal point.
        decimal_places: u8,
    },
    /// A boolean flag.
    BooleanField,
    /// A date without time.
    DateField,
    /// A to-one reference to another model.
    ForeignKey {
        /// Target model as `app.model` (e.g. `people.client`).
        to: &'static str,
        /// Deletion behavior.
        on_delete: OnDelete,
        /// Reverse accessor name on the target model.
        related_name: Option<&'static str>,
    },
    /// A to-many reference to another model.
    ManyToManyField {
        /// Target model as `app.model`.
        to: &'static str,
        /// Reverse accessor name on the target model.
        related_name: Option<&'static str>,
    },
}

/// The complete definition of a model field.
///
/// Construct with [`FieldDef::new`] and refine with the builder methods.
///
/// # Examples
///
/// ```
/// use tally_rs_models::fields::{FieldDef, FieldType};
///
/// let number = FieldDef::new("number", FieldType::CharField)
///     .max_length(32)
///     .verbose_name("Number");
/// assert!(number.required_for_forms());
/// ```
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The field name (also the form field name).
    pub name: &'static str,
    /// The field type.
    pub field_type: FieldType,
    /// Whether this field is the primary key.
    pub primary_key: bool,
    /// Whether the stored value may be absent.
    pub null: bool,
    /// Whether forms may leave the field empty.
    pub blank: bool,
    /// Default value applied when nothing is supplied.
    pub default: Option<Value>,
    /// Whether values must be unique across rows.
    pub unique: bool,
    /// Maximum length for character fields.
    pub max_length: Option<u32>,
    /// Human-readable name; falls back to the field name.
    pub verbose_name: Option<String>,
    /// Help text shown next to the input.
    pub help_text: Option<String>,
    /// Whether the field may appear on forms at all.
    pub editable: bool,
}

impl FieldDef {
    /// Creates a new field definition with the given name and type.
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            primary_key: false,
            null: false,
            blank: false,
            default: None,
            unique: false,
            max_length: None,
            verbose_name: None,
            help_text: None,
            editable: true,
        }
    }

    /// Marks this field as the primary key (implies not editable).
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.editable = false;
        self
    }

    /// Allows the stored value to be absent.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    /// Allows forms to leave this field empty.
    #[must_use]
    pub const fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Requires values to be unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the maximum length for character fields.
    #[must_use]
    pub const fn max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the human-readable name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = Some(name.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Controls whether the field may appear on forms.
    #[must_use]
    pub const fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Returns `true` if this field references another model.
    pub const fn is_relation(&self) -> bool {
        matches!(
            self.field_type,
            FieldType::ForeignKey { .. } | FieldType::ManyToManyField { .. }
        )
    }

    /// Returns `true` if a form must receive a value for this field:
    /// not nullable, not blank, and without a default.
    pub const fn required_for_forms(&self) -> bool {
        !self.null && !self.blank && self.default.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let f = FieldDef::new("label", FieldType::CharField);
        assert_eq!(f.name, "label");
        assert!(!f.primary_key);
        assert!(!f.null);
        assert!(!f.blank);
        assert!(f.editable);
        assert!(f.default.is_none());
    }

    #[test]
    fn test_primary_key_is_not_editable() {
        let f = FieldDef::new("id", FieldType::BigAutoField).primary_key();
        assert!(f.primary_key);
        assert!(!f.editable);
    }

    #[test]
    fn test_builder_chain() {
        let f = FieldDef::new("date_dued", FieldType::DateField)
            .nullable()
            .blank()
            .verbose_name("Due date")
            .help_text("Leave empty for no due date");
        assert!(f.null);
        assert!(f.blank);
        assert_eq!(f.verbose_name.as_deref(), Some("Due date"));
        assert!(!f.required_for_forms());
    }

    #[test]
    fn test_required_for_forms() {
        let required = FieldDef::new("amount", FieldType::DecimalField {
            max_digits: 12,
            decimal_places: 2,
        });
        assert!(required.required_for_forms());

        let defaulted = FieldDef::new("draft", FieldType::BooleanField)
            .default(Value::Bool(false));
        assert!(!defaulted.required_for_forms());
    }

    #[test]
    fn test_is_relation() {
        let fk = FieldDef::new("client", FieldType::ForeignKey {
            to: "people.client",
            on_delete: OnDelete::Protect,
            related_name: None,
        });
        assert!(fk.is_relation());

        let m2m = FieldDef::new("members", FieldType::ManyToManyField {
            to: "people.user",
            related_name: Some("organizations"),
        });
        assert!(m2m.is_relation());

        let plain = FieldDef::new("number", FieldType::CharField);
        assert!(!plain.is_relation());
    }
}
