//! Model trait and metadata.
//!
//! [`ModelMeta`] captures everything forms need to know about a model:
//! its identity, its human-readable names, and its field definitions.
//! [`Model`] is implemented by every struct that represents a stored
//! entity; metadata is held in a `LazyLock` static per model type.

use crate::fields::FieldDef;
use crate::value::Value;

/// The trait implemented by all stored entities.
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use tally_rs_models::fields::{FieldDef, FieldType};
/// use tally_rs_models::meta::{Model, ModelMeta};
/// use tally_rs_models::value::Value;
///
/// struct TaxRate {
///     id: i64,
///     name: String,
/// }
///
/// static TAX_RATE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
///     app_label: "books",
///     model_name: "taxrate",
///     db_table: "books_taxrate".to_string(),
///     verbose_name: "tax rate".to_string(),
///     verbose_name_plural: "tax rates".to_string(),
///     fields: vec![
///         FieldDef::new("id", FieldType::BigAutoField).primary_key(),
///         FieldDef::new("name", FieldType::CharField).max_length(100),
///     ],
/// });
///
/// impl Model for TaxRate {
///     fn meta() -> &'static ModelMeta {
///         &TAX_RATE_META
///     }
///
///     fn pk(&self) -> Option<Value> {
///         (self.id != 0).then_some(Value::Int(self.id))
///     }
/// }
///
/// assert_eq!(TaxRate::meta().label(), "books.taxrate");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Returns the static metadata for this model type.
    fn meta() -> &'static ModelMeta;

    /// Returns the primary key value, or `None` if unsaved.
    fn pk(&self) -> Option<Value>;
}

/// Metadata about a model.
#[derive(Debug, Clone)]
pub struct ModelMeta {
    /// The application label (e.g., "books", "people").
    pub app_label: &'static str,
    /// The model name in lowercase (e.g., "invoice", "taxrate").
    pub model_name: &'static str,
    /// The storage table name.
    pub db_table: String,
    /// Human-readable singular name.
    pub verbose_name: String,
    /// Human-readable plural name.
    pub verbose_name_plural: String,
    /// Field definitions for this model.
    pub fields: Vec<FieldDef>,
}

impl ModelMeta {
    /// Returns the `app.model` label used to reference this model.
    pub fn label(&self) -> String {
        format!("{}.{}", self.app_label, self.model_name)
    }

    /// Looks up a field definition by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the primary key field, if one is declared.
    pub fn pk_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.primary_key)
    }

    /// Returns the fields that may appear on forms, in declaration order.
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.editable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use std::sync::LazyLock;

    struct Client {
        id: i64,
    }

    static CLIENT_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
        app_label: "people",
        model_name: "client",
        db_table: "people_client".to_string(),
        verbose_name: "client".to_string(),
        verbose_name_plural: "clients".to_string(),
        fields: vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("name", FieldType::CharField).max_length(150),
            FieldDef::new("notes", FieldType::TextField).blank(),
        ],
    });

    impl Model for Client {
        fn meta() -> &'static ModelMeta {
            &CLIENT_META
        }

        fn pk(&self) -> Option<Value> {
            (self.id != 0).then_some(Value::Int(self.id))
        }
    }

    #[test]
    fn test_label() {
        assert_eq!(Client::meta().label(), "people.client");
    }

    #[test]
    fn test_get_field() {
        let meta = Client::meta();
        assert!(meta.get_field("name").is_some());
        assert!(meta.get_field("missing").is_none());
    }

    #[test]
    fn test_pk_field() {
        let pk = Client::meta().pk_field().unwrap();
        assert_eq!(pk.name, "id");
        assert_eq!(pk.field_type, FieldType::BigAutoField);
    }

    #[test]
    fn test_editable_fields_skip_pk() {
        let names: Vec<&str> = Client::meta().editable_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["name", "notes"]);
    }

    #[test]
    fn test_pk_none_when_unsaved() {
        let unsaved = Client { id: 0 };
        assert!(unsaved.pk().is_none());
        let saved = Client { id: 7 };
        assert_eq!(saved.pk(), Some(Value::Int(7)));
    }
}
