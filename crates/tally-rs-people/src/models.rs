//! User and client models.

use std::sync::LazyLock;

use tally_rs_models::fields::{FieldDef, FieldType, OnDelete};
use tally_rs_models::meta::{Model, ModelMeta};
use tally_rs_models::value::Value;

static USER_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "people",
    model_name: "user",
    db_table: "people_user".to_string(),
    verbose_name: "user".to_string(),
    verbose_name_plural: "users".to_string(),
    fields: vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new("username", FieldType::CharField)
            .max_length(150)
            .unique(),
        FieldDef::new("first_name", FieldType::CharField)
            .max_length(150)
            .blank(),
        FieldDef::new("last_name", FieldType::CharField)
            .max_length(150)
            .blank(),
        FieldDef::new("email", FieldType::CharField)
            .max_length(254)
            .blank(),
    ],
});

static CLIENT_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "people",
    model_name: "client",
    db_table: "people_client".to_string(),
    verbose_name: "client".to_string(),
    verbose_name_plural: "clients".to_string(),
    fields: vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            "organization",
            FieldType::ForeignKey {
                to: "books.organization",
                on_delete: OnDelete::Cascade,
                related_name: Some("clients"),
            },
        ),
        FieldDef::new("name", FieldType::CharField).max_length(255),
    ],
});

/// An account that can be a member of organizations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key, `None` until stored.
    pub pk: Option<i64>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    /// Creates an unstored user with only a username set.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            pk: None,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        }
    }

    /// Sets the first and last name.
    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// The label shown in selection widgets: the full name when present,
    /// otherwise the username.
    pub fn display_label(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl Model for User {
    fn meta() -> &'static ModelMeta {
        &USER_META
    }

    fn pk(&self) -> Option<Value> {
        self.pk.map(Value::Int)
    }
}

/// A customer of one organization.
///
/// Clients are tenant-scoped: every client belongs to exactly one
/// organization and is never visible across tenants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Primary key, `None` until stored.
    pub pk: Option<i64>,
    /// The owning organization's primary key.
    pub organization: i64,
    pub name: String,
}

impl Client {
    /// Creates an unstored client for the given organization.
    pub fn new(organization: i64, name: impl Into<String>) -> Self {
        Self {
            pk: None,
            organization,
            name: name.into(),
        }
    }
}

impl Model for Client {
    fn meta() -> &'static ModelMeta {
        &CLIENT_META
    }

    fn pk(&self) -> Option<Value> {
        self.pk.map(Value::Int)
    }
}
