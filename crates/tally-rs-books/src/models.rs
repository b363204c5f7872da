//! Billing domain models.
//!
//! The tenant boundary ([`Organization`]) owns tax rates, clients, and the
//! three billing document types ([`Estimate`], [`Invoice`], [`Bill`]), each
//! carrying line items. Metadata is limited to what the forms layer needs:
//! field types, defaults, presentation text, and relation targets.

use std::sync::LazyLock;

use chrono::NaiveDate;
use tally_rs_models::fields::{FieldDef, FieldType, OnDelete};
use tally_rs_models::meta::{Model, ModelMeta};
use tally_rs_models::value::Value;

// ── Organization ───────────────────────────────────────────────────────

static ORGANIZATION_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "organization",
    db_table: "books_organization".to_string(),
    verbose_name: "organization".to_string(),
    verbose_name_plural: "organizations".to_string(),
    fields: vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new("display_name", FieldType::CharField)
            .max_length(150)
            .help_text("Name that you communicate"),
        FieldDef::new("legal_name", FieldType::CharField)
            .max_length(150)
            .help_text("Official name to appear on your reports, sales invoices and bills"),
        FieldDef::new(
            "members",
            FieldType::ManyToManyField {
                to: "people.user",
                related_name: Some("organizations"),
            },
        )
        .blank(),
    ],
});

/// The tenant boundary. Every client, tax rate, and billing document
/// belongs to exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    /// Primary key, `None` until stored.
    pub pk: Option<i64>,
    pub display_name: String,
    pub legal_name: String,
    /// Primary keys of the member users.
    pub members: Vec<i64>,
}

impl Organization {
    /// Creates an unstored organization with no members.
    pub fn new(display_name: impl Into<String>, legal_name: impl Into<String>) -> Self {
        Self {
            pk: None,
            display_name: display_name.into(),
            legal_name: legal_name.into(),
            members: Vec::new(),
        }
    }

    /// Adds a member user.
    #[must_use]
    pub fn with_member(mut self, user: i64) -> Self {
        self.members.push(user);
        self
    }
}

impl Model for Organization {
    fn meta() -> &'static ModelMeta {
        &ORGANIZATION_META
    }

    fn pk(&self) -> Option<Value> {
        self.pk.map(Value::Int)
    }
}

// ── Tax rate ───────────────────────────────────────────────────────────

static TAX_RATE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "taxrate",
    db_table: "books_taxrate".to_string(),
    verbose_name: "tax rate".to_string(),
    verbose_name_plural: "tax rates".to_string(),
    fields: vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            "organization",
            FieldType::ForeignKey {
                to: "books.organization",
                on_delete: OnDelete::Cascade,
                related_name: Some("tax_rates"),
            },
        ),
        FieldDef::new("name", FieldType::CharField).max_length(50),
        FieldDef::new(
            "rate",
            FieldType::DecimalField {
                max_digits: 6,
                decimal_places: 5,
            },
        )
        .help_text("A fraction between 0 and 1"),
    ],
});

/// A named tax rate owned by an organization. The rate is a fraction,
/// e.g. `0.2` for 20% VAT.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxRate {
    /// Primary key, `None` until stored.
    pub pk: Option<i64>,
    /// The owning organization's primary key.
    pub organization: i64,
    pub name: String,
    pub rate: f64,
}

impl TaxRate {
    pub fn new(organization: i64, name: impl Into<String>, rate: f64) -> Self {
        Self {
            pk: None,
            organization,
            name: name.into(),
            rate,
        }
    }
}

impl Model for TaxRate {
    fn meta() -> &'static ModelMeta {
        &TAX_RATE_META
    }

    fn pk(&self) -> Option<Value> {
        self.pk.map(Value::Int)
    }
}

// ── Billing documents ──────────────────────────────────────────────────

fn document_fields(organization_related: &'static str) -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            "organization",
            FieldType::ForeignKey {
                to: "books.organization",
                on_delete: OnDelete::Cascade,
                related_name: Some(organization_related),
            },
        ),
        FieldDef::new("number", FieldType::CharField)
            .max_length(32)
            .verbose_name("Number"),
        FieldDef::new(
            "client",
            FieldType::ForeignKey {
                to: "people.client",
                on_delete: OnDelete::Protect,
                related_name: None,
            },
        ),
        FieldDef::new("draft", FieldType::BooleanField).default(Value::Bool(false)),
        FieldDef::new("sent", FieldType::BooleanField).default(Value::Bool(false)),
        FieldDef::new("paid", FieldType::BooleanField).default(Value::Bool(false)),
        FieldDef::new("date_issued", FieldType::DateField),
        FieldDef::new("date_dued", FieldType::DateField)
            .nullable()
            .blank()
            .verbose_name("Due date")
            .help_text("The date when the total amount should have been collected"),
    ]
}

static ESTIMATE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "estimate",
    db_table: "books_estimate".to_string(),
    verbose_name: "estimate".to_string(),
    verbose_name_plural: "estimates".to_string(),
    fields: document_fields("estimates"),
});

static INVOICE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "invoice",
    db_table: "books_invoice".to_string(),
    verbose_name: "invoice".to_string(),
    verbose_name_plural: "invoices".to_string(),
    fields: document_fields("invoices"),
});

static BILL_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "bill",
    db_table: "books_bill".to_string(),
    verbose_name: "bill".to_string(),
    verbose_name_plural: "bills".to_string(),
    fields: document_fields("bills"),
});

macro_rules! billing_document {
    ($(#[$doc:meta])* $name:ident, $meta:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            /// Primary key, `None` until stored.
            pub pk: Option<i64>,
            /// The owning organization's primary key.
            pub organization: i64,
            pub number: String,
            /// The billed client's primary key.
            pub client: i64,
            pub draft: bool,
            pub sent: bool,
            pub paid: bool,
            pub date_issued: NaiveDate,
            pub date_dued: Option<NaiveDate>,
        }

        impl $name {
            /// Creates an unstored document issued today, with all status
            /// flags cleared and no due date.
            pub fn new(organization: i64, number: impl Into<String>, client: i64) -> Self {
                Self {
                    pk: None,
                    organization,
                    number: number.into(),
                    client,
                    draft: false,
                    sent: false,
                    paid: false,
                    date_issued: chrono::Local::now().date_naive(),
                    date_dued: None,
                }
            }

            /// Sets the issue date.
            #[must_use]
            pub const fn issued_on(mut self, date: NaiveDate) -> Self {
                self.date_issued = date;
                self
            }

            /// Sets the due date.
            #[must_use]
            pub const fn due_on(mut self, date: NaiveDate) -> Self {
                self.date_dued = Some(date);
                self
            }
        }

        impl Model for $name {
            fn meta() -> &'static ModelMeta {
                &$meta
            }

            fn pk(&self) -> Option<Value> {
                self.pk.map(Value::Int)
            }
        }
    };
}

billing_document!(
    /// A quote sent to a client before any work is committed.
    Estimate,
    ESTIMATE_META
);
billing_document!(
    /// A request for payment sent to a client.
    Invoice,
    INVOICE_META
);
billing_document!(
    /// A request for payment received from a supplier.
    Bill,
    BILL_META
);

// ── Line items ─────────────────────────────────────────────────────────

fn line_fields(parent: &'static str, parent_model: &'static str) -> Vec<FieldDef> {
    vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            parent,
            FieldType::ForeignKey {
                to: parent_model,
                on_delete: OnDelete::Cascade,
                related_name: Some("lines"),
            },
        ),
        FieldDef::new("label", FieldType::CharField).max_length(255),
        FieldDef::new("description", FieldType::TextField)
            .nullable()
            .blank(),
        FieldDef::new(
            "unit_price_excl_tax",
            FieldType::DecimalField {
                max_digits: 12,
                decimal_places: 2,
            },
        ),
        FieldDef::new(
            "quantity",
            FieldType::DecimalField {
                max_digits: 8,
                decimal_places: 2,
            },
        )
        .default(Value::Float(1.0)),
        FieldDef::new(
            "tax_rate",
            FieldType::ForeignKey {
                to: "books.taxrate",
                on_delete: OnDelete::Protect,
                related_name: None,
            },
        ),
    ]
}

static ESTIMATE_LINE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "estimateline",
    db_table: "books_estimateline".to_string(),
    verbose_name: "estimate line".to_string(),
    verbose_name_plural: "estimate lines".to_string(),
    fields: line_fields("estimate", "books.estimate"),
});

static INVOICE_LINE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "invoiceline",
    db_table: "books_invoiceline".to_string(),
    verbose_name: "invoice line".to_string(),
    verbose_name_plural: "invoice lines".to_string(),
    fields: line_fields("invoice", "books.invoice"),
});

static BILL_LINE_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "billline",
    db_table: "books_billline".to_string(),
    verbose_name: "bill line".to_string(),
    verbose_name_plural: "bill lines".to_string(),
    fields: line_fields("bill", "books.bill"),
});

macro_rules! billing_line {
    ($(#[$doc:meta])* $name:ident, $parent:ident, $meta:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            /// Primary key, `None` until stored.
            pub pk: Option<i64>,
            /// The parent document's primary key.
            pub $parent: i64,
            pub label: String,
            pub description: String,
            pub unit_price_excl_tax: f64,
            pub quantity: f64,
            /// The applied tax rate's primary key.
            pub tax_rate: i64,
        }

        impl $name {
            /// Creates an unstored line with quantity 1 and no description.
            pub fn new(
                $parent: i64,
                label: impl Into<String>,
                unit_price_excl_tax: f64,
                tax_rate: i64,
            ) -> Self {
                Self {
                    pk: None,
                    $parent,
                    label: label.into(),
                    description: String::new(),
                    unit_price_excl_tax,
                    quantity: 1.0,
                    tax_rate,
                }
            }

            /// Sets the free-text description.
            #[must_use]
            pub fn with_description(mut self, description: impl Into<String>) -> Self {
                self.description = description.into();
                self
            }

            /// Sets the quantity.
            #[must_use]
            pub const fn with_quantity(mut self, quantity: f64) -> Self {
                self.quantity = quantity;
                self
            }
        }

        impl Model for $name {
            fn meta() -> &'static ModelMeta {
                &$meta
            }

            fn pk(&self) -> Option<Value> {
                self.pk.map(Value::Int)
            }
        }
    };
}

billing_line!(
    /// A line of an estimate.
    EstimateLine,
    estimate,
    ESTIMATE_LINE_META
);
billing_line!(
    /// A line of an invoice.
    InvoiceLine,
    invoice,
    INVOICE_LINE_META
);
billing_line!(
    /// A line of a bill.
    BillLine,
    bill,
    BILL_LINE_META
);

// ── Payment ────────────────────────────────────────────────────────────

static PAYMENT_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
    app_label: "books",
    model_name: "payment",
    db_table: "books_payment".to_string(),
    verbose_name: "payment".to_string(),
    verbose_name_plural: "payments".to_string(),
    fields: vec![
        FieldDef::new("id", FieldType::BigAutoField).primary_key(),
        FieldDef::new(
            "amount",
            FieldType::DecimalField {
                max_digits: 12,
                decimal_places: 2,
            },
        ),
        FieldDef::new("reference", FieldType::CharField)
            .max_length(255)
            .nullable()
            .blank(),
        FieldDef::new("detail", FieldType::TextField).nullable().blank(),
        FieldDef::new("date_paid", FieldType::DateField),
    ],
});

/// A payment collected against a billing document.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    /// Primary key, `None` until stored.
    pub pk: Option<i64>,
    pub amount: f64,
    pub reference: String,
    pub detail: String,
    pub date_paid: NaiveDate,
}

impl Payment {
    /// Creates an unstored payment dated today.
    pub fn new(amount: f64) -> Self {
        Self {
            pk: None,
            amount,
            reference: String::new(),
            detail: String::new(),
            date_paid: chrono::Local::now().date_naive(),
        }
    }

    /// Sets the bank or wire reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Sets the free-text detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Sets the payment date.
    #[must_use]
    pub const fn paid_on(mut self, date: NaiveDate) -> Self {
        self.date_paid = date;
        self
    }
}

impl Model for Payment {
    fn meta() -> &'static ModelMeta {
        &PAYMENT_META
    }

    fn pk(&self) -> Option<Value> {
        self.pk.map(Value::Int)
    }
}

// ── Document and line sum types ────────────────────────────────────────

/// The three billing document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Estimate,
    Invoice,
    Bill,
}

impl DocumentKind {
    /// The document model's metadata.
    pub fn meta(self) -> &'static ModelMeta {
        match self {
            Self::Estimate => Estimate::meta(),
            Self::Invoice => Invoice::meta(),
            Self::Bill => Bill::meta(),
        }
    }

    /// The line model's metadata.
    pub fn line_meta(self) -> &'static ModelMeta {
        match self {
            Self::Estimate => EstimateLine::meta(),
            Self::Invoice => InvoiceLine::meta(),
            Self::Bill => BillLine::meta(),
        }
    }

    /// The name of the parent reference field on the line model.
    pub const fn parent_field(self) -> &'static str {
        match self {
            Self::Estimate => "estimate",
            Self::Invoice => "invoice",
            Self::Bill => "bill",
        }
    }

    /// The document type name as it appears in lookup error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Estimate => "Estimate",
            Self::Invoice => "Invoice",
            Self::Bill => "Bill",
        }
    }
}

/// A line item of any of the three document types.
///
/// Code that works across document types (the store, the tax-rate
/// restriction) matches on this instead of taking three parallel paths.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLine {
    Estimate(EstimateLine),
    Invoice(InvoiceLine),
    Bill(BillLine),
}

impl DocumentLine {
    /// The document type this line belongs to.
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Estimate(_) => DocumentKind::Estimate,
            Self::Invoice(_) => DocumentKind::Invoice,
            Self::Bill(_) => DocumentKind::Bill,
        }
    }

    /// The concrete line model's metadata.
    pub fn meta(&self) -> &'static ModelMeta {
        self.kind().line_meta()
    }

    /// The line's own primary key, `None` until stored.
    pub const fn pk(&self) -> Option<i64> {
        match self {
            Self::Estimate(l) => l.pk,
            Self::Invoice(l) => l.pk,
            Self::Bill(l) => l.pk,
        }
    }

    /// The parent document's primary key.
    pub const fn document_pk(&self) -> i64 {
        match self {
            Self::Estimate(l) => l.estimate,
            Self::Invoice(l) => l.invoice,
            Self::Bill(l) => l.bill,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Estimate(l) => &l.label,
            Self::Invoice(l) => &l.label,
            Self::Bill(l) => &l.label,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Estimate(l) => &l.description,
            Self::Invoice(l) => &l.description,
            Self::Bill(l) => &l.description,
        }
    }

    pub const fn unit_price_excl_tax(&self) -> f64 {
        match self {
            Self::Estimate(l) => l.unit_price_excl_tax,
            Self::Invoice(l) => l.unit_price_excl_tax,
            Self::Bill(l) => l.unit_price_excl_tax,
        }
    }

    pub const fn quantity(&self) -> f64 {
        match self {
            Self::Estimate(l) => l.quantity,
            Self::Invoice(l) => l.quantity,
            Self::Bill(l) => l.quantity,
        }
    }

    /// The applied tax rate's primary key.
    pub const fn tax_rate(&self) -> i64 {
        match self {
            Self::Estimate(l) => l.tax_rate,
            Self::Invoice(l) => l.tax_rate,
            Self::Bill(l) => l.tax_rate,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)] // constructor-set values compare exactly
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_model_labels() {
        assert_eq!(Organization::meta().label(), "books.organization");
        assert_eq!(TaxRate::meta().label(), "books.taxrate");
        assert_eq!(Estimate::meta().label(), "books.estimate");
        assert_eq!(Invoice::meta().label(), "books.invoice");
        assert_eq!(Bill::meta().label(), "books.bill");
        assert_eq!(EstimateLine::meta().label(), "books.estimateline");
        assert_eq!(InvoiceLine::meta().label(), "books.invoiceline");
        assert_eq!(BillLine::meta().label(), "books.billline");
        assert_eq!(Payment::meta().label(), "books.payment");
    }

    #[test]
    fn test_document_meta_editable_fields() {
        for kind in [
            DocumentKind::Estimate,
            DocumentKind::Invoice,
            DocumentKind::Bill,
        ] {
            let meta = kind.meta();
            for name in [
                "number",
                "client",
                "draft",
                "sent",
                "paid",
                "date_issued",
                "date_dued",
            ] {
                assert!(meta.get_field(name).is_some(), "{name} missing on {kind:?}");
            }
        }
    }

    #[test]
    fn test_line_meta_editable_fields() {
        for kind in [
            DocumentKind::Estimate,
            DocumentKind::Invoice,
            DocumentKind::Bill,
        ] {
            let meta = kind.line_meta();
            for name in [
                "label",
                "description",
                "unit_price_excl_tax",
                "quantity",
                "tax_rate",
            ] {
                assert!(meta.get_field(name).is_some(), "{name} missing on {kind:?}");
            }
            assert!(meta.get_field(kind.parent_field()).is_some());
        }
    }

    #[test]
    fn test_status_flags_default_false() {
        let meta = Invoice::meta();
        for flag in ["draft", "sent", "paid"] {
            let field = meta.get_field(flag).unwrap();
            assert_eq!(field.default, Some(Value::Bool(false)));
            assert!(!field.required_for_forms());
        }
    }

    #[test]
    fn test_due_date_is_optional() {
        let field = Bill::meta().get_field("date_dued").unwrap();
        assert!(field.null);
        assert!(field.blank);
        assert!(!field.required_for_forms());
        assert_eq!(field.verbose_name.as_deref(), Some("Due date"));
    }

    #[test]
    fn test_number_is_required_char() {
        let field = Estimate::meta().get_field("number").unwrap();
        assert_eq!(field.field_type, FieldType::CharField);
        assert!(field.required_for_forms());
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let field = InvoiceLine::meta().get_field("quantity").unwrap();
        assert_eq!(field.default, Some(Value::Float(1.0)));
        assert!(!field.required_for_forms());
    }

    #[test]
    fn test_rate_precision() {
        let field = TaxRate::meta().get_field("rate").unwrap();
        assert_eq!(
            field.field_type,
            FieldType::DecimalField {
                max_digits: 6,
                decimal_places: 5
            }
        );
    }

    #[test]
    fn test_members_is_blank_many_to_many() {
        let field = Organization::meta().get_field("members").unwrap();
        assert!(field.blank);
        assert!(matches!(
            field.field_type,
            FieldType::ManyToManyField {
                to: "people.user",
                ..
            }
        ));
    }

    #[test]
    fn test_payment_optional_fields() {
        let meta = Payment::meta();
        assert!(!meta.get_field("reference").unwrap().required_for_forms());
        assert!(!meta.get_field("detail").unwrap().required_for_forms());
        assert!(meta.get_field("amount").unwrap().required_for_forms());
    }

    #[test]
    fn test_new_document_state() {
        let invoice = Invoice::new(1, "INV-2026-0001", 3);
        assert!(invoice.pk.is_none());
        assert!(!invoice.draft && !invoice.sent && !invoice.paid);
        assert!(invoice.date_dued.is_none());

        let due = NaiveDate::from_ymd_opt(2026, 9, 30).unwrap();
        let invoice = invoice.due_on(due);
        assert_eq!(invoice.date_dued, Some(due));
    }

    #[test]
    fn test_new_line_state() {
        let line = BillLine::new(4, "Hosting", 29.99, 2);
        assert_eq!(line.quantity, 1.0);
        assert!(line.description.is_empty());
        let line = line.with_quantity(12.0).with_description("Monthly plan");
        assert_eq!(line.quantity, 12.0);
        assert_eq!(line.description, "Monthly plan");
    }

    #[test]
    fn test_document_line_accessors() {
        let line = DocumentLine::Invoice(
            InvoiceLine::new(7, "Consulting", 650.0, 1).with_quantity(3.0),
        );
        assert_eq!(line.kind(), DocumentKind::Invoice);
        assert_eq!(line.document_pk(), 7);
        assert_eq!(line.label(), "Consulting");
        assert_eq!(line.quantity(), 3.0);
        assert_eq!(line.tax_rate(), 1);
        assert_eq!(line.meta().label(), "books.invoiceline");
        assert!(line.pk().is_none());
    }

    #[test]
    fn test_document_kind_names() {
        assert_eq!(DocumentKind::Estimate.parent_field(), "estimate");
        assert_eq!(DocumentKind::Invoice.parent_field(), "invoice");
        assert_eq!(DocumentKind::Bill.parent_field(), "bill");
        assert_eq!(DocumentKind::Bill.name(), "Bill");
    }

    #[test]
    fn test_model_pk_values() {
        let mut org = Organization::new("Acme", "Acme Ltd");
        assert!(org.pk().is_none());
        org.pk = Some(9);
        assert_eq!(Model::pk(&org), Some(Value::Int(9)));
    }
}
