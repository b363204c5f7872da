//! Billing for tally-rs: documents, tenancy, and the billing forms.
//!
//! This crate covers the accounting side of the framework:
//!
//! - [`models`]: organizations, tax rates, the three billing documents
//!   (estimate, invoice, bill) with their line items, and payments
//! - [`store`]: the async [`BooksStore`] lookup trait and an in-memory
//!   implementation
//! - [`tenancy`]: resolving the organization selected by a request
//! - [`client_field`]: the tenant-scoped client autocomplete field
//! - [`forms`]: builder functions for the document, line, and auxiliary
//!   forms
//! - [`formsets`]: line-item formsets with the shared row policy
//!
//! Every form builder scopes its choices to one organization's data, so a
//! request can never submit another tenant's clients or tax rates.

pub mod client_field;
pub mod forms;
pub mod formsets;
pub mod models;
pub mod store;
pub mod tenancy;

pub use client_field::{ClientChoices, SEARCH_PARAM};
pub use forms::{
    bill_form, bill_line_form, document_form, estimate_form, estimate_line_form, invoice_form,
    invoice_line_form, line_form, organization_form, payment_form, restrict_to_organization,
    tax_rate_form,
};
pub use formsets::{
    bill_line_formset, estimate_line_formset, invoice_line_formset, line_formset, LINE_PREFIX,
};
pub use models::{
    Bill, BillLine, DocumentKind, DocumentLine, Estimate, EstimateLine, Invoice, InvoiceLine,
    Organization, Payment, TaxRate,
};
pub use store::{BooksStore, MemoryBooks};
pub use tenancy::{OrganizationResolver, RequestContext, SessionOrganizationResolver};
