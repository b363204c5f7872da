//! # tally-rs
//!
//! Multi-tenant billing forms for Rust, in the Django mould.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. You can depend on `tally-rs` to get the whole stack, or depend
//! on individual crates for finer-grained control.

/// Core types, settings, and error types.
pub use tally_rs_core as core;

/// Model metadata, typed values, and validators.
#[cfg(feature = "models")]
pub use tally_rs_models as models;

/// Forms, model forms, formsets, and widgets.
#[cfg(feature = "forms")]
pub use tally_rs_forms as forms;

/// Users, clients, and their directory-backed choice fields.
#[cfg(feature = "people")]
pub use tally_rs_people as people;

/// Billing documents, tenancy resolution, and the billing forms.
#[cfg(feature = "books")]
pub use tally_rs_books as books;
