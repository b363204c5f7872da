//! # tally-rs-models
//!
//! Model metadata layer for the tally-rs framework. Provides the
//! [`Model`](meta::Model) trait for describing stored entities,
//! [`ModelMeta`](meta::ModelMeta) carrying per-model field definitions, the
//! backend-agnostic [`Value`](value::Value) enum, and field validators.
//!
//! Forms consume this metadata to generate fields, convert submitted strings
//! into typed values, and run validators. The crate itself performs no
//! storage; stores for concrete models live in the application crates.
//!
//! ## Module Overview
//!
//! - [`meta`] - The [`Model`](meta::Model) trait and [`ModelMeta`](meta::ModelMeta)
//! - [`fields`] - Field definitions ([`FieldDef`](fields::FieldDef)) and types
//! - [`value`] - The backend-agnostic [`Value`](value::Value) enum
//! - [`validators`] - Field validators

// struct_excessive_bools: FieldDef mirrors a form-facing field API which uses many booleans
#![allow(clippy::struct_excessive_bools)]
// result_large_err: TallyError is the framework error type and should be used consistently
#![allow(clippy::result_large_err)]

pub mod fields;
pub mod meta;
pub mod validators;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use fields::{FieldDef, FieldType, OnDelete};
pub use meta::{Model, ModelMeta};
pub use validators::{
    MaxLengthValidator, MaxValueValidator, MinLengthValidator, MinValueValidator, Validator,
};
pub use value::Value;
