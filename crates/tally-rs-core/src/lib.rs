//! # tally-rs-core
//!
//! Error types, settings, logging, and shared utilities for the tally-rs
//! workspace. This crate has zero domain dependencies and provides the
//! foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Application settings and global configuration
//! - [`settings_loader`] - TOML/JSON/env settings loading
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Utility types (`MultiValueDict`)

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{TallyError, TallyResult, ValidationError};
pub use settings::{Settings, SETTINGS};
