//! Users, clients, and directory lookups for tally-rs.
//!
//! This crate holds the people side of the bookkeeping domain:
//!
//! - [`models`]: the `User` and `Client` model types and their metadata
//! - [`directory`]: async lookup traits plus an in-memory implementation
//! - [`forms`]: user-selection form field builders for autocomplete widgets

pub mod directory;
pub mod forms;
pub mod models;

pub use directory::{ClientDirectory, MemoryDirectory, UserDirectory};
pub use forms::{user_choice_field, user_choices, user_multiple_choice_field};
pub use models::{Client, User};
