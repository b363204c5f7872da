//! Utility types for the tally-rs workspace.
//!
//! - [`MultiValueDict`]: A dictionary that can hold multiple values per key,
//!   backing submitted form data.

mod multi_value_dict;

pub use multi_value_dict::MultiValueDict;
