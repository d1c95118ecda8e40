//! Configuration module for linemark
//!
//! This module holds the parse options and their loading from JSON or TOML
//! files, with graceful fallback to defaults.

mod options;
mod persistence;

pub use options::*;
pub use persistence::*;
