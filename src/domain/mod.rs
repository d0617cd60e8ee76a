//! Core domain types
//!
//! Pure types with no I/O dependencies: sensor kinds, readings, errors and
//! client configuration profiles.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
