//! Port traits (interfaces)
//!
//! These traits define the boundaries between the core logic and external I/O.
//! Adapters implement these traits to connect to real hardware.

pub mod serial;
pub mod transport;

pub use serial::*;
pub use transport::*;
