//! Adapters: implementations of port traits
//!
//! These connect the core logic to real hardware (serial port) or to
//! in-memory stand-ins (mock board), and persist configuration profiles.

pub mod mock_board;
pub mod profile_store;
pub mod serial_port;
