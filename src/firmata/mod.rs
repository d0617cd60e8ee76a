//! Minimal Firmata sysex layer.
//!
//! This module separates the three concerns of talking sysex to a board:
//! - `encode`: translate (command, data) → wire bytes (pure, no I/O)
//! - `decode`: split an inbound byte stream into sysex frames (pure, no I/O)
//! - `session`: own the serial port, run the receive loop, dispatch frames
//!
//! Only sysex framing is implemented. Pin modes, digital/analog reporting
//! and the firmware handshake are left to a full Firmata client.

pub mod decode;
pub mod encode;
pub mod session;

pub use decode::SysexParser;
pub use encode::encode_sysex;
pub use session::FirmataSession;

/// Start of a sysex message
pub const START_SYSEX: u8 = 0xF0;

/// End of a sysex message
pub const END_SYSEX: u8 = 0xF7;

/// Largest data byte allowed inside a sysex message
pub const MAX_DATA_BYTE: u8 = 0x7F;
