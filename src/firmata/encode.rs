//! Pure encoding: (sysex command, data) → wire bytes.
//!
//! No I/O, no side effects. Easy to unit-test without any serial port.

use crate::domain::{FirmataError, FirmataResult};

use super::{END_SYSEX, MAX_DATA_BYTE, START_SYSEX};

/// Encode a sysex message, including the start and end markers.
///
/// Returns `Err` if any data byte has its high bit set; such a byte would be
/// read by the firmware as a new command.
pub fn encode_sysex(command: u8, data: &[u8]) -> FirmataResult<Vec<u8>> {
    if command > MAX_DATA_BYTE {
        return Err(FirmataError::Protocol(format!(
            "Sysex command 0x{command:02X} is not a 7-bit value"
        )));
    }
    if let Some(bad) = data.iter().find(|&&b| b > MAX_DATA_BYTE) {
        return Err(FirmataError::Protocol(format!(
            "Sysex 0x{command:02X} data byte 0x{bad:02X} is not a 7-bit value"
        )));
    }

    let mut wire = Vec::with_capacity(data.len() + 3);
    wire.push(START_SYSEX);
    wire.push(command);
    wire.extend_from_slice(data);
    wire.push(END_SYSEX);
    Ok(wire)
}
