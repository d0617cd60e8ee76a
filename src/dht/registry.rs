//! DHT command codes and the inbound handler for DHT replies.

use std::sync::Arc;

use crate::domain::{DhtReading, FirmataError, FirmataResult, Pin};
use crate::ports::HandlerTable;

use super::ReplyTable;

/// Configure a DHT sensor: payload `[pin, sensor_type]`
pub const DHT_CONFIG: u8 = 0x66;

/// Request (`[pin]`) and reply (`[pin, temperature, humidity]`) for DHT data
pub const DHT_DATA: u8 = 0x67;

/// Payload length of a DHT data reply
const DHT_REPLY_LEN: usize = 3;

/// Parse a raw `[DHT_DATA, pin, temperature, humidity, END_SYSEX]` frame.
///
/// The first and last byte are the frame markers and are not checked here.
pub fn parse_reply(frame: &[u8]) -> FirmataResult<(Pin, DhtReading)> {
    if frame.len() < 2 {
        return Err(FirmataError::Protocol(format!(
            "DHT reply frame too short: {frame:02X?}"
        )));
    }

    match &frame[1..frame.len() - 1] {
        &[pin, temperature, humidity] => Ok((pin, DhtReading { temperature, humidity })),
        payload => Err(FirmataError::Protocol(format!(
            "DHT reply payload must be {DHT_REPLY_LEN} bytes, got {}: {payload:02X?}",
            payload.len()
        ))),
    }
}

/// Wires the DHT reply command into a transport's dispatch table and writes
/// parsed replies into the shared reply slots.
#[derive(Debug, Clone)]
pub struct DhtRegistry {
    replies: Arc<ReplyTable>,
}

impl DhtRegistry {
    pub fn new(replies: Arc<ReplyTable>) -> Self {
        Self { replies }
    }

    /// Handler table to merge into the transport: `DHT_DATA` → `handle_inbound`
    pub fn register_handlers(&self) -> HandlerTable {
        let registry = self.clone();
        let mut table = HandlerTable::new();
        table.insert(
            DHT_DATA,
            Arc::new(move |frame: &[u8]| registry.handle_inbound(frame)),
        );
        table
    }

    /// Store the reading carried by `frame` in the slot for its pin.
    ///
    /// A reply for a pin with no pending request still lands in its slot.
    /// Malformed frames are logged and dropped, leaving the slot unset.
    pub fn handle_inbound(&self, frame: &[u8]) {
        match parse_reply(frame) {
            Ok((pin, reading)) => {
                log::debug!(
                    "DHT pin {pin}: {}°C {}%",
                    reading.temperature,
                    reading.humidity
                );
                self.replies.store(pin, reading);
            }
            Err(e) => log::warn!("Dropping DHT reply: {e}"),
        }
    }
}
