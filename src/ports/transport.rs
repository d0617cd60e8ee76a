//! Sysex transport port trait
//!
//! The contract a Firmata client must offer so that command extensions can
//! be layered on top of it without subclassing: send a custom sysex command,
//! extend the inbound dispatch table, and expose the poll tuning value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::FirmataResult;

/// Callback for one inbound sysex command code.
///
/// Receives the raw frame `[command, payload..., END_SYSEX]` and runs on the
/// transport's receive thread, so it must be quick and must not block.
pub type SysexHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Inbound dispatch table: sysex command code → handler
pub type HandlerTable = HashMap<u8, SysexHandler>;

pub trait SysexTransport: Send + Sync {
    /// Send `[START_SYSEX, command, data..., END_SYSEX]` to the board
    fn send_sysex(&self, command: u8, data: &[u8]) -> FirmataResult<()>;

    /// Merge `handlers` into the inbound dispatch table, replacing any
    /// existing handler registered for the same code
    fn extend_handlers(&self, handlers: HandlerTable);

    /// Interval used when polling for a reply
    fn sleep_tune(&self) -> Duration;
}
