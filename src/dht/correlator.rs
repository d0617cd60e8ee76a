//! DhtClient: configures DHT sensors and performs the timed request/reply
//! exchange for readings.
//!
//! The firmware's reply carries no request id, only the pin number, so
//! replies are matched by pin:
//!
//! ```text
//! UNCONFIGURED ──configure──▶ CONFIGURED ──get_data sends──▶ AWAITING_REPLY
//!                                 ▲   ▲                          │      │
//!                                 │   └──────── timeout ─────────┘      │ handler
//!                                 └──── get_data takes ◀── REPLY_READY ◀┘
//! ```
//!
//! A reply that arrives after a timeout lands in the slot and is discarded
//! by the next `get_data`, which clears the slot before sending. A late reply
//! that arrives after that send is indistinguishable from the fresh one.
//! Callers must not issue concurrent `get_data` calls for the same pin.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::{DhtReading, DhtType, FirmataError, FirmataResult, Pin, DEFAULT_REPLY_TIMEOUT};
use crate::ports::SysexTransport;

use super::{DhtRegistry, ReplyTable, DHT_CONFIG, DHT_DATA};

/// Default reply timeout, shared with `ClientConfig`
pub const REPLY_TIMEOUT: Duration = DEFAULT_REPLY_TIMEOUT;

/// DHT extension layered on a Firmata transport by composition.
pub struct DhtClient {
    transport: Arc<dyn SysexTransport>,
    sensors: Mutex<HashMap<Pin, DhtType>>,
    replies: Arc<ReplyTable>,
    reply_timeout: Duration,
    poll_interval: Duration,
}

impl DhtClient {
    /// Register the DHT reply handler with `transport` and wrap it.
    pub fn attach(transport: Arc<dyn SysexTransport>) -> Self {
        let replies = Arc::new(ReplyTable::new());
        let registry = DhtRegistry::new(Arc::clone(&replies));
        transport.extend_handlers(registry.register_handlers());

        let poll_interval = transport.sleep_tune();
        Self {
            transport,
            sensors: Mutex::new(HashMap::new()),
            replies,
            reply_timeout: REPLY_TIMEOUT,
            poll_interval,
        }
    }

    /// Override the reply timeout (default 2 s)
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    fn sensors(&self) -> MutexGuard<'_, HashMap<Pin, DhtType>> {
        self.sensors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the sensor type for `pin` and tell the firmware about it.
    ///
    /// Any reply already waiting in the pin's slot is left alone.
    pub fn configure(&self, pin: Pin, sensor: DhtType) -> FirmataResult<()> {
        if let Some(previous) = self.sensors().insert(pin, sensor) {
            if previous != sensor {
                log::info!("Pin {pin}: sensor changed from {previous} to {sensor}");
            }
        }
        log::info!("Configuring {sensor} on pin {pin}");
        self.transport
            .send_sysex(DHT_CONFIG, &[pin, sensor.wire_value()])
    }

    /// Sensor type recorded for `pin`, if configured
    pub fn sensor_type(&self, pin: Pin) -> Option<DhtType> {
        self.sensors().get(&pin).copied()
    }

    /// Every configured pin, ascending
    pub fn configured_pins(&self) -> Vec<Pin> {
        let mut pins: Vec<Pin> = self.sensors().keys().copied().collect();
        pins.sort_unstable();
        pins
    }

    /// Request a fresh reading for `pin` and wait for the reply.
    ///
    /// Returns `Ok(None)` if no reply arrives within the reply timeout.
    /// Fails with `FirmataError::Config` if `pin` was never configured.
    pub fn get_data(&self, pin: Pin) -> FirmataResult<Option<DhtReading>> {
        let sensor = self.sensor_type(pin).ok_or_else(|| {
            FirmataError::Config(format!(
                "DHT sensor type unknown for pin {pin}: call configure first"
            ))
        })?;

        self.replies.clear(pin);
        self.transport.send_sysex(DHT_DATA, &[pin])?;

        let reading = self
            .replies
            .wait_take(pin, self.reply_timeout, self.poll_interval);
        if reading.is_none() {
            log::warn!(
                "No reply from {sensor} on pin {pin} within {} ms",
                self.reply_timeout.as_millis()
            );
        }
        Ok(reading)
    }
}
