//! Firmata DHT client
//!
//! Talks to a Firmata board running the DHT sysex extension: configure a
//! DHT11/DHT21/DHT22 sensor on a pin, then request readings and wait for the
//! board's asynchronous reply.
//!
//! ## Architecture (Hexagonal / Ports & Adapters)
//!
//! - `domain/` - Pure domain types, no I/O dependencies
//! - `ports/` - Trait definitions (serial I/O, sysex transport contract)
//! - `firmata/` - Sysex framing and the session that runs the receive loop
//! - `dht/` - The DHT command extension and request/reply correlation
//! - `adapters/` - Implementations of ports (serialport, mock board, profiles)

// Core domain (pure, no I/O)
pub mod domain;
pub mod ports;

// Protocol layers
pub mod dht;
pub mod firmata;

// Adapters (external I/O)
pub mod adapters;

use std::sync::Arc;

use adapters::serial_port::SerialPortFactory;
use dht::DhtClient;
use domain::{ClientConfig, FirmataError, FirmataResult};
use firmata::FirmataSession;
use ports::{SerialConnection, SerialFactory};

/// Open a session on `serial` and attach the DHT extension to it.
///
/// The session is returned alongside the client so the caller controls when
/// the port is closed.
pub fn connect_with(
    serial: Box<dyn SerialConnection>,
    config: &ClientConfig,
) -> FirmataResult<(Arc<FirmataSession>, DhtClient)> {
    let session = Arc::new(FirmataSession::open(serial, config)?);
    let client = DhtClient::attach(session.clone()).with_reply_timeout(config.reply_timeout());
    Ok((session, client))
}

/// Open the serial port named in `config` and attach the DHT extension.
pub fn connect(config: &ClientConfig) -> FirmataResult<(Arc<FirmataSession>, DhtClient)> {
    let port = config
        .serial_port
        .as_deref()
        .ok_or_else(|| FirmataError::Config("No serial port configured".into()))?;
    let serial = SerialPortFactory::open(port, config.baud_rate)?;
    connect_with(serial, config)
}
