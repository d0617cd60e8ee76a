//! Client configuration profiles
//!
//! A ClientConfig is a saved profile for one board setup: which serial port,
//! how fast, and the timing knobs of the DHT request/reply exchange.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// StandardFirmata default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Wall-clock limit for a DHT reply, measured from the request send
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

fn default_arduino_wait_ms() -> u64 {
    2000
}

fn default_sleep_tune_us() -> u64 {
    100
}

fn default_reply_timeout_ms() -> u64 {
    DEFAULT_REPLY_TIMEOUT.as_millis() as u64
}

/// A saved configuration profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Profile name (e.g., "Greenhouse Uno")
    pub name: String,
    /// Selected serial port name
    pub serial_port: Option<String>,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Time to wait after opening the port while the board resets
    #[serde(default = "default_arduino_wait_ms")]
    pub arduino_wait_ms: u64,
    /// Poll interval used while waiting for a reply
    #[serde(default = "default_sleep_tune_us")]
    pub sleep_tune_us: u64,
    /// How long `get_data` waits for a DHT reply before giving up
    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,
}

impl ClientConfig {
    pub fn arduino_wait(&self) -> Duration {
        Duration::from_millis(self.arduino_wait_ms)
    }

    pub fn sleep_tune(&self) -> Duration {
        Duration::from_micros(self.sleep_tune_us)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_millis(self.reply_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            arduino_wait_ms: default_arduino_wait_ms(),
            sleep_tune_us: default_sleep_tune_us(),
            reply_timeout_ms: default_reply_timeout_ms(),
        }
    }
}
