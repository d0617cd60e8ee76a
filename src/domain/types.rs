//! Core domain types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FirmataError, FirmataResult};

/// Board pin number as sent on the wire (7-bit in sysex payloads)
pub type Pin = u8;

/// DHT sensor family. The discriminant is the value sent to the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DhtType {
    #[default]
    Dht11 = 11,
    Dht21 = 21,
    Dht22 = 22,
}

impl DhtType {
    /// The AM2301 is wire-identical to the DHT21.
    pub const AM2301: DhtType = DhtType::Dht21;

    pub fn wire_value(self) -> u8 {
        self as u8
    }

    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            11 => Some(Self::Dht11),
            21 => Some(Self::Dht21),
            22 => Some(Self::Dht22),
            _ => None,
        }
    }
}

impl fmt::Display for DhtType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dht11 => "DHT11",
            Self::Dht21 => "DHT21",
            Self::Dht22 => "DHT22",
        };
        f.write_str(name)
    }
}

impl FromStr for DhtType {
    type Err = FirmataError;

    fn from_str(s: &str) -> FirmataResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dht11" | "11" => Ok(Self::Dht11),
            "dht21" | "am2301" | "21" => Ok(Self::Dht21),
            "dht22" | "22" => Ok(Self::Dht22),
            other => Err(FirmataError::Config(format!("Unknown DHT sensor type: '{other}'"))),
        }
    }
}

/// One temperature/humidity sample reported by the board firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhtReading {
    /// Degrees Celsius, as reported by the firmware
    pub temperature: u8,
    /// Relative humidity in percent
    pub humidity: u8,
}

/// Information about a serial port
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialPortInfo {
    pub name: String,
    pub port_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_match_firmware_constants() {
        assert_eq!(DhtType::Dht11.wire_value(), 11);
        assert_eq!(DhtType::Dht22.wire_value(), 22);
        assert_eq!(DhtType::Dht21.wire_value(), 21);
        assert_eq!(DhtType::AM2301.wire_value(), 21);
    }

    #[test]
    fn am2301_is_dht21() {
        assert_eq!(DhtType::AM2301, DhtType::Dht21);
        assert_eq!("am2301".parse::<DhtType>().unwrap(), DhtType::Dht21);
    }

    #[test]
    fn default_sensor_is_dht11() {
        assert_eq!(DhtType::default(), DhtType::Dht11);
    }

    #[test]
    fn from_wire_rejects_unknown_values() {
        assert_eq!(DhtType::from_wire(22), Some(DhtType::Dht22));
        assert_eq!(DhtType::from_wire(12), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("DHT22".parse::<DhtType>().unwrap(), DhtType::Dht22);
        assert!("dht99".parse::<DhtType>().is_err());
    }

    #[test]
    fn reading_serializes_to_json() {
        let reading = DhtReading { temperature: 26, humidity: 34 };
        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, r#"{"temperature":26,"humidity":34}"#);
    }
}
