//! Serial port adapter using the `serialport` crate
//!
//! Implements `SerialFactory` and `SerialConnection` traits.
//! `SerialPortFactory` has no instance data, just static methods for
//! listing/opening ports.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use crate::domain::{FirmataError, FirmataResult, SerialPortInfo};
use crate::ports::{SerialConnection, SerialFactory};

/// Per-read timeout; bounds how long the reader thread takes to notice shutdown
const READ_TIMEOUT_MS: u64 = 100;

/// Zero-sized factory for creating serial port connections.
pub struct SerialPortFactory;

impl SerialFactory for SerialPortFactory {
    fn list_ports() -> FirmataResult<Vec<SerialPortInfo>> {
        let ports = serialport::available_ports()
            .map_err(|e| FirmataError::Serial(format!("Failed to list ports: {e}")))?;

        Ok(ports
            .into_iter()
            .map(|p| {
                let port_type = match &p.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        format!("USB ({:04X}:{:04X})", info.vid, info.pid)
                    }
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::Unknown => "Native".to_string(),
                };
                SerialPortInfo {
                    name: p.port_name,
                    port_type,
                }
            })
            .collect())
    }

    fn open(port: &str, baud_rate: u32) -> FirmataResult<Box<dyn SerialConnection>> {
        let serial = serialport::new(port, baud_rate)
            .timeout(Duration::from_millis(READ_TIMEOUT_MS))
            .open()
            .map_err(|e| FirmataError::Serial(format!("Failed to open {port}: {e}")))?;

        log::info!("Opened {port} at {baud_rate} baud");
        Ok(Box::new(SerialPortConnection {
            port: serial,
            connected: true,
        }))
    }
}

/// An open serial port connection wrapping the `serialport` crate.
pub struct SerialPortConnection {
    port: Box<dyn serialport::SerialPort>,
    connected: bool,
}

impl SerialConnection for SerialPortConnection {
    fn write(&mut self, data: &[u8]) -> FirmataResult<usize> {
        if !self.connected {
            return Err(FirmataError::Serial("Write failed: port closed".into()));
        }
        self.port
            .write(data)
            .map_err(|e| FirmataError::Serial(format!("Write failed: {e}")))
    }

    fn read(&mut self, buffer: &mut [u8]) -> FirmataResult<usize> {
        if !self.connected {
            return Err(FirmataError::Serial("Read failed: port closed".into()));
        }
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(FirmataError::Serial(format!("Read failed: {e}"))),
        }
    }

    fn try_clone(&self) -> FirmataResult<Box<dyn SerialConnection>> {
        let port = self
            .port
            .try_clone()
            .map_err(|e| FirmataError::Serial(format!("Failed to clone port: {e}")))?;
        Ok(Box::new(SerialPortConnection {
            port,
            connected: self.connected,
        }))
    }

    fn close(&mut self) -> FirmataResult<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Pseudo-terminal pair standing in for a board on the other end
    fn pty_connection() -> (SerialPortConnection, serialport::TTYPort) {
        let (host, board) = serialport::TTYPort::pair().unwrap();
        let conn = SerialPortConnection {
            port: Box::new(host),
            connected: true,
        };
        (conn, board)
    }

    #[test]
    fn open_connection_writes_through() {
        let (mut conn, _board) = pty_connection();
        assert_eq!(conn.write(&[0xF0, 0x67, 2, 0xF7]).unwrap(), 4);
    }

    #[test]
    fn closed_connection_rejects_writes_and_reads() {
        let (mut conn, _board) = pty_connection();
        conn.close().unwrap();
        assert!(!conn.is_connected());
        assert!(matches!(conn.write(&[0xF0, 0x67, 2, 0xF7]), Err(FirmataError::Serial(_))));
        let mut buf = [0u8; 8];
        assert!(matches!(conn.read(&mut buf), Err(FirmataError::Serial(_))));
    }

    #[test]
    fn clone_of_closed_connection_is_closed() {
        let (mut conn, _board) = pty_connection();
        conn.close().unwrap();
        let mut clone = conn.try_clone().unwrap();
        assert!(!clone.is_connected());
        assert!(clone.write(&[0xF0]).is_err());
    }
}
