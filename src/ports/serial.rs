//! Serial port traits
//!
//! Split into two traits:
//! - `SerialFactory`: static methods for listing and opening ports
//! - `SerialConnection`: instance methods for reading/writing data

use crate::domain::{FirmataResult, SerialPortInfo};

/// Factory for creating serial connections.
pub trait SerialFactory {
    /// List available serial ports on the system
    fn list_ports() -> FirmataResult<Vec<SerialPortInfo>>;

    /// Open a serial port at the given baud rate, returning a boxed connection
    fn open(port: &str, baud_rate: u32) -> FirmataResult<Box<dyn SerialConnection>>;
}

/// Trait for an open serial port connection.
/// Only requires `Send` (not `Sync`), always accessed behind a Mutex or
/// owned by a single thread.
pub trait SerialConnection: Send {
    /// Write bytes to the port
    fn write(&mut self, data: &[u8]) -> FirmataResult<usize>;

    /// Write the whole buffer, retrying short writes
    fn write_all(&mut self, mut data: &[u8]) -> FirmataResult<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(crate::domain::FirmataError::Serial(
                    "Write returned zero bytes".into(),
                ));
            }
            data = &data[n..];
        }
        Ok(())
    }

    /// Read bytes from the port. Returns `Ok(0)` when the read timed out.
    fn read(&mut self, buffer: &mut [u8]) -> FirmataResult<usize>;

    /// Open a second handle on the same port so reads and writes can run on
    /// different threads.
    fn try_clone(&self) -> FirmataResult<Box<dyn SerialConnection>>;

    /// Close the connection
    fn close(&mut self) -> FirmataResult<()>;

    /// Check if the port is still connected
    fn is_connected(&self) -> bool;
}
