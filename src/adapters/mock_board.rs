//! Mock board adapter for development and testing without hardware.
//!
//! Emulates a Firmata board running the DHT sysex extension. Activate from
//! the CLI with `--mock`:
//!
//!   RUST_LOG=firmata_dht=info cargo run -- --mock --pin 2 --sensor dht22
//!
//! Every sysex message the board receives is logged at INFO level so you can
//! verify exactly what a real board would be sent.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::dht::{DHT_CONFIG, DHT_DATA};
use crate::domain::{DhtReading, DhtType, FirmataError, FirmataResult, Pin};
use crate::firmata::{encode_sysex, SysexParser};
use crate::ports::SerialConnection;

/// How long a read waits for board output before reporting a timeout
const READ_TIMEOUT: Duration = Duration::from_millis(20);

#[derive(Default)]
struct BoardState {
    parser: SysexParser,
    sensors: HashMap<Pin, DhtType>,
    readings: HashMap<Pin, DhtReading>,
    received: Vec<Vec<u8>>,
    silent: bool,
}

struct BoardInner {
    state: Mutex<BoardState>,
    to_host: Sender<Vec<u8>>,
    from_board: Receiver<Vec<u8>>,
}

/// In-memory DHT firmware. Cloning yields another handle on the same board.
#[derive(Clone)]
pub struct MockBoard {
    inner: Arc<BoardInner>,
}

impl MockBoard {
    pub fn new() -> Self {
        let (to_host, from_board) = crossbeam_channel::unbounded();
        log::info!("[MOCK BOARD] Initialized");
        Self {
            inner: Arc::new(BoardInner {
                state: Mutex::new(BoardState::default()),
                to_host,
                from_board,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// A serial connection wired to this board
    pub fn connection(&self) -> Box<dyn SerialConnection> {
        Box::new(MockBoardConnection {
            board: self.clone(),
            pending: Vec::new(),
            connected: true,
        })
    }

    /// Reading the sensor on `pin` reports from now on
    pub fn set_reading(&self, pin: Pin, reading: DhtReading) {
        self.state().readings.insert(pin, reading);
    }

    /// Simulate a sensor that stopped answering
    pub fn clear_reading(&self, pin: Pin) {
        self.state().readings.remove(&pin);
    }

    /// When silent, data requests are swallowed without a reply
    pub fn set_silent(&self, silent: bool) {
        self.state().silent = silent;
    }

    /// Sensor type the board was configured with for `pin`
    pub fn configured_sensor(&self, pin: Pin) -> Option<DhtType> {
        self.state().sensors.get(&pin).copied()
    }

    /// Every sysex frame received so far, as `[command, data..., END_SYSEX]`
    pub fn received_frames(&self) -> Vec<Vec<u8>> {
        self.state().received.clone()
    }

    /// Push raw bytes to the host, bypassing the firmware logic
    pub fn send_raw(&self, bytes: &[u8]) {
        // The receiver lives in `inner`, so the channel cannot be disconnected
        let _ = self.inner.to_host.send(bytes.to_vec());
    }

    fn receive(&self, bytes: &[u8]) {
        let mut state = self.state();
        let frames = state.parser.push(bytes);
        for frame in frames {
            log::info!("[MOCK BOARD] RX sysex {frame:02X?}");
            state.received.push(frame.clone());
            if let Some(reply) = respond(&mut state, &frame) {
                log::info!("[MOCK BOARD] TX {reply:02X?}");
                let _ = self.inner.to_host.send(reply);
            }
        }
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

/// Firmware behaviour for one inbound frame
fn respond(state: &mut BoardState, frame: &[u8]) -> Option<Vec<u8>> {
    match (frame[0], &frame[1..frame.len() - 1]) {
        (DHT_CONFIG, &[pin, sensor]) => {
            match DhtType::from_wire(sensor) {
                Some(sensor) => {
                    state.sensors.insert(pin, sensor);
                }
                None => log::warn!("[MOCK BOARD] Unknown DHT type {sensor} for pin {pin}"),
            }
            None
        }
        (DHT_DATA, &[pin]) => {
            if state.silent {
                return None;
            }
            if !state.sensors.contains_key(&pin) {
                log::warn!("[MOCK BOARD] Data request for unconfigured pin {pin}");
                return None;
            }
            let reading = state.readings.get(&pin)?;
            encode_sysex(DHT_DATA, &[pin, reading.temperature, reading.humidity]).ok()
        }
        (command, _) => {
            log::warn!("[MOCK BOARD] Ignoring sysex 0x{command:02X}");
            None
        }
    }
}

/// Host side of the mock board's serial link
struct MockBoardConnection {
    board: MockBoard,
    pending: Vec<u8>,
    connected: bool,
}

impl SerialConnection for MockBoardConnection {
    fn write(&mut self, data: &[u8]) -> FirmataResult<usize> {
        if !self.connected {
            return Err(FirmataError::Serial("Write failed: port closed".into()));
        }
        self.board.receive(data);
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> FirmataResult<usize> {
        if !self.connected {
            return Err(FirmataError::Serial("Read failed: port closed".into()));
        }
        if self.pending.is_empty() {
            match self.board.inner.from_board.recv_timeout(READ_TIMEOUT) {
                Ok(bytes) => self.pending = bytes,
                Err(RecvTimeoutError::Timeout) => return Ok(0),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(FirmataError::Serial("Read failed: board gone".into()))
                }
            }
        }
        let n = self.pending.len().min(buffer.len());
        buffer[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn try_clone(&self) -> FirmataResult<Box<dyn SerialConnection>> {
        Ok(self.board.connection())
    }

    fn close(&mut self) -> FirmataResult<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(conn: &mut Box<dyn SerialConnection>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = conn.read(&mut buf).unwrap();
            if n == 0 {
                return out;
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn config_frame_is_recorded() {
        let board = MockBoard::new();
        let mut conn = board.connection();
        conn.write_all(&[0xF0, 0x66, 2, 22, 0xF7]).unwrap();
        assert_eq!(board.configured_sensor(2), Some(DhtType::Dht22));
        assert_eq!(board.received_frames(), vec![vec![0x66, 2, 22, 0xF7]]);
    }

    #[test]
    fn data_request_is_answered_for_configured_pin() {
        let board = MockBoard::new();
        board.set_reading(2, DhtReading { temperature: 26, humidity: 34 });
        let mut conn = board.connection();
        conn.write_all(&[0xF0, 0x66, 2, 22, 0xF7, 0xF0, 0x67, 2, 0xF7]).unwrap();
        // Reply is longer than the read buffer, so it arrives in pieces
        assert_eq!(read_all(&mut conn), vec![0xF0, 0x67, 2, 26, 34, 0xF7]);
    }

    #[test]
    fn data_request_for_unconfigured_pin_is_ignored() {
        let board = MockBoard::new();
        board.set_reading(2, DhtReading { temperature: 26, humidity: 34 });
        let mut conn = board.connection();
        conn.write_all(&[0xF0, 0x67, 2, 0xF7]).unwrap();
        assert!(read_all(&mut conn).is_empty());
    }

    #[test]
    fn silent_board_never_replies() {
        let board = MockBoard::new();
        board.set_reading(2, DhtReading { temperature: 26, humidity: 34 });
        board.set_silent(true);
        let mut conn = board.connection();
        conn.write_all(&[0xF0, 0x66, 2, 11, 0xF7, 0xF0, 0x67, 2, 0xF7]).unwrap();
        assert!(read_all(&mut conn).is_empty());
    }

    #[test]
    fn cloned_connection_reads_board_output() {
        let board = MockBoard::new();
        let writer = board.connection();
        let mut reader = writer.try_clone().unwrap();
        board.send_raw(&[0xF0, 0x67, 1, 2, 3, 0xF7]);
        assert_eq!(read_all(&mut reader), vec![0xF0, 0x67, 1, 2, 3, 0xF7]);
    }

    #[test]
    fn closed_connection_rejects_writes() {
        let board = MockBoard::new();
        let mut conn = board.connection();
        conn.close().unwrap();
        assert!(!conn.is_connected());
        assert!(conn.write(&[0xF0]).is_err());
        let mut buf = [0u8; 4];
        assert!(conn.read(&mut buf).is_err());
    }
}
