//! FirmataSession: owns a serial connection and runs the receive loop.
//!
//! Writes happen on the caller's thread behind a Mutex. Reads happen on a
//! dedicated reader thread that owns a cloned handle on the same port, splits
//! the byte stream into sysex frames and hands each frame to the handler
//! registered for its command code.
//!
//! Pure translation lives in `encode` / `decode`. FirmataSession only handles
//! I/O and dispatch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::domain::{ClientConfig, FirmataError, FirmataResult};
use crate::ports::{HandlerTable, SerialConnection, SysexTransport};

use super::{encode_sysex, SysexParser};

/// Chunk size for each serial read call
const READ_CHUNK_SIZE: usize = 64;

/// Owns a serial connection and exchanges sysex messages with the board.
pub struct FirmataSession {
    writer: Mutex<Box<dyn SerialConnection>>,
    handlers: Arc<Mutex<HandlerTable>>,
    running: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
    sleep_tune: Duration,
}

impl FirmataSession {
    /// Wait for the board to come out of reset, then start the reader thread.
    pub fn open(serial: Box<dyn SerialConnection>, config: &ClientConfig) -> FirmataResult<Self> {
        let wait = config.arduino_wait();
        if !wait.is_zero() {
            log::info!("Waiting {} ms for board reset", wait.as_millis());
            thread::sleep(wait);
        }

        let reader_serial = serial.try_clone()?;
        let handlers = Arc::new(Mutex::new(HandlerTable::new()));
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let handlers = Arc::clone(&handlers);
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("firmata-reader".into())
                .spawn(move || run_reader(reader_serial, handlers, running))
                .map_err(|e| FirmataError::Serial(format!("Failed to start reader thread: {e}")))?
        };

        log::info!("Firmata session open");
        Ok(Self {
            writer: Mutex::new(serial),
            handlers,
            running,
            reader: Mutex::new(Some(handle)),
            sleep_tune: config.sleep_tune(),
        })
    }

    /// False once the reader thread has stopped (closed or read failure)
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the reader thread and close the port. Safe to call twice.
    pub fn close(&self) -> FirmataResult<()> {
        self.running.store(false, Ordering::SeqCst);

        let handle = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| FirmataError::Serial("Reader thread panicked".into()))?;
            log::info!("Firmata session closed");
        }

        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close()
    }
}

impl SysexTransport for FirmataSession {
    fn send_sysex(&self, command: u8, data: &[u8]) -> FirmataResult<()> {
        let wire = encode_sysex(command, data)?;
        log::debug!("Sysex TX: {wire:02X?}");

        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(&wire)
    }

    fn extend_handlers(&self, handlers: HandlerTable) {
        let mut table = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        for (code, handler) in handlers {
            if table.insert(code, handler).is_some() {
                log::warn!("Replaced existing handler for sysex 0x{code:02X}");
            }
        }
    }

    fn sleep_tune(&self) -> Duration {
        self.sleep_tune
    }
}

impl Drop for FirmataSession {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Error while closing Firmata session: {e}");
        }
    }
}

/// The receive loop, runs on its own thread until `running` is cleared or
/// the port fails.
fn run_reader(
    mut serial: Box<dyn SerialConnection>,
    handlers: Arc<Mutex<HandlerTable>>,
    running: Arc<AtomicBool>,
) {
    let mut parser = SysexParser::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    while running.load(Ordering::SeqCst) {
        match serial.read(&mut chunk) {
            Ok(0) => {} // Read timed out, check the flag again
            Ok(n) => {
                for frame in parser.push(&chunk[..n]) {
                    dispatch(&handlers, &frame);
                }
            }
            Err(e) => {
                log::error!("Firmata reader stopped: {e}");
                running.store(false, Ordering::SeqCst);
                break;
            }
        }
    }

    if parser.in_frame() {
        log::warn!("Reader stopped with a partial sysex frame pending, dropped");
    }
}

fn dispatch(handlers: &Mutex<HandlerTable>, frame: &[u8]) {
    log::debug!("Sysex RX: {frame:02X?}");
    let code = frame[0];

    // Release the table before calling out so handlers may take their own locks
    let handler = handlers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&code)
        .cloned();

    match handler {
        Some(handler) => handler(frame),
        None => log::debug!("No handler for sysex 0x{code:02X}, frame ignored"),
    }
}
