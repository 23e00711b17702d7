//! Serial-port transport backed by the `serialport` crate.
//!
//! Opening the port spawns one reader thread that pushes every received byte
//! into the shared [`InboundBuffer`].  Writes run on Tokio's blocking pool so
//! the async caller never stalls on the UART.
//!
//! The chip ships at 9600 baud but KVM dongles are normally reconfigured to
//! 115200, which is the default here.

use std::{
    io::{ErrorKind, Read, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
    thread::JoinHandle,
    time::Duration,
};

use async_trait::async_trait;
use serialport::SerialPort;
use tracing::{debug, info, warn};

use crate::application::transport::{InboundBuffer, Transport, TransportError};

/// Default UART speed of CH9329-based KVM dongles.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// How long a blocking read waits before re-checking the stop flag.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(50);

type SharedPort = Arc<Mutex<Option<Box<dyn SerialPort>>>>;

/// A CH9329 attached to a local serial port.
pub struct SerialTransport {
    path: String,
    port: SharedPort,
    stop: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl SerialTransport {
    /// Opens `path` at `baud_rate` and starts feeding received bytes into `inbound`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the port cannot be opened or the
    /// reader thread cannot be started.
    pub fn open(path: &str, baud_rate: u32, inbound: InboundBuffer) -> Result<Self, TransportError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_POLL_INTERVAL)
            .open()
            .map_err(std::io::Error::from)?;
        let read_half = port.try_clone().map_err(std::io::Error::from)?;

        let stop = Arc::new(AtomicBool::new(false));
        let reader = std::thread::Builder::new()
            .name("ch9329-serial-reader".to_string())
            .spawn({
                let stop = Arc::clone(&stop);
                move || read_loop(read_half, inbound, stop)
            })?;

        info!(port = path, baud_rate, "serial port opened");
        Ok(Self {
            path: path.to_string(),
            port: Arc::new(Mutex::new(Some(port))),
            stop,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Stops the reader thread and releases the port.  Later writes fail
    /// with [`TransportError::Closed`].
    pub fn close(&self) {
        self.stop.store(true, Ordering::SeqCst);
        lock(&self.port).take();
        let handle = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(port = %self.path, "serial reader thread panicked");
            }
            info!(port = %self.path, "serial port closed");
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let port = Arc::clone(&self.port);
        let frame = bytes.to_vec();
        tokio::task::spawn_blocking(move || -> Result<(), TransportError> {
            let mut guard = lock(&port);
            let port = guard.as_mut().ok_or(TransportError::Closed)?;
            port.write_all(&frame)?;
            port.flush()?;
            Ok(())
        })
        .await
        .map_err(|e| TransportError::Io(std::io::Error::new(ErrorKind::Other, e)))?
    }
}

/// Lists serial ports the OS knows about, for `ch9329-host ports`.
///
/// # Errors
///
/// Returns [`TransportError::Io`] if enumeration fails.
pub fn available_ports() -> Result<Vec<String>, TransportError> {
    Ok(serialport::available_ports()
        .map_err(std::io::Error::from)?
        .into_iter()
        .map(|info| info.port_name)
        .collect())
}

fn read_loop(mut port: Box<dyn SerialPort>, inbound: InboundBuffer, stop: Arc<AtomicBool>) {
    let mut buf = [0u8; 256];
    while !stop.load(Ordering::SeqCst) {
        match port.read(&mut buf) {
            Ok(0) => {}
            Ok(n) => inbound.push(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
            Err(e) => {
                warn!(error = %e, "serial read failed, stopping reader");
                break;
            }
        }
    }
    debug!("serial reader exiting");
}

fn lock(port: &SharedPort) -> std::sync::MutexGuard<'_, Option<Box<dyn SerialPort>>> {
    port.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_port_fails_with_io_error() {
        // Arrange
        let inbound = InboundBuffer::new();

        // Act
        let result = SerialTransport::open("/dev/ch9329-does-not-exist", DEFAULT_BAUD_RATE, inbound);

        // Assert
        assert!(matches!(result, Err(TransportError::Io(_))));
    }

    #[test]
    fn test_default_baud_rate_matches_dongle_setting() {
        assert_eq!(DEFAULT_BAUD_RATE, 115_200);
    }
}
