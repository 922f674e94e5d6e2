//! Serial-port facade over the daemon-backed printer
//!
//! A G-code client sees an ordinary line-oriented serial device: it writes
//! command lines and reads response lines. Each write is executed on the
//! daemon synchronously and its response queued for `readline`. A worker
//! thread drains the intercept channel for as long as the device is open.

use super::output_queue::OutputQueue;
use super::{PORT_NAME, SERIAL_LOG_TARGET};
use crate::daemon::DaemonConnections;
use crate::printer::DsfPrinter;
use dsfprinter_core::{Error, Result};
use dsfprinter_settings::PrinterSettings;
use parking_lot::Mutex;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use uuid::Uuid;

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default baud rate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Serial parameters reported to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialOptions {
    /// How long `readline` waits for a response
    pub read_timeout: Duration,
    /// Reported write timeout; writes are bounded by the daemon client
    pub write_timeout: Duration,
    /// Reported baud rate
    pub baudrate: u32,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            baudrate: DEFAULT_BAUDRATE,
        }
    }
}

/// Virtual serial device backed by the remote daemon
pub struct VirtualSerial {
    id: Uuid,
    span: tracing::Span,
    printer: Arc<DsfPrinter>,
    queue: OutputQueue,
    read_timeout: Mutex<Duration>,
    write_timeout: Mutex<Duration>,
    baudrate: u32,
    shutdown: Mutex<Option<Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl VirtualSerial {
    /// Connect to the daemon, subscribe to the machine model and start the
    /// intercept worker.
    pub fn open(
        connections: DaemonConnections,
        settings: PrinterSettings,
        options: SerialOptions,
    ) -> Result<Self> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("virtual_serial", device = %id);
        let wait_interval = settings.wait_interval();
        let printer = Arc::new(DsfPrinter::new(connections, settings));

        span.in_scope(|| {
            tracing::info!(target: SERIAL_LOG_TARGET, "{}", "-".repeat(78));
            tracing::info!("opening {} at {} baud", PORT_NAME, options.baudrate);
            let opened = printer.connect().and_then(|_| printer.subscribe());
            if let Err(e) = &opened {
                tracing::error!("failed to open device: {}", e);
                if let Err(close_error) = printer.close() {
                    tracing::debug!("close after failed open: {}", close_error);
                }
            }
            opened
        })?;

        let queue = OutputQueue::new();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let worker = {
            let printer = Arc::clone(&printer);
            let queue = queue.clone();
            let span = span.clone();
            thread::Builder::new()
                .name(format!("dsf-intercept-{}", id))
                .spawn(move || {
                    let _entered = span.enter();
                    intercept_loop(&printer, &queue, &shutdown_rx, wait_interval);
                })
        };
        let worker = match worker {
            Ok(handle) => handle,
            Err(e) => {
                span.in_scope(|| {
                    tracing::error!("failed to start intercept worker: {}", e);
                    if let Err(close_error) = printer.close() {
                        tracing::debug!("close after failed worker start: {}", close_error);
                    }
                });
                return Err(Error::from(e));
            }
        };

        Ok(Self {
            id,
            span,
            printer,
            queue,
            read_timeout: Mutex::new(options.read_timeout),
            write_timeout: Mutex::new(options.write_timeout),
            baudrate: options.baudrate,
            shutdown: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Execute one command line and queue its response.
    ///
    /// Always returns `data.len()`. A failure becomes a single `// {error}`
    /// response line.
    pub fn write(&self, data: &[u8]) -> usize {
        let _entered = self.span.enter();
        let line = String::from_utf8_lossy(data);
        tracing::info!(target: SERIAL_LOG_TARGET, ">> {}", line.trim_end());

        let response = match self.printer.command(&line) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("command {:?} failed: {}", line.trim_end(), e);
                format!("// {}", e)
            }
        };
        if !self.queue.push(response) {
            tracing::warn!("device closed, response dropped");
        }
        data.len()
    }

    /// Next response line including its trailing newline, or an empty
    /// buffer once the read timeout elapses.
    pub fn readline(&self) -> Vec<u8> {
        let _entered = self.span.enter();
        let timeout = *self.read_timeout.lock();
        match self.queue.pop_timeout(timeout) {
            Some(line) => {
                tracing::info!(target: SERIAL_LOG_TARGET, "<< {}", line);
                let mut bytes = line.into_bytes();
                bytes.push(b'\n');
                bytes
            }
            None => Vec::new(),
        }
    }

    /// Stop the worker and close every daemon connection.
    ///
    /// Closing twice only logs a warning.
    pub fn close(&self) {
        let _entered = self.span.enter();
        let Some(shutdown) = self.shutdown.lock().take() else {
            tracing::warn!("already closed");
            return;
        };
        tracing::debug!("+close");
        drop(shutdown);
        self.queue.close();

        if !self.printer.is_closed() {
            if let Err(e) = self.printer.close() {
                tracing::warn!("error while closing printer: {}", e);
            }
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::error!("intercept worker panicked");
            }
        }
        tracing::debug!("-close");
    }

    /// Whether the device accepts commands
    pub fn is_open(&self) -> bool {
        self.shutdown.lock().is_some() && !self.queue.is_closed()
    }

    /// Read timeout
    pub fn timeout(&self) -> Duration {
        *self.read_timeout.lock()
    }

    /// Change the read timeout
    pub fn set_timeout(&self, timeout: Duration) {
        *self.read_timeout.lock() = timeout;
    }

    /// Write timeout
    pub fn write_timeout(&self) -> Duration {
        *self.write_timeout.lock()
    }

    /// Change the write timeout
    pub fn set_write_timeout(&self, timeout: Duration) {
        *self.write_timeout.lock() = timeout;
    }

    /// Port identifier used for discovery
    pub fn port(&self) -> &'static str {
        PORT_NAME
    }

    /// Reported baud rate
    pub fn baudrate(&self) -> u32 {
        self.baudrate
    }

    /// Unique id of this device instance, also recorded on its log span
    pub fn device_id(&self) -> Uuid {
        self.id
    }

    /// The printer behind this device
    pub fn printer(&self) -> &DsfPrinter {
        &self.printer
    }
}

impl fmt::Display for VirtualSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VirtualSerial(port={}, baudrate={}, timeout={:?}, open={})",
            self.port(),
            self.baudrate,
            self.timeout(),
            self.is_open()
        )
    }
}

impl Drop for VirtualSerial {
    fn drop(&mut self) {
        if self.shutdown.lock().is_some() {
            self.close();
        }
    }
}

fn shutdown_requested(shutdown: &Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(TryRecvError::Empty))
}

fn wait_for_shutdown(shutdown: &Receiver<()>, interval: Duration) -> bool {
    !matches!(shutdown.recv_timeout(interval), Err(RecvTimeoutError::Timeout))
}

/// Whether a connection reset came from the daemon rather than from `close`
fn is_implicit_close(shutdown: &Receiver<()>, printer: &DsfPrinter) -> bool {
    !shutdown_requested(shutdown) && !printer.is_closed()
}

fn intercept_loop(
    printer: &DsfPrinter,
    queue: &OutputQueue,
    shutdown: &Receiver<()>,
    wait_interval: Duration,
) {
    tracing::debug!("intercept worker started");
    loop {
        if shutdown_requested(shutdown) || queue.is_closed() {
            break;
        }
        if !printer.is_subscribed() {
            if wait_for_shutdown(shutdown, wait_interval) {
                break;
            }
            continue;
        }

        match printer.intercept() {
            Ok(Some(code)) => tracing::trace!("released intercepted code {}", code),
            Ok(None) => {}
            Err(e) if e.is_connection_reset() => {
                if is_implicit_close(shutdown, printer) {
                    tracing::info!("intercept connection reset, closing device");
                    queue.close();
                    if let Err(e) = printer.close() {
                        tracing::debug!("close after reset: {}", e);
                    }
                }
                break;
            }
            Err(e) if e.is_state_error() => {
                tracing::debug!("intercept stopped: {}", e);
                break;
            }
            Err(e) if e.is_protocol_error() => {
                tracing::warn!("intercept: {}", e);
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("intercept: {}", e);
                if wait_for_shutdown(shutdown, wait_interval) {
                    break;
                }
            }
            Err(e) => {
                tracing::error!("intercept failed: {}", e);
                if wait_for_shutdown(shutdown, wait_interval) {
                    break;
                }
            }
        }
    }
    tracing::debug!("intercept worker stopped");
}
