//! # DSFPrinter Communication
//!
//! Presents a machine driven by the Duet Software Framework daemon as a
//! classic serial-line printer. Provides the remote daemon channel seams,
//! the machine model store, the command and intercept channel adapters and
//! the virtual serial device a G-code client talks to.

pub mod daemon;
pub mod printer;
pub mod serial;

pub use daemon::{
    CodeChannel, CodeResult, CodeType, CommandConnection, DaemonConnections, DaemonConnector,
    InterceptConnection, RemoteCode, SubscribeConnection,
};

pub use printer::{CommandChannel, DsfPrinter, InterceptChannel, ModelStore};

pub use serial::{
    additional_port_names, serial_factory, OutputQueue, SerialOptions, VirtualSerial, PORT_NAME,
    SERIAL_LOG_TARGET,
};
