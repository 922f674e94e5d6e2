//! Virtual serial device
//!
//! The line-oriented serial surface presented to G-code clients, its
//! response queue and the discovery hooks that advertise it.

pub mod discovery;
pub mod output_queue;
pub mod virtual_serial;

pub use discovery::{additional_port_names, serial_factory, PORT_NAME};
pub use output_queue::OutputQueue;
pub use virtual_serial::{SerialOptions, VirtualSerial};

/// Log target carrying the serial traffic (`>>` written, `<<` read)
pub const SERIAL_LOG_TARGET: &str = "dsfprinter::serial";
