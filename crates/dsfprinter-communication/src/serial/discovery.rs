//! Port discovery hooks for the host's serial-port enumeration

use super::virtual_serial::{SerialOptions, VirtualSerial};
use crate::daemon::{DaemonConnections, DaemonConnector};
use dsfprinter_core::{Error, Result};
use dsfprinter_settings::PrinterSettings;
use std::time::Duration;

/// Identifier the virtual device is listed under
pub const PORT_NAME: &str = "DSF";

/// Ports to add to the host's port list
pub fn additional_port_names() -> Vec<String> {
    vec![PORT_NAME.to_string()]
}

/// Open a [`VirtualSerial`] when the host asks for [`PORT_NAME`].
///
/// Returns `None` for any other port so the host falls back to a real
/// serial port.
pub fn serial_factory(
    connector: &dyn DaemonConnector,
    settings: &PrinterSettings,
    port: &str,
    baudrate: u32,
    read_timeout: Duration,
) -> Option<Result<VirtualSerial>> {
    if port != PORT_NAME {
        return None;
    }
    tracing::debug!("creating virtual serial for port {}", port);
    Some(open_virtual_serial(connector, settings, baudrate, read_timeout))
}

fn open_virtual_serial(
    connector: &dyn DaemonConnector,
    settings: &PrinterSettings,
    baudrate: u32,
    read_timeout: Duration,
) -> Result<VirtualSerial> {
    settings
        .validate()
        .map_err(|e| Error::other(e.to_string()))?;
    let connections = DaemonConnections::open(connector)?;
    let options = SerialOptions {
        read_timeout,
        baudrate,
        ..SerialOptions::default()
    };
    VirtualSerial::open(connections, settings.clone(), options)
}
