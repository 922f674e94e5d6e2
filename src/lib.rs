//! # DSFPrinter
//!
//! Virtual serial printer for G-code clients whose machine is driven by the
//! Duet Software Framework (DSF) daemon.
//!
//! ## Architecture
//!
//! DSFPrinter is organized as a workspace with multiple crates:
//!
//! 1. **dsfprinter-core** - Error taxonomy, G-code line parser, machine model merge-patch engine
//! 2. **dsfprinter-settings** - Flat key-value printer settings and report templates
//! 3. **dsfprinter-communication** - Daemon connection seams, printer, virtual serial device
//! 4. **dsfprinter** - Logging setup and re-exports
//!
//! A client opens the `DSF` port through [`serial_factory`], writes command
//! lines with [`VirtualSerial::write`] and reads responses with
//! [`VirtualSerial::readline`].

pub use dsfprinter_communication as communication;
pub use dsfprinter_settings as settings;

pub use dsfprinter_communication::{
    additional_port_names, serial_factory, CodeChannel, CodeResult, CodeType, CommandConnection,
    DaemonConnections, DaemonConnector, DsfPrinter, InterceptConnection, RemoteCode,
    SerialOptions, SubscribeConnection, VirtualSerial, PORT_NAME, SERIAL_LOG_TARGET,
};
pub use dsfprinter_core::{apply_patch, parse_line, Error, ListPolicy, ParsedCommand, Result};
pub use dsfprinter_settings::PrinterSettings;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with tracing
///
/// Sets up structured logging with:
/// - Console output to stdout
/// - INFO level by default
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize logging and copy the serial traffic to `path`
///
/// Everything logged on [`SERIAL_LOG_TARGET`] is appended to the file as
/// plain lines, in addition to the console output of [`init_logging`].
pub fn init_logging_with_serial_log(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;
    use tracing_subscriber::filter::Targets;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open serial log {}", path.display()))?;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_filter(env_filter);

    let serial_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .with_filter(Targets::new().with_target(SERIAL_LOG_TARGET, tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(serial_layer)
        .try_init()?;

    Ok(())
}
