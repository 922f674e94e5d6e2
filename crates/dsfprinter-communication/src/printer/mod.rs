//! Virtual printer backed by the remote daemon
//!
//! [`DsfPrinter`] ties the model store and both channel adapters to one
//! subscription latch. The serial device drives it from two threads.

pub mod command;
pub mod intercept;
pub mod model_store;
mod report;

pub use command::CommandChannel;
pub use intercept::InterceptChannel;
pub use model_store::ModelStore;

use crate::daemon::{CodeChannel, DaemonConnections, RemoteCode};
use dsfprinter_core::{latch, Error, Result, StateError};
use dsfprinter_settings::PrinterSettings;
use std::sync::atomic::{AtomicBool, Ordering};

/// Printer facade over the daemon connections
pub struct DsfPrinter {
    settings: PrinterSettings,
    model: ModelStore,
    command: CommandChannel,
    intercept: InterceptChannel,
    closed: AtomicBool,
}

impl DsfPrinter {
    /// Build a printer over unconnected daemon connections
    pub fn new(connections: DaemonConnections, settings: PrinterSettings) -> Self {
        let subscribed = latch();
        let model = ModelStore::new(
            connections.subscribe,
            subscribed.clone(),
            settings.throttle_interval(),
        );
        let command = CommandChannel::new(
            connections.command,
            subscribed.clone(),
            CodeChannel::default(),
            settings.ok_format_string.clone(),
        );
        let intercept = InterceptChannel::new(connections.intercept, subscribed);

        Self {
            settings,
            model,
            command,
            intercept,
            closed: AtomicBool::new(false),
        }
    }

    /// Open the command and intercept connections
    pub fn connect(&self) -> Result<()> {
        tracing::debug!("+connect");
        self.command.connect()?;
        self.intercept.connect()?;
        tracing::debug!("-connect");
        Ok(())
    }

    /// Fetch the machine model and start serving it
    pub fn subscribe(&self) -> Result<()> {
        if self.is_closed() {
            return Err(StateError::Closed.into());
        }
        self.model.subscribe()
    }

    /// Whether the machine model has been fetched
    pub fn is_subscribed(&self) -> bool {
        self.model.is_subscribed()
    }

    /// Whether [`close`](Self::close) has run
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Settings the printer was built with
    pub fn settings(&self) -> &PrinterSettings {
        &self.settings
    }

    /// The machine model store
    pub fn model(&self) -> &ModelStore {
        &self.model
    }

    /// Execute one serial line, see [`CommandChannel::send`]
    pub fn command(&self, line: &str) -> Result<String> {
        if self.is_closed() {
            return Err(StateError::Closed.into());
        }
        self.command.send(line)
    }

    /// Receive and release one intercepted code, see [`InterceptChannel::receive`]
    pub fn intercept(&self) -> Result<Option<RemoteCode>> {
        if self.is_closed() {
            return Err(StateError::Closed.into());
        }
        self.intercept.receive()
    }

    /// Close every connection.
    ///
    /// The intercept connection goes first so a blocked receive returns.
    /// A second call fails with [`StateError::Closed`].
    pub fn close(&self) -> Result<()> {
        tracing::debug!("+close");
        if self.closed.swap(true, Ordering::SeqCst) {
            tracing::error!("already closed");
            return Err(StateError::Closed.into());
        }

        let results = [self.intercept.close(), self.command.close(), self.model.close()];
        let mut first_error: Option<Error> = None;
        for result in results {
            if let Err(e) = result {
                tracing::warn!("error while closing connection: {}", e);
                first_error.get_or_insert(e);
            }
        }

        tracing::debug!("-close");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of tools with a heater
    pub fn tool_count(&self) -> usize {
        self.model.heaters().tools.len()
    }

    /// Current temperature of tool `tool`, 0 when it has no heater
    pub fn current_temp(&self, tool: usize) -> f64 {
        self.tool_temperatures(tool).0
    }

    /// Target temperature of tool `tool`, 0 when it has no heater
    pub fn target_temp(&self, tool: usize) -> f64 {
        self.tool_temperatures(tool).1
    }

    /// `(tool, current, target)` for every tool with a heater
    pub fn tool_temps(&self) -> Vec<(usize, f64, f64)> {
        (0..self.tool_count())
            .map(|tool| {
                let (current, target) = self.tool_temperatures(tool);
                (tool, current, target)
            })
            .collect()
    }

    /// Whether the model has a bed heater
    pub fn has_bed_heater(&self) -> bool {
        self.model.heaters().first_bed().is_some()
    }

    /// Current temperature of the first bed heater
    pub fn current_bed_temp(&self) -> f64 {
        self.slot_temperatures(self.model.heaters().first_bed()).0
    }

    /// Target temperature of the first bed heater
    pub fn target_bed_temp(&self) -> f64 {
        self.slot_temperatures(self.model.heaters().first_bed()).1
    }

    /// Whether the model has a chamber heater
    pub fn has_chamber_heater(&self) -> bool {
        self.model.heaters().first_chamber().is_some()
    }

    /// Current temperature of the first chamber heater
    pub fn current_chamber_temp(&self) -> f64 {
        self.slot_temperatures(self.model.heaters().first_chamber()).0
    }

    /// Target temperature of the first chamber heater
    pub fn target_chamber_temp(&self) -> f64 {
        self.slot_temperatures(self.model.heaters().first_chamber()).1
    }

    fn tool_temperatures(&self, tool: usize) -> (f64, f64) {
        let temperatures = self.slot_temperatures(self.model.heaters().tool(tool));
        tracing::trace!("tool {} temperatures {:?}", tool, temperatures);
        temperatures
    }

    fn slot_temperatures(&self, slot: Option<usize>) -> (f64, f64) {
        slot.and_then(|slot| self.model.heater_temperatures(slot))
            .unwrap_or((0.0, 0.0))
    }
}
