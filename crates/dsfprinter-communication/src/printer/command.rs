//! Command channel adapter
//!
//! Sends one serial line to the daemon and turns the outcome into the
//! response line a serial client expects: the acknowledgement (`ok`), or
//! `!!` on failure, followed by any output the code produced.

use crate::daemon::{CodeChannel, CommandConnection};
use dsfprinter_core::{parse_line, Latch, Result, StateError};
use parking_lot::Mutex;
use std::sync::atomic::Ordering;

/// Line swallowed locally: SD card init is not needed with an SBC
const SWALLOWED_LINE: &str = "M21";

/// Adapter over the daemon's command connection
pub struct CommandChannel {
    connection: Mutex<Box<dyn CommandConnection>>,
    subscribed: Latch,
    channel: CodeChannel,
    ok: String,
}

impl CommandChannel {
    /// Create an adapter sending on `channel`, acknowledging with `ok`
    pub fn new(
        connection: Box<dyn CommandConnection>,
        subscribed: Latch,
        channel: CodeChannel,
        ok: impl Into<String>,
    ) -> Self {
        Self {
            connection: Mutex::new(connection),
            subscribed,
            channel,
            ok: ok.into(),
        }
    }

    /// Open the command connection
    pub fn connect(&self) -> Result<()> {
        self.connection.lock().connect()
    }

    /// Channel commands are sent on
    pub fn channel(&self) -> CodeChannel {
        self.channel
    }

    /// Execute `line` and build the response line.
    ///
    /// `M21` is answered locally and never reaches the daemon. Other lines
    /// need a subscribed model. Errors raised by the connection are passed
    /// on for the caller to report.
    pub fn send(&self, line: &str) -> Result<String> {
        let code = line.trim_end_matches(['\r', '\n']);
        tracing::debug!("+send(line={}, channel={})", code.trim(), self.channel);
        tracing::debug!("send classified {}", parse_line(code));

        if code.trim() == SWALLOWED_LINE {
            tracing::debug!("-send swallowed {}", SWALLOWED_LINE);
            return Ok(self.ok.clone());
        }

        if !self.subscribed.load(Ordering::SeqCst) {
            return Err(StateError::NotSubscribed.into());
        }

        let result = self
            .connection
            .lock()
            .perform_simple_code(code, self.channel)?;

        let mut response = if result.success {
            self.ok.clone()
        } else {
            "!!".to_string()
        };
        let output = result.result.trim_end();
        if !output.is_empty() {
            response.push(' ');
            response.push_str(output);
        }

        tracing::debug!("-send -> {}", response);
        Ok(response)
    }

    /// Close the command connection
    pub fn close(&self) -> Result<()> {
        self.connection.lock().close()
    }
}
