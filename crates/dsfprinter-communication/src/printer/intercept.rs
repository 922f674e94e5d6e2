//! Intercept channel adapter
//!
//! Drains codes the daemon surfaces before executing them. Each code's
//! channel is flushed so the bridge stays in step with commands already
//! sent, then the code is released unchanged. The bridge never acts on
//! intercepted codes.

use crate::daemon::{InterceptConnection, RemoteCode};
use dsfprinter_core::{Latch, ProtocolError, Result};
use std::sync::atomic::Ordering;

/// Adapter over the daemon's intercept connection
pub struct InterceptChannel {
    connection: Box<dyn InterceptConnection>,
    subscribed: Latch,
}

impl InterceptChannel {
    /// Create an adapter gated on the subscription latch
    pub fn new(connection: Box<dyn InterceptConnection>, subscribed: Latch) -> Self {
        Self {
            connection,
            subscribed,
        }
    }

    /// Open the intercept connection
    pub fn connect(&self) -> Result<()> {
        self.connection.connect()
    }

    /// Wait for the next intercepted code and release it.
    ///
    /// Returns `Ok(None)` at once while nothing is subscribed. If the code's
    /// channel cannot be flushed the code is canceled and
    /// [`ProtocolError::FlushFailed`] is returned; the caller may keep
    /// receiving.
    pub fn receive(&self) -> Result<Option<RemoteCode>> {
        if !self.subscribed.load(Ordering::SeqCst) {
            tracing::trace!("receive while not subscribed");
            return Ok(None);
        }

        let code = self.connection.receive_code()?;
        tracing::debug!("+flush {} for {}", code.channel, code);
        let flushed = self.connection.flush(code.channel)?;
        if !flushed {
            self.connection.cancel_code()?;
            return Err(ProtocolError::FlushFailed {
                channel: code.channel.to_string(),
            }
            .into());
        }

        self.connection.ignore_code()?;
        tracing::debug!("-receive code={}", code);
        Ok(Some(code))
    }

    /// Close the intercept connection, unblocking a pending receive
    pub fn close(&self) -> Result<()> {
        self.connection.close()
    }
}
