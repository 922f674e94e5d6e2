//! Remote daemon client seams
//!
//! The bridge talks to the daemon over three independent connections:
//! - a command connection that executes codes and returns their result
//! - an intercept connection that surfaces codes before the machine runs them
//! - a subscribe connection that serves the machine model and its patches
//!
//! All calls block. Methods take `&self` so a connection blocked in one
//! thread can be closed from another; implementations synchronize
//! internally.

pub mod types;

pub use types::{CodeChannel, CodeResult, CodeType, RemoteCode};

use dsfprinter_core::Result;
use serde_json::Value;

/// Connection used to submit codes for execution
pub trait CommandConnection: Send + Sync {
    /// Open the connection
    fn connect(&self) -> Result<()>;

    /// Execute a single line of G-code on `channel` and wait for its result
    fn perform_simple_code(&self, code: &str, channel: CodeChannel) -> Result<CodeResult>;

    /// Close the connection
    fn close(&self) -> Result<()>;
}

/// Connection that surfaces codes before the machine executes them
pub trait InterceptConnection: Send + Sync {
    /// Open the connection
    fn connect(&self) -> Result<()>;

    /// Block until the daemon hands over the next code.
    ///
    /// A pending call must return once [`close`](Self::close) is called,
    /// failing with `ConnectionError::ConnectionReset`.
    fn receive_code(&self) -> Result<RemoteCode>;

    /// Wait until every code already queued on `channel` has been processed.
    ///
    /// Returns `false` if the channel could not be flushed.
    fn flush(&self, channel: CodeChannel) -> Result<bool>;

    /// Cancel the code received last
    fn cancel_code(&self) -> Result<()>;

    /// Let the code received last run unchanged
    fn ignore_code(&self) -> Result<()>;

    /// Close the connection
    fn close(&self) -> Result<()>;
}

/// Connection that serves the machine model
pub trait SubscribeConnection: Send + Sync {
    /// Open the connection
    fn connect(&self) -> Result<()>;

    /// Fetch the complete machine model
    fn get_machine_model(&self) -> Result<Value>;

    /// Fetch the next machine model patch as JSON text
    fn get_machine_model_patch(&self) -> Result<String>;

    /// Close the connection
    fn close(&self) -> Result<()>;
}

/// Factory for the three daemon connections
pub trait DaemonConnector: Send + Sync {
    /// Create a command connection
    fn command_connection(&self) -> Result<Box<dyn CommandConnection>>;

    /// Create an intercept connection
    fn intercept_connection(&self) -> Result<Box<dyn InterceptConnection>>;

    /// Create a subscribe connection
    fn subscribe_connection(&self) -> Result<Box<dyn SubscribeConnection>>;
}

/// The set of connections a printer needs
pub struct DaemonConnections {
    /// Command connection
    pub command: Box<dyn CommandConnection>,
    /// Intercept connection
    pub intercept: Box<dyn InterceptConnection>,
    /// Subscribe connection
    pub subscribe: Box<dyn SubscribeConnection>,
}

impl DaemonConnections {
    /// Create all three connections from a connector, without connecting them
    pub fn open(connector: &dyn DaemonConnector) -> Result<Self> {
        Ok(Self {
            command: connector.command_connection()?,
            intercept: connector.intercept_connection()?,
            subscribe: connector.subscribe_connection()?,
        })
    }
}
