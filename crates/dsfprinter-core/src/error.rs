//! Error handling for DSFPrinter
//!
//! Errors are grouped by how the bridge reacts to them:
//! - Connection errors (remote daemon faults, mostly transient)
//! - Protocol errors (intercept channel out of sync)
//! - State errors (subscribe twice, use after close)
//! - Model errors (patch text that is not a JSON document)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Connection error type
///
/// Raised by the remote daemon client for any of its channels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The daemon reset the connection
    #[error("Connection reset by remote daemon")]
    ConnectionReset,

    /// The socket to the daemon is gone
    #[error("Broken pipe to remote daemon")]
    BrokenPipe,

    /// The daemon reported an internal fault
    #[error("Internal server error: {message}")]
    InternalServer {
        /// The message reported by the daemon.
        message: String,
    },

    /// The daemon canceled the pending task
    #[error("Task canceled by remote daemon")]
    TaskCanceled,

    /// The channel has not been connected yet
    #[error("Channel not connected")]
    NotConnected,

    /// Generic connection error
    #[error("Connection error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

impl ConnectionError {
    /// Create an internal server error from a message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalServer {
            message: message.into(),
        }
    }

    /// Whether the fault is expected to clear up on its own.
    ///
    /// Transient faults are logged and skipped; everything else ends the
    /// current operation.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::BrokenPipe | Self::InternalServer { .. } | Self::TaskCanceled
        )
    }

    /// Whether the daemon went away, which closes the device implicitly
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::ConnectionReset)
    }
}

/// Protocol error type
///
/// The intercept channel could not be brought in step with the machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Flushing the originating channel of an intercepted code failed
    #[error("Flush failed on channel {channel}")]
    FlushFailed {
        /// The channel that could not be flushed.
        channel: String,
    },
}

/// State error type
///
/// The device was used in a way its lifecycle does not allow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// `subscribe` was called on an already subscribed model
    #[error("Already subscribed")]
    AlreadySubscribed,

    /// An operation needs the machine model but nothing is subscribed
    #[error("Not subscribed")]
    NotSubscribed,

    /// The device has been closed
    #[error("Device closed")]
    Closed,
}

/// Model error type
#[derive(Error, Debug)]
pub enum ModelError {
    /// A patch fetched from the daemon was not valid JSON
    #[error("Invalid machine model patch: {0}")]
    InvalidPatch(#[from] serde_json::Error),
}

/// Main error type for DSFPrinter
///
/// Encompasses all error types that can occur in the bridge.
#[derive(Error, Debug)]
pub enum Error {
    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// State error
    #[error(transparent)]
    State(#[from] StateError),

    /// Model error
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transient remote fault
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connection(e) if e.is_transient())
    }

    /// Check if the remote daemon reset the connection
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, Error::Connection(e) if e.is_reset())
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a state error
    pub fn is_state_error(&self) -> bool {
        matches!(self, Error::State(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Model(ModelError::InvalidPatch(err))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ConnectionError::TaskCanceled.is_transient());
        assert!(ConnectionError::BrokenPipe.is_transient());
        assert!(ConnectionError::internal("boom").is_transient());
        assert!(!ConnectionError::ConnectionReset.is_transient());
        assert!(!ConnectionError::NotConnected.is_transient());
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = ConnectionError::ConnectionReset.into();
        assert!(err.is_connection_reset());
        assert!(err.is_connection_error());
        assert!(!err.is_transient());

        let err: Error = ProtocolError::FlushFailed {
            channel: "SBC".to_string(),
        }
        .into();
        assert!(err.is_protocol_error());
        assert_eq!(err.to_string(), "Flush failed on channel SBC");

        let err: Error = StateError::AlreadySubscribed.into();
        assert!(err.is_state_error());
    }

    #[test]
    fn test_json_error_becomes_model_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Model(ModelError::InvalidPatch(_))));
    }

    #[test]
    fn test_display() {
        let err = ConnectionError::internal("heater fault");
        assert_eq!(err.to_string(), "Internal server error: heater fault");
        assert_eq!(Error::other("oops").to_string(), "oops");
    }
}
