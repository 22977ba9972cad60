//! Error types for Zedis
//!
//! This module defines all error types used throughout the client.
//! Server-side errors (RESP `-ERR ...` replies) are kept distinct from
//! client-side protocol and transport failures.

use thiserror::Error;

/// Main error type for Zedis operations
#[derive(Debug, Error)]
pub enum ZedisError {
    /// RESP parsing or serialization errors
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An error reply sent by the server (e.g. WRONGTYPE, ERR)
    #[error("server error: {0}")]
    Server(String),

    /// The server sent a well-formed reply of an unexpected kind
    #[error("unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply {
        expected: &'static str,
        got: &'static str,
    },

    /// Connection-level failures (closed by peer, reply timeout)
    #[error("connection error: {0}")]
    Connection(String),

    /// Network/IO errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (bad URL, bad address)
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid argument supplied to a command builder
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Type alias for Results throughout Zedis
pub type Result<T> = std::result::Result<T, ZedisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZedisError::Server("WRONGTYPE Operation against a key holding the wrong kind of value".to_string());
        assert_eq!(
            err.to_string(),
            "server error: WRONGTYPE Operation against a key holding the wrong kind of value"
        );

        let err = ZedisError::UnexpectedReply {
            expected: "integer",
            got: "bulk string",
        };
        assert_eq!(err.to_string(), "unexpected reply: expected integer, got bulk string");
    }
}
