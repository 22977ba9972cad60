//! Zedis library
//!
//! A blocking Redis client built around the sorted-set (ZSET) command family.
//! The crate layers a high-level convenience API over plain RESP primitives:
//! commands are marshalled into RESP arrays of bulk strings, sent over a TCP
//! connection (optionally batched through a pipeline), and replies are
//! demarshalled back into Rust types.

pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod pipeline;
pub mod protocol;
pub mod score;

// Re-export commonly used types
pub use commands::{Command, SortedSetCommands};
pub use config::ConnectionConfig;
pub use connection::{Connection, Transport};
pub use error::{Result, ZedisError};
pub use pipeline::Pipeline;
pub use protocol::resp::RespFrame;
pub use score::{format_score, lexical_score};
