//! RESP (REdis Serialization Protocol) implementation
//!
//! This module provides reply parsing and command serialization for RESP2,
//! plus the RESP3 reply types (null, boolean, double, map, set) so the client
//! stays usable against servers negotiated to RESP3.

pub mod parser;
pub mod resp;
pub mod serializer;

pub use parser::RespParser;
pub use resp::RespFrame;

// Re-export commonly used items
pub use parser::parse_resp_frame;
pub use serializer::serialize_command;
