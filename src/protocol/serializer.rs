//! RESP command serializer
//!
//! Every client request is marshalled as a RESP array of bulk strings:
//! `*<argc>\r\n$<len>\r\n<arg>\r\n...`. This is the only frame shape a
//! client ever sends, so the serializer is deliberately narrower than the
//! reply parser.

use crate::commands::Command;

/// Serialize a command into `buf` as a RESP array of bulk strings
pub fn serialize_command(command: &Command, buf: &mut Vec<u8>) {
    let args = command.args();

    buf.push(b'*');
    buf.extend_from_slice(args.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");

    for arg in args {
        buf.push(b'$');
        buf.extend_from_slice(arg.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(arg);
        buf.extend_from_slice(b"\r\n");
    }
}

/// Serialize a command to a fresh byte vector
pub fn serialize_to_vec(command: &Command) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    serialize_command(command, &mut buf);
    buf
}
