//! RESP frame definitions and reply demarshalling
//!
//! `RespFrame` models every reply shape a Redis server can send. The
//! consuming `into_*` converters below are the demarshalling layer used by
//! the command API: each one turns a server `Error` frame into
//! [`ZedisError::Server`] so callers never have to match on error frames.

use crate::error::{Result, ZedisError};

/// RESP protocol frame types
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    /// Simple string: +OK\r\n
    SimpleString(Vec<u8>),

    /// Error: -Error message\r\n
    Error(Vec<u8>),

    /// Integer: :1000\r\n
    Integer(i64),

    /// Bulk string: $6\r\nfoobar\r\n or $-1\r\n (null)
    BulkString(Option<Vec<u8>>),

    /// Array: *2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n or *-1\r\n (null)
    Array(Option<Vec<RespFrame>>),

    // RESP3 additions
    /// Null value: _\r\n
    Null,

    /// Boolean: #t\r\n or #f\r\n
    Boolean(bool),

    /// Double: ,1.23\r\n or ,inf\r\n
    Double(f64),

    /// Map: %2\r\n+first\r\n:1\r\n+second\r\n:2\r\n
    Map(Vec<(RespFrame, RespFrame)>),

    /// Set: ~2\r\n+first\r\n+second\r\n
    Set(Vec<RespFrame>),
}

impl RespFrame {
    /// Create a bulk string frame
    pub fn bulk_string(bytes: impl Into<Vec<u8>>) -> Self {
        RespFrame::BulkString(Some(bytes.into()))
    }

    /// Create a simple string frame
    pub fn simple_string(s: impl Into<Vec<u8>>) -> Self {
        RespFrame::SimpleString(s.into())
    }

    /// Create an error frame
    pub fn error(msg: impl Into<Vec<u8>>) -> Self {
        RespFrame::Error(msg.into())
    }

    /// Create a null bulk string
    pub fn null_bulk() -> Self {
        RespFrame::BulkString(None)
    }

    /// Create an array frame
    pub fn array(frames: Vec<RespFrame>) -> Self {
        RespFrame::Array(Some(frames))
    }

    /// Check if this frame represents a null/nil value
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            RespFrame::Null | RespFrame::BulkString(None) | RespFrame::Array(None)
        )
    }

    /// Human-readable frame kind, used in error reporting
    pub fn kind(&self) -> &'static str {
        match self {
            RespFrame::SimpleString(_) => "simple string",
            RespFrame::Error(_) => "error",
            RespFrame::Integer(_) => "integer",
            RespFrame::BulkString(Some(_)) => "bulk string",
            RespFrame::BulkString(None) => "nil",
            RespFrame::Array(Some(_)) => "array",
            RespFrame::Array(None) => "nil array",
            RespFrame::Null => "null",
            RespFrame::Boolean(_) => "boolean",
            RespFrame::Double(_) => "double",
            RespFrame::Map(_) => "map",
            RespFrame::Set(_) => "set",
        }
    }

    /// Propagate a server error frame as `Err`, pass everything else through
    fn check_error(self) -> Result<RespFrame> {
        match self {
            RespFrame::Error(msg) => Err(ZedisError::Server(
                String::from_utf8_lossy(&msg).into_owned(),
            )),
            other => Ok(other),
        }
    }

    /// Expect a status reply (+OK and friends)
    pub fn into_ok(self) -> Result<()> {
        match self.check_error()? {
            RespFrame::SimpleString(_) => Ok(()),
            other => Err(ZedisError::UnexpectedReply {
                expected: "simple string",
                got: other.kind(),
            }),
        }
    }

    /// Expect an integer reply
    pub fn into_int(self) -> Result<i64> {
        match self.check_error()? {
            RespFrame::Integer(n) => Ok(n),
            RespFrame::Boolean(b) => Ok(b as i64),
            other => Err(ZedisError::UnexpectedReply {
                expected: "integer",
                got: other.kind(),
            }),
        }
    }

    /// Expect an integer reply that may be nil (e.g. ZRANK of a missing member)
    pub fn into_optional_int(self) -> Result<Option<i64>> {
        let frame = self.check_error()?;
        if frame.is_null() {
            return Ok(None);
        }
        frame.into_int().map(Some)
    }

    /// Expect a score reply: a bulk string holding an ASCII double, or a
    /// RESP3 double frame
    pub fn into_double(self) -> Result<f64> {
        match self.check_error()? {
            RespFrame::Double(f) => Ok(f),
            RespFrame::Integer(n) => Ok(n as f64),
            RespFrame::BulkString(Some(bytes)) => parse_double_bytes(&bytes),
            other => Err(ZedisError::UnexpectedReply {
                expected: "double",
                got: other.kind(),
            }),
        }
    }

    /// Expect a score reply that may be nil (e.g. ZSCORE of a missing member)
    pub fn into_optional_double(self) -> Result<Option<f64>> {
        let frame = self.check_error()?;
        if frame.is_null() {
            return Ok(None);
        }
        frame.into_double().map(Some)
    }

    /// Expect a bulk string reply that may be nil
    pub fn into_optional_bytes(self) -> Result<Option<Vec<u8>>> {
        match self.check_error()? {
            RespFrame::BulkString(opt) => Ok(opt),
            RespFrame::SimpleString(bytes) => Ok(Some(bytes)),
            RespFrame::Null => Ok(None),
            other => Err(ZedisError::UnexpectedReply {
                expected: "bulk string",
                got: other.kind(),
            }),
        }
    }

    /// Expect a bulk string reply that may be nil, decoded as UTF-8
    pub fn into_optional_string(self) -> Result<Option<String>> {
        match self.into_optional_bytes()? {
            Some(bytes) => decode_utf8(bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Expect a multi-bulk reply of strings; a nil array demarshals to empty
    pub fn into_string_vec(self) -> Result<Vec<String>> {
        let elements = match self.check_error()? {
            RespFrame::Array(Some(elements)) => elements,
            RespFrame::Set(elements) => elements,
            frame if frame.is_null() => return Ok(Vec::new()),
            other => {
                return Err(ZedisError::UnexpectedReply {
                    expected: "array",
                    got: other.kind(),
                })
            }
        };

        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element.into_optional_bytes()? {
                Some(bytes) => items.push(decode_utf8(bytes)?),
                None => {
                    return Err(ZedisError::Protocol(
                        "nil element inside multi-bulk reply".to_string(),
                    ))
                }
            }
        }
        Ok(items)
    }

    /// Expect a WITHSCORES reply: a flat member/score array (RESP2) or a map
    /// (RESP3). Server ordering is preserved.
    pub fn into_score_pairs(self) -> Result<Vec<(String, f64)>> {
        match self.check_error()? {
            RespFrame::Array(Some(elements)) => {
                if elements.len() % 2 != 0 {
                    return Err(ZedisError::Protocol(
                        "odd number of elements in member/score reply".to_string(),
                    ));
                }
                let mut pairs = Vec::with_capacity(elements.len() / 2);
                let mut iter = elements.into_iter();
                while let (Some(member), Some(score)) = (iter.next(), iter.next()) {
                    let member = match member.into_optional_bytes()? {
                        Some(bytes) => decode_utf8(bytes)?,
                        None => {
                            return Err(ZedisError::Protocol(
                                "nil member inside member/score reply".to_string(),
                            ))
                        }
                    };
                    pairs.push((member, score.into_double()?));
                }
                Ok(pairs)
            }
            RespFrame::Map(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (member, score) in entries {
                    let member = match member.into_optional_bytes()? {
                        Some(bytes) => decode_utf8(bytes)?,
                        None => {
                            return Err(ZedisError::Protocol(
                                "nil member inside member/score map".to_string(),
                            ))
                        }
                    };
                    pairs.push((member, score.into_double()?));
                }
                Ok(pairs)
            }
            frame if frame.is_null() => Ok(Vec::new()),
            other => Err(ZedisError::UnexpectedReply {
                expected: "array",
                got: other.kind(),
            }),
        }
    }
}

fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|_| ZedisError::Protocol("invalid UTF-8 in bulk string".to_string()))
}

fn parse_double_bytes(bytes: &[u8]) -> Result<f64> {
    let s = std::str::from_utf8(bytes)
        .map_err(|_| ZedisError::Protocol("invalid UTF-8 in score".to_string()))?;
    match s {
        "inf" | "+inf" => Ok(f64::INFINITY),
        "-inf" => Ok(f64::NEG_INFINITY),
        _ => s
            .parse::<f64>()
            .map_err(|_| ZedisError::Protocol(format!("invalid score format: {}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_int() {
        assert_eq!(RespFrame::Integer(42).into_int().unwrap(), 42);
        assert!(matches!(
            RespFrame::bulk_string("x").into_int(),
            Err(ZedisError::UnexpectedReply { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_error_frame_becomes_server_error() {
        let err = RespFrame::error("ERR no such key").into_int().unwrap_err();
        assert!(matches!(err, ZedisError::Server(msg) if msg == "ERR no such key"));
    }

    #[test]
    fn test_optional_converters_map_nil_to_none() {
        assert_eq!(RespFrame::null_bulk().into_optional_int().unwrap(), None);
        assert_eq!(RespFrame::null_bulk().into_optional_double().unwrap(), None);
        assert_eq!(RespFrame::Null.into_optional_string().unwrap(), None);
    }

    #[test]
    fn test_into_double_parses_bulk() {
        assert_eq!(RespFrame::bulk_string("3.5").into_double().unwrap(), 3.5);
        assert_eq!(RespFrame::bulk_string("inf").into_double().unwrap(), f64::INFINITY);
        assert_eq!(RespFrame::bulk_string("-inf").into_double().unwrap(), f64::NEG_INFINITY);
        assert_eq!(RespFrame::Double(1.25).into_double().unwrap(), 1.25);
    }

    #[test]
    fn test_into_string_vec() {
        let frame = RespFrame::array(vec![
            RespFrame::bulk_string("one"),
            RespFrame::bulk_string("two"),
        ]);
        assert_eq!(frame.into_string_vec().unwrap(), vec!["one", "two"]);

        assert!(RespFrame::Array(None).into_string_vec().unwrap().is_empty());
    }

    #[test]
    fn test_into_score_pairs() {
        let frame = RespFrame::array(vec![
            RespFrame::bulk_string("a"),
            RespFrame::bulk_string("1"),
            RespFrame::bulk_string("b"),
            RespFrame::bulk_string("2.5"),
        ]);
        assert_eq!(
            frame.into_score_pairs().unwrap(),
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.5)]
        );
    }

    #[test]
    fn test_into_score_pairs_rejects_odd_length() {
        let frame = RespFrame::array(vec![RespFrame::bulk_string("a")]);
        assert!(matches!(
            frame.into_score_pairs(),
            Err(ZedisError::Protocol(_))
        ));
    }

    #[test]
    fn test_into_score_pairs_resp3_map() {
        let frame = RespFrame::Map(vec![
            (RespFrame::bulk_string("a"), RespFrame::Double(1.0)),
            (RespFrame::bulk_string("b"), RespFrame::Double(2.0)),
        ]);
        assert_eq!(
            frame.into_score_pairs().unwrap(),
            vec![("a".to_string(), 1.0), ("b".to_string(), 2.0)]
        );
    }
}
