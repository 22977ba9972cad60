//! Client connection management
//!
//! A blocking TCP connection speaking RESP. [`Transport`] is the seam between
//! the command layer and the wire: the high-level sorted-set API is written
//! against the trait, so tests can substitute a scripted transport.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Instant;

use tracing::debug;

use crate::commands::Command;
use crate::config::ConnectionConfig;
use crate::error::{Result, ZedisError};
use crate::protocol::{serialize_command, RespFrame, RespParser};

/// Executes commands against a Redis server
pub trait Transport {
    /// Send one command and read its reply.
    ///
    /// Server error replies are returned as `Error` frames, not `Err`; the
    /// reply converters surface them when the caller demarshals.
    fn request(&mut self, command: Command) -> Result<RespFrame>;

    /// Send a batch of commands in one write and read one reply per command,
    /// in order.
    fn request_pipeline(&mut self, commands: Vec<Command>) -> Result<Vec<RespFrame>>;
}

/// A blocking connection to a Redis server
pub struct Connection {
    /// TCP stream
    stream: TcpStream,

    /// Server address
    pub addr: SocketAddr,

    /// RESP reply parser
    parser: RespParser,

    /// Write buffer, reused across requests
    write_buffer: Vec<u8>,

    /// Last activity timestamp
    pub last_activity: Instant,
}

impl Connection {
    /// Connect using the given configuration, authenticating and selecting
    /// the database when configured.
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let addr = resolve_addr(&config.addr())?;

        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)?;
        stream.set_nodelay(config.tcp_nodelay)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        debug!(%addr, "connected to redis server");

        let mut conn = Connection {
            stream,
            addr,
            parser: RespParser::new(),
            write_buffer: Vec::with_capacity(4096),
            last_activity: Instant::now(),
        };

        if let Some(password) = &config.password {
            debug!("authenticating");
            conn.request(Command::new("AUTH").arg(password))?.into_ok()?;
        }

        if config.db != 0 {
            debug!(db = config.db, "selecting database");
            conn.request(Command::new("SELECT").arg(config.db))?
                .into_ok()?;
        }

        Ok(conn)
    }

    /// Liveness check
    pub fn ping(&mut self) -> Result<()> {
        match self.request(Command::new("PING"))? {
            RespFrame::SimpleString(s) if s == b"PONG" => Ok(()),
            other => Err(ZedisError::UnexpectedReply {
                expected: "PONG",
                got: other.kind(),
            }),
        }
    }

    /// Read one complete reply frame, blocking up to the read timeout
    fn read_reply(&mut self) -> Result<RespFrame> {
        loop {
            if let Some(frame) = self.parser.parse()? {
                self.last_activity = Instant::now();
                return Ok(frame);
            }

            let mut buf = [0u8; 4096];
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    return Err(ZedisError::Connection(
                        "connection closed by server".to_string(),
                    ))
                }
                Ok(n) => self.parser.feed(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                    return Err(ZedisError::Connection(
                        "timed out waiting for reply".to_string(),
                    ))
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn flush_write_buffer(&mut self) -> Result<()> {
        self.stream.write_all(&self.write_buffer)?;
        self.stream.flush()?;
        self.write_buffer.clear();
        Ok(())
    }
}

impl Transport for Connection {
    fn request(&mut self, command: Command) -> Result<RespFrame> {
        debug!(command = %String::from_utf8_lossy(command.name()), "sending command");

        self.write_buffer.clear();
        serialize_command(&command, &mut self.write_buffer);
        self.flush_write_buffer()?;

        self.read_reply()
    }

    fn request_pipeline(&mut self, commands: Vec<Command>) -> Result<Vec<RespFrame>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }

        debug!(count = commands.len(), "flushing pipelined commands");

        self.write_buffer.clear();
        for command in &commands {
            serialize_command(command, &mut self.write_buffer);
        }
        self.flush_write_buffer()?;

        let mut replies = Vec::with_capacity(commands.len());
        for _ in 0..commands.len() {
            replies.push(self.read_reply()?);
        }
        Ok(replies)
    }
}

fn resolve_addr(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|e| ZedisError::Config(format!("cannot resolve {}: {}", addr, e)))?
        .next()
        .ok_or_else(|| ZedisError::Config(format!("no addresses for {}", addr)))
}
