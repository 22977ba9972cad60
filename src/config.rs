//! Client configuration
//!
//! Connection parameters with sensible defaults, plus parsing of
//! `redis://[:password@]host[:port][/db]` URLs.

use std::time::Duration;

use crate::error::{Result, ZedisError};

/// Default Redis port
pub const DEFAULT_PORT: u16 = 6379;

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server hostname or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Password for AUTH on connect
    pub password: Option<String>,

    /// Database index selected on connect (0 skips SELECT)
    pub db: u32,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Socket read timeout (None blocks indefinitely)
    pub read_timeout: Option<Duration>,

    /// Socket write timeout (None blocks indefinitely)
    pub write_timeout: Option<Duration>,

    /// Disable Nagle's algorithm
    pub tcp_nodelay: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            password: None,
            db: 0,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
        }
    }
}

impl ConnectionConfig {
    /// Configuration for a host and port with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ConnectionConfig {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Parse a `redis://[user][:password@]host[:port][/db]` URL
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("redis://")
            .ok_or_else(|| ZedisError::Config("URL must start with redis://".to_string()))?;

        let (userinfo, host_part) = match rest.rsplit_once('@') {
            Some((userinfo, host_part)) => (Some(userinfo), host_part),
            None => (None, rest),
        };

        // Only the password component is used; Redis ignores the user name
        // for legacy AUTH.
        let password = userinfo.and_then(|info| match info.split_once(':') {
            Some((_, password)) if !password.is_empty() => Some(password.to_string()),
            Some(_) => None,
            None if !info.is_empty() => Some(info.to_string()),
            None => None,
        });

        let (host_port, db) = match host_part.split_once('/') {
            Some((host_port, db_str)) if !db_str.is_empty() => {
                let db = db_str.parse::<u32>().map_err(|_| {
                    ZedisError::Config(format!("invalid database index: {}", db_str))
                })?;
                (host_port, db)
            }
            Some((host_port, _)) => (host_port, 0),
            None => (host_part, 0),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port_str)) => {
                let port = port_str
                    .parse::<u16>()
                    .map_err(|_| ZedisError::Config(format!("invalid port: {}", port_str)))?;
                (host, port)
            }
            None => (host_port, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(ZedisError::Config("empty host in URL".to_string()));
        }

        Ok(ConnectionConfig {
            host: host.to_string(),
            port,
            password,
            db,
            ..Default::default()
        })
    }

    /// The `host:port` address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
