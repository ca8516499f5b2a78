use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use adcp_schema::CommandRegistry;
use tracing::debug;

use crate::client::Client;
use crate::error::{ClientError, Result};
use crate::handshake::{handshake, ConnectionRole};

/// Connection behavior knobs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for dialing and for each handshake read/write.
    pub connect_timeout: Duration,
    /// Default response window; long-running commands extend it.
    pub response_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(5),
        }
    }
}

/// Connect to an instrument with default configuration.
pub fn connect(
    addr: impl ToSocketAddrs,
    role: ConnectionRole,
    registry: CommandRegistry,
) -> Result<Client> {
    connect_with_config(addr, role, registry, ClientConfig::default())
}

/// Connect to an instrument with explicit configuration.
///
/// Dials, performs the role handshake under the connect timeout, then
/// clears the socket timeouts; from here on the correlator owns response
/// deadlines and the receiver thread blocks on the stream.
pub fn connect_with_config(
    addr: impl ToSocketAddrs,
    role: ConnectionRole,
    registry: CommandRegistry,
    config: ClientConfig,
) -> Result<Client> {
    let mut stream = None;
    let mut last_err = None;
    for addr in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(connected) => {
                stream = Some(connected);
                break;
            }
            Err(err) => last_err = Some(err),
        }
    }
    let mut stream = stream.ok_or_else(|| {
        ClientError::Io(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no addresses resolved")
        }))
    })?;

    stream.set_read_timeout(Some(config.connect_timeout))?;
    stream.set_write_timeout(Some(config.connect_timeout))?;
    handshake(&mut stream, role)?;
    stream.set_read_timeout(None)?;
    stream.set_write_timeout(None)?;

    debug!(peer = ?stream.peer_addr().ok(), role = role.bits(), "connected");
    Client::spawn(stream, Arc::new(registry), config)
}
