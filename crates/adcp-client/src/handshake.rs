use std::io::{ErrorKind, Read, Write};

use adcp_frame::FrameType;

use crate::error::{ClientError, Result};

/// The two magic bytes opening every connection.
///
/// On the wire these are literally the `connection set type` command id,
/// which is why the handshake doubles as the role subscription.
pub const CONNECT_MAGIC: [u8; 2] = [0x10, 0x00];

/// The fixed acknowledgment the instrument sends back: a framed OK
/// response (`type 0, length 1, status 0`).
pub const CONNECT_ACK: [u8; 4] = [0x00, 0x01, 0x00, 0x00];

/// The traffic a connection subscribes to, fixed at handshake.
///
/// Roles are a bitmask over the frame-type discriminants; responses are
/// always delivered regardless of role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionRole(u8);

impl ConnectionRole {
    pub const NONE: ConnectionRole = ConnectionRole(0);
    pub const DEBUG: ConnectionRole = ConnectionRole(1);
    pub const STATUS: ConnectionRole = ConnectionRole(2);
    pub const DATA: ConnectionRole = ConnectionRole(4);
    pub const FFT: ConnectionRole = ConnectionRole(8);

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Union of two roles.
    pub fn with(self, other: ConnectionRole) -> ConnectionRole {
        ConnectionRole(self.0 | other.0)
    }

    /// Whether frames of this type belong on a connection with this role.
    pub fn accepts(self, frame_type: FrameType) -> bool {
        match frame_type {
            FrameType::Response => true,
            other => self.0 & other.byte() != 0,
        }
    }
}

/// Perform the client side of the connection handshake.
///
/// Sends the magic bytes plus the role byte and verifies the fixed 4-byte
/// acknowledgment; any other reply is a connection error.
pub fn handshake<S: Read + Write>(stream: &mut S, role: ConnectionRole) -> Result<()> {
    stream.write_all(&[CONNECT_MAGIC[0], CONNECT_MAGIC[1], role.bits()])?;
    stream.flush()?;

    let mut ack = [0u8; 4];
    stream.read_exact(&mut ack).map_err(|err| {
        if err.kind() == ErrorKind::UnexpectedEof {
            ClientError::Disconnected
        } else {
            ClientError::Io(err)
        }
    })?;

    if ack != CONNECT_ACK {
        return Err(ClientError::Handshake(format!(
            "unexpected acknowledgment {ack:02x?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    struct Duplex {
        rx: Cursor<Vec<u8>>,
        tx: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.rx.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sends_magic_and_role() {
        let mut stream = Duplex {
            rx: Cursor::new(CONNECT_ACK.to_vec()),
            tx: Vec::new(),
        };
        handshake(&mut stream, ConnectionRole::STATUS).unwrap();
        assert_eq!(stream.tx, vec![0x10, 0x00, 0x02]);
    }

    #[test]
    fn combined_roles_send_union_bitmask() {
        let mut stream = Duplex {
            rx: Cursor::new(CONNECT_ACK.to_vec()),
            tx: Vec::new(),
        };
        let role = ConnectionRole::STATUS.with(ConnectionRole::DEBUG);
        handshake(&mut stream, role).unwrap();
        assert_eq!(stream.tx, vec![0x10, 0x00, 0x03]);
    }

    #[test]
    fn rejects_wrong_acknowledgment() {
        let mut stream = Duplex {
            rx: Cursor::new(vec![0x00, 0x01, 0x00, 0x01]),
            tx: Vec::new(),
        };
        let err = handshake(&mut stream, ConnectionRole::NONE).unwrap_err();
        assert!(matches!(err, ClientError::Handshake(_)));
    }

    #[test]
    fn truncated_acknowledgment_is_disconnect() {
        let mut stream = Duplex {
            rx: Cursor::new(vec![0x00, 0x01]),
            tx: Vec::new(),
        };
        let err = handshake(&mut stream, ConnectionRole::NONE).unwrap_err();
        assert!(matches!(err, ClientError::Disconnected));
    }

    #[test]
    fn role_accepts_frame_types() {
        let role = ConnectionRole::STATUS;
        assert!(role.accepts(FrameType::Response));
        assert!(role.accepts(FrameType::Status));
        assert!(!role.accepts(FrameType::Data));

        let role = ConnectionRole::DATA.with(ConnectionRole::FFT);
        assert!(role.accepts(FrameType::Data));
        assert!(role.accepts(FrameType::Fft));
        assert!(!role.accepts(FrameType::Debug));
    }
}
