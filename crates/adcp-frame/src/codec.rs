use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: type (1) + length (2) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Maximum payload size, bounded by the 16-bit length field.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// The kind of traffic a frame carries.
///
/// The same discriminants double as the connection-role bitmask sent during
/// the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Response = 0,
    Debug = 1,
    Status = 2,
    Data = 4,
    Fft = 8,
}

impl FrameType {
    /// Map a header type byte to a known frame type.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(FrameType::Response),
            1 => Some(FrameType::Debug),
            2 => Some(FrameType::Status),
            4 => Some(FrameType::Data),
            8 => Some(FrameType::Fft),
            _ => None,
        }
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameType::Response => "RESPONSE",
            FrameType::Debug => "DEBUG",
            FrameType::Status => "STATUS",
            FrameType::Data => "DATA",
            FrameType::Fft => "FFT",
        }
    }
}

/// One complete frame extracted from the stream.
#[derive(Debug, Clone)]
pub struct Frame {
    pub frame_type: FrameType,
    pub payload: Bytes,
}

impl Frame {
    pub fn new(frame_type: FrameType, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_type,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format: `[type: u8][length: u16 LE][payload…]`. The host only sends
/// raw command bytes, so this mostly serves tests and mock instruments.
pub fn encode_frame(frame_type: FrameType, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u8(frame_type.byte());
    dst.put_u16_le(payload.len() as u16);
    dst.put_slice(payload);
    Ok(())
}

/// Split one frame off the front of the buffer.
///
/// Returns `None` until a complete frame is buffered. The type byte is
/// returned raw: even an unrecognized type carries a trustworthy length,
/// which is what lets framing re-synchronize past it.
pub fn decode_frame(src: &mut BytesMut) -> Option<(u8, Bytes)> {
    if src.len() < HEADER_SIZE {
        return None;
    }

    let type_byte = src[0];
    let payload_len = u16::from_le_bytes([src[1], src[2]]) as usize;

    if src.len() < HEADER_SIZE + payload_len {
        return None;
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Some((type_byte, payload))
}
