//! Length-prefixed frame extraction for the ADCP instrument protocol.
//!
//! Everything the instrument sends is framed with a 3-byte header:
//! - A 1-byte frame type (response, debug, status, data, FFT)
//! - A 2-byte little-endian payload length
//!
//! Frames may arrive split across reads or several per read; the reader
//! buffers leftovers so callers only ever see complete frames. Commands in
//! the other direction are written raw; only instrument-to-host traffic
//! is framed.

pub mod codec;
pub mod error;
pub mod reader;

pub use codec::{decode_frame, encode_frame, Frame, FrameType, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
