use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::warn;

use crate::codec::{decode_frame, Frame, FrameType};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete frames.
/// Frames with an unrecognized type byte are logged and skipped; the
/// declared length is still honored so framing stays in sync.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> FrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Read the next complete frame of a known type (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            while let Some((type_byte, payload)) = decode_frame(&mut self.buf) {
                match FrameType::from_byte(type_byte) {
                    Some(frame_type) => return Ok(Frame::new(frame_type, payload)),
                    None => {
                        warn!(
                            type_byte,
                            len = payload.len(),
                            "dropping frame with unknown type"
                        );
                    }
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::encode_frame;

    fn wire(frames: &[(FrameType, &[u8])]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for (ty, payload) in frames {
            encode_frame(*ty, payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[(FrameType::Status, b"hello")])));
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.frame_type, FrameType::Status);
        assert_eq!(frame.payload.as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_frames_in_order() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[
            (FrameType::Response, b"one"),
            (FrameType::Status, b"two"),
            (FrameType::Data, b"three"),
        ])));

        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        let f3 = reader.read_frame().unwrap();

        assert_eq!((f1.frame_type, f1.payload.as_ref()), (FrameType::Response, b"one".as_ref()));
        assert_eq!((f2.frame_type, f2.payload.as_ref()), (FrameType::Status, b"two".as_ref()));
        assert_eq!((f3.frame_type, f3.payload.as_ref()), (FrameType::Data, b"three".as_ref()));
    }

    #[test]
    fn arbitrary_chunk_boundaries() {
        // Byte-by-byte delivery splits mid-header and mid-payload.
        let bytes = wire(&[
            (FrameType::Response, b"slow"),
            (FrameType::Fft, &[1, 2, 3, 4, 5, 6, 7]),
        ]);
        let mut reader = FrameReader::new(ByteByByteReader { bytes, pos: 0 });

        let f1 = reader.read_frame().unwrap();
        assert_eq!(f1.frame_type, FrameType::Response);
        assert_eq!(f1.payload.as_ref(), b"slow");

        let f2 = reader.read_frame().unwrap();
        assert_eq!(f2.frame_type, FrameType::Fft);
        assert_eq!(f2.payload.as_ref(), &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn unknown_type_skipped_and_framing_resumes() {
        let mut bytes = BytesMut::new();
        encode_frame(FrameType::Status, b"good", &mut bytes).unwrap();
        // A frame with a bogus type byte in the middle of the stream.
        bytes.put_u8(0x55);
        bytes.put_u16_le(3);
        bytes.put_slice(b"bad");
        encode_frame(FrameType::Response, b"after", &mut bytes).unwrap();

        let mut reader = FrameReader::new(Cursor::new(bytes.to_vec()));
        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();

        assert_eq!(f1.payload.as_ref(), b"good");
        assert_eq!(f2.frame_type, FrameType::Response);
        assert_eq!(f2.payload.as_ref(), b"after");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_u8(FrameType::Status.byte());
        partial.put_u16_le(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            bytes: wire(&[(FrameType::Debug, b"ok")]),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap();

        assert_eq!(frame.frame_type, FrameType::Debug);
        assert_eq!(frame.payload.as_ref(), b"ok");
    }

    #[test]
    fn io_error_propagates() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::from(ErrorKind::ConnectionReset))
            }
        }

        let mut reader = FrameReader::new(Broken);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    fn roundtrip_over_tcp() {
        use std::io::Write;

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = BytesMut::new();
            encode_frame(FrameType::Status, b"ping", &mut buf).unwrap();
            stream.write_all(&buf).unwrap();
        });

        let stream = std::net::TcpStream::connect(addr).unwrap();
        let mut reader = FrameReader::new(stream);
        let frame = reader.read_frame().unwrap();

        assert_eq!(frame.frame_type, FrameType::Status);
        assert_eq!(frame.payload.as_ref(), b"ping");
        server.join().unwrap();
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let n = (self.bytes.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
