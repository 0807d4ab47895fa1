use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::codec::{decode_telegram, MAX_TELEGRAM_SIZE};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 64;

/// Reads complete telegrams from any `Read` stream.
///
/// The size indicator in the header decides how many bytes make up one
/// telegram; partial reads are handled internally. Bytes following a
/// telegram stay buffered for the next call.
pub struct TelegramReader<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Read> TelegramReader<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(2 * MAX_TELEGRAM_SIZE),
        }
    }

    /// Read the next complete telegram (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached, and
    /// the stream's own error (for example `TimedOut`) when a read timeout
    /// configured on it expires.
    pub fn read_telegram(&mut self) -> Result<Bytes> {
        loop {
            if let Some(tele) = decode_telegram(&mut self.buf)? {
                trace!(size = tele.len(), "telegram received");
                return Ok(tele);
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

    /// Drop any partially received bytes.
    pub fn discard_buffered(&mut self) {
        self.buf.clear();
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
    use std::io::{Cursor, Write};

    use super::*;
    use crate::codec::{build_telegram, Checksum};

    #[test]
    fn read_single_telegram() {
        let wire = build_telegram(0x001, 0x02, &[], Checksum::Additive);

        let mut reader = TelegramReader::new(Cursor::new(wire.clone()));
        let tele = reader.read_telegram().unwrap();

        assert_eq!(tele.as_ref(), wire.as_slice());
    }

    #[test]
    fn read_multiple_telegrams() {
        let mut wire = build_telegram(0x001, 0x02, &[], Checksum::Additive);
        wire.extend(build_telegram(0x001, 0x4F, &[1, 2, 3, 4, 5, 6], Checksum::Additive));
        wire.extend(build_telegram(0x3F1, 0x05, &[], Checksum::Additive));

        let mut reader = TelegramReader::new(Cursor::new(wire));

        assert_eq!(reader.read_telegram().unwrap().len(), 4);
        assert_eq!(reader.read_telegram().unwrap().len(), 10);
        assert_eq!(reader.read_telegram().unwrap().len(), 4);
    }

    #[test]
    fn partial_read_handling() {
        let wire = build_telegram(0x010, 0x4E, &[0x00, 0xFF, 0x10], Checksum::Crc8);

        let byte_reader = ByteByByteReader {
            bytes: wire.clone(),
            pos: 0,
        };
        let mut reader = TelegramReader::new(byte_reader);

        let tele = reader.read_telegram().unwrap();
        assert_eq!(tele.as_ref(), wire.as_slice());
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = TelegramReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_telegram().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_telegram() {
        let wire = build_telegram(0x001, 0x4F, &[0; 6], Checksum::Additive);

        let mut reader = TelegramReader::new(Cursor::new(wire[..5].to_vec()));
        let err = reader.read_telegram().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn invalid_preamble_in_stream() {
        let mut reader = TelegramReader::new(Cursor::new(vec![0x00, 0x04, 0x02, 0x00]));
        let err = reader.read_telegram().unwrap_err();
        assert!(matches!(err, FrameError::InvalidPreamble { found: 0 }));
    }

    #[derive(Debug)]
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

    #[cfg(unix)]
    #[test]
    fn read_over_socket_pair() {
        let (mut left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut reader = TelegramReader::new(right);

        let wire = build_telegram(0x001, 0x07, &[], Checksum::Additive);
        left.write_all(&wire).unwrap();

        let tele = reader.read_telegram().unwrap();
        assert_eq!(tele.as_ref(), wire.as_slice());
    }
}
