/// Errors that can occur while decoding or reading telegrams.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The top nibble of the first byte is not the OSP preamble.
    #[error("invalid telegram preamble {found:X} (expected A)")]
    InvalidPreamble { found: u8 },

    /// The byte sequence is shorter than header plus checksum.
    #[error("telegram too short ({len} bytes, minimum {min})")]
    TooShort { len: usize, min: usize },

    /// An I/O error occurred while reading telegrams.
    #[error("telegram I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete telegram was received.
    #[error("connection closed (incomplete telegram)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
