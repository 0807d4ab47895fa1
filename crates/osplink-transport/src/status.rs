use std::fmt;

use osplink_frame::FrameError;

/// Outcome of one bus exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// No (complete) response within the read timeout.
    Timeout,
    /// The bridge closed the connection.
    Closed,
    /// Any other I/O failure.
    Io,
    /// The frame to send is empty or larger than a telegram.
    TxSize,
    /// The response does not start with the preamble.
    RxPreamble,
    /// The response length differs from the expected one.
    RxSize,
    /// The response checksum is wrong.
    RxChecksum,
    /// Nothing answered (in-memory transport without a scripted response).
    NoResponse,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Timeout => "timeout",
            Self::Closed => "closed",
            Self::Io => "io",
            Self::TxSize => "tx_size",
            Self::RxPreamble => "rx_preamble",
            Self::RxSize => "rx_size",
            Self::RxChecksum => "rx_crc",
            Self::NoResponse => "no_response",
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&std::io::Error> for Status {
    fn from(err: &std::io::Error) -> Self {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => Self::Timeout,
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => Self::Closed,
            _ => Self::Io,
        }
    }
}

impl From<&FrameError> for Status {
    fn from(err: &FrameError) -> Self {
        match err {
            FrameError::InvalidPreamble { .. } => Self::RxPreamble,
            FrameError::TooShort { .. } => Self::RxSize,
            FrameError::ConnectionClosed => Self::Closed,
            FrameError::Io(io) => Self::from(io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn renders_lowercase() {
        assert_eq!(Status::Ok.to_string(), "ok");
        assert_eq!(Status::TxSize.to_string(), "tx_size");
        assert_eq!(Status::RxChecksum.to_string(), "rx_crc");
        assert_eq!(Status::NoResponse.to_string(), "no_response");
    }

    #[test]
    fn maps_read_errors() {
        let timeout = FrameError::Io(Error::new(ErrorKind::WouldBlock, "again"));
        assert_eq!(Status::from(&timeout), Status::Timeout);
        assert_eq!(Status::from(&FrameError::ConnectionClosed), Status::Closed);
        assert_eq!(
            Status::from(&FrameError::InvalidPreamble { found: 0x5 }),
            Status::RxPreamble
        );
        assert_eq!(
            Status::from(&Error::new(ErrorKind::PermissionDenied, "no")),
            Status::Io
        );
    }
}
