use std::fmt;
use std::io;

use osplink::frame::FrameError;
use osplink::transport::TransportError;
use osplink::variants::VariantError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Connect { .. } | TransportError::Io(_) => {
            CliError::new(TRANSPORT_ERROR, format!("{context}: {err}"))
        }
        TransportError::Frame(err) => frame_error(context, err),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

/// Knowledge-base failures stop the program before any command runs.
pub fn variant_error(context: &str, err: VariantError) -> CliError {
    match err {
        VariantError::LoadFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        VariantError::InvalidJson(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connection_is_a_transport_error() {
        let err = io_error("connect", io::Error::from(io::ErrorKind::ConnectionRefused));
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("connect: "));
    }

    #[test]
    fn inconsistent_table_is_internal() {
        let err = variant_error("telegram knowledge base", VariantError::Empty);
        assert_eq!(err.code, INTERNAL);
    }

    #[test]
    fn malformed_frame_is_invalid_data() {
        let err = frame_error("rx", FrameError::InvalidPreamble { found: 0x5 });
        assert_eq!(err.code, DATA_INVALID);
        let err = frame_error("rx", FrameError::ConnectionClosed);
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
