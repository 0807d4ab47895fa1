use std::path::PathBuf;

use osplink_frame::FrameError;

/// Errors that can occur while setting up a transport.
///
/// Failures during an exchange are reported as a [`Status`](crate::Status)
/// instead, since the operator sees them as part of the command output.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the bus bridge.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bridge sent bytes that do not form a telegram.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, TransportError>;
