use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use osplink_frame::{hex_bytes, Checksum, TelegramReader, Topology};
use tracing::{debug, warn};

use crate::check::check_response;
use crate::error::{Result, TransportError};
use crate::status::Status;
use crate::traits::{frame_size_ok, Counters, Transport};

/// Settings for a [`StreamTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Checksum kind used to verify responses.
    pub checksum: Checksum,
    /// How long to wait for a response; `None` blocks.
    pub read_timeout: Option<Duration>,
    pub topology: Topology,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            checksum: Checksum::default(),
            read_timeout: Some(Self::DEFAULT_READ_TIMEOUT),
            topology: Topology::default(),
        }
    }
}

impl StreamConfig {
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);
}

/// Transport over a byte stream to a bus bridge or simulator.
///
/// Telegrams are written raw; responses are framed by their size
/// indicator. Timeouts are whatever the stream itself enforces.
pub struct StreamTransport<S> {
    reader: TelegramReader<S>,
    checksum: Checksum,
    topology: Topology,
    counters: Counters,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(stream: S, config: StreamConfig) -> Self {
        Self {
            reader: TelegramReader::new(stream),
            checksum: config.checksum,
            topology: config.topology,
            counters: Counters::default(),
        }
    }

    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }

    fn send(&mut self, frame: &[u8]) -> Status {
        if !frame_size_ok(frame) {
            return Status::TxSize;
        }
        debug!(frame = %hex_bytes(frame), "send");
        let stream = self.reader.get_mut();
        if let Err(err) = stream.write_all(frame).and_then(|()| stream.flush()) {
            warn!(error = %err, "write to bus bridge failed");
            return Status::from(&err);
        }
        self.counters.tx += 1;
        Status::Ok
    }
}

#[cfg(unix)]
impl StreamTransport<std::os::unix::net::UnixStream> {
    /// Connect to a bus bridge listening on a Unix domain socket.
    pub fn connect_unix(path: impl AsRef<Path>, config: StreamConfig) -> Result<Self> {
        let path = path.as_ref();
        let stream =
            std::os::unix::net::UnixStream::connect(path).map_err(|e| TransportError::Connect {
                path: path.to_path_buf(),
                source: e,
            })?;
        stream.set_read_timeout(config.read_timeout)?;
        debug!(?path, "connected to bus bridge");
        Ok(Self::new(stream, config))
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn transmit(&mut self, frame: &[u8]) -> Status {
        self.send(frame)
    }

    fn transmit_receive(&mut self, frame: &[u8], expected: Option<usize>) -> (Vec<u8>, Status) {
        // stale bytes from an earlier timed out exchange
        self.reader.discard_buffered();

        let status = self.send(frame);
        if !status.is_ok() {
            return (Vec::new(), status);
        }

        self.counters.rx += 1;
        match self.reader.read_telegram() {
            Ok(response) => {
                debug!(frame = %hex_bytes(&response), "received");
                let status = check_response(&response, expected, self.checksum);
                (response.to_vec(), status)
            }
            Err(err) => {
                let status = Status::from(&err);
                debug!(error = %err, %status, "no response");
                self.reader.discard_buffered();
                (Vec::new(), status)
            }
        }
    }

    fn topology(&self) -> Topology {
        self.topology
    }

    fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    fn counters(&self) -> Counters {
        self.counters
    }

    fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    fn name(&self) -> &'static str {
        "stream"
    }
}
