use std::collections::VecDeque;

use osplink_frame::{hex_bytes, Checksum, Topology};
use tracing::debug;

use crate::check::check_response;
use crate::status::Status;
use crate::traits::{frame_size_ok, Counters, Transport};

/// Transport without a bus behind it.
///
/// Sent frames are recorded; responses are taken from a script queued
/// up front. Used for offline sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Vec<Vec<u8>>,
    responses: VecDeque<Vec<u8>>,
    checksum: Checksum,
    topology: Topology,
    counters: Counters,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check scripted responses with `checksum` instead of the default.
    pub fn with_checksum(checksum: Checksum) -> Self {
        Self {
            checksum,
            ..Self::default()
        }
    }

    /// Queue the response for the next `transmit_receive`.
    pub fn push_response(&mut self, response: impl Into<Vec<u8>>) {
        self.responses.push_back(response.into());
    }

    /// Frames sent so far, oldest first.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }

    /// Number of scripted responses not consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.responses.len()
    }

    fn record(&mut self, frame: &[u8]) {
        debug!(frame = %hex_bytes(frame), "memory transport send");
        self.sent.push(frame.to_vec());
        self.counters.tx += 1;
    }
}

impl Transport for MemoryTransport {
    fn transmit(&mut self, frame: &[u8]) -> Status {
        if !frame_size_ok(frame) {
            return Status::TxSize;
        }
        self.record(frame);
        Status::Ok
    }

    fn transmit_receive(&mut self, frame: &[u8], expected: Option<usize>) -> (Vec<u8>, Status) {
        if !frame_size_ok(frame) {
            return (Vec::new(), Status::TxSize);
        }
        self.record(frame);
        self.counters.rx += 1;
        match self.responses.pop_front() {
            Some(response) => {
                let status = check_response(&response, expected, self.checksum);
                (response, status)
            }
            None => (Vec::new(), Status::NoResponse),
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
        "memory"
    }
}
