use osplink_frame::Topology;

use crate::status::Status;

/// Number of telegrams sent and received since the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub tx: u32,
    pub rx: u32,
}

/// A link to a chain of OSP nodes.
///
/// Implementations only move bytes: frames are handed over fully built,
/// and the caller decides how to interpret the returned [`Status`].
pub trait Transport {
    /// Send a telegram that does not expect a response.
    fn transmit(&mut self, frame: &[u8]) -> Status;

    /// Send a telegram and wait for its response.
    ///
    /// With `expected` set, a response of any other length is reported as
    /// [`Status::RxSize`]; the received bytes are returned either way.
    fn transmit_receive(&mut self, frame: &[u8], expected: Option<usize>) -> (Vec<u8>, Status);

    fn topology(&self) -> Topology;

    fn set_topology(&mut self, topology: Topology);

    fn counters(&self) -> Counters;

    fn reset_counters(&mut self);

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, frame: &[u8]) -> Status {
        (**self).transmit(frame)
    }

    fn transmit_receive(&mut self, frame: &[u8], expected: Option<usize>) -> (Vec<u8>, Status) {
        (**self).transmit_receive(frame, expected)
    }

    fn topology(&self) -> Topology {
        (**self).topology()
    }

    fn set_topology(&mut self, topology: Topology) {
        (**self).set_topology(topology)
    }

    fn counters(&self) -> Counters {
        (**self).counters()
    }

    fn reset_counters(&mut self) {
        (**self).reset_counters()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Whether `frame` can be put on the wire at all.
pub(crate) fn frame_size_ok(frame: &[u8]) -> bool {
    !frame.is_empty() && frame.len() <= osplink_frame::MAX_TELEGRAM_SIZE
}
