//! Bus transports for OSP telegrams.
//!
//! A [`Transport`] moves fully built telegrams to a chain of nodes and
//! returns the response together with a [`Status`]:
//! - [`MemoryTransport`] has no bus; it records frames and plays back
//!   scripted responses
//! - [`StreamTransport`] talks to a bus bridge over any byte stream,
//!   typically a Unix domain socket

mod check;
pub mod error;
pub mod memory;
pub mod status;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use memory::MemoryTransport;
pub use status::Status;
pub use stream::{StreamConfig, StreamTransport};
pub use traits::{Counters, Transport};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
