//! Bit-packed telegram framing for the OSP serial LED bus.
//!
//! Every telegram on the wire is:
//! - A 4-bit preamble (0xA) for stream synchronization
//! - A 10-bit node address and a 3-bit payload size indicator (psi)
//! - A 7-bit telegram identifier (tid)
//! - 0 to 8 payload bytes and one trailing checksum byte
//!
//! Building is deliberately permissive; checking a telegram against the
//! protocol rules is left to `osplink-variants`.

pub mod address;
pub mod codec;
pub mod dissect;
pub mod error;
pub mod reader;
pub mod topology;

pub use address::AddressClass;
pub use codec::{
    build_telegram, decode_telegram, encode_telegram, is_legal_payload_size, payload_size_for,
    psi_for, Checksum, Header, CHECKSUM_SEED, HEADER_SIZE, LEGAL_PAYLOAD_SIZES,
    MAX_PAYLOAD_SIZE, MAX_TELEGRAM_SIZE, MIN_TELEGRAM_SIZE, PREAMBLE,
};
pub use dissect::{dissect, hex_bytes, Dissection, Field};
pub use error::{FrameError, Result};
pub use reader::TelegramReader;
pub use topology::Topology;

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
