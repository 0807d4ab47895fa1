use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Preamble nibble carried in the top four bits of every telegram.
pub const PREAMBLE: u8 = 0xA;

/// Header: preamble (4b) + address (10b) + psi (3b) + tid (7b) = 3 bytes.
pub const HEADER_SIZE: usize = 3;

/// Header plus trailing checksum.
pub const MIN_TELEGRAM_SIZE: usize = HEADER_SIZE + 1;

/// Largest payload the size indicator can express.
pub const MAX_PAYLOAD_SIZE: usize = 8;

pub const MAX_TELEGRAM_SIZE: usize = MIN_TELEGRAM_SIZE + MAX_PAYLOAD_SIZE;

/// Payload sizes the 3-bit size indicator can encode.
pub const LEGAL_PAYLOAD_SIZES: [usize; 7] = [0, 1, 2, 3, 4, 6, 8];

/// Seed of the additive checksum.
pub const CHECKSUM_SEED: u8 = 0xA5;

const CRC8_POLY: u8 = 0x2F;

/// Checksum algorithm appended as the last telegram byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Checksum {
    /// Wrapping 8-bit sum of all bytes, seeded with [`CHECKSUM_SEED`].
    #[default]
    Additive,
    /// CRC-8, polynomial 0x2F, init 0x00, no reflection, as computed by OSP silicon.
    Crc8,
}

impl Checksum {
    /// Compute the checksum over `bytes`.
    pub fn compute(self, bytes: &[u8]) -> u8 {
        match self {
            Self::Additive => bytes
                .iter()
                .fold(CHECKSUM_SEED, |sum, &b| sum.wrapping_add(b)),
            Self::Crc8 => bytes.iter().fold(0u8, |crc, &b| {
                let mut crc = crc ^ b;
                for _ in 0..8 {
                    crc = if crc & 0x80 != 0 {
                        (crc << 1) ^ CRC8_POLY
                    } else {
                        crc << 1
                    };
                }
                crc
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::Crc8 => "crc8",
        }
    }
}

/// Returns true when `size` can be expressed by the size indicator.
pub fn is_legal_payload_size(size: usize) -> bool {
    LEGAL_PAYLOAD_SIZES.contains(&size)
}

/// Canonical size indicator for a payload of `size` bytes.
///
/// Sizes below 8 map to themselves (so 5 and 7 produce indicators that
/// do not round-trip); 8 and above map to 7.
pub fn psi_for(size: usize) -> u8 {
    if size < 8 {
        size as u8
    } else {
        7
    }
}

/// Payload size announced by a size indicator.
pub fn payload_size_for(psi: u8) -> usize {
    match psi & 0x07 {
        7 => 8,
        n => n as usize,
    }
}

/// Decoded three-byte telegram header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub preamble: u8,
    pub address: u16,
    pub psi: u8,
    pub tid: u8,
}

impl Header {
    /// Decode the header fields from the first three bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let [b0, b1, b2, ..] = *bytes else {
            return None;
        };
        Some(Self {
            preamble: b0 >> 4,
            address: (u16::from(b0 & 0x0F) << 6) | u16::from(b1 >> 2),
            psi: ((b1 & 0x03) << 1) | (b2 >> 7),
            tid: b2 & 0x7F,
        })
    }

    /// Payload size announced by the size indicator.
    pub fn payload_size(&self) -> usize {
        payload_size_for(self.psi)
    }

    /// Total wire size announced by this header.
    pub fn telegram_size(&self) -> usize {
        MIN_TELEGRAM_SIZE + self.payload_size()
    }
}

/// Encode a telegram into the wire format.
///
/// Wire format (most significant bit first):
/// ```text
/// ┌──────────┬──────────────┬─────────┬─────────┬─────────────┬──────────┐
/// │ Preamble │ Address      │ PSI     │ TID     │ Payload     │ Checksum │
/// │ 4b (0xA) │ 10b          │ 3b      │ 7b      │ 0..8 bytes  │ 1 byte   │
/// └──────────┴──────────────┴─────────┴─────────┴─────────────┴──────────┘
/// ```
///
/// Fields are masked to their width and nothing is rejected: a payload of
/// 5 or 7 bytes still goes out with its (non-canonical) size indicator.
pub fn encode_telegram(
    address: u16,
    tid: u8,
    payload: &[u8],
    checksum: Checksum,
    dst: &mut BytesMut,
) {
    let start = dst.len();
    let psi = psi_for(payload.len());
    dst.reserve(MIN_TELEGRAM_SIZE + payload.len());
    dst.put_u8((PREAMBLE << 4) | ((address >> 6) as u8 & 0x0F));
    dst.put_u8((((address & 0x3F) as u8) << 2) | (psi >> 1));
    dst.put_u8(((psi & 0x01) << 7) | (tid & 0x7F));
    dst.put_slice(payload);
    let crc = checksum.compute(&dst[start..]);
    dst.put_u8(crc);
}

/// Encode a telegram into a fresh byte vector.
pub fn build_telegram(address: u16, tid: u8, payload: &[u8], checksum: Checksum) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(MIN_TELEGRAM_SIZE + payload.len());
    encode_telegram(address, tid, payload, checksum, &mut buf);
    buf.to_vec()
}

/// Decode one telegram from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete telegram yet.
/// The checksum is not verified; on success the telegram bytes are consumed.
pub fn decode_telegram(src: &mut BytesMut) -> Result<Option<Bytes>> {
    let Some(header) = Header::parse(&src[..]) else {
        return Ok(None); // Need more data
    };

    if header.preamble != PREAMBLE {
        return Err(FrameError::InvalidPreamble {
            found: header.preamble,
        });
    }

    let total = header.telegram_size();
    if src.len() < total {
        return Ok(None); // Need more data
    }

    Ok(Some(src.split_to(total).freeze()))
}
