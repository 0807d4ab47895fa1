use std::fmt;

use osplink_frame::address;
use osplink_frame::{
    is_legal_payload_size, psi_for, Checksum, Header, Topology, MIN_TELEGRAM_SIZE, PREAMBLE,
};

use crate::registry::VariantRegistry;
use crate::variant::{SizeMask, TelegramVariant};

const TID_INITBIDIR: u8 = 0x02;
const TID_INITLOOP: u8 = 0x03;

/// The kind of exchange a telegram is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Transmit only; no response is awaited.
    SendOnly,
    /// Transmit and wait for a response.
    SendReceive,
}

/// What the validator knows beyond the telegram bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext {
    pub checksum: Checksum,
    /// Checked against the variant's response size when set.
    pub exchange: Option<Exchange>,
    /// Checked against the init telegrams when set.
    pub topology: Option<Topology>,
    /// Validate against this variant instead of looking one up by tid and size.
    pub variant: Option<usize>,
}

/// One independent observation about a telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    TooShort { len: usize },
    BadPreamble { found: u8 },
    IllegalAddress { address: u16 },
    NoInfo { tid: u8 },
    NoBroadcast { label: String },
    NoMulticast { label: String },
    PayloadSize { label: String, size: usize, legal: SizeMask },
    IllegalPayloadSize { size: usize },
    SizeIndicator { size: usize, expected: u8, found: u8 },
    Checksum { found: u8, expected: u8 },
    UnexpectedReceive { label: String },
    MissingReceive { label: String },
    Topology { label: String, topology: Topology },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { len } => write!(
                f,
                "minimal telegram length is {MIN_TELEGRAM_SIZE} bytes, got {len} (other validation skipped)"
            ),
            Self::BadPreamble { found } => {
                write!(f, "first nibble should be preamble ({PREAMBLE:X}) but is {found:X}")
            }
            Self::IllegalAddress { address } => write!(f, "illegal addr {address:03X}"),
            Self::NoInfo { tid } => write!(f, "no info {tid:02X}/??? to validate against"),
            Self::NoBroadcast { label } => write!(f, "{label} does not support broadcast"),
            Self::NoMulticast { label } => write!(f, "{label} does not support multicast"),
            Self::PayloadSize { label, size, legal } => write!(
                f,
                "{label} does not have {size} bytes as payload, but {legal}"
            ),
            Self::IllegalPayloadSize { size } => {
                write!(f, "illegal payload size {size} (allowed is 0,1,2,3,4,6,8)")
            }
            Self::SizeIndicator {
                size,
                expected,
                found,
            } => write!(
                f,
                "payload is {size} bytes so psi should be {expected} but is {found}"
            ),
            Self::Checksum { found, expected } => {
                write!(f, "crc {found:02X} is incorrect (should be {expected:02X})")
            }
            Self::UnexpectedReceive { label } => write!(
                f,
                "a receive command is given, but {label} has no response"
            ),
            Self::MissingReceive { label } => write!(
                f,
                "{label} triggers response, but a tx only command is given"
            ),
            Self::Topology { label, topology } => {
                write!(f, "{label} does not match dirmux mode {topology}")
            }
        }
    }
}

impl VariantRegistry {
    /// Check raw telegram bytes against the protocol rules and this
    /// knowledge base.
    ///
    /// Never fails; every rule that is violated adds one finding. A telegram
    /// shorter than four bytes yields only [`Finding::TooShort`].
    pub fn validate(&self, bytes: &[u8], ctx: &ValidationContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        let Some(header) = Header::parse(bytes).filter(|_| bytes.len() >= MIN_TELEGRAM_SIZE) else {
            findings.push(Finding::TooShort { len: bytes.len() });
            return findings;
        };
        let size = bytes.len() - MIN_TELEGRAM_SIZE;

        let index = ctx
            .variant
            .filter(|&i| i < self.len())
            .unwrap_or_else(|| self.find(header.tid, size));
        let variant = &self.variants()[index];

        if header.preamble != PREAMBLE {
            findings.push(Finding::BadPreamble {
                found: header.preamble,
            });
        }
        if !address::is_valid(header.address) {
            findings.push(Finding::IllegalAddress {
                address: header.address,
            });
        }

        if variant.has_info() {
            check_variant(self, variant, &header, size, ctx, &mut findings);
        } else {
            findings.push(Finding::NoInfo { tid: header.tid });
        }

        if !is_legal_payload_size(size) {
            findings.push(Finding::IllegalPayloadSize { size });
        } else if psi_for(size) != header.psi {
            findings.push(Finding::SizeIndicator {
                size,
                expected: psi_for(size),
                found: header.psi,
            });
        }

        let (body, last) = bytes.split_at(bytes.len() - 1);
        let expected = ctx.checksum.compute(body);
        if last[0] != expected {
            findings.push(Finding::Checksum {
                found: last[0],
                expected,
            });
        }

        findings
    }
}

fn check_variant(
    registry: &VariantRegistry,
    variant: &TelegramVariant,
    header: &Header,
    size: usize,
    ctx: &ValidationContext,
    findings: &mut Vec<Finding>,
) {
    let label = variant.label();

    match ctx.exchange {
        Some(Exchange::SendReceive) if !variant.has_response() => {
            findings.push(Finding::UnexpectedReceive {
                label: label.clone(),
            });
        }
        Some(Exchange::SendOnly) if variant.has_response() => {
            findings.push(Finding::MissingReceive {
                label: label.clone(),
            });
        }
        _ => {}
    }

    if !variant.supports_broadcast() && address::is_broadcast_or_multicast(header.address) {
        let label = label.clone();
        findings.push(if header.address == address::BROADCAST {
            Finding::NoBroadcast { label }
        } else {
            Finding::NoMulticast { label }
        });
    }

    if !variant.sizes.contains(size) {
        findings.push(Finding::PayloadSize {
            label: label.clone(),
            size,
            legal: registry.legal_sizes(variant.tid),
        });
    }

    let clash = match (variant.tid, ctx.topology) {
        (TID_INITBIDIR, Some(Topology::Loop)) => Some(Topology::Loop),
        (TID_INITLOOP, Some(Topology::Bidir)) => Some(Topology::Bidir),
        _ => None,
    };
    if let Some(topology) = clash {
        findings.push(Finding::Topology { label, topology });
    }
}
