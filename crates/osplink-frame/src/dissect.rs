//! Field-by-field decoding of a telegram for display.

use crate::address::AddressClass;
use crate::codec::{Checksum, Header, MIN_TELEGRAM_SIZE, PREAMBLE};
use crate::error::{FrameError, Result};

/// A telegram split into its fields.
///
/// Nothing here is validated; the checksum is recomputed only so it can be
/// shown next to the received one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissection {
    pub header: Header,
    pub payload: Vec<u8>,
    pub checksum: u8,
    pub expected_checksum: u8,
}

/// One row of the dissection table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub value: String,
    pub note: String,
}

impl Dissection {
    pub fn checksum_ok(&self) -> bool {
        self.checksum == self.expected_checksum
    }

    /// Rows for preamble, address, psi, tid, payload and checksum.
    pub fn fields(&self) -> Vec<Field> {
        let h = &self.header;
        let preamble_note = if h.preamble == PREAMBLE {
            "ok".to_string()
        } else {
            format!("expected {PREAMBLE:X}")
        };
        let payload_note = if self.payload.len() == h.payload_size() {
            format!("{} bytes", self.payload.len())
        } else {
            format!("{} bytes, psi announces {}", self.payload.len(), h.payload_size())
        };
        let checksum_note = if self.checksum_ok() {
            "matches".to_string()
        } else {
            format!("expected {:02X}", self.expected_checksum)
        };

        vec![
            field("preamble", format!("{:X}", h.preamble), preamble_note),
            field(
                "address",
                format!("{:03X}", h.address),
                AddressClass::of(h.address).to_string(),
            ),
            field(
                "psi",
                h.psi.to_string(),
                format!("payload size {}", h.payload_size()),
            ),
            field("tid", format!("{:02X}", h.tid), String::new()),
            field("payload", hex_bytes(&self.payload), payload_note),
            field("crc", format!("{:02X}", self.checksum), checksum_note),
        ]
    }
}

fn field(name: &'static str, value: String, note: String) -> Field {
    Field { name, value, note }
}

/// Split `bytes` into telegram fields.
///
/// Any sequence of at least four bytes dissects; the payload is whatever
/// lies between header and last byte, independent of the size indicator.
pub fn dissect(bytes: &[u8], checksum: Checksum) -> Result<Dissection> {
    let header = match Header::parse(bytes) {
        Some(header) if bytes.len() >= MIN_TELEGRAM_SIZE => header,
        _ => {
            return Err(FrameError::TooShort {
                len: bytes.len(),
                min: MIN_TELEGRAM_SIZE,
            })
        }
    };
    let (body, last) = bytes.split_at(bytes.len() - 1);

    Ok(Dissection {
        header,
        payload: body[3..].to_vec(),
        checksum: last[0],
        expected_checksum: checksum.compute(body),
    })
}

/// Render bytes as space separated upper-case hex pairs.
pub fn hex_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{b:02X}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::build_telegram;

    #[test]
    fn test_dissect_fields() {
        let tele = build_telegram(0x005, 0x4D, &[0x0F], Checksum::Additive);
        let d = dissect(&tele, Checksum::Additive).unwrap();

        assert_eq!(d.header.address, 0x005);
        assert_eq!(d.header.tid, 0x4D);
        assert_eq!(d.header.psi, 1);
        assert_eq!(d.payload, vec![0x0F]);
        assert!(d.checksum_ok());

        let fields = d.fields();
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1].value, "005");
        assert_eq!(fields[1].note, "unicast");
        assert_eq!(fields[5].note, "matches");
    }

    #[test]
    fn test_dissect_bad_checksum_still_decodes() {
        let mut tele = build_telegram(0x000, 0x00, &[], Checksum::Additive);
        let good = tele[3];
        tele[3] = good.wrapping_add(1);

        let d = dissect(&tele, Checksum::Additive).unwrap();
        assert_eq!(d.header.address, 0x000);
        assert!(!d.checksum_ok());
        assert_eq!(d.expected_checksum, good);
        assert_eq!(d.fields()[5].note, format!("expected {good:02X}"));
    }

    #[test]
    fn test_dissect_any_preamble() {
        let d = dissect(&[0x50, 0x04, 0x02, 0x00], Checksum::Crc8).unwrap();
        assert_eq!(d.header.preamble, 0x5);
        assert_eq!(d.fields()[0].note, "expected A");
    }

    #[test]
    fn test_dissect_too_short() {
        let err = dissect(&[0xA0, 0x04, 0x02], Checksum::Additive).unwrap_err();
        assert!(matches!(err, FrameError::TooShort { len: 3, min: 4 }));
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[]), "");
        assert_eq!(hex_bytes(&[0xA0, 0x04, 0x02]), "A0 04 02");
    }
}
