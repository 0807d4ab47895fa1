use osplink_frame::{Checksum, Header, MIN_TELEGRAM_SIZE, PREAMBLE};

use crate::status::Status;

/// Check a received response against the expected length and checksum.
pub(crate) fn check_response(
    response: &[u8],
    expected: Option<usize>,
    checksum: Checksum,
) -> Status {
    if let Some(expected) = expected {
        if response.len() != expected {
            return Status::RxSize;
        }
    }
    if response.len() < MIN_TELEGRAM_SIZE {
        return Status::RxSize;
    }
    match Header::parse(response) {
        Some(header) if header.preamble == PREAMBLE => {}
        _ => return Status::RxPreamble,
    }
    let (body, crc) = response.split_at(response.len() - 1);
    if checksum.compute(body) != crc[0] {
        return Status::RxChecksum;
    }
    Status::Ok
}
