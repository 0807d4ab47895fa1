//! Argument parsing helpers shared by command handlers.

/// Parse a hex number of up to four significant digits.
///
/// Leading zeros do not count, so `000001F4` is accepted. Case is ignored.
pub fn parse_hex(s: &str) -> Option<u16> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digits = s.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    if digits.len() > 4 {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Parse a signed decimal number, rejecting overflow.
pub fn parse_dec(s: &str) -> Option<i32> {
    s.parse().ok()
}

/// Returns true when `part` is a non-empty prefix of `full`.
///
/// Subcommands match on any prefix: `is_prefix("record", "rec")`.
pub fn is_prefix(full: &str, part: &str) -> bool {
    !part.is_empty() && full.starts_with(part)
}
