use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Bit that turns a telegram into its status-request twin.
pub const STATUS_REQUEST_BIT: u8 = 0x20;

/// How a telegram may be addressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Casting {
    /// Sent to one node; may also be broad- or multicast when it has no response.
    #[default]
    Unicast,
    /// Travels through the chain, each node acting on it in turn.
    Serial,
}

/// Set of legal payload lengths, one bit per size 0..=8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct SizeMask(u16);

impl SizeMask {
    pub const EMPTY: Self = Self(0);

    /// Mask accepting exactly `size`.
    pub const fn size(size: usize) -> Self {
        Self(1 << size)
    }

    /// Mask accepting every wire-legal size in `lo..=hi`.
    ///
    /// Sizes 5 and 7 can not be expressed by the size indicator and are
    /// left out.
    pub const fn range(lo: usize, hi: usize) -> Self {
        let mut bits = 0u16;
        let mut n = lo;
        while n <= hi && n <= 8 {
            if n != 5 && n != 7 {
                bits |= 1 << n;
            }
            n += 1;
        }
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, size: usize) -> bool {
        size <= 8 && self.0 & (1 << size) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Iterate the accepted sizes in increasing order.
    pub fn sizes(self) -> impl Iterator<Item = usize> {
        (0..=8).filter(move |&n| self.contains(n))
    }

    pub fn min(self) -> Option<usize> {
        self.sizes().next()
    }

    pub fn max(self) -> Option<usize> {
        self.sizes().last()
    }
}

/// Renders runs as ranges, e.g. `0`, `1..4,6,8`, or `-` when empty.
impl fmt::Display for SizeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut first = true;
        let mut n = 0;
        while n <= 8 {
            if !self.contains(n) {
                n += 1;
                continue;
            }
            let start = n;
            while n < 8 && self.contains(n + 1) {
                n += 1;
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if start == n {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}..{n}")?;
            }
            n += 1;
        }
        Ok(())
    }
}

impl From<SizeMask> for Vec<u8> {
    fn from(mask: SizeMask) -> Self {
        mask.sizes().map(|n| n as u8).collect()
    }
}

impl TryFrom<Vec<u8>> for SizeMask {
    type Error = String;

    fn try_from(sizes: Vec<u8>) -> Result<Self, Self::Error> {
        let mut bits = 0u16;
        for size in sizes {
            if size > 8 {
                return Err(format!("payload size {size} exceeds 8"));
            }
            bits |= 1 << size;
        }
        Ok(Self(bits))
    }
}

/// One interpretation of a telegram identifier.
///
/// A row either describes a telegram fully or is an empty placeholder for
/// an identifier nothing is known about (no name, mask, response or
/// description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramVariant {
    pub tid: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Cow<'static, str>>,
    #[serde(default)]
    pub casting: Casting,
    #[serde(default)]
    pub sizes: SizeMask,
    #[serde(default)]
    pub response_size: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tele_args: Option<Cow<'static, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resp_args: Option<Cow<'static, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Cow<'static, str>>,
}

impl TelegramVariant {
    /// Placeholder row for an identifier without known semantics.
    pub fn unknown(tid: u8) -> Self {
        Self {
            tid,
            name: None,
            casting: Casting::Unicast,
            sizes: SizeMask::EMPTY,
            response_size: 0,
            tele_args: None,
            resp_args: None,
            description: None,
        }
    }

    pub fn has_info(&self) -> bool {
        self.name.is_some()
    }

    /// Name for messages; `???` for placeholder rows.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("???")
    }

    pub fn has_response(&self) -> bool {
        self.response_size > 0
    }

    /// Whether broadcast and multicast addressing is allowed.
    ///
    /// Only unicast telegrams without a response qualify: a serial-cast
    /// telegram must ripple through the chain and a response can come from
    /// one node only.
    pub fn supports_broadcast(&self) -> bool {
        self.has_info() && self.response_size == 0 && self.casting == Casting::Unicast
    }

    /// Whether this is the status-request twin of another telegram.
    pub fn is_status_request(&self) -> bool {
        self.tid & STATUS_REQUEST_BIT != 0
    }

    /// Whether a status-request twin may exist at `tid ^ 0x20`.
    pub fn may_have_status_request(&self) -> bool {
        self.response_size == 0 && self.casting == Casting::Unicast && self.tid != 0
    }

    /// `tid/name` as used throughout operator messages.
    pub fn label(&self) -> String {
        format!("{:02X}/{}", self.tid, self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_skips_illegal_sizes() {
        let mask = SizeMask::range(0, 8);
        assert!(mask.contains(4));
        assert!(!mask.contains(5));
        assert!(mask.contains(6));
        assert!(!mask.contains(7));
        assert!(mask.contains(8));
        assert!(!mask.contains(9));
    }

    #[test]
    fn test_mask_rendering() {
        assert_eq!(SizeMask::EMPTY.to_string(), "-");
        assert_eq!(SizeMask::size(0).to_string(), "0");
        assert_eq!(SizeMask::range(1, 8).to_string(), "1..4,6,8");
        assert_eq!(SizeMask::size(2).union(SizeMask::size(3)).to_string(), "2..3");
        assert_eq!(SizeMask::size(0).union(SizeMask::size(6)).to_string(), "0,6");
    }

    #[test]
    fn test_mask_bounds() {
        let mask = SizeMask::range(3, 8);
        assert_eq!(mask.min(), Some(3));
        assert_eq!(mask.max(), Some(8));
        assert_eq!(SizeMask::EMPTY.min(), None);
    }

    #[test]
    fn test_mask_serde_as_size_list() {
        let json = serde_json::to_string(&SizeMask::range(1, 4)).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let mask: SizeMask = serde_json::from_str("[0,6]").unwrap();
        assert_eq!(mask, SizeMask::size(0).union(SizeMask::size(6)));
        assert!(serde_json::from_str::<SizeMask>("[9]").is_err());
    }

    #[test]
    fn test_derived_rules() {
        let mut v = TelegramVariant::unknown(0x05);
        assert!(!v.supports_broadcast());
        v.name = Some("goactive".into());
        v.sizes = SizeMask::size(0);
        v.description = Some("x".into());
        assert!(v.supports_broadcast());
        assert!(v.may_have_status_request());
        v.response_size = 1;
        assert!(!v.supports_broadcast());
        assert_eq!(v.label(), "05/goactive");
    }
}
