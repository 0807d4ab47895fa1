//! Node address classes.
//!
//! Addresses are 10 bits wide. Nodes in a chain get consecutive unicast
//! addresses starting at 1; address 0 reaches every node and the top
//! sixteen addresses select a multicast group.

use std::fmt;

/// Broadcast address: every node in the chain.
pub const BROADCAST: u16 = 0x000;

/// First unicast address (the node next to the controller).
pub const UNICAST_MIN: u16 = 0x001;

/// Last unicast address.
pub const UNICAST_MAX: u16 = 0x3EA;

/// First multicast (group) address.
pub const MULTICAST_MIN: u16 = 0x3F0;

/// Last multicast (group) address.
pub const MULTICAST_MAX: u16 = 0x3FF;

/// Largest value the 10-bit address field can hold.
pub const ADDRESS_MASK: u16 = 0x3FF;

/// Classification of a 10-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressClass {
    Broadcast,
    Unicast,
    Multicast,
    /// Inside the field width but not assigned to any class.
    Reserved,
}

impl AddressClass {
    /// Classify `address`. Bits above the 10-bit field make it reserved.
    pub fn of(address: u16) -> Self {
        match address {
            BROADCAST => Self::Broadcast,
            UNICAST_MIN..=UNICAST_MAX => Self::Unicast,
            MULTICAST_MIN..=MULTICAST_MAX => Self::Multicast,
            _ => Self::Reserved,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Broadcast => "broadcast",
            Self::Unicast => "unicast",
            Self::Multicast => "multicast",
            Self::Reserved => "reserved",
        }
    }
}

impl fmt::Display for AddressClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when the address reaches more than one node.
pub fn is_broadcast_or_multicast(address: u16) -> bool {
    matches!(
        AddressClass::of(address),
        AddressClass::Broadcast | AddressClass::Multicast
    )
}

/// Returns true for every address an operator may legally send to.
pub fn is_valid(address: u16) -> bool {
    AddressClass::of(address) != AddressClass::Reserved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_classes() {
        assert_eq!(AddressClass::of(0x000), AddressClass::Broadcast);
        assert_eq!(AddressClass::of(0x001), AddressClass::Unicast);
        assert_eq!(AddressClass::of(0x3EA), AddressClass::Unicast);
        assert_eq!(AddressClass::of(0x3EB), AddressClass::Reserved);
        assert_eq!(AddressClass::of(0x3EF), AddressClass::Reserved);
        assert_eq!(AddressClass::of(0x3F0), AddressClass::Multicast);
        assert_eq!(AddressClass::of(0x3FF), AddressClass::Multicast);
        assert_eq!(AddressClass::of(0x400), AddressClass::Reserved);
    }

    #[test]
    fn test_group_detection() {
        assert!(is_broadcast_or_multicast(BROADCAST));
        assert!(is_broadcast_or_multicast(0x3F5));
        assert!(!is_broadcast_or_multicast(0x005));
        assert!(is_valid(0x3F5));
        assert!(!is_valid(0x3EC));
    }
}
