/// Device addresses and OUI vendor lookup.
///
/// Addresses are held as six raw octets in transmission order (most
/// significant first) and rendered in the canonical `AA:BB:CC:DD:EE:FF`
/// form. The first three octets form the OUI key.

use core::fmt;
use core::str::FromStr;

use crate::defaults::{OUI_PREFIXES, UNKNOWN_VENDOR};
use crate::error::Error;

/// Canonical text form is 17 chars; one spare for serializers that want it.
pub type MacString = heapless::String<18>;

/// A six-octet BLE device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Build from the little-endian byte order used by the HCI layer.
    pub fn from_le_bytes(raw: [u8; 6]) -> Self {
        let mut octets = raw;
        octets.reverse();
        Self(octets)
    }

    pub fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Vendor label for this address, `"Unknown"` on a miss.
    pub fn vendor(&self) -> &'static str {
        vendor_for_oui(self.oui())
    }

    /// Render into a fixed-capacity string.
    pub fn to_mac_string(&self) -> MacString {
        use core::fmt::Write;
        let mut s = MacString::new();
        let _ = write!(s, "{}", self);
        s
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    /// Parse `AA:BB:CC:DD:EE:FF`, hex digits in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(Error::InvalidAddress)?;
            *octet = parse_octet(part)?;
        }
        if parts.next().is_some() {
            return Err(Error::InvalidAddress);
        }
        Ok(Self(octets))
    }
}

fn parse_octet(part: &str) -> Result<u8, Error> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidAddress);
    }
    u8::from_str_radix(part, 16).map_err(|_| Error::InvalidAddress)
}

/// Map an address string to a vendor label.
///
/// Only the leading `XX:XX:XX` is examined, case-insensitively. Text that
/// does not start with a well-formed OUI yields `"Unknown"`.
pub fn lookup(address: &str) -> &'static str {
    let Some(prefix) = address.get(..8) else {
        return UNKNOWN_VENDOR;
    };
    let mut oui = [0u8; 3];
    let mut parts = prefix.split(':');
    for octet in oui.iter_mut() {
        match parts.next().map(parse_octet) {
            Some(Ok(v)) => *octet = v,
            _ => return UNKNOWN_VENDOR,
        }
    }
    vendor_for_oui(oui)
}

fn vendor_for_oui(oui: [u8; 3]) -> &'static str {
    OUI_PREFIXES
        .iter()
        .find(|(prefix, _)| *prefix == oui)
        .map(|&(_, vendor)| vendor)
        .unwrap_or(UNKNOWN_VENDOR)
}
