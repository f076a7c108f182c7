// Tue Oct 13 2026 - Alex

use serde::Serialize;
use std::fmt;
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Address {
    value: u64,
}

impl Address {
    pub fn new(value: u64) -> Self {
        Self { value }
    }

    pub fn zero() -> Self {
        Self { value: 0 }
    }

    pub fn as_u64(&self) -> u64 {
        self.value
    }

    pub fn is_null(&self) -> bool {
        self.value == 0
    }

    /// Applies a signed displacement, as used for thunk-adjusted vtable entries.
    pub fn offset(&self, offset: i64) -> Self {
        Self { value: self.value.wrapping_add(offset as u64) }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.value)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.value, f)
    }
}

impl Add<u64> for Address {
    type Output = Self;
    fn add(self, rhs: u64) -> Self::Output {
        Self { value: self.value.wrapping_add(rhs) }
    }
}

impl Sub<Address> for Address {
    type Output = i64;
    /// Signed distance, exact while the addresses are within `i64::MAX` of each other.
    fn sub(self, rhs: Address) -> Self::Output {
        self.value.wrapping_sub(rhs.value) as i64
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> Self {
        addr.value
    }
}

/// Half-open byte range `[start, start + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AddressRange {
    start: Address,
    length: u64,
}

impl AddressRange {
    pub fn new(start: Address, length: u64) -> Self {
        Self { start, length }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.start + self.length
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr >= self.start && addr < self.end()
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {})", self.start, self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_applies_negative_displacement() {
        let addr = Address::new(0x1010);
        assert_eq!(addr.offset(-0x10), Address::new(0x1000));
        assert_eq!(addr.offset(8), Address::new(0x1018));
    }

    #[test]
    fn test_range_overlap() {
        let a = AddressRange::new(Address::new(0x1000), 0x10);
        let b = AddressRange::new(Address::new(0x100c), 4);
        let c = AddressRange::new(Address::new(0x1010), 4);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(Address::new(0x100f)));
        assert!(!a.contains(Address::new(0x1010)));
    }

    #[test]
    fn test_distance_in_upper_half() {
        let high = Address::new(0xffff_ffff_ffff_fff0);
        assert_eq!(high - Address::new(0xffff_ffff_ffff_ff00), 0xf0);
        assert_eq!(Address::new(0xffff_ffff_ffff_ff00) - high, -0xf0);
        assert_eq!(Address::new(0x1000) - Address::new(0x1010), -0x10);
        assert_eq!(Address::new(0x8000_0000_0000_0000) - Address::new(1), i64::MAX);
    }
}
