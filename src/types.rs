use std::fmt;

/// 12-bit unsigned integer for the MCS-4 address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct U12(u16);

impl U12 {
    pub fn new(value: u16) -> Self {
        U12(value & 0xFFF)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    pub fn wrapping_inc(&self) -> Self {
        U12::new(self.0.wrapping_add(1))
    }

    /// One of the three 4-bit slots, 0 = low, 2 = high.
    pub fn nibble(&self, index: u8) -> u8 {
        ((self.0 >> (4 * (index & 0x3))) & 0xF) as u8
    }

    /// Replace one 4-bit slot, leaving the others untouched.
    pub fn with_nibble(&self, index: u8, nibble: u8) -> Self {
        let shift = 4 * (index & 0x3) as u16;
        U12::new((self.0 & !(0xF << shift)) | (((nibble & 0xF) as u16) << shift))
    }
}

impl fmt::Display for U12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}", self.0)
    }
}

impl From<u16> for U12 {
    fn from(value: u16) -> Self {
        U12::new(value)
    }
}

impl From<U12> for u16 {
    fn from(value: U12) -> Self {
        value.value()
    }
}
