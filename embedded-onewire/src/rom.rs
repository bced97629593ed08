use core::{
    fmt::{Display, Formatter, LowerHex, Result as FmtResult},
    num::ParseIntError,
    str::FromStr,
};

use crate::OneWireCrc;

/// 64-bit ROM code of a 1-Wire device.
///
/// | Bit | Description |
/// |-----|-------------|
/// | 0-7 | Family code (e.g., 0x28 for DS18B20) |
/// | 8-55 | Serial number |
/// | 56-63 | CRC-8 of the lower seven bytes |
///
/// The textual form is the hexadecimal value of the 64-bit integer, zero
/// padded to 16 digits, so the family code is the last two digits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Rom(u64);

impl Rom {
    /// Wraps a raw ROM code.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw 64-bit value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Family code of the device, the lowest byte of the ROM.
    pub const fn family(&self) -> u8 {
        self.0 as u8
    }

    /// Lower 32 bits, transmitted first.
    pub const fn low_word(&self) -> u32 {
        self.0 as u32
    }

    /// Upper 32 bits, transmitted last.
    pub const fn high_word(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// ROM bytes in bus order.
    pub const fn to_le_bytes(&self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Whether the last byte is the CRC-8 of the other seven.
    pub fn has_valid_crc(&self) -> bool {
        OneWireCrc::validate(&self.to_le_bytes())
    }
}

impl From<u64> for Rom {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Rom> for u64 {
    fn from(rom: Rom) -> Self {
        rom.0
    }
}

impl Display for Rom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{:016x}", self.0)
    }
}

impl LowerHex for Rom {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        LowerHex::fmt(&self.0, f)
    }
}

/// Error returned when a textual ROM address cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid ROM address: {0}")]
pub struct InvalidAddress(ParseIntError);

impl FromStr for Rom {
    type Err = InvalidAddress;

    /// Parses up to 16 hexadecimal digits, with an optional `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16)
            .map(Rom)
            .map_err(InvalidAddress)
    }
}
