use crate::{OneWireError, OneWireResult};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Calculate CRC-8 used in 1-Wire communications.
///
/// The accumulator starts at zero. Folding in a block of data followed by its
/// trailing CRC byte leaves the accumulator at zero when the block is intact.
pub struct OneWireCrc(u8);

#[cfg(feature = "crc-table")]
const CRC_TABLE: [u8; 256] = {
    let mut table = [0; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = OneWireCrc::fold(0, idx as u8);
        idx += 1;
    }
    table
};

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Fold one byte into the accumulator `crc`, least significant bit first.
    ///
    /// Dallas/Maxim polynomial `x^8 + x^5 + x^4 + 1`.
    pub const fn fold(crc: u8, byte: u8) -> u8 {
        let mut crc = crc;
        let mut i = 0;
        while i < 8 {
            if (crc ^ (byte >> i)) & 0x01 == 0x01 {
                crc = ((crc ^ 0x18) >> 1) | 0x80;
            } else {
                crc = (crc >> 1) & 0x7f;
            }
            i += 1;
        }
        crc
    }

    /// Update the CRC with the incoming byte.
    #[cfg(feature = "crc-table")]
    pub fn update(&mut self, byte: u8) {
        self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
    }

    /// Update the CRC with the incoming byte.
    #[cfg(not(feature = "crc-table"))]
    pub fn update(&mut self, byte: u8) {
        self.0 = Self::fold(self.0, byte);
    }

    /// Update the CRC with every byte of `data`.
    pub fn update_all(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Compute the CRC of `data`.
    pub fn checksum(data: &[u8]) -> u8 {
        let mut crc = OneWireCrc::default();
        crc.update_all(data);
        crc.0
    }

    /// Fails with [`OneWireError::InvalidCrc`] unless the accumulator is zero.
    pub fn verify<E>(&self) -> OneWireResult<(), E> {
        if self.0 == 0 {
            Ok(())
        } else {
            Err(OneWireError::InvalidCrc)
        }
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        Self::checksum(sequence) == 0x0
    }
}

#[cfg(test)]
mod tests {
    use super::OneWireCrc;
    use alloc::vec::Vec;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    #[test]
    fn check_value() {
        assert_eq!(OneWireCrc::checksum(b"123456789"), 0xa1);
    }

    #[test]
    fn rom_from_application_note() {
        let rom = [0x02, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2];
        assert_eq!(OneWireCrc::checksum(&rom[..7]), 0xa2);
        assert!(OneWireCrc::validate(&rom));
    }

    #[test]
    fn update_matches_fold() {
        for crc in 0..=255u8 {
            for byte in 0..=255u8 {
                let mut acc = OneWireCrc(crc);
                acc.update(byte);
                assert_eq!(acc.value(), OneWireCrc::fold(crc, byte));
            }
        }
    }

    #[test]
    fn verify_rejects_nonzero() {
        assert!(OneWireCrc(0).verify::<()>().is_ok());
        assert!(matches!(
            OneWireCrc(0x5a).verify::<()>(),
            Err(crate::OneWireError::InvalidCrc)
        ));
    }

    #[test]
    fn single_bit_errors_are_caught() {
        let mut rng = StdRng::seed_from_u64(0x1e55);
        for _ in 0..200 {
            let len = rng.random_range(1..16);
            let mut data: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            data.push(OneWireCrc::checksum(&data));
            assert!(OneWireCrc::validate(&data));

            for bit in 0..data.len() * 8 {
                let mut corrupted = data.clone();
                corrupted[bit / 8] ^= 1 << (bit % 8);
                assert!(!OneWireCrc::validate(&corrupted), "bit {bit} flip undetected");
            }
        }
    }
}
