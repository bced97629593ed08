use crate::{OneWireResult, Rom, consts::{ONEWIRE_MATCH_ROM_CMD, ONEWIRE_SKIP_ROM_CMD}};

/// Trait for 1-Wire communication.
/// This trait defines the primitive operations of a 1-Wire bus master. Every
/// higher layer ([search](crate::OneWireSearch), device drivers) is built from
/// these calls only.
///
/// Implementations must not retry internally: the first failure is returned to
/// the caller, which owns the retry policy.
pub trait OneWire {
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus.
    ///
    /// # Errors
    /// This method returns an error if the reset operation fails.
    fn reset(&mut self) -> OneWireResult<(), Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    /// # Arguments
    /// * `bit` - The bit to write.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Writes a byte to the 1-Wire bus.
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError>;

    /// Writes four bytes to the 1-Wire bus, least significant byte first.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    fn write_4bytes(&mut self, word: u32) -> OneWireResult<(), Self::BusError>;

    /// Reads two consecutive bits from the 1-Wire bus.
    ///
    /// During a ROM search these are the id bit and its complement.
    ///
    /// # Returns
    /// The first bit in bit 0 and the second bit in bit 1 of the result.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_2bits(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Reads a byte from the 1-Wire bus.
    /// # Returns
    /// Byte read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError>;

    /// Reads four bytes from the 1-Wire bus.
    /// # Returns
    /// The bytes assembled least significant byte first.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    fn read_4bytes(&mut self) -> OneWireResult<u32, Self::BusError>;

    /// Addresses devices on the 1-Wire bus.
    /// The bus is reset, then either a Match ROM command followed by the ROM
    /// as two 4-byte words, or a Skip ROM command is sent.
    /// # Arguments
    /// * `rom` - The ROM address of the device to address. Pass [`None`] to skip ROM addressing and address all devices on the bus.
    ///
    /// # Returns
    /// A result indicating the success or failure of the operation.
    fn address(&mut self, rom: Option<Rom>) -> OneWireResult<(), Self::BusError> {
        self.reset()?;
        match rom {
            Some(rom) => {
                self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
                self.write_4bytes(rom.low_word())?;
                self.write_4bytes(rom.high_word())
            }
            None => self.write_byte(ONEWIRE_SKIP_ROM_CMD),
        }
    }
}

