use crate::{
    ControlTransport, Mp707, Mp707Error,
    codec::{Command, Echo, PAYLOAD},
};
use embedded_hal::delay::DelayNs;
use embedded_onewire::{OneWire, OneWireResult};

impl<T: ControlTransport, D: DelayNs> OneWire for Mp707<T, D> {
    type BusError = Mp707Error<T::Error>;

    fn reset(&mut self) -> OneWireResult<(), Self::BusError> {
        self.exchange(Command::Reset, &[], Echo::Full)?;
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        self.exchange(Command::Bit, &[bit as u8], Echo::Full)?;
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.exchange(Command::Byte, &[byte], Echo::Full)?;
        Ok(())
    }

    fn write_4bytes(&mut self, word: u32) -> OneWireResult<(), Self::BusError> {
        self.exchange(Command::Word, &word.to_le_bytes(), Echo::Full)?;
        Ok(())
    }

    fn read_2bits(&mut self) -> OneWireResult<u8, Self::BusError> {
        let input = self.exchange(Command::BitPair, &[0x01, 0x01], Echo::Header)?;
        Ok((input[PAYLOAD] & 0x01) | (input[PAYLOAD + 1] & 0x01) << 1)
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let input = self.exchange(Command::Byte, &[0xff], Echo::Header)?;
        Ok(input[PAYLOAD])
    }

    fn read_4bytes(&mut self) -> OneWireResult<u32, Self::BusError> {
        let input = self.exchange(Command::Word, &[0xff; 4], Echo::Header)?;
        let mut word = [0; 4];
        word.copy_from_slice(&input[PAYLOAD..PAYLOAD + 4]);
        Ok(u32::from_le_bytes(word))
    }
}
