#![no_std]
//! Temperature readout for the DS18x20 family of 1-Wire thermometers.
//!
//! A reading broadcasts a conversion to every sensor, addresses one sensor,
//! reads its 9-byte scratchpad and checks the CRC before converting the raw
//! value according to the sensor family.

use core::fmt::Debug;

use embedded_onewire::{
    ONEWIRE_DEFAULT_RETRIES, OneWire, OneWireCrc, OneWireError, OneWireResult, Rom, retry::retry,
};
use fixed::types::I16F16;

/// Temperature in degrees Celsius.
pub type Temperature = I16F16;

/// Value reported for a ROM whose family is not a known thermometer.
///
/// Outside the range of every supported sensor, so it cannot be mistaken for
/// a reading.
pub const UNKNOWN_FAMILY: Temperature = Temperature::from_bits(1000 << 16);

/// Thermometer families, by ROM family code.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Family {
    /// DS18S20, 1/2 °C per LSB.
    Ds18s20 = 0x10,
    /// DS1822, 1/16 °C per LSB.
    Ds1822 = 0x22,
    /// DS18B20, 1/16 °C per LSB.
    Ds18b20 = 0x28,
}

impl Family {
    /// Convert a raw scratchpad reading to degrees Celsius.
    pub fn convert(&self, raw: i16) -> Temperature {
        use Family::*;
        // I16F16 keeps 16 fractional bits, shift the raw LSB into place
        let shift = match self {
            Ds18s20 => 15,
            Ds1822 | Ds18b20 => 12,
        };
        Temperature::from_bits(i32::from(raw) << shift)
    }
}

impl TryFrom<u8> for Family {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Family::*;
        match value {
            0x10 => Ok(Ds18s20),
            0x22 => Ok(Ds1822),
            0x28 => Ok(Ds18b20),
            _ => Err("Unknown thermometer family"),
        }
    }
}

/// Convert a raw reading of a sensor with the given family code.
///
/// Unknown families yield [`UNKNOWN_FAMILY`].
pub fn convert(family: u8, raw: i16) -> Temperature {
    Family::try_from(family)
        .map(|family| family.convert(raw))
        .unwrap_or(UNKNOWN_FAMILY)
}

/// Scratchpad contents: eight data bytes followed by their CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad([u8; 9]);

impl Scratchpad {
    /// Issue Read Scratchpad to the addressed sensor and fetch all 9 bytes.
    pub fn read<O: OneWire>(bus: &mut O) -> OneWireResult<Self, O::BusError> {
        bus.write_byte(DS18X20_READ_SCRATCH)?;
        let first = bus.read_4bytes()?.to_le_bytes();
        let second = bus.read_4bytes()?.to_le_bytes();
        let crc = bus.read_byte()?;
        let mut buf = [0; 9];
        buf[..4].copy_from_slice(&first);
        buf[4..8].copy_from_slice(&second);
        buf[8] = crc;
        Ok(Self(buf))
    }

    /// Raw bytes, CRC last.
    pub fn bytes(&self) -> &[u8; 9] {
        &self.0
    }

    /// Fails with [`OneWireError::InvalidCrc`] unless the CRC matches.
    pub fn verify<E>(&self) -> OneWireResult<(), E> {
        let mut crc = OneWireCrc::default();
        crc.update_all(&self.0);
        crc.verify()
    }

    /// Signed raw temperature from the first two bytes.
    pub fn raw_temperature(&self) -> i16 {
        i16::from_le_bytes([self.0[0], self.0[1]])
    }

    /// Temperature for a sensor of the given family code.
    pub fn temperature(&self, family: u8) -> Temperature {
        convert(family, self.raw_temperature())
    }
}

impl From<[u8; 9]> for Scratchpad {
    fn from(buf: [u8; 9]) -> Self {
        Self(buf)
    }
}

/// DS18x20 reader.
#[derive(Debug, Clone, Copy)]
pub struct Ds18x20 {
    retries: u8,
}

impl Default for Ds18x20 {
    fn default() -> Self {
        Self {
            retries: ONEWIRE_DEFAULT_RETRIES,
        }
    }
}

impl Ds18x20 {
    /// Set the number of attempts for one reading.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Start a conversion on every sensor on the bus.
    pub fn trigger_temperature_conversion<O: OneWire>(
        bus: &mut O,
    ) -> OneWireResult<(), O::BusError> {
        bus.address(None)?; // address all devices
        bus.write_byte(DS18X20_START_CONV)
    }

    /// Run one full conversion and scratchpad read for `rom`, without retries.
    pub fn read_scratchpad<O: OneWire>(
        bus: &mut O,
        rom: Rom,
    ) -> OneWireResult<Scratchpad, O::BusError> {
        Self::trigger_temperature_conversion(bus)?;
        bus.address(Some(rom))?;
        let scratchpad = Scratchpad::read(bus)?;
        scratchpad.verify::<O::BusError>()?;
        Ok(scratchpad)
    }

    /// Read the temperature of the sensor at `rom`.
    ///
    /// Any failure of an attempt, including a CRC mismatch, starts the
    /// sequence over.
    ///
    /// # Errors
    /// [`OneWireError::IoFailure`] once every attempt failed.
    pub fn read_temperature<O: OneWire>(
        &self,
        bus: &mut O,
        rom: Rom,
    ) -> OneWireResult<Temperature, O::BusError>
    where
        O::BusError: Debug,
    {
        retry(self.retries, OneWireError::is_retryable, |_| {
            Self::read_scratchpad(bus, rom)
        })
        .map(|scratchpad| scratchpad.temperature(rom.family()))
        .map_err(|err| {
            log::warn!("reading {} failed: {:?}", rom, err);
            if err.is_retryable() {
                OneWireError::IoFailure
            } else {
                err
            }
        })
    }
}

/// Reads the whole scratchpad including the CRC byte
pub const DS18X20_READ_SCRATCH: u8 = 0xbe;
/// Writes TH, TL (and the configuration register on DS18B20/DS1822)
pub const DS18X20_WRITE_SCRATCH: u8 = 0x4e;
/// Copies TH, TL and configuration from the scratchpad to EEPROM
pub const DS18X20_COPY_SCRATCH: u8 = 0x48;
/// Initiates temperature conversion
pub const DS18X20_START_CONV: u8 = 0x44;
/// Signals the power supply mode to the master
pub const DS18X20_READ_POWERMODE: u8 = 0xb4;
/// Recalls TH, TL and configuration from EEPROM to the scratchpad
pub const DS18X20_RECALL_EEPROM: u8 = 0xb8;
