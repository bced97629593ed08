//! Command constants for 1-Wire communication.

/// Command to read the ROM of the only device on the bus
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Command to match a specific ROM address in 1-Wire communication
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Command to skip ROM address in 1-Wire communication
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// Command to search for devices on the 1-Wire bus
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Command to search for devices in alarm state on the 1-Wire bus
pub const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xec;

/// Number of bits in a ROM code
pub const ONEWIRE_ROM_BITS: usize = 64;

/// Default number of attempts for multi-step bus operations
pub const ONEWIRE_DEFAULT_RETRIES: u8 = 3;
