#![deny(missing_docs)]

/*! # MP707
 *
 * Driver for the MP707 (Rodos-5Z) USB thermometer adapter. The adapter has no
 * 1-Wire controller of its own that the host can talk to; every bus primitive
 * is sent as an 8-byte HID report and echoed back by the adapter, which lets
 * the host detect a garbled exchange.
 *
 * [`Mp707`] implements [`OneWire`], so the search and the sensor drivers built
 * on `embedded-onewire` run on top of it unchanged.
 */

pub use embedded_onewire::{OneWire, OneWireError, OneWireResult};
mod codec;
mod error;
mod onewire;
mod traits;
#[cfg(feature = "usb")]
mod usb;

pub use codec::CMD_SIZE;
pub use error::Mp707Error;
pub use traits::ControlTransport;
#[cfg(feature = "usb")]
pub use usb::{FoundDevice, HidTransport, PRODUCT_ID, UsbError, VENDOR_ID, lookup};
#[cfg(feature = "usb")]
pub use rusb;

/// Results of MP707-specific function calls.
pub type Mp707Result<T, E> = Result<T, Mp707Error<E>>;

/// A MP707 USB to 1-Wire bridge device session.
///
/// Takes ownership of a control transport (implementing [`ControlTransport`])
/// and a timer object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
/// The session owns both command buffers, so primitives on one session are
/// strictly sequential.
pub struct Mp707<T, D> {
    pub(crate) transport: T,
    pub(crate) delay: D,
    pub(crate) id: u8,
    pub(crate) output: [u8; CMD_SIZE],
    pub(crate) input: [u8; CMD_SIZE],
}

impl<T, D> Mp707<T, D> {
    /// Creates a new instance of `Mp707` with the given transport.
    pub fn new(transport: T, delay: D) -> Self {
        Mp707 {
            transport,
            delay,
            id: 0,
            output: [0; CMD_SIZE],
            input: [0; CMD_SIZE],
        }
    }

    /// Set the numeric identifier of this adapter.
    pub fn with_id(mut self, id: u8) -> Self {
        self.id = id;
        self
    }

    /// Numeric identifier of this adapter.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Gives back the transport and the delay source.
    pub fn release(self) -> (T, D) {
        (self.transport, self.delay)
    }
}
