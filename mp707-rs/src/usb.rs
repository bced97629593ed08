use std::time::Duration;

use rusb::{DeviceHandle, UsbContext};

use crate::{CMD_SIZE, ControlTransport};

/// Vendor ID of the Rodos-5Z / MP707 adapter.
pub const VENDOR_ID: u16 = 0x20a0;
/// Product ID of the Rodos-5Z / MP707 adapter.
pub const PRODUCT_ID: u16 = 0x4173;

/// Default timeout of a single control transfer.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

// HID class requests, HID 1.11 section 7.2
const HID_GET_REPORT: u8 = 0x01;
const HID_SET_REPORT: u8 = 0x09;

// bmRequestType values the adapter is known to answer: the direction bit, the
// report descriptor type (0x22) and the HID report type or'ed together
const REQUEST_TYPE_OUT: u8 = 0x22;
const REQUEST_TYPE_IN: u8 = 0xa3;

const REPORT_VALUE: u16 = 0x300;
const REPORT_INDEX: u16 = 0;

// libusb error codes, used where rusb does not hand out a number
const LIBUSB_ERROR_IO: i32 = -1;
const LIBUSB_ERROR_INVALID_PARAM: i32 = -2;
const LIBUSB_ERROR_ACCESS: i32 = -3;
const LIBUSB_ERROR_NO_DEVICE: i32 = -4;
const LIBUSB_ERROR_NOT_FOUND: i32 = -5;
const LIBUSB_ERROR_BUSY: i32 = -6;
const LIBUSB_ERROR_TIMEOUT: i32 = -7;
const LIBUSB_ERROR_OVERFLOW: i32 = -8;
const LIBUSB_ERROR_PIPE: i32 = -9;
const LIBUSB_ERROR_INTERRUPTED: i32 = -10;
const LIBUSB_ERROR_NO_MEM: i32 = -11;
const LIBUSB_ERROR_NOT_SUPPORTED: i32 = -12;
const LIBUSB_ERROR_OTHER: i32 = -99;

/// USB transport failure.
///
/// `code` is the libusb error number, or the number of bytes moved when a
/// transfer came up short.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error({code}): {description}")]
pub struct UsbError {
    /// Numeric error code.
    pub code: i32,
    /// Human readable description.
    pub description: String,
}

impl UsbError {
    fn short_transfer(moved: usize) -> Self {
        UsbError {
            code: moved as i32,
            description: format!("short transfer, {moved} of {CMD_SIZE} bytes"),
        }
    }
}

impl From<rusb::Error> for UsbError {
    fn from(err: rusb::Error) -> Self {
        let code = match err {
            rusb::Error::Io => LIBUSB_ERROR_IO,
            rusb::Error::InvalidParam => LIBUSB_ERROR_INVALID_PARAM,
            rusb::Error::Access => LIBUSB_ERROR_ACCESS,
            rusb::Error::NoDevice => LIBUSB_ERROR_NO_DEVICE,
            rusb::Error::NotFound => LIBUSB_ERROR_NOT_FOUND,
            rusb::Error::Busy => LIBUSB_ERROR_BUSY,
            rusb::Error::Timeout => LIBUSB_ERROR_TIMEOUT,
            rusb::Error::Overflow => LIBUSB_ERROR_OVERFLOW,
            rusb::Error::Pipe => LIBUSB_ERROR_PIPE,
            rusb::Error::Interrupted => LIBUSB_ERROR_INTERRUPTED,
            rusb::Error::NoMem => LIBUSB_ERROR_NO_MEM,
            rusb::Error::NotSupported => LIBUSB_ERROR_NOT_SUPPORTED,
            _ => LIBUSB_ERROR_OTHER,
        };
        UsbError {
            code,
            description: err.to_string(),
        }
    }
}

/// HID control-transfer channel to one adapter.
pub struct HidTransport<C: UsbContext> {
    handle: DeviceHandle<C>,
    timeout: Duration,
}

impl<C: UsbContext> HidTransport<C> {
    /// Wraps an opened device handle.
    pub fn new(handle: DeviceHandle<C>) -> Self {
        Self {
            handle,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the timeout of every control transfer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl<C: UsbContext> ControlTransport for HidTransport<C> {
    type Error = UsbError;

    fn write_control(&mut self, data: &[u8; CMD_SIZE]) -> Result<(), UsbError> {
        let written = self.handle.write_control(
            REQUEST_TYPE_OUT,
            HID_SET_REPORT,
            REPORT_VALUE,
            REPORT_INDEX,
            data,
            self.timeout,
        )?;
        if written != CMD_SIZE {
            return Err(UsbError::short_transfer(written));
        }
        Ok(())
    }

    fn read_control(&mut self, data: &mut [u8; CMD_SIZE]) -> Result<(), UsbError> {
        let read = self.handle.read_control(
            REQUEST_TYPE_IN,
            HID_GET_REPORT,
            REPORT_VALUE,
            REPORT_INDEX,
            data,
            self.timeout,
        )?;
        if read != CMD_SIZE {
            return Err(UsbError::short_transfer(read));
        }
        Ok(())
    }
}

/// An adapter found by [`lookup`].
pub struct FoundDevice<C: UsbContext> {
    /// Index of the serial number string descriptor, used as adapter id.
    pub id: u8,
    /// Opened transport.
    pub transport: HidTransport<C>,
}

/// Opens every attached MP707 adapter.
///
/// Adapters that cannot be opened are skipped. Failing to list the bus or to
/// read a device descriptor is an error.
pub fn lookup<C: UsbContext>(context: &C) -> Result<Vec<FoundDevice<C>>, UsbError> {
    let mut found = Vec::new();
    for device in context.devices()?.iter() {
        let desc = device.device_descriptor()?;
        if desc.vendor_id() != VENDOR_ID || desc.product_id() != PRODUCT_ID {
            continue;
        }
        let id = desc.serial_number_string_index().unwrap_or(0);
        match device.open() {
            Ok(handle) => found.push(FoundDevice {
                id,
                transport: HidTransport::new(handle),
            }),
            Err(err) => log::warn!(
                "cannot open adapter {} at {:03}:{:03}: {}",
                id,
                device.bus_number(),
                device.address(),
                err
            ),
        }
    }
    Ok(found)
}
