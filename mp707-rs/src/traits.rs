use crate::CMD_SIZE;

/// Control channel to the adapter.
///
/// Each call moves exactly one [`CMD_SIZE`]-byte report. A transfer that moves
/// fewer bytes is an error. Implementations never retry.
pub trait ControlTransport {
    /// Error type of the underlying transport.
    type Error;

    /// Send one report to the adapter.
    fn write_control(&mut self, data: &[u8; CMD_SIZE]) -> Result<(), Self::Error>;

    /// Fetch one report from the adapter.
    fn read_control(&mut self, data: &mut [u8; CMD_SIZE]) -> Result<(), Self::Error>;
}
