use crate::{ControlTransport, Mp707, Mp707Error, Mp707Result};
use embedded_hal::delay::DelayNs;

/// Size of the adapter's input and output reports.
pub const CMD_SIZE: usize = 8;

/// First byte of every report.
pub(crate) const CMD_MAGIC: u8 = 0x18;

/// Offset of the payload in a report.
pub(crate) const PAYLOAD: usize = 2;

/// Command byte of a report.
///
/// Taken from observed adapter traffic. A write and the matching read of the
/// same width share one command; the payload decides which one it is.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    Reset = 0x48,
    Bit = 0x81,
    BitPair = 0x82,
    Word = 0x84,
    Byte = 0x88,
}

impl Command {
    /// Time the adapter needs between the request and its answer.
    pub(crate) fn settle_ms(&self) -> u32 {
        match self {
            Command::Word => 2,
            _ => 1,
        }
    }
}

/// How much of the answer has to mirror the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Echo {
    /// Whole report, for commands that only write.
    Full,
    /// Magic and command bytes, for commands that return data in the payload.
    Header,
}

impl Echo {
    fn depth(&self) -> usize {
        match self {
            Echo::Full => CMD_SIZE,
            Echo::Header => PAYLOAD,
        }
    }
}

impl<T: ControlTransport, D: DelayNs> Mp707<T, D> {
    /// Runs one write, settle, read exchange and checks the echo.
    ///
    /// Both buffers are zeroed first. On success the answer is returned.
    pub(crate) fn exchange(
        &mut self,
        cmd: Command,
        payload: &[u8],
        echo: Echo,
    ) -> Mp707Result<&[u8; CMD_SIZE], T::Error> {
        self.output = [0; CMD_SIZE];
        self.input = [0; CMD_SIZE];
        self.output[0] = CMD_MAGIC;
        self.output[1] = cmd as u8;
        self.output[PAYLOAD..PAYLOAD + payload.len()].copy_from_slice(payload);

        self.transport.write_control(&self.output)?;
        self.delay.delay_ms(cmd.settle_ms());
        self.transport.read_control(&mut self.input)?;

        log::trace!(
            "mp707#{} {:02x?} -> {:02x?}",
            self.id,
            self.output,
            self.input
        );
        let depth = echo.depth();
        if self.output[..depth] != self.input[..depth] {
            return Err(Mp707Error::EchoMismatch {
                sent: self.output,
                received: self.input,
            });
        }
        Ok(&self.input)
    }
}
