#[derive(Debug, thiserror::Error)]
/// MP707 adapter errors
pub enum Mp707Error<E> {
    /// USB transport errors.
    #[error("transport error: {0}")]
    Transport(E),
    /// The adapter did not echo the command it was sent.
    #[error("echo mismatch: sent {sent:02x?}, received {received:02x?}")]
    EchoMismatch {
        /// Outbound buffer.
        sent: [u8; crate::CMD_SIZE],
        /// Inbound buffer.
        received: [u8; crate::CMD_SIZE],
    },
}

impl<E> From<E> for Mp707Error<E> {
    fn from(value: E) -> Self {
        Self::Transport(value)
    }
}
