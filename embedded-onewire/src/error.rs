/// One wire communication error type.
#[derive(Debug, thiserror::Error)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    #[error("bus error: {0}")]
    Other(E),
    /// Indicates that no device answered, or the answer was an all-zero address.
    #[error("no device present on the bus")]
    NoDevicePresent,
    /// Computed CRC of a ROM or scratchpad is invalid.
    #[error("crc mismatch")]
    InvalidCrc,
    /// No valid ROM could be established within the retry budget.
    #[error("failed to enumerate devices")]
    EnumerationFailed,
    /// A multi-step read exhausted its retry budget.
    #[error("input/output error")]
    IoFailure,
}

impl<E> OneWireError<E> {
    /// Whether the error only spoils the current attempt.
    ///
    /// Bus, presence and CRC failures are worth another try; the terminal
    /// [`EnumerationFailed`](OneWireError::EnumerationFailed) and
    /// [`IoFailure`](OneWireError::IoFailure) are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Other(_) | Self::NoDevicePresent | Self::InvalidCrc
        )
    }
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}
