use pmv_protocol::{DecodeError, DecodeErrorKind, PacketSizeError, ValidationError};
use thiserror::Error;

/// Terminal failure of a single call to a sign.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid command: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    PacketSize(#[from] PacketSizeError),

    #[error("No reply within {0:?}")]
    Timeout(std::time::Duration),

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Device rejected the command (NAK)")]
    Rejected,

    #[error("Protocol violation: {0}")]
    ProtocolViolation(DecodeError),
}

impl From<DecodeError> for ClientError {
    fn from(error: DecodeError) -> Self {
        match error.kind() {
            DecodeErrorKind::Nak => Self::Rejected,
            _ => Self::ProtocolViolation(error),
        }
    }
}

impl ClientError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
