use core::str::Utf8Error;
use thiserror::Error;

/// A reply that could not be decoded into the type expected by the issuing command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    type_name: &'static str,
}

impl DecodeError {
    pub fn new<T>(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            type_name: core::any::type_name::<T>(),
        }
    }

    pub const fn kind(&self) -> DecodeErrorKind {
        self.kind
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Failed to decode {}: {}", self.type_name, self.kind)
    }
}

/// Why a sign's reply was refused.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The reply ended before the field being read, or left no payload between
    /// its header and trailer.
    #[error("Reply was too short.")]
    UnexpectedEnd,

    /// A mode or style code that is not in its table.
    #[error(
        "Could not decode {name} with unexpected byte. Found {value:x}, expected one of: {expected:x?}."
    )]
    UnexpectedByte {
        name: &'static str,
        value: u8,
        expected: &'static [u8],
    },

    /// An ACK where a read reply frame was expected, or anything but a bare
    /// ACK or NAK in answer to a write command.
    #[error("Reply does not have the shape expected for this command.")]
    UnexpectedReply,

    /// The sign answered a read command with a NAK.
    #[error("Sign rejected the command (NAK).")]
    Nak,

    #[error("Reply field is not an ASCII decimal number.")]
    InvalidNumber,

    /// The sign sent more than one packet's worth of bytes.
    #[error("Reply exceeds the maximum packet size of {max_size} octets.")]
    ReplyTooLong { max_size: usize },

    #[error(transparent)]
    Utf8Error(#[from] Utf8Error),
}

/// A type that can be reconstructed (decoded) from a raw sequence of bytes.
///
/// The input slice will be advanced by the number of bytes consumed during
/// decoding.
pub trait Decode {
    /// Attempts to decode `Self` from the beginning of the provided byte slice.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is malformed or insufficient
    /// to decode a complete value of this type.
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

impl Decode for u8 {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let (&byte, rest) = data
            .split_first()
            .ok_or_else(|| DecodeError::new::<Self>(DecodeErrorKind::UnexpectedEnd))?;
        *data = rest;
        Ok(byte)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let bytes = data
            .get(..N)
            .ok_or_else(|| DecodeError::new::<Self>(DecodeErrorKind::UnexpectedEnd))?;
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        *data = &data[N..];
        Ok(array)
    }
}
