//! Reply decoding.
//!
//! Replies have no common layout. Write commands are answered with a bare
//! [`ACK`] or [`NAK`], while read commands are answered with a frame whose fields
//! sit at fixed offsets from its start and end. [`ReplyKind`] picks the decoder.
//!
//! # Read reply layout
//!
//! | Reply           | Header | Payload                     | Trailer       |
//! |-----------------|--------|-----------------------------|---------------|
//! | `GetMode`       | 4      | mode code                   | any           |
//! | `GetRowsNumber` | 4      | ASCII decimal row count     | 2             |
//! | `GetMessage`    | 4      | style code, message text    | 3             |

use alloc::string::{String, ToString};

use crate::{
    ACK, MAX_PACKET_SIZE, NAK,
    command::ReplyKind,
    decode::{Decode, DecodeError, DecodeErrorKind},
    fields::{Mode, Style},
};

const HEADER_SIZE: usize = 4;

/// A decoded reply, shaped by the command it answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reply {
    /// `true` if the command was acknowledged, `false` if it was rejected.
    Status(bool),
    Mode(Mode),
    RowsNumber(u16),
    Message { style: Style, text: String },
}

impl Reply {
    pub fn status(&self) -> Option<bool> {
        match self {
            Self::Status(status) => Some(*status),
            _ => None,
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::Mode(mode) => Some(*mode),
            _ => None,
        }
    }

    pub fn rows_number(&self) -> Option<u16> {
        match self {
            Self::RowsNumber(rows) => Some(*rows),
            _ => None,
        }
    }

    pub fn into_message(self) -> Option<(Style, String)> {
        match self {
            Self::Message { style, text } => Some((style, text)),
            _ => None,
        }
    }
}

impl ReplyKind {
    /// Decodes a raw reply.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when `data` does not have the shape expected for
    /// this kind of reply. A [`NAK`] sent in answer to a read command is reported
    /// as [`DecodeErrorKind::Nak`], and anything longer than [`MAX_PACKET_SIZE`]
    /// as [`DecodeErrorKind::ReplyTooLong`].
    pub fn decode(self, mut data: &[u8]) -> Result<Reply, DecodeError> {
        if data.len() > MAX_PACKET_SIZE {
            return Err(DecodeError::new::<Reply>(DecodeErrorKind::ReplyTooLong {
                max_size: MAX_PACKET_SIZE,
            }));
        }

        let data = &mut data;
        let reply = match self {
            Self::Status => Reply::Status(Status::decode(data)?.is_ack()),
            Self::Mode => Reply::Mode(ModeReply::decode(data)?.0),
            Self::RowsNumber => Reply::RowsNumber(RowsNumber::decode(data)?.0),
            Self::Message => {
                let MessageReply { style, text } = MessageReply::decode(data)?;
                Reply::Message { style, text }
            }
        };
        Ok(reply)
    }
}

/// Bare acknowledgement sent in answer to a write command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ack,
    Nak,
}

impl Status {
    pub const fn is_ack(self) -> bool {
        matches!(self, Self::Ack)
    }
}

impl From<Status> for bool {
    fn from(status: Status) -> Self {
        status.is_ack()
    }
}

impl Decode for Status {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let status = if *data == ACK {
            Self::Ack
        } else if *data == NAK {
            Self::Nak
        } else {
            return Err(DecodeError::new::<Self>(DecodeErrorKind::UnexpectedReply));
        };
        *data = &[];
        Ok(status)
    }
}

/// Rejects a bare acknowledgement where a framed read reply was expected.
fn expect_frame<T>(data: &[u8]) -> Result<(), DecodeError> {
    if data == NAK {
        Err(DecodeError::new::<T>(DecodeErrorKind::Nak))
    } else if data == ACK {
        Err(DecodeError::new::<T>(DecodeErrorKind::UnexpectedReply))
    } else {
        Ok(())
    }
}

/// Splits the payload out of a read reply with `trailer` framing bytes at its end.
fn payload<T>(data: &[u8], trailer: usize) -> Result<&[u8], DecodeError> {
    expect_frame::<T>(data)?;
    data.get(HEADER_SIZE..data.len().saturating_sub(trailer))
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| DecodeError::new::<T>(DecodeErrorKind::UnexpectedEnd))
}

/// Reply to `GetMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeReply(pub Mode);

impl Decode for ModeReply {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        expect_frame::<Self>(data)?;

        let _header = <[u8; HEADER_SIZE]>::decode(data)?;
        let code = u8::decode(data)?;
        let mode = Mode::from_code(code).ok_or_else(|| {
            DecodeError::new::<Self>(DecodeErrorKind::UnexpectedByte {
                name: "mode",
                value: code,
                expected: b"012",
            })
        })?;

        // The rest of the frame is ETX and the checksum.
        *data = &[];
        Ok(Self(mode))
    }
}

/// Reply to `GetRowsNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowsNumber(pub u16);

impl Decode for RowsNumber {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let digits = payload::<Self>(data, 2)?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(DecodeError::new::<Self>(DecodeErrorKind::InvalidNumber));
        }

        let rows = core::str::from_utf8(digits)
            .map_err(|e| DecodeError::new::<Self>(e.into()))?
            .parse()
            .map_err(|_| DecodeError::new::<Self>(DecodeErrorKind::InvalidNumber))?;

        *data = &[];
        Ok(Self(rows))
    }
}

/// Reply to `GetMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageReply {
    pub style: Style,
    pub text: String,
}

impl Decode for MessageReply {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        // Style code, then text terminated by CR, ETX and the checksum.
        let payload = payload::<Self>(data, 3)?;
        let (&code, text) = payload
            .split_first()
            .ok_or_else(|| DecodeError::new::<Self>(DecodeErrorKind::UnexpectedEnd))?;

        let style = Style::from_code(code).ok_or_else(|| {
            DecodeError::new::<Self>(DecodeErrorKind::UnexpectedByte {
                name: "style",
                value: code,
                expected: b"012",
            })
        })?;
        let text = core::str::from_utf8(text)
            .map_err(|e| DecodeError::new::<Self>(e.into()))?
            .to_string();

        *data = &[];
        Ok(Self { style, text })
    }
}
