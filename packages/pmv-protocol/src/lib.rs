//! Implementation of the PMV variable-message sign control protocol in Rust.
//!
//! Commands are built as [`Command`] values, which validate their parameters on
//! construction. A command is framed for a device with [`Packet`], and the device's
//! reply is turned into a [`Reply`] with [`Command::decode_reply`]. This crate does
//! no I/O.

#![no_std]

extern crate alloc;

pub mod command;
pub mod fields;
pub mod packet;
pub mod reply;

mod checksum;
mod decode;
mod encode;

pub use checksum::{verify, xor_checksum};
pub use command::{Command, MessageSlot, PagePlan, ReplyKind, TextMessage};
pub use decode::{Decode, DecodeError, DecodeErrorKind};
pub use encode::Encode;
pub use fields::{DeviceAddress, Mode, Style, ValidationError};
pub use packet::{Packet, PacketSizeError};
pub use reply::{MessageReply, ModeReply, Reply, RowsNumber, Status};

/// Start-of-text byte opening every frame.
pub const STX: u8 = 0x02;

/// End-of-text byte closing the control field of every frame.
pub const ETX: u8 = 0x03;

/// Terminator appended to the text of a written message.
pub const CR: u8 = 0x0D;

/// Largest frame, in octets, that a device accepts or sends back.
pub const MAX_PACKET_SIZE: usize = 128;

/// Reply sent by a device that accepted a write command.
pub const ACK: [u8; 5] = [0x06; 5];

/// Reply sent by a device that rejected a command.
pub const NAK: [u8; 5] = [0x15; 5];
