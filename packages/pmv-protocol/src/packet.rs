//! Packet framing.

use alloc::{vec, vec::Vec};
use thiserror::Error;

use crate::{
    ETX, MAX_PACKET_SIZE, STX, checksum::xor_checksum, command::Command, encode::Encode,
    fields::DeviceAddress,
};

/// A framed packet would not fit in [`MAX_PACKET_SIZE`] octets.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Packet of {size} octets exceeds the maximum packet size of {max_size} octets.")]
pub struct PacketSizeError {
    pub size: usize,
    pub max_size: usize,
}

/// The exact bytes sent to a sign for one command.
///
/// # Encoding
///
/// | Field      | Size | Description |
/// |------------|------|-------------|
/// | `stx`      | 1    | Must be [`STX`]. |
/// | `address`  | 1    | The [`DeviceAddress`] of the sign. |
/// | `control`  | n    | The [control field](Command::control_field) of the command. |
/// | `etx`      | 1    | Must be [`ETX`]. |
/// | `checksum` | 1    | XOR of every preceding byte, `stx` through `etx`. |
///
/// The whole packet is at most [`MAX_PACKET_SIZE`] octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Packet {
    bytes: Vec<u8>,
}

impl Packet {
    /// Bytes of framing around the control field.
    pub const FRAME_SIZE: usize = 4;

    /// Frames `command` for the sign at `address`.
    pub fn new(address: DeviceAddress, command: &Command) -> Result<Self, PacketSizeError> {
        Self::frame(address, command.size(), |data| command.encode(data))
    }

    /// Frames an already encoded control field for the sign at `address`.
    pub fn from_control_field(
        address: DeviceAddress,
        control_field: &[u8],
    ) -> Result<Self, PacketSizeError> {
        Self::frame(address, control_field.len(), |data| control_field.encode(data))
    }

    fn frame(
        address: DeviceAddress,
        control_size: usize,
        control_fn: impl FnOnce(&mut [u8]),
    ) -> Result<Self, PacketSizeError> {
        let size = control_size + Self::FRAME_SIZE;
        if size > MAX_PACKET_SIZE {
            return Err(PacketSizeError {
                size,
                max_size: MAX_PACKET_SIZE,
            });
        }

        let mut bytes = vec![0; size];
        bytes[0] = STX;
        bytes[1] = address.as_byte();
        control_fn(&mut bytes[2..(size - 2)]);
        bytes[size - 2] = ETX;

        // The checksum covers the whole frame, including STX and ETX.
        bytes[size - 1] = xor_checksum(&bytes[..(size - 1)]);

        Ok(Self { bytes })
    }

    pub fn address(&self) -> DeviceAddress {
        DeviceAddress::new(self.bytes[1])
    }

    pub fn control_field(&self) -> &[u8] {
        &self.bytes[2..(self.bytes.len() - 2)]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Encode for Packet {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn encode(&self, data: &mut [u8]) {
        self.as_bytes().encode(data)
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
