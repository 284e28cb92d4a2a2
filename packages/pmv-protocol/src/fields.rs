//! Field encoding rules.
//!
//! Numeric parameters travel as zero-padded ASCII decimal strings of a fixed
//! width, and enumerated parameters travel as a single code character looked up
//! in [`MODES`] or [`STYLES`].

use alloc::string::{String, ToString};
use core::{fmt, str::FromStr};
use thiserror::Error;

/// Inclusive parameter ranges accepted by the device.
///
/// The index ranges differ between commands and are kept separate on purpose.
pub mod limits {
    /// Highest row index of `WriteMessage` and `GetMessage`.
    pub const ROW_INDEX_MAX: u8 = 9;
    /// Highest message index of `InitPage`.
    pub const INIT_PAGE_MESSAGE_INDEX_MAX: u8 = 7;
    /// Highest message index of `WriteMessage`.
    pub const WRITE_MESSAGE_INDEX_MAX: u8 = 7;
    /// Highest message index of `GetMessage`.
    pub const GET_MESSAGE_INDEX_MAX: u8 = 8;
    /// Highest page index of `WriteMessage` and `GetMessage`.
    pub const PAGE_INDEX_MAX: u8 = 4;
    /// Longest page duration that is not the [`PAGE_DURATION_INDEFINITE`] sentinel.
    pub const PAGE_DURATION_MAX: u16 = 180;
    /// Page duration meaning "indefinite" (or "not set").
    pub const PAGE_DURATION_INDEFINITE: u16 = 255;
}

/// A command parameter outside of the range accepted by the device.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid mode {0:?}. Expected one of: automatic, force, off.")]
    InvalidMode(String),

    #[error("Invalid style {0:?}. Expected one of: normal, blinking, bold.")]
    InvalidStyle(String),

    #[error("Row index {value} is out of range 0..={max}.")]
    InvalidRowIndex { value: u8, max: u8 },

    #[error("Message index {value} is out of range 0..={max}.")]
    InvalidMessageIndex { value: u8, max: u8 },

    #[error("Page index {value} is out of range 0..={max}.")]
    InvalidPageIndex { value: u8, max: u8 },

    #[error("Page duration {0} is neither in 0..=180 nor the indefinite value 255.")]
    InvalidPageDuration(u16),

    #[error("Device address {0} does not fit in a single octet.")]
    InvalidDeviceAddress(u32),

    #[error("Message text has unsendable byte {byte:#04x} at offset {offset}.")]
    InvalidMessageText { offset: usize, byte: u8 },
}

/// Declares a closed set of names and the code character each one is sent as.
macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident, $table:ident, $error:ident {
            $($(#[$variant_meta:meta])* $variant:ident => ($text:literal, $code:literal)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
        pub enum $name {
            $($(#[$variant_meta])* $variant),*
        }

        #[doc = concat!("Code characters of every [`", stringify!($name), "`].")]
        pub const $table: &[($name, u8)] = &[$(($name::$variant, $code)),*];

        impl $name {
            /// The code character this value is sent as.
            pub const fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),*
                }
            }

            /// Looks up the value sent as `code`.
            pub fn from_code(code: u8) -> Option<Self> {
                $table
                    .iter()
                    .find(|(_, candidate)| *candidate == code)
                    .map(|(value, _)| *value)
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)*
                    other => Err(ValidationError::$error(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

code_table! {
    /// Operating mode of a sign.
    Mode, MODES, InvalidMode {
        /// The sign follows its own schedule.
        Automatic => ("automatic", b'0'),
        /// The sign shows what was written to it.
        Force => ("force", b'1'),
        Off => ("off", b'2'),
    }
}

code_table! {
    /// Display style of a message row.
    Style, STYLES, InvalidStyle {
        Normal => ("normal", b'0'),
        Blinking => ("blinking", b'1'),
        Bold => ("bold", b'2'),
    }
}

/// Address of one sign on the bus.
///
/// Sent as a single raw octet right after `STX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    pub const fn new(address: u8) -> Self {
        Self(address)
    }

    pub const fn as_byte(self) -> u8 {
        self.0
    }
}

impl From<u8> for DeviceAddress {
    fn from(address: u8) -> Self {
        Self(address)
    }
}

impl From<DeviceAddress> for u32 {
    fn from(address: DeviceAddress) -> Self {
        address.0 as u32
    }
}

impl TryFrom<u32> for DeviceAddress {
    type Error = ValidationError;

    fn try_from(address: u32) -> Result<Self, Self::Error> {
        u8::try_from(address)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDeviceAddress(address))
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

pub(crate) fn check_row(row: u8) -> Result<u8, ValidationError> {
    if row > limits::ROW_INDEX_MAX {
        return Err(ValidationError::InvalidRowIndex {
            value: row,
            max: limits::ROW_INDEX_MAX,
        });
    }
    Ok(row)
}

pub(crate) fn check_message(message: u8, max: u8) -> Result<u8, ValidationError> {
    if message > max {
        return Err(ValidationError::InvalidMessageIndex {
            value: message,
            max,
        });
    }
    Ok(message)
}

pub(crate) fn check_page(page: u8) -> Result<u8, ValidationError> {
    if page > limits::PAGE_INDEX_MAX {
        return Err(ValidationError::InvalidPageIndex {
            value: page,
            max: limits::PAGE_INDEX_MAX,
        });
    }
    Ok(page)
}

pub(crate) fn check_page_duration(duration: u16) -> Result<u16, ValidationError> {
    match duration {
        0..=limits::PAGE_DURATION_MAX | limits::PAGE_DURATION_INDEFINITE => Ok(duration),
        _ => Err(ValidationError::InvalidPageDuration(duration)),
    }
}

/// Message text may not contain control bytes, so `CR`, `STX` and `ETX` never
/// appear inside the control field. Anything else is sent as UTF-8.
pub(crate) fn check_text(text: &str) -> Result<(), ValidationError> {
    match text
        .bytes()
        .enumerate()
        .find(|(_, byte)| byte.is_ascii_control())
    {
        Some((offset, byte)) => Err(ValidationError::InvalidMessageText { offset, byte }),
        None => Ok(()),
    }
}

/// Two-digit, zero-padded ASCII decimal. `value` must be below 100.
pub(crate) const fn two_digits(value: u8) -> [u8; 2] {
    [b'0' + value / 10 % 10, b'0' + value % 10]
}

/// Three-digit, zero-padded ASCII decimal. `value` must be below 1000.
pub(crate) const fn three_digits(value: u16) -> [u8; 3] {
    [
        b'0' + (value / 100 % 10) as u8,
        b'0' + (value / 10 % 10) as u8,
        b'0' + (value % 10) as u8,
    ]
}
