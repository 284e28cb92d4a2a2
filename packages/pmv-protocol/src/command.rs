//! Command model.
//!
//! Every protocol operation is one [`Command`] variant. Its parameters are
//! validated when it is constructed, so an existing command always encodes to a
//! well-formed control field.
//!
//! # Control fields
//!
//! | Variant         | Control field                                            |
//! |-----------------|----------------------------------------------------------|
//! | `Test`          | `WT`                                                     |
//! | `SwitchToMode`  | `WB` mode                                                |
//! | `InitPage`      | `WF` msg(2) duration(3) ×5                               |
//! | `WriteMessage`  | `WI` row(2) msg(2) page(2) style text `CR`               |
//! | `GetMode`       | `RB`                                                     |
//! | `GetRowsNumber` | `RC`                                                     |
//! | `GetMessage`    | `RI` row(2) msg(2) page(2)                               |

use alloc::{string::String, vec, vec::Vec};

use crate::{
    CR,
    decode::DecodeError,
    encode::{Encode, MessageEncoder},
    fields::{self, Mode, Style, ValidationError, limits, three_digits, two_digits},
    reply::Reply,
};

/// Command opcodes.
///
/// Write commands start with `W`, read commands with `R`.
pub mod cmds {
    pub const TEST: [u8; 2] = *b"WT";
    pub const SWITCH_TO_MODE: [u8; 2] = *b"WB";
    pub const INIT_PAGE: [u8; 2] = *b"WF";
    pub const WRITE_MESSAGE: [u8; 2] = *b"WI";
    pub const GET_MODE: [u8; 2] = *b"RB";
    pub const GET_ROWS_NUMBER: [u8; 2] = *b"RC";
    pub const GET_MESSAGE: [u8; 2] = *b"RI";
}

/// How the reply to a command is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyKind {
    /// A bare `ACK` or `NAK`.
    Status,
    Mode,
    RowsNumber,
    Message,
}

/// Durations of the five pages of a message, as sent by `InitPage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PagePlan {
    message: u8,
    durations: [u16; 5],
}

impl PagePlan {
    pub const fn message(&self) -> u8 {
        self.message
    }

    /// Page durations. `255` means the page is shown indefinitely.
    pub const fn durations(&self) -> [u16; 5] {
        self.durations
    }
}

/// Row, message and page addressing a single row of text on a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageSlot {
    row: u8,
    message: u8,
    page: u8,
}

impl MessageSlot {
    fn new(row: u8, message: u8, page: u8, message_max: u8) -> Result<Self, ValidationError> {
        Ok(Self {
            row: fields::check_row(row)?,
            message: fields::check_message(message, message_max)?,
            page: fields::check_page(page)?,
        })
    }

    pub const fn row(&self) -> u8 {
        self.row
    }

    pub const fn message(&self) -> u8 {
        self.message
    }

    pub const fn page(&self) -> u8 {
        self.page
    }
}

impl Encode for MessageSlot {
    fn size(&self) -> usize {
        6
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&two_digits(self.row));
        enc.write(&two_digits(self.message));
        enc.write(&two_digits(self.page));
    }
}

/// Text written to one row by `WriteMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextMessage {
    slot: MessageSlot,
    style: Style,
    text: String,
}

impl TextMessage {
    pub const fn slot(&self) -> MessageSlot {
        self.slot
    }

    pub const fn style(&self) -> Style {
        self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A single request to a sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// Checks that the sign is reachable. Acknowledged with `ACK`.
    Test,
    SwitchToMode(Mode),
    InitPage(PagePlan),
    WriteMessage(TextMessage),
    GetMode,
    GetRowsNumber,
    GetMessage(MessageSlot),
}

impl Command {
    pub const fn test() -> Self {
        Self::Test
    }

    pub const fn switch_to_mode(mode: Mode) -> Self {
        Self::SwitchToMode(mode)
    }

    /// Puts the sign in [`Mode::Force`] so that it shows written messages.
    pub const fn set_to_force_mode() -> Self {
        Self::SwitchToMode(Mode::Force)
    }

    /// Sets up the pages of `message`, showing each for the given number of seconds.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::InvalidMessageIndex`] if `message` is above 7.
    /// - [`ValidationError::InvalidPageDuration`] if a duration is neither in
    ///   `0..=180` nor `255`.
    pub fn init_page(message: u8, durations: [u16; 5]) -> Result<Self, ValidationError> {
        let message = fields::check_message(message, limits::INIT_PAGE_MESSAGE_INDEX_MAX)?;
        for duration in durations {
            fields::check_page_duration(duration)?;
        }

        Ok(Self::InitPage(PagePlan { message, durations }))
    }

    /// Sets up `message` with a single page shown indefinitely.
    pub fn init_page_default(message: u8) -> Result<Self, ValidationError> {
        Self::init_page(message, [limits::PAGE_DURATION_INDEFINITE, 0, 0, 0, 0])
    }

    /// Writes `text` to one row of a message page.
    ///
    /// # Errors
    ///
    /// Fails if `row` is above 9, `message` above 7, `page` above 4, or if `text`
    /// contains an ASCII control byte such as `CR`. Other characters, accented
    /// letters included, are sent as their UTF-8 bytes.
    pub fn write_message(
        row: u8,
        message: u8,
        page: u8,
        style: Style,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let slot = MessageSlot::new(row, message, page, limits::WRITE_MESSAGE_INDEX_MAX)?;
        let text = text.into();
        fields::check_text(&text)?;

        Ok(Self::WriteMessage(TextMessage { slot, style, text }))
    }

    pub const fn get_mode() -> Self {
        Self::GetMode
    }

    pub const fn get_rows_number() -> Self {
        Self::GetRowsNumber
    }

    /// Reads back one row of a message page.
    ///
    /// # Errors
    ///
    /// Fails if `row` is above 9, `message` above 8 or `page` above 4.
    pub fn get_message(row: u8, message: u8, page: u8) -> Result<Self, ValidationError> {
        Ok(Self::GetMessage(MessageSlot::new(
            row,
            message,
            page,
            limits::GET_MESSAGE_INDEX_MAX,
        )?))
    }

    pub const fn opcode(&self) -> [u8; 2] {
        match self {
            Self::Test => cmds::TEST,
            Self::SwitchToMode(_) => cmds::SWITCH_TO_MODE,
            Self::InitPage(_) => cmds::INIT_PAGE,
            Self::WriteMessage(_) => cmds::WRITE_MESSAGE,
            Self::GetMode => cmds::GET_MODE,
            Self::GetRowsNumber => cmds::GET_ROWS_NUMBER,
            Self::GetMessage(_) => cmds::GET_MESSAGE,
        }
    }

    pub const fn reply_kind(&self) -> ReplyKind {
        match self {
            Self::Test | Self::SwitchToMode(_) | Self::InitPage(_) | Self::WriteMessage(_) => {
                ReplyKind::Status
            }
            Self::GetMode => ReplyKind::Mode,
            Self::GetRowsNumber => ReplyKind::RowsNumber,
            Self::GetMessage(_) => ReplyKind::Message,
        }
    }

    /// Returns `true` for commands that read state back from the sign.
    pub const fn is_read(&self) -> bool {
        !matches!(self.reply_kind(), ReplyKind::Status)
    }

    /// The protocol payload of this command, without any framing.
    pub fn control_field(&self) -> Vec<u8> {
        let mut field = vec![0; self.size()];
        self.encode(&mut field);
        field
    }

    /// Decodes a raw reply from the sign according to this command's [`ReplyKind`].
    pub fn decode_reply(&self, data: &[u8]) -> Result<Reply, DecodeError> {
        self.reply_kind().decode(data)
    }
}

impl Encode for Command {
    fn size(&self) -> usize {
        2 + match self {
            Self::Test | Self::GetMode | Self::GetRowsNumber => 0,
            Self::SwitchToMode(_) => 1,
            Self::InitPage(_) => 2 + 5 * 3,
            Self::WriteMessage(message) => message.slot.size() + 1 + message.text.len() + 1,
            Self::GetMessage(slot) => slot.size(),
        }
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.opcode());

        match self {
            Self::Test | Self::GetMode | Self::GetRowsNumber => {}
            Self::SwitchToMode(mode) => enc.write(&mode.code()),
            Self::InitPage(plan) => {
                enc.write(&two_digits(plan.message));
                for duration in plan.durations {
                    enc.write(&three_digits(duration));
                }
            }
            Self::WriteMessage(message) => {
                enc.write(&message.slot);
                enc.write(&message.style.code());
                enc.write(&message.text.as_bytes());
                enc.write(&CR);
            }
            Self::GetMessage(slot) => enc.write(slot),
        }
    }
}
