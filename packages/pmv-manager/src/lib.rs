//! Crate for controlling PMV variable-message signs over UDP.
//!
//! Commands are built and decoded by the [`protocol`] crate. This crate frames
//! them, exchanges them with a sign in a single bounded UDP round trip, and hands
//! back the decoded reply.
//!
//! ```no_run
//! use pmv_manager::{PmvClient, protocol::{DeviceAddress, Style}};
//!
//! # fn main() -> Result<(), pmv_manager::ClientError> {
//! let client = PmvClient::new(DeviceAddress::new(0x05), [192, 168, 1, 50].into());
//!
//! client.set_to_force_mode()?;
//! client.write_message(0, 7, 0, Style::Blinking, "INCIDENTE")?;
//! # Ok(())
//! # }
//! ```

pub use pmv_protocol as protocol;

use std::time::Duration;

mod client;
mod error;
pub mod udp;

pub use client::{ClientConfig, PmvClient};
pub use error::ClientError;

/// UDP port signs listen on unless configured otherwise.
pub const PMV_DEFAULT_PORT: u16 = 10;

/// How long to wait for a reply unless configured otherwise.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(2000);
