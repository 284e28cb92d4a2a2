use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use log::{debug, warn};
use pmv_protocol::{
    Command, DecodeError, DecodeErrorKind, DeviceAddress, Mode, Packet, Reply, Style,
};

use crate::{ClientError, PMV_DEFAULT_PORT, RESPONSE_TIMEOUT, udp};

#[cfg(feature = "serde")]
fn default_port() -> u16 {
    PMV_DEFAULT_PORT
}

#[cfg(feature = "serde")]
fn default_timeout() -> Duration {
    RESPONSE_TIMEOUT
}

/// Where a sign is and how long to wait for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    pub address: DeviceAddress,
    pub ip: IpAddr,
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,
    #[cfg_attr(feature = "serde", serde(default = "default_timeout"))]
    pub timeout: Duration,
    /// Local address each call binds its socket to.
    ///
    /// `None` binds an ephemeral port on every interface.
    #[cfg_attr(feature = "serde", serde(default))]
    pub bind_addr: Option<SocketAddr>,
}

impl ClientConfig {
    /// Configuration for the sign at `address`, reachable at `ip` on the default port.
    pub fn new(address: DeviceAddress, ip: IpAddr) -> Self {
        Self {
            address,
            ip,
            port: PMV_DEFAULT_PORT,
            timeout: RESPONSE_TIMEOUT,
            bind_addr: None,
        }
    }

    pub fn endpoint(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }
}

/// Client for a single sign.
///
/// The client holds no connection. Every call opens its own socket for one
/// request and reply, so a client can be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmvClient {
    config: ClientConfig,
}

impl PmvClient {
    pub fn new(address: DeviceAddress, ip: IpAddr) -> Self {
        Self::from_config(ClientConfig::new(address, ip))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.config.bind_addr = Some(bind_addr);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.config.endpoint()
    }

    /// Sends `command` to the sign and decodes its reply.
    ///
    /// This makes exactly one attempt. Retrying after a [`ClientError::Timeout`]
    /// is left to the caller.
    pub fn send(&self, command: &Command) -> Result<Reply, ClientError> {
        let packet = Packet::new(self.config.address, command)?;
        debug!("Sending {:?} to {}", command, self.endpoint());

        let raw = udp::exchange(
            packet.as_bytes(),
            self.endpoint(),
            self.config.bind_addr,
            self.config.timeout,
        )?;

        decode(command, &raw)
    }

    /// Async version of [`PmvClient::send`].
    #[cfg(feature = "tokio")]
    pub async fn send_async(&self, command: &Command) -> Result<Reply, ClientError> {
        let packet = Packet::new(self.config.address, command)?;
        debug!("Sending {:?} to {}", command, self.endpoint());

        let raw = udp::exchange_async(
            packet.as_bytes(),
            self.endpoint(),
            self.config.bind_addr,
            self.config.timeout,
        )
        .await?;

        decode(command, &raw)
    }

    /// Returns `true` if the sign acknowledged the test command.
    pub fn test(&self) -> Result<bool, ClientError> {
        status(self.send(&Command::test())?)
    }

    pub fn switch_to_mode(&self, mode: Mode) -> Result<bool, ClientError> {
        status(self.send(&Command::switch_to_mode(mode))?)
    }

    pub fn set_to_force_mode(&self) -> Result<bool, ClientError> {
        status(self.send(&Command::set_to_force_mode())?)
    }

    pub fn init_page(&self, message: u8, durations: [u16; 5]) -> Result<bool, ClientError> {
        status(self.send(&Command::init_page(message, durations)?)?)
    }

    pub fn write_message(
        &self,
        row: u8,
        message: u8,
        page: u8,
        style: Style,
        text: impl Into<String>,
    ) -> Result<bool, ClientError> {
        let command = Command::write_message(row, message, page, style, text)?;
        status(self.send(&command)?)
    }

    pub fn get_mode(&self) -> Result<Mode, ClientError> {
        let reply = self.send(&Command::get_mode())?;
        reply.mode().ok_or_else(unexpected_reply::<Mode>)
    }

    pub fn get_rows_number(&self) -> Result<u16, ClientError> {
        let reply = self.send(&Command::get_rows_number())?;
        reply.rows_number().ok_or_else(unexpected_reply::<u16>)
    }

    /// Reads back the style and text of one row.
    pub fn get_message(
        &self,
        row: u8,
        message: u8,
        page: u8,
    ) -> Result<(Style, String), ClientError> {
        let reply = self.send(&Command::get_message(row, message, page)?)?;
        reply
            .into_message()
            .ok_or_else(unexpected_reply::<(Style, String)>)
    }
}

fn decode(command: &Command, raw: &[u8]) -> Result<Reply, ClientError> {
    match command.decode_reply(raw) {
        Ok(reply) => {
            debug!("Decoded reply: {:?}", reply);
            Ok(reply)
        }
        Err(e) => {
            warn!("Failed to decode reply {:x?}: {}", raw, e);
            Err(e.into())
        }
    }
}

fn status(reply: Reply) -> Result<bool, ClientError> {
    reply.status().ok_or_else(unexpected_reply::<bool>)
}

fn unexpected_reply<T>() -> ClientError {
    ClientError::ProtocolViolation(DecodeError::new::<T>(DecodeErrorKind::UnexpectedReply))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use pmv_protocol::{ACK, NAK, ValidationError};

    use super::*;

    #[test]
    fn defaults() {
        let client = PmvClient::new(DeviceAddress::new(3), Ipv4Addr::new(10, 0, 0, 9).into());

        assert_eq!(client.config().port, 10);
        assert_eq!(client.config().timeout, Duration::from_millis(2000));
        assert_eq!(client.config().bind_addr, None);
        assert_eq!(client.endpoint(), "10.0.0.9:10".parse().unwrap());
    }

    #[test]
    fn overrides() {
        let client = PmvClient::new(DeviceAddress::new(3), Ipv4Addr::LOCALHOST.into())
            .with_port(4010)
            .with_timeout(Duration::from_millis(250))
            .with_bind_addr("127.0.0.1:0".parse().unwrap());

        assert_eq!(client.endpoint(), "127.0.0.1:4010".parse().unwrap());
        assert_eq!(client.config().timeout, Duration::from_millis(250));
        assert_eq!(client.config().bind_addr, Some("127.0.0.1:0".parse().unwrap()));
    }

    #[test]
    fn validation_fails_before_any_io() {
        // Port 9 on TEST-NET-1 would time out if anything were sent.
        let client = PmvClient::new(DeviceAddress::new(1), Ipv4Addr::new(192, 0, 2, 1).into())
            .with_port(9);

        let error = client.init_page(0, [0, 0, 0, 0, 181]).unwrap_err();
        assert!(matches!(
            error,
            ClientError::Validation(ValidationError::InvalidPageDuration(181))
        ));

        let error = client.get_message(0, 9, 0).unwrap_err();
        assert!(matches!(
            error,
            ClientError::Validation(ValidationError::InvalidMessageIndex { value: 9, max: 8 })
        ));
    }

    #[test]
    fn oversized_message_fails_before_any_io() {
        let client = PmvClient::new(DeviceAddress::new(1), Ipv4Addr::new(192, 0, 2, 1).into());

        let error = client
            .write_message(0, 0, 0, Style::Normal, "X".repeat(200))
            .unwrap_err();
        assert!(matches!(error, ClientError::PacketSize(_)));
    }

    #[test]
    fn decode_maps_errors() {
        assert!(matches!(
            decode(&Command::test(), &ACK),
            Ok(Reply::Status(true))
        ));
        assert!(matches!(
            decode(&Command::get_mode(), &NAK),
            Err(ClientError::Rejected)
        ));
        assert!(matches!(
            decode(&Command::test(), b"garbage"),
            Err(ClientError::ProtocolViolation(_))
        ));
    }
}
