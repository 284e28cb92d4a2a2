//! Single UDP round trips with a sign.
//!
//! Every exchange opens its own socket, sends one packet, waits for at most one
//! reply and closes the socket again, whatever the outcome. Nothing is shared
//! between exchanges, so they can run concurrently.

use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    time::Duration,
};

use log::{debug, trace};
use pmv_protocol::{DecodeError, DecodeErrorKind, MAX_PACKET_SIZE, Reply};

use crate::ClientError;

/// A zero read timeout would block forever, so shorter timeouts are raised to this.
const MIN_TIMEOUT: Duration = Duration::from_millis(1);

/// Any interface and an ephemeral port, in the address family of `endpoint`.
pub fn unspecified_bind_addr(endpoint: SocketAddr) -> SocketAddr {
    match endpoint {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(error.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

/// Receive buffer one octet larger than any valid reply, so that an oversized
/// datagram is detected instead of silently truncated.
const RECV_BUFFER_SIZE: usize = MAX_PACKET_SIZE + 1;

fn received(buf: &[u8]) -> Result<Vec<u8>, ClientError> {
    trace!("received reply: {:x?}", buf);
    if buf.len() > MAX_PACKET_SIZE {
        return Err(ClientError::ProtocolViolation(DecodeError::new::<Reply>(
            DecodeErrorKind::ReplyTooLong {
                max_size: MAX_PACKET_SIZE,
            },
        )));
    }
    Ok(buf.to_vec())
}

/// Sends `packet` to `endpoint` and waits up to `timeout` for the reply.
///
/// The socket is bound to `bind_addr`, or to [`unspecified_bind_addr`] when it is
/// `None`.
///
/// # Errors
///
/// - [`ClientError::Timeout`] if nothing arrives within `timeout`.
/// - [`ClientError::ProtocolViolation`] if the reply is longer than
///   [`MAX_PACKET_SIZE`].
/// - [`ClientError::Network`] if the socket cannot be opened or the endpoint is
///   unreachable.
pub fn exchange(
    packet: &[u8],
    endpoint: SocketAddr,
    bind_addr: Option<SocketAddr>,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    let bind_addr = bind_addr.unwrap_or_else(|| unspecified_bind_addr(endpoint));
    let socket = UdpSocket::bind(bind_addr)?;
    debug!("Bound UDP socket on {} for {}", bind_addr, endpoint);

    let result = round_trip(&socket, packet, endpoint, timeout);

    // Released on every outcome, including timeouts and network errors.
    drop(socket);
    result
}

fn round_trip(
    socket: &UdpSocket,
    packet: &[u8],
    endpoint: SocketAddr,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    // Connecting filters out datagrams from other hosts and surfaces ICMP errors.
    socket.connect(endpoint)?;
    socket.set_read_timeout(Some(timeout.max(MIN_TIMEOUT)))?;

    trace!("sent packet: {:x?}", packet);
    socket.send(packet)?;

    let mut buf = [0; RECV_BUFFER_SIZE];
    let len = match socket.recv(&mut buf) {
        Ok(len) => len,
        Err(e) if is_timeout(&e) => {
            debug!("No reply from {} within {:?}", endpoint, timeout);
            return Err(ClientError::Timeout(timeout));
        }
        Err(e) => return Err(ClientError::Network(e)),
    };

    received(&buf[..len])
}

/// Async version of [`exchange`] on the tokio runtime.
///
/// Dropping the returned future also closes the socket.
#[cfg(feature = "tokio")]
pub async fn exchange_async(
    packet: &[u8],
    endpoint: SocketAddr,
    bind_addr: Option<SocketAddr>,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    let bind_addr = bind_addr.unwrap_or_else(|| unspecified_bind_addr(endpoint));
    let socket = tokio::net::UdpSocket::bind(bind_addr).await?;
    debug!("Bound UDP socket on {} for {}", bind_addr, endpoint);

    let result: Result<Vec<u8>, ClientError> = async {
        socket.connect(endpoint).await?;

        trace!("sent packet: {:x?}", packet);
        socket.send(packet).await?;

        let mut buf = [0; RECV_BUFFER_SIZE];
        match tokio::time::timeout(timeout, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => received(&buf[..len]),
            Ok(Err(e)) => Err(ClientError::Network(e)),
            Err(_) => {
                debug!("No reply from {} within {:?}", endpoint, timeout);
                Err(ClientError::Timeout(timeout))
            }
        }
    }
    .await;

    drop(socket);
    result
}
