use std::{
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    sync::mpsc,
    thread,
    time::Duration,
};

use pmv_manager::{
    ClientError, PmvClient,
    protocol::{ACK, CR, DeviceAddress, ETX, Mode, NAK, STX, Style, verify, xor_checksum},
};

const ADDRESS: u8 = 0x05;

fn init_logger() {
    let _ = simplelog::TestLogger::init(log::LevelFilter::Trace, simplelog::Config::default());
}

/// A loopback sign that answers `requests` packets and forwards each one it receives.
fn fake_sign(requests: usize) -> (SocketAddr, mpsc::Receiver<Vec<u8>>) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = socket.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for _ in 0..requests {
            let mut buf = [0; 256];
            let Ok((len, from)) = socket.recv_from(&mut buf) else {
                return;
            };
            let request = buf[..len].to_vec();
            let reply = answer(&request);
            socket.send_to(&reply, from).unwrap();
            let _ = tx.send(request);
        }
    });

    (addr, rx)
}

/// A loopback sign that answers a single packet with `reply`, whatever it was.
fn one_shot_sign(reply: Vec<u8>) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    let addr = socket.local_addr().unwrap();

    thread::spawn(move || {
        let mut buf = [0; 256];
        let (_, from) = socket.recv_from(&mut buf).unwrap();
        socket.send_to(&reply, from).unwrap();
    });

    addr
}

/// Builds a framed reply the way a sign does.
fn frame(opcode: &[u8], payload: &[u8], trailer: &[u8]) -> Vec<u8> {
    let mut frame = vec![STX, ADDRESS];
    frame.extend_from_slice(opcode);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(trailer);
    frame.push(xor_checksum(&frame));
    frame
}

fn answer(request: &[u8]) -> Vec<u8> {
    if !verify(request) {
        return NAK.to_vec();
    }

    match &request[2..4] {
        b"WT" | b"WB" | b"WF" => ACK.to_vec(),
        // Row 9 is read-only on this sign.
        b"WI" if &request[4..6] == b"09" => NAK.to_vec(),
        b"WI" => ACK.to_vec(),
        b"RB" => frame(b"RB", b"1", &[ETX]),
        b"RC" => frame(b"RC", b"012", &[ETX]),
        b"RI" => frame(b"RI", b"2USCITA CHIUSA", &[CR, ETX]),
        _ => NAK.to_vec(),
    }
}

fn client(endpoint: SocketAddr) -> PmvClient {
    PmvClient::new(DeviceAddress::new(ADDRESS), endpoint.ip()).with_port(endpoint.port())
}

#[test]
fn write_commands_are_acknowledged() {
    init_logger();
    let (endpoint, requests) = fake_sign(4);
    let client = client(endpoint);

    assert!(client.test().unwrap());
    assert_eq!(requests.recv().unwrap(), [0x02, 0x05, 0x57, 0x54, 0x03, 0x07]);

    assert!(client.set_to_force_mode().unwrap());
    assert_eq!(requests.recv().unwrap()[2..5], *b"WB1");

    assert!(client.init_page(7, [255, 0, 0, 0, 0]).unwrap());
    assert_eq!(requests.recv().unwrap()[2..21], *b"WF07255000000000000");

    assert!(client.write_message(0, 7, 0, Style::Normal, "CODA").unwrap());
    let request = requests.recv().unwrap();
    assert_eq!(request[2..16], *b"WI0007000CODA\r");
    assert!(verify(&request));
}

#[test]
fn nak_is_a_false_status() {
    init_logger();
    let (endpoint, _requests) = fake_sign(1);

    let accepted = client(endpoint)
        .write_message(9, 0, 0, Style::Bold, "VIETATO")
        .unwrap();
    assert!(!accepted);
}

#[test]
fn read_commands_decode_their_replies() {
    init_logger();
    let (endpoint, requests) = fake_sign(3);
    let client = client(endpoint);

    assert_eq!(client.get_mode().unwrap(), Mode::Force);
    assert_eq!(requests.recv().unwrap()[2..4], *b"RB");

    assert_eq!(client.get_rows_number().unwrap(), 12);
    assert_eq!(requests.recv().unwrap()[2..4], *b"RC");

    assert_eq!(
        client.get_message(1, 8, 4).unwrap(),
        (Style::Bold, "USCITA CHIUSA".to_string())
    );
    assert_eq!(requests.recv().unwrap()[2..10], *b"RI010804");
}

#[test]
fn mismatched_reply_is_a_protocol_violation() {
    init_logger();

    // A mode query answered with a bare ACK.
    let result = client(one_shot_sign(ACK.to_vec())).get_mode();
    assert!(
        matches!(result, Err(ClientError::ProtocolViolation(_))),
        "expected ProtocolViolation, got: {:?}",
        result
    );

    // A write command answered with neither ACK nor NAK.
    let result = client(one_shot_sign(b"not a reply".to_vec())).test();
    assert!(
        matches!(result, Err(ClientError::ProtocolViolation(_))),
        "expected ProtocolViolation, got: {:?}",
        result
    );
}

#[cfg(unix)]
#[test]
fn oversized_reply_is_a_protocol_violation() {
    init_logger();

    // 150 characters of text make a 158 octet frame.
    let mut payload = vec![b'0'];
    payload.extend_from_slice(&[b'A'; 150]);
    let reply = frame(b"RI", &payload, &[CR, ETX]);
    assert_eq!(reply.len(), 158);

    let result = client(one_shot_sign(reply)).get_message(0, 0, 0);
    assert!(
        matches!(result, Err(ClientError::ProtocolViolation(_))),
        "expected ProtocolViolation, got: {:?}",
        result
    );
}

#[test]
fn accented_text_is_sent_as_utf8() {
    init_logger();
    let (endpoint, requests) = fake_sign(1);

    let text = "CHAUSS\u{00C9}E GLISSANTE";
    assert!(client(endpoint).write_message(1, 0, 0, Style::Normal, text).unwrap());

    let request = requests.recv().unwrap();
    assert!(verify(&request));
    assert_eq!(&request[11..(request.len() - 3)], text.as_bytes());
}

#[test]
fn nak_to_a_read_is_rejected() {
    init_logger();

    let result = client(one_shot_sign(NAK.to_vec())).get_rows_number();
    assert!(
        matches!(result, Err(ClientError::Rejected)),
        "expected Rejected, got: {:?}",
        result
    );
}

#[test]
fn silent_sign_times_out() {
    init_logger();
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let endpoint = silent.local_addr().unwrap();

    let client = client(endpoint).with_timeout(Duration::from_millis(100));
    let result = client.test();
    assert!(
        matches!(result, Err(ClientError::Timeout(timeout)) if timeout == Duration::from_millis(100)),
        "expected Timeout, got: {:?}",
        result
    );
}

#[test]
fn repeated_timeouts_do_not_leak_sockets() {
    init_logger();
    let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
    let local = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap().local_addr().unwrap();

    let client = client(silent.local_addr().unwrap())
        .with_timeout(Duration::from_millis(20))
        .with_bind_addr(local);

    // Each call binds the same local port, which fails if the last socket is still open.
    for _ in 0..5 {
        assert!(client.test().unwrap_err().is_timeout());
    }
}

#[test]
fn concurrent_calls_are_independent() {
    init_logger();
    let (endpoint, _requests) = fake_sign(8);
    let client = client(endpoint);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| client.get_rows_number()))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 12);
        }
    });
}

#[cfg(feature = "tokio")]
#[tokio::test]
async fn send_async_decodes_reply() {
    use pmv_manager::protocol::{Command, Reply};

    init_logger();
    let (endpoint, _requests) = fake_sign(1);

    let reply = client(endpoint)
        .send_async(&Command::get_mode())
        .await
        .unwrap();
    assert_eq!(reply, Reply::Mode(Mode::Force));
}
