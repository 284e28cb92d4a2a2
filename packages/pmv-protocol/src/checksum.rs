/// Folds `data` with XOR, starting from zero.
///
/// This is the frame check byte of the protocol: the last byte of a frame is the
/// XOR of every byte before it, from `STX` through `ETX` inclusive.
pub fn xor_checksum(data: &[u8]) -> u8 {
    let mut checksum = 0;
    for byte in data {
        checksum ^= byte;
    }
    checksum
}

/// Returns `true` if the last byte of `frame` is the XOR of all the bytes before it.
///
/// An empty frame has no check byte and never verifies.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&check, body)) => xor_checksum(body) == check,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{verify, xor_checksum};

    #[test]
    fn empty_input_folds_to_zero() {
        assert_eq!(xor_checksum(&[]), 0);
    }

    #[test]
    fn order_of_bytes_is_folded() {
        assert_eq!(xor_checksum(&[0x02, 0x05, b'W', b'T', 0x03]), 0x07);
        assert_eq!(xor_checksum(&[0xFF, 0x0F]), 0xF0);
    }

    #[test]
    fn appending_the_checksum_cancels_out() {
        let body = [0x02, 0x11, b'R', b'B', 0x03];
        let mut frame = body.to_vec();
        frame.push(xor_checksum(&body));

        assert_eq!(xor_checksum(&frame), 0);
        assert!(verify(&frame));
    }

    #[test]
    fn verify_rejects_corrupted_frames() {
        assert!(!verify(&[]));
        assert!(!verify(&[0x02, 0x05, b'W', b'T', 0x03, 0x08]));
    }
}
