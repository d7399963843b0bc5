//! Additive checksum used by the wire framing.
//!
//! The checksum byte is chosen so that the wrapping sum of every byte in a
//! frame — header and payload, including the checksum byte itself — is zero
//! modulo 256. Computing it is therefore the same operation whether you are
//! producing a frame (checksum field temporarily zeroed) or verifying one
//! (checksum field already populated): sum everything, compare or negate.

/// Wrapping sum of every byte in `bytes`, modulo 256.
#[inline]
pub fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Checksum byte that makes `sum(bytes)` equal zero, treating the checksum
/// field itself as already zeroed in `bytes`.
#[inline]
pub fn checksum_of(bytes: &[u8]) -> u8 {
    0u8.wrapping_sub(sum(bytes))
}

/// Checksum of a header slice followed by a payload slice, as if they were
/// contiguous. Convenience for callers that have not yet copied payload
/// bytes next to the header (most callers have, and should call
/// [`checksum_of`] directly over the contiguous region instead).
#[inline]
pub fn checksum_of_parts(header: &[u8], payload: &[u8]) -> u8 {
    let partial = sum(header).wrapping_add(sum(payload));
    0u8.wrapping_sub(partial)
}

/// `true` iff `bytes` is a valid frame: `sum(bytes) == 0`.
#[inline]
pub fn is_valid(bytes: &[u8]) -> bool {
    sum(bytes) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_closure_over_random_bytes() {
        let mut payload = [0x03u8, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00];
        let sum_without_checksum = sum(&payload);
        payload[1] = 0u8.wrapping_sub(sum_without_checksum);
        assert!(is_valid(&payload));
    }

    #[test]
    fn checksum_of_empty_is_zero() {
        assert_eq!(checksum_of(&[]), 0);
        assert!(is_valid(&[]));
    }

    #[test]
    fn flipping_any_byte_breaks_validity() {
        let mut frame = [0x03u8, 0x00, 0xAA, 0xBB, 0x01, 0x00, 0x02, 0x00, 0x11, 0x22];
        frame[1] = checksum_of(&frame);
        assert!(is_valid(&frame));
        for i in 0..frame.len() {
            let mut broken = frame;
            broken[i] ^= 0x01;
            assert!(!is_valid(&broken), "byte {i} flip should break checksum");
        }
    }

    #[test]
    fn checksum_of_parts_matches_contiguous() {
        let header = [0x03u8, 0x00, 0x10, 0x00, 0x00, 0x00, 0x04, 0x00];
        let payload = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut contiguous = [0u8; 12];
        contiguous[..8].copy_from_slice(&header);
        contiguous[8..].copy_from_slice(&payload);

        assert_eq!(checksum_of(&contiguous), checksum_of_parts(&header, &payload));
    }
}
