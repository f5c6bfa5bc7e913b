//! Length-hiding padding for the version 2 payload scheme.
//!
//! Messages up to 32 bytes pad to 32. Above that, the padded length rounds
//! up to a chunk that grows with the next power of two: chunks are 32 bytes
//! while the next power of two is at most 256, and one eighth of it beyond.
//! The padded buffer is `u16 big-endian length || plaintext || zeros`.

use super::PayloadError;

/// Smallest accepted plaintext length in bytes.
pub const MIN_PLAINTEXT_SIZE: usize = 1;

/// Largest accepted plaintext length in bytes.
pub const MAX_PLAINTEXT_SIZE: usize = 65535;

/// Returns the padded length for an unpadded length of `unpadded_len` bytes.
///
/// # Example
///
/// ```
/// use courier_core::nostr::encryption::calc_padded_len;
///
/// assert_eq!(calc_padded_len(1), 32);
/// assert_eq!(calc_padded_len(33), 64);
/// assert_eq!(calc_padded_len(515), 640);
/// ```
#[must_use]
pub const fn calc_padded_len(unpadded_len: usize) -> usize {
    if unpadded_len <= 32 {
        return 32;
    }
    let n = unpadded_len - 1;
    // 1 << (floor(log2(n)) + 1)
    let next_power = 1usize << (usize::BITS - n.leading_zeros());
    let chunk = if next_power <= 256 { 32 } else { next_power / 8 };
    chunk * (n / chunk + 1)
}

/// Prefixes the plaintext with its length and zero-pads it.
pub(super) fn pad(plaintext: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let len = plaintext.len();
    let prefix = u16::try_from(len)
        .ok()
        .filter(|_| len >= MIN_PLAINTEXT_SIZE)
        .ok_or(PayloadError::InvalidPlaintextLength(len))?;

    let padded_len = calc_padded_len(len);
    let mut padded = Vec::with_capacity(2 + padded_len);
    padded.extend_from_slice(&prefix.to_be_bytes());
    padded.extend_from_slice(plaintext);
    padded.resize(2 + padded_len, 0);
    Ok(padded)
}

/// Strips the length prefix and padding, validating both.
pub(super) fn unpad(padded: &[u8]) -> Result<&[u8], PayloadError> {
    let (prefix, rest) = padded.split_at_checked(2).ok_or(PayloadError::InvalidPadding)?;
    let len = usize::from(u16::from_be_bytes([prefix[0], prefix[1]]));

    if len < MIN_PLAINTEXT_SIZE || len > rest.len() || rest.len() != calc_padded_len(len) {
        return Err(PayloadError::InvalidPadding);
    }
    Ok(&rest[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_length_vectors() {
        let vectors = [
            (16, 32),
            (32, 32),
            (33, 64),
            (37, 64),
            (45, 64),
            (49, 64),
            (64, 64),
            (65, 96),
            (100, 128),
            (111, 128),
            (200, 224),
            (250, 256),
            (320, 320),
            (383, 384),
            (384, 384),
            (400, 448),
            (500, 512),
            (512, 512),
            (515, 640),
            (700, 768),
            (800, 896),
            (900, 1024),
            (1020, 1024),
            (65536, 65536),
        ];
        for (unpadded, expected) in vectors {
            assert_eq!(calc_padded_len(unpadded), expected, "unpadded length {unpadded}");
        }
    }

    #[test]
    fn exact_power_of_two_boundary_uses_next_bucket() {
        // n - 1 = 256 is itself a power of two: the schedule moves to 64-byte chunks
        assert_eq!(calc_padded_len(257), 320);
        assert_eq!(calc_padded_len(513), 640);
    }

    #[test]
    fn padded_length_is_monotonic() {
        let mut previous = 0;
        for len in 1..=MAX_PLAINTEXT_SIZE {
            let padded = calc_padded_len(len);
            assert!(padded >= len);
            assert!(padded >= previous);
            previous = padded;
        }
    }

    #[test]
    fn pad_then_unpad() {
        let padded = pad(b"hello").unwrap();
        assert_eq!(padded.len(), 2 + 32);
        assert_eq!(&padded[..2], &[0, 5]);
        assert!(padded[7..].iter().all(|&b| b == 0));
        assert_eq!(unpad(&padded).unwrap(), b"hello");
    }

    #[test]
    fn pad_rejects_empty_and_oversized() {
        assert!(matches!(pad(b""), Err(PayloadError::InvalidPlaintextLength(0))));
        let big = vec![b'x'; MAX_PLAINTEXT_SIZE + 1];
        assert!(matches!(
            pad(&big),
            Err(PayloadError::InvalidPlaintextLength(65536))
        ));
        assert!(pad(&big[..MAX_PLAINTEXT_SIZE]).is_ok());
    }

    #[test]
    fn unpad_rejects_zero_length_prefix() {
        let mut padded = pad(b"abc").unwrap();
        padded[0] = 0;
        padded[1] = 0;
        assert!(matches!(unpad(&padded), Err(PayloadError::InvalidPadding)));
    }

    #[test]
    fn unpad_rejects_length_beyond_buffer() {
        let mut padded = pad(b"abc").unwrap();
        padded[1] = 40;
        assert!(matches!(unpad(&padded), Err(PayloadError::InvalidPadding)));
    }

    #[test]
    fn unpad_rejects_non_canonical_padding() {
        let mut padded = pad(b"abc").unwrap();
        padded.extend_from_slice(&[0u8; 32]);
        assert!(matches!(unpad(&padded), Err(PayloadError::InvalidPadding)));
    }

    #[test]
    fn unpad_rejects_short_buffer() {
        assert!(matches!(unpad(&[1]), Err(PayloadError::InvalidPadding)));
    }
}
