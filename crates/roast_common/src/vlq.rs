//! Base64 VLQ decoding for source map `mappings` segments.

/// Errors produced while decoding a VLQ segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VlqError {
    /// A character outside the base64 alphabet was found.
    #[error("invalid base64 VLQ character '{0}'")]
    InvalidChar(char),

    /// The segment ended while a continuation bit was still set.
    #[error("truncated VLQ value")]
    Truncated,

    /// A value did not fit in 32 bits.
    #[error("VLQ value overflows 32 bits")]
    Overflow,
}

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_CONTINUATION_BIT: u32 = 1 << VLQ_BASE_SHIFT;
const VLQ_BASE_MASK: u32 = VLQ_CONTINUATION_BIT - 1;

fn base64_value(c: u8) -> Option<u32> {
    match c {
        b'A'..=b'Z' => Some((c - b'A') as u32),
        b'a'..=b'z' => Some((c - b'a') as u32 + 26),
        b'0'..=b'9' => Some((c - b'0') as u32 + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Decodes every signed value packed in one segment.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>, VlqError> {
    let mut values = Vec::new();
    let mut acc: u64 = 0;
    let mut shift: u32 = 0;
    let mut pending = false;

    for &byte in segment.as_bytes() {
        let digit = base64_value(byte).ok_or(VlqError::InvalidChar(byte as char))?;
        if shift > 32 {
            return Err(VlqError::Overflow);
        }
        acc |= u64::from(digit & VLQ_BASE_MASK) << shift;
        if digit & VLQ_CONTINUATION_BIT != 0 {
            shift += VLQ_BASE_SHIFT;
            pending = true;
            continue;
        }
        let magnitude = (acc >> 1) as i64;
        if magnitude > i64::from(u32::MAX) {
            return Err(VlqError::Overflow);
        }
        values.push(if acc & 1 == 1 { -magnitude } else { magnitude });
        acc = 0;
        shift = 0;
        pending = false;
    }

    if pending {
        return Err(VlqError::Truncated);
    }
    Ok(values)
}

/// Encodes signed values into one segment. Used to build fixtures and by
/// tools that synthesize maps.
pub fn encode_segment(values: &[i64]) -> String {
    const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut out = String::new();
    for &value in values {
        let mut vlq: u64 = if value < 0 {
            ((value.unsigned_abs()) << 1) | 1
        } else {
            (value as u64) << 1
        };
        loop {
            let mut digit = (vlq & u64::from(VLQ_BASE_MASK)) as u32;
            vlq >>= VLQ_BASE_SHIFT;
            if vlq > 0 {
                digit |= VLQ_CONTINUATION_BIT;
            }
            out.push(ALPHABET[digit as usize] as char);
            if vlq == 0 {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_known_segments() {
        assert_eq!(decode_segment("AAAA").unwrap(), vec![0, 0, 0, 0]);
        assert_eq!(decode_segment("AACA").unwrap(), vec![0, 0, 1, 0]);
        assert_eq!(decode_segment("D").unwrap(), vec![-1]);
        assert_eq!(decode_segment("gB").unwrap(), vec![16]);
    }

    #[test]
    fn rejects_bad_character() {
        assert_eq!(decode_segment("A*A"), Err(VlqError::InvalidChar('*')));
    }

    #[test]
    fn rejects_dangling_continuation() {
        assert_eq!(decode_segment("g"), Err(VlqError::Truncated));
    }

    #[test]
    fn rejects_overflow() {
        assert_eq!(decode_segment("gggggggggB"), Err(VlqError::Overflow));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(values in proptest::collection::vec(-1_000_000i64..1_000_000, 0..8)) {
            let encoded = encode_segment(&values);
            prop_assert_eq!(decode_segment(&encoded).unwrap(), values);
        }
    }
}
