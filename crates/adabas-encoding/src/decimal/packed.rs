//! Packed decimal (format `P`) encoding and decoding.
//!
//! Packed decimal stores two decimal digits per byte. The rightmost nibble
//! holds the sign, so a field of `L` bytes carries `2L - 1` digits.
//!
//! Example: +24615 in a 3-byte field
//! - Layout: d1|d2 d3|d4 d5|sign
//! - Open systems: 0x24 0x61 0x5C
//! - Mainframe: 0x24 0x61 0x5F

use super::digit_count;
use crate::error::EncodingError;
use crate::Result;

/// Sign nibbles written by the packed encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedSigns {
    /// Nibble for zero and positive values.
    pub positive: u8,
    /// Nibble for negative values.
    pub negative: u8,
}

impl PackedSigns {
    /// Open systems: `C` positive, `B` negative.
    pub const OPEN: PackedSigns = PackedSigns {
        positive: 0x0C,
        negative: 0x0B,
    };

    /// Mainframe: `F` positive, `D` negative.
    pub const MAINFRAME: PackedSigns = PackedSigns {
        positive: 0x0F,
        negative: 0x0D,
    };

    /// Whether a sign nibble read from the wire means negative.
    ///
    /// `B` and `D` are negative; every other nibble is taken as positive.
    pub fn is_negative_nibble(nibble: u8) -> bool {
        matches!(nibble & 0x0F, 0x0B | 0x0D)
    }
}

/// Bytes a packed field needs to hold `value`.
pub fn packed_len_for(value: i64) -> usize {
    let digits = digit_count(value.unsigned_abs() as u128);
    (digits + 2) / 2
}

/// Encode `value` into a packed field of `len` bytes.
///
/// # Errors
/// Returns `EncodingError::Overflow` if the magnitude needs more than
/// `2 * len - 1` digits.
pub fn pack_i64(value: i64, len: usize, signs: PackedSigns) -> Result<Vec<u8>> {
    let capacity = (len * 2).saturating_sub(1);
    let mut magnitude = value.unsigned_abs();
    let digits = digit_count(magnitude as u128);
    if len == 0 || digits > capacity {
        return Err(EncodingError::Overflow {
            value: value as i128,
            digits,
            capacity,
        });
    }

    let sign = if value < 0 {
        signs.negative
    } else {
        signs.positive
    };

    let mut out = vec![0u8; len];
    // Last byte: one digit and the sign.
    out[len - 1] = (((magnitude % 10) as u8) << 4) | sign;
    magnitude /= 10;
    for byte in out.iter_mut().rev().skip(1) {
        let low = (magnitude % 10) as u8;
        magnitude /= 10;
        let high = (magnitude % 10) as u8;
        magnitude /= 10;
        *byte = (high << 4) | low;
    }
    Ok(out)
}

/// Decode a packed field to an integer.
///
/// An empty slice decodes to zero.
///
/// # Errors
/// Returns `EncodingError::InvalidDigit` for a digit nibble above 9 and
/// `EncodingError::Overflow` if the result does not fit an `i64`.
pub fn packed_to_i64(bytes: &[u8]) -> Result<i64> {
    let Some((&last, body)) = bytes.split_last() else {
        return Ok(0);
    };

    let mut acc: i128 = 0;
    for (position, &byte) in body.iter().enumerate() {
        let high = byte >> 4;
        let low = byte & 0x0F;
        if high > 9 || low > 9 {
            return Err(EncodingError::InvalidDigit {
                nibble: if high > 9 { high } else { low },
                position,
            });
        }
        acc = acc * 100 + (high as i128) * 10 + low as i128;
        if acc > i64::MAX as i128 {
            return Err(overflow(acc, bytes.len()));
        }
    }

    let high = last >> 4;
    if high > 9 {
        return Err(EncodingError::InvalidDigit {
            nibble: high,
            position: body.len(),
        });
    }
    acc = acc * 10 + high as i128;
    if PackedSigns::is_negative_nibble(last) {
        acc = -acc;
    }
    i64::try_from(acc).map_err(|_| overflow(acc, bytes.len()))
}

fn overflow(acc: i128, len: usize) -> EncodingError {
    EncodingError::Overflow {
        value: acc,
        digits: digit_count(acc.unsigned_abs()),
        capacity: len * 2 - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_small_positive() {
        assert_eq!(
            pack_i64(9, 4, PackedSigns::OPEN).unwrap(),
            vec![0x00, 0x00, 0x00, 0x9C]
        );
    }

    #[test]
    fn test_pack_negative_open() {
        assert_eq!(
            pack_i64(-10, 4, PackedSigns::OPEN).unwrap(),
            vec![0x00, 0x00, 0x01, 0x0B]
        );
    }

    #[test]
    fn test_pack_mainframe_signs() {
        assert_eq!(pack_i64(12345, 3, PackedSigns::MAINFRAME).unwrap(), vec![0x12, 0x34, 0x5F]);
        assert_eq!(pack_i64(-12345, 3, PackedSigns::MAINFRAME).unwrap(), vec![0x12, 0x34, 0x5D]);
    }

    #[test]
    fn test_zero_is_positive() {
        assert_eq!(pack_i64(0, 2, PackedSigns::OPEN).unwrap(), vec![0x00, 0x0C]);
    }

    #[test]
    fn test_pack_overflow() {
        // 2 bytes hold three digits.
        assert!(pack_i64(999, 2, PackedSigns::OPEN).is_ok());
        let err = pack_i64(1000, 2, PackedSigns::OPEN).unwrap_err();
        assert!(matches!(err, EncodingError::Overflow { capacity: 3, .. }));
        assert!(pack_i64(-1000, 2, PackedSigns::OPEN).is_err());
        assert!(pack_i64(1, 0, PackedSigns::OPEN).is_err());
    }

    #[test]
    fn test_unpack() {
        assert_eq!(packed_to_i64(&[0x00, 0x00, 0x24, 0x61, 0x5C]).unwrap(), 24615);
        assert_eq!(packed_to_i64(&[0x12, 0x34, 0x5D]).unwrap(), -12345);
        assert_eq!(packed_to_i64(&[0x00, 0x00, 0x01, 0x0B]).unwrap(), -10);
        assert_eq!(packed_to_i64(&[0x5F]).unwrap(), 5);
        assert_eq!(packed_to_i64(&[]).unwrap(), 0);
    }

    #[test]
    fn test_unpack_invalid_digit() {
        let err = packed_to_i64(&[0x1A, 0x5C]).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidDigit { nibble: 0x0A, position: 0 }));
    }

    #[test]
    fn test_unpack_too_large_for_i64() {
        let bytes = [0x99u8; 11];
        assert!(packed_to_i64(&bytes).is_err());
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for len in 1..=9usize {
            let max = 10i64.pow((2 * len - 1) as u32) - 1;
            for v in [0, 1, -1, max, -max, max / 7] {
                let packed = pack_i64(v, len, PackedSigns::OPEN).unwrap();
                assert_eq!(packed_to_i64(&packed).unwrap(), v, "len {len} value {v}");
            }
            assert!(pack_i64(max + 1, len, PackedSigns::OPEN).is_err());
        }
    }

    #[test]
    fn test_packed_len_for() {
        assert_eq!(packed_len_for(0), 1);
        assert_eq!(packed_len_for(9), 1);
        assert_eq!(packed_len_for(10), 2);
        assert_eq!(packed_len_for(-999), 2);
        assert_eq!(packed_len_for(1000), 3);
        assert_eq!(packed_len_for(i64::MIN), 10);
    }
}
