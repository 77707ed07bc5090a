//! Unpacked (zoned) decimal, format `U`.
//!
//! One digit per byte: the digit sits in the low nibble and the zone in the
//! high nibble. The last byte's zone carries the sign.
//!
//! Example: -123 in a 4-byte field
//! - Open systems: 0x30 0x31 0x32 0x73
//! - Mainframe: 0xF0 0xF1 0xF2 0xD3

use super::digit_count;
use crate::error::EncodingError;
use crate::Result;

/// Zone nibbles written by the unpacked encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedSigns {
    /// Zone of every digit byte and of a positive last byte.
    pub zone: u8,
    /// Zone of the last byte when the value is negative.
    pub negative: u8,
}

impl ZonedSigns {
    /// ASCII digits, `0x7` marks negative.
    pub const OPEN: ZonedSigns = ZonedSigns {
        zone: 0x3,
        negative: 0x7,
    };

    /// EBCDIC digits, `0xD` marks negative.
    pub const MAINFRAME: ZonedSigns = ZonedSigns {
        zone: 0xF,
        negative: 0xD,
    };
}

/// Bytes an unpacked field needs to hold `value`.
pub fn zoned_len_for(value: i64) -> usize {
    digit_count(value.unsigned_abs() as u128)
}

/// Encode `value` into an unpacked field of `len` bytes.
///
/// # Errors
/// Returns `EncodingError::Overflow` if the value needs more than `len`
/// digits.
pub fn zone_i64(value: i64, len: usize, signs: ZonedSigns) -> Result<Vec<u8>> {
    let mut magnitude = value.unsigned_abs();
    let digits = digit_count(magnitude as u128);
    if len == 0 || digits > len {
        return Err(EncodingError::Overflow {
            value: value as i128,
            digits,
            capacity: len,
        });
    }

    let zone = signs.zone << 4;
    let mut out = vec![zone; len];
    for byte in out.iter_mut().rev() {
        *byte = zone | (magnitude % 10) as u8;
        magnitude /= 10;
    }
    if value < 0 {
        let last = len - 1;
        out[last] = (signs.negative << 4) | (out[last] & 0x0F);
    }
    Ok(out)
}

/// Decode an unpacked field.
///
/// The value is negative when the last byte's zone differs from the digit
/// zone of the given sign set. An empty slice decodes to zero.
///
/// # Errors
/// Returns `EncodingError::InvalidDigit` for a low nibble above 9 and
/// `EncodingError::Overflow` if the result does not fit an `i64`.
pub fn unzone_i64(bytes: &[u8], signs: ZonedSigns) -> Result<i64> {
    let mut acc: i128 = 0;
    for (position, &byte) in bytes.iter().enumerate() {
        let digit = byte & 0x0F;
        if digit > 9 {
            return Err(EncodingError::InvalidDigit {
                nibble: digit,
                position,
            });
        }
        acc = acc * 10 + digit as i128;
        if acc > i64::MAX as i128 {
            return Err(EncodingError::Overflow {
                value: acc,
                digits: bytes.len(),
                capacity: 19,
            });
        }
    }
    if let Some(&last) = bytes.last() {
        if last >> 4 != signs.zone {
            acc = -acc;
        }
    }
    Ok(acc as i64)
}
