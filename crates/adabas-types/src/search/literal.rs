//! Search operand literals.
//!
//! After constant extraction an operand is one of
//! - a single placeholder `#{N}`, assigned as text;
//! - plain text such as `12` or `-3.5`, parsed by the field;
//! - a mixed run of hex (`0x0102(3)`), placeholders and numbers, folded
//!   into raw bytes.

use crate::platform::ByteOrder;
use crate::value::{decode_hex, Scalar};
use crate::{AdabasError, Result};

/// Upper bound for the bytes a single literal may expand to.
const MAX_LITERAL_BYTES: usize = u16::MAX as usize;

fn invalid(literal: &str, reason: &str) -> AdabasError {
    AdabasError::InvalidLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

/// Index of an exact `#{N}` placeholder.
fn placeholder(text: &str) -> Option<&str> {
    text.strip_prefix("#{")?.strip_suffix('}')
}

fn constant<'a>(literal: &str, index: &str, constants: &'a [String]) -> Result<&'a str> {
    index
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| constants.get(n))
        .map(String::as_str)
        .ok_or_else(|| invalid(literal, "unknown constant placeholder"))
}

/// Drop the escape in `\'`.
pub(crate) fn unescape(raw: &str) -> String {
    raw.replace("\\'", "'")
}

/// Turn operand text into the scalar assigned to the search value.
pub(crate) fn operand(text: &str, constants: &[String], order: ByteOrder) -> Result<Scalar> {
    let text = text.trim();
    if let Some(index) = placeholder(text) {
        if !index.contains('{') {
            return Ok(Scalar::Str(unescape(constant(text, index, constants)?)));
        }
    }
    if text.contains("#{") || text.starts_with("0x") || text.starts_with("0X") {
        return mixed(text, constants, order).map(Scalar::Bytes);
    }
    Ok(Scalar::Str(text.to_string()))
}

/// Fold a mixed literal into bytes.
pub(crate) fn mixed(text: &str, constants: &[String], order: ByteOrder) -> Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let rest = &text[i..];
        if rest.len() >= 2 && rest.as_bytes()[..2].eq_ignore_ascii_case(b"0x") {
            let digits = rest[2..]
                .bytes()
                .take_while(u8::is_ascii_hexdigit)
                .count();
            let hex = &rest[2..2 + digits];
            let run = decode_hex(hex)
                .filter(|run| !run.is_empty())
                .ok_or_else(|| invalid(text, "bad hex run"))?;
            i += 2 + digits;
            let mut count = 1usize;
            if text[i..].starts_with('(') {
                let close = text[i..]
                    .find(')')
                    .ok_or_else(|| invalid(text, "unterminated repeat count"))?;
                count = text[i + 1..i + close]
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|c| *c > 0)
                    .ok_or_else(|| invalid(text, "bad repeat count"))?;
                i += close + 1;
            }
            let total = run
                .len()
                .checked_mul(count)
                .and_then(|n| n.checked_add(out.len()))
                .filter(|n| *n <= MAX_LITERAL_BYTES)
                .ok_or_else(|| invalid(text, "repeat count too large"))?;
            out.reserve(total - out.len());
            for _ in 0..count {
                out.extend_from_slice(&run);
            }
        } else if rest.starts_with("#{") {
            let close = rest
                .find('}')
                .ok_or_else(|| invalid(text, "unterminated placeholder"))?;
            out.extend_from_slice(unescape(constant(text, &rest[2..close], constants)?).as_bytes());
            i += close + 1;
        } else if bytes[i].is_ascii_digit() {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            let mut acc: u64 = 0;
            for d in rest[..digits].bytes() {
                acc = acc
                    .checked_add((d - b'0') as u64)
                    .and_then(|v| v.checked_mul(10))
                    .ok_or_else(|| invalid(text, "number too large"))?;
            }
            out.extend_from_slice(&minimal_bytes(acc, order));
            i += digits;
        } else if bytes[i].is_ascii_whitespace() {
            i += 1;
        } else {
            return Err(invalid(text, "unexpected character"));
        }
    }
    tracing::trace!(literal = %text, bytes = ?out, "mixed literal");
    Ok(out)
}

/// Fewest bytes holding `value`, at least one.
fn minimal_bytes(value: u64, order: ByteOrder) -> Vec<u8> {
    let width = (((64 - value.leading_zeros()) + 7) / 8).max(1) as usize;
    match order {
        ByteOrder::Big => value.to_be_bytes()[8 - width..].to_vec(),
        ByteOrder::Little => value.to_le_bytes()[..width].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constants() -> Vec<String> {
        vec!["ABCD".to_string(), "O\\'Neil".to_string()]
    }

    #[test]
    fn test_mixed_literal() {
        let bytes = mixed("0x01#{1}101", &constants(), ByteOrder::Little).unwrap();
        assert_eq!(bytes, vec![0x01, 0x41, 0x42, 0x43, 0x44, 0xF2, 0x03]);
        let bytes = mixed("0x01#{1}101", &constants(), ByteOrder::Big).unwrap();
        assert_eq!(&bytes[5..], &[0x03, 0xF2]);
    }

    #[test]
    fn test_hex_repeat() {
        let bytes = mixed("0x0A0B(3)", &[], ByteOrder::Big).unwrap();
        assert_eq!(bytes, vec![0x0A, 0x0B, 0x0A, 0x0B, 0x0A, 0x0B]);
        assert_eq!(mixed("0x0A(0)", &[], ByteOrder::Big).unwrap_err().code(), 171);
        assert_eq!(mixed("0x0A(x)", &[], ByteOrder::Big).unwrap_err().code(), 171);
        assert_eq!(mixed("0xABC", &[], ByteOrder::Big).unwrap_err().code(), 171);
        assert_eq!(mixed("0xZZ", &[], ByteOrder::Big).unwrap_err().code(), 171);
    }

    #[test]
    fn test_hex_repeat_limit() {
        let bytes = mixed("0x00(65535)", &[], ByteOrder::Big).unwrap();
        assert_eq!(bytes.len(), 65535);
        let err = mixed("0x00(99999999)", &[], ByteOrder::Big).unwrap_err();
        assert_eq!(err.code(), 171);
        let err = mixed("0x0102(40000)", &[], ByteOrder::Big).unwrap_err();
        assert_eq!(err.code(), 171);
        let err = mixed("0x01(65535)0x02", &[], ByteOrder::Big).unwrap_err();
        assert_eq!(err.code(), 171);
        let err = mixed("0x00(18446744073709551615)", &[], ByteOrder::Big).unwrap_err();
        assert_eq!(err.code(), 171);
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(mixed("0", &[], ByteOrder::Big).unwrap(), vec![0]);
        assert_eq!(mixed("1", &[], ByteOrder::Big).unwrap(), vec![10]);
        let err = mixed("99999999999999999999", &[], ByteOrder::Big).unwrap_err();
        assert_eq!(err.code(), 171);
    }

    #[test]
    fn test_operand_kinds() {
        let c = constants();
        assert_eq!(
            operand("#{2}", &c, ByteOrder::Big).unwrap(),
            Scalar::Str("O'Neil".into())
        );
        assert_eq!(operand(" 12 ", &c, ByteOrder::Big).unwrap(), Scalar::Str("12".into()));
        assert_eq!(
            operand("0x0102", &c, ByteOrder::Big).unwrap(),
            Scalar::Bytes(vec![1, 2])
        );
        assert_eq!(operand("#{9}", &c, ByteOrder::Big).unwrap_err().code(), 171);
        assert_eq!(operand("#{1}x", &c, ByteOrder::Big).unwrap_err().code(), 171);
    }
}
