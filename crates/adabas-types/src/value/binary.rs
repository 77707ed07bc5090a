//! Fixed-width binary integers (`B` and `F` with length 1, 2, 4 or 8).

use std::sync::Arc;

use super::{
    format_scaled, pow10, scalar_to_scaled, scaled_to_integer, to_i64, to_u64, BufferOption,
    Scalar, TraverseResult, ValueCodec, ValueMeta,
};
use crate::buffer::BufferHelper;
use crate::platform::ByteOrder;
use crate::types::AdaType;
use crate::{AdabasError, Result};

/// Binary integer value.
///
/// The number is kept as a plain integer; byte order is applied when the
/// value is written to or read from a buffer.
#[derive(Debug, Clone)]
pub struct BinaryValue {
    pub(crate) meta: ValueMeta,
    value: i128,
}

impl BinaryValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        Self { meta, value: 0 }
    }

    fn width(&self) -> (usize, bool) {
        self.meta.ada_type.kind().binary_width().unwrap_or((8, true))
    }

    fn bounds(&self) -> (i128, i128) {
        let (width, signed) = self.width();
        let bits = (width * 8) as u32;
        if signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }

    fn check(&self, v: i128) -> Result<i128> {
        let (low, high) = self.bounds();
        if v < 0 && low == 0 {
            return Err(AdabasError::NegativeUnsigned {
                field: self.meta.short_name().to_string(),
                value: v.to_string(),
            });
        }
        if v < low || v > high {
            return Err(self.meta.out_of_range(v));
        }
        Ok(v)
    }

    fn from_bits(&self, bits: u64) -> i128 {
        let (width, signed) = self.width();
        if signed {
            let shift = 64 - (width * 8) as u32;
            (((bits << shift) as i64) >> shift) as i128
        } else {
            bits as i128
        }
    }

    fn decode_bytes(&self, data: &[u8]) -> Result<i128> {
        let (width, _) = self.width();
        if data.len() > width {
            return Err(AdabasError::BytesTooLong {
                field: self.meta.short_name().to_string(),
                actual: data.len(),
                length: width as u32,
            });
        }
        let mut padded = vec![0u8; width];
        let bits = match self.meta.platform.byte_order() {
            ByteOrder::Big => {
                padded[width - data.len()..].copy_from_slice(data);
                padded.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)
            }
            ByteOrder::Little => {
                padded[..data.len()].copy_from_slice(data);
                padded.iter().rev().fold(0u64, |acc, b| (acc << 8) | *b as u64)
            }
        };
        Ok(self.from_bits(bits))
    }
}

impl ValueCodec for BinaryValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        let v = match &value {
            Scalar::Bytes(data) => self.decode_bytes(data)?,
            other => scalar_to_scaled(&self.meta, other)?,
        };
        self.value = self.check(v)?;
        tracing::trace!(field = %self.meta.short_name(), value = %self.value, "set binary");
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        let (width, _) = self.width();
        let be = (self.value as u64).to_be_bytes();
        let mut out = be[8 - width..].to_vec();
        if self.meta.platform.byte_order() == ByteOrder::Little {
            out.reverse();
        }
        out
    }

    fn string(&self) -> String {
        format_scaled(self.value, self.meta.ada_type.fractional())
    }

    fn int64(&self) -> Result<i64> {
        to_i64(&self.meta, scaled_to_integer(&self.meta, self.value)?)
    }

    fn uint64(&self) -> Result<u64> {
        to_u64(&self.meta, scaled_to_integer(&self.meta, self.value)?)
    }

    fn float64(&self) -> Result<f64> {
        Ok(self.value as f64 / pow10(self.meta.ada_type.fractional()) as f64)
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        self.meta.common_format(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if opt.is_second_call() {
            return Ok(());
        }
        let bits = self.value as u64;
        match self.width().0 {
            1 => helper.put_u8(bits as u8),
            2 => helper.put_u16(bits as u16),
            4 => helper.put_u32(bits as u32),
            _ => helper.put_u64(bits),
        }
        Ok(())
    }

    fn parse_buffer(
        &mut self,
        helper: &mut BufferHelper,
        opt: &mut BufferOption,
    ) -> Result<TraverseResult> {
        if opt.is_second_call() {
            return Ok(TraverseResult::SkipTree);
        }
        let bits = match self.width().0 {
            1 => helper.receive_u8()? as u64,
            2 => helper.receive_u16()? as u64,
            4 => helper.receive_u32()? as u64,
            _ => helper.receive_u64()?,
        };
        self.value = self.from_bits(bits);
        tracing::trace!(field = %self.meta.short_name(), value = %self.value, offset = helper.offset(), "parsed binary");
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, ARCH_OPEN_LOW};
    use crate::types::FieldKind;
    use crate::value::AdaValue;

    fn value(kind: FieldKind, platform: Platform) -> AdaValue {
        Arc::new(AdaType::new(kind, "BI")).new_value(&platform)
    }

    #[test]
    fn test_set_and_read() {
        let mut v = value(FieldKind::Int4, Platform::default());
        v.set_value(Scalar::from(-12345)).unwrap();
        assert_eq!(v.int64().unwrap(), -12345);
        assert_eq!(v.int32().unwrap(), -12345);
        assert_eq!(v.string(), "-12345");
        assert_eq!(v.bytes(), (-12345i32).to_be_bytes().to_vec());
        assert_eq!(v.int8().unwrap_err().code(), 57);
    }

    #[test]
    fn test_unsigned_limits() {
        let mut v = value(FieldKind::UByte, Platform::default());
        v.set_value(Scalar::from(255u32)).unwrap();
        assert_eq!(v.uint8().unwrap(), 255);
        assert_eq!(v.set_value(Scalar::from(256)).unwrap_err().code(), 57);
        assert_eq!(v.set_value(Scalar::from(-1)).unwrap_err().code(), 101);
        // Failed setters leave the old value in place.
        assert_eq!(v.uint64().unwrap(), 255);
    }

    #[test]
    fn test_uint8_full_range() {
        let mut v = value(FieldKind::UInt8, Platform::default());
        v.set_value(Scalar::from(u64::MAX)).unwrap();
        assert_eq!(v.uint64().unwrap(), u64::MAX);
        assert_eq!(v.int64().unwrap_err().code(), 57);
    }

    #[test]
    fn test_set_string() {
        let mut v = value(FieldKind::Int2, Platform::default());
        v.set_string("  -300 ").unwrap();
        assert_eq!(v.int64().unwrap(), -300);
        assert_eq!(v.set_string("abc").unwrap_err().code(), 103);
        assert_eq!(v.set_string("40000").unwrap_err().code(), 57);
    }

    #[test]
    fn test_set_bytes_platform_order() {
        let mut big = value(FieldKind::UInt4, Platform::default());
        big.set_value(Scalar::Bytes(vec![0x01, 0x02])).unwrap();
        assert_eq!(big.uint64().unwrap(), 0x0102);

        let mut little = value(FieldKind::UInt4, Platform::new(ARCH_OPEN_LOW));
        little.set_value(Scalar::Bytes(vec![0x01, 0x02])).unwrap();
        assert_eq!(little.uint64().unwrap(), 0x0201);
        assert_eq!(little.bytes(), vec![0x01, 0x02, 0, 0]);

        let err = big.set_value(Scalar::Bytes(vec![0; 5])).unwrap_err();
        assert_eq!(err.code(), 59);
    }

    #[test]
    fn test_store_and_parse_little_endian() {
        let mut v = value(FieldKind::Int8, Platform::default());
        v.set_value(Scalar::from(123)).unwrap();
        let mut helper = BufferHelper::new(ByteOrder::Little);
        let mut opt = BufferOption::new(true, 0);
        v.store_buffer(&mut helper, &mut opt).unwrap();
        assert_eq!(helper.as_bytes(), &[0x7B, 0, 0, 0, 0, 0, 0, 0]);

        let mut parsed = value(FieldKind::Int8, Platform::default());
        let mut reader = BufferHelper::from_bytes(helper.as_bytes(), ByteOrder::Little);
        let mut opt = BufferOption::new(false, 0);
        parsed.parse_buffer(&mut reader, &mut opt).unwrap();
        assert_eq!(parsed.int64().unwrap(), 123);
    }

    #[test]
    fn test_parse_signed_byte() {
        let mut v = value(FieldKind::Byte, Platform::default());
        let mut reader = BufferHelper::from_bytes(&[0xFF], ByteOrder::Big);
        v.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(v.int64().unwrap(), -1);
    }

    #[test]
    fn test_format_buffer() {
        let v = value(FieldKind::UInt8, Platform::default());
        let mut out = String::from("AA,4,B");
        assert_eq!(v.format_buffer(&mut out, &BufferOption::default()), 8);
        assert_eq!(out, "AA,4,B,BI,8,B");
        let mut out = String::new();
        assert_eq!(v.format_buffer(&mut out, &BufferOption::new(false, 1)), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fractional_binary() {
        let t = Arc::new(AdaType::new(FieldKind::Int4, "FB").with_fractional(2));
        let mut v = t.new_value(&Platform::default());
        v.set_string("12.34").unwrap();
        assert_eq!(v.string(), "12.34");
        assert_eq!(v.int64().unwrap_err().code(), 112);
        assert!((v.float64().unwrap() - 12.34).abs() < 1e-9);
        v.set_value(Scalar::from(7)).unwrap();
        assert_eq!(v.int64().unwrap(), 7);
        assert_eq!(v.string(), "7.00");
    }
}
