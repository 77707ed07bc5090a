//! Unpacked (zoned) decimal fields.

use std::sync::Arc;

use adabas_encoding::{unzone_i64, zone_i64, zoned_len_for};

use super::{
    format_scaled, parse_scaled, pow10, scalar_to_scaled, scaled_to_integer, to_i64, to_u64,
    BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta,
};
use crate::buffer::BufferHelper;
use crate::types::AdaType;
use crate::{AdabasError, Result};

/// Unpacked decimal value, stored in wire layout.
#[derive(Debug, Clone)]
pub struct UnpackedValue {
    pub(crate) meta: ValueMeta,
    data: Vec<u8>,
}

impl UnpackedValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        let zero = meta.platform.zoned_signs().zone << 4;
        let data = vec![zero; meta.ada_type.length() as usize];
        Self { meta, data }
    }

    fn zero_digit(&self) -> u8 {
        self.meta.platform.zoned_signs().zone << 4
    }

    fn raw(&self) -> Result<i64> {
        Ok(unzone_i64(&self.data, self.meta.platform.zoned_signs())?)
    }

    fn encode(&self, v: i128) -> Result<Vec<u8>> {
        let length = self.meta.ada_type.length();
        let v = i64::try_from(v).map_err(|_| self.meta.out_of_range(v))?;
        let len = if length == 0 {
            zoned_len_for(v)
        } else {
            if length < 19 && (v.unsigned_abs() as u128) >= pow10(length) as u128 {
                return Err(self.meta.out_of_range(v));
            }
            length as usize
        };
        zone_i64(v, len, self.meta.platform.zoned_signs()).map_err(|_| self.meta.out_of_range(v))
    }

    fn from_bytes(&self, input: &[u8]) -> Result<Vec<u8>> {
        let length = self.meta.ada_type.length() as usize;
        if length > 0 && input.len() > length {
            return Err(AdabasError::BytesTooLong {
                field: self.meta.short_name().to_string(),
                actual: input.len(),
                length: length as u32,
            });
        }
        if unzone_i64(input, self.meta.platform.zoned_signs()).is_err() {
            return Err(self.meta.type_mismatch(&Scalar::Bytes(input.to_vec())));
        }
        let mut data = vec![self.zero_digit(); length.saturating_sub(input.len())];
        data.extend_from_slice(input);
        Ok(data)
    }
}

impl ValueCodec for UnpackedValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        let data = match &value {
            Scalar::Bytes(b) => self.from_bytes(b)?,
            Scalar::Str(s) => self.encode(parse_scaled(&self.meta, s)?)?,
            other => self.encode(scalar_to_scaled(&self.meta, other)?)?,
        };
        self.data = data;
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn string(&self) -> String {
        match self.raw() {
            Ok(raw) => format_scaled(raw as i128, self.meta.ada_type.fractional()),
            Err(_) => String::new(),
        }
    }

    fn int64(&self) -> Result<i64> {
        to_i64(&self.meta, scaled_to_integer(&self.meta, self.raw()? as i128)?)
    }

    fn uint64(&self) -> Result<u64> {
        to_u64(&self.meta, scaled_to_integer(&self.meta, self.raw()? as i128)?)
    }

    fn float64(&self) -> Result<f64> {
        Ok(self.raw()? as f64 / pow10(self.meta.ada_type.fractional()) as f64)
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        self.meta.common_format(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if opt.is_second_call() {
            return Ok(());
        }
        if self.meta.ada_type.is_variable() {
            if self.data.is_empty() {
                helper.put_bytes(&[2, self.zero_digit()]);
                return Ok(());
            }
            helper.put_u8(self.data.len() as u8 + 1);
        }
        helper.put_bytes(&self.data);
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
        let length = match self.meta.ada_type.length() {
            0 => helper.receive_u8()?.saturating_sub(1) as usize,
            n => n as usize,
        };
        self.data = helper.receive_bytes(length)?;
        tracing::trace!(field = %self.meta.short_name(), offset = helper.offset(), "parsed unpacked");
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ByteOrder, Platform};
    use crate::types::FieldKind;
    use crate::value::AdaValue;

    fn value(length: u32, platform: Platform) -> AdaValue {
        Arc::new(AdaType::new(FieldKind::Unpacked, "UN").with_length(length)).new_value(&platform)
    }

    #[test]
    fn test_open_system() {
        let mut v = value(4, Platform::default());
        assert_eq!(v.bytes(), vec![0x30; 4]);
        v.set_value(Scalar::from(123)).unwrap();
        assert_eq!(v.bytes(), vec![0x30, 0x31, 0x32, 0x33]);
        v.set_value(Scalar::from(-123)).unwrap();
        assert_eq!(v.bytes(), vec![0x30, 0x31, 0x32, 0x73]);
        assert_eq!(v.int64().unwrap(), -123);
        assert_eq!(v.string(), "-123");
    }

    #[test]
    fn test_mainframe() {
        let mut v = value(3, Platform::mainframe());
        v.set_string("-45").unwrap();
        assert_eq!(v.bytes(), vec![0xF0, 0xF4, 0xD5]);
        assert_eq!(v.int64().unwrap(), -45);
    }

    #[test]
    fn test_limits() {
        let mut v = value(2, Platform::default());
        v.set_value(Scalar::from(99)).unwrap();
        assert_eq!(v.set_value(Scalar::from(100)).unwrap_err().code(), 57);
        assert_eq!(v.set_value(Scalar::Bytes(vec![0x31; 3])).unwrap_err().code(), 59);
        assert_eq!(v.int64().unwrap(), 99);
        v.set_value(Scalar::Bytes(vec![0x37])).unwrap();
        assert_eq!(v.bytes(), vec![0x30, 0x37]);
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for platform in [Platform::default(), Platform::mainframe()] {
            for len in 1..=18u32 {
                let max = 10i64.pow(len) - 1;
                for n in [0, 1, -1, max, -max, max / 7] {
                    let mut v = value(len, platform);
                    v.set_value(Scalar::from(n)).unwrap();
                    let mut helper = BufferHelper::new(ByteOrder::Big);
                    v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
                    assert_eq!(helper.len(), len as usize);

                    let mut parsed = value(len, platform);
                    let mut reader = BufferHelper::from_bytes(helper.as_bytes(), ByteOrder::Big);
                    parsed.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
                    assert_eq!(parsed.int64().unwrap(), n, "len {len} value {n}");
                }
                let mut v = value(len, platform);
                let err = v.set_value(Scalar::from(max + 1)).unwrap_err();
                assert_eq!(err.code(), 57, "len {len}");
                let err = v.set_value(Scalar::from(-max - 1)).unwrap_err();
                assert_eq!(err.code(), 57, "len {len}");
            }
        }
    }

    #[test]
    fn test_variable() {
        let mut v = value(0, Platform::default());
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.as_bytes(), &[2, 0x30]);

        v.set_value(Scalar::from(42)).unwrap();
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.as_bytes(), &[3, 0x34, 0x32]);

        let mut out = String::new();
        assert_eq!(v.format_buffer(&mut out, &BufferOption::default()), 29);
    }
}
