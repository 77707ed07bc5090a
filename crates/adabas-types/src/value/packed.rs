//! Packed decimal fields, including natural date and time.

use std::sync::Arc;

use adabas_encoding::{pack_i64, packed_len_for, packed_to_i64};

use super::datetime::{date_to_string, string_to_date, string_to_time, time_to_string};
use super::{
    format_scaled, pow10, scalar_to_scaled, scaled_to_integer, to_i64, to_u64, BufferOption,
    Scalar, TraverseResult, ValueCodec, ValueMeta,
};
use crate::buffer::BufferHelper;
use crate::types::{AdaType, FieldKind};
use crate::{AdabasError, Result};

/// Packed decimal value, stored in wire layout.
#[derive(Debug, Clone)]
pub struct PackedValue {
    pub(crate) meta: ValueMeta,
    data: Vec<u8>,
}

impl PackedValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        let length = meta.ada_type.length() as usize;
        let mut data = vec![0u8; length];
        if let Some(last) = data.last_mut() {
            *last = meta.platform.packed_signs().positive;
        }
        Self { meta, data }
    }

    fn raw(&self) -> Result<i64> {
        Ok(packed_to_i64(&self.data)?)
    }

    fn encode(&self, v: i128) -> Result<Vec<u8>> {
        let length = self.meta.ada_type.length();
        let v = i64::try_from(v).map_err(|_| self.meta.out_of_range(v))?;
        let len = if length == 0 {
            packed_len_for(v)
        } else {
            let capacity = 2 * length - 1;
            if capacity < 19 && (v.unsigned_abs() as u128) >= pow10(capacity) as u128 {
                return Err(self.meta.out_of_range(v));
            }
            length as usize
        };
        pack_i64(v, len, self.meta.platform.packed_signs())
            .map_err(|_| self.meta.out_of_range(v))
    }

    fn datetime_error(&self, input: &str) -> AdabasError {
        AdabasError::InvalidDateTime {
            field: self.meta.short_name().to_string(),
            input: input.to_string(),
        }
    }

    fn parse_text(&self, text: &str) -> Result<i128> {
        let kind = self.meta.ada_type.kind();
        if kind == FieldKind::Packed {
            return super::parse_scaled(&self.meta, text);
        }
        let converted = match kind {
            FieldKind::Date => string_to_date(text),
            _ => string_to_time(text),
        };
        match converted {
            Some(v) => Ok(v as i128),
            None => text
                .trim()
                .parse::<i64>()
                .map(|v| v as i128)
                .map_err(|_| self.datetime_error(text)),
        }
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
        if packed_to_i64(input).is_err() {
            return Err(self.meta.type_mismatch(&Scalar::Bytes(input.to_vec())));
        }
        let mut data = vec![0u8; length.saturating_sub(input.len())];
        data.extend_from_slice(input);
        Ok(data)
    }
}

impl ValueCodec for PackedValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        let data = match &value {
            Scalar::Bytes(b) => self.from_bytes(b)?,
            Scalar::Str(s) => self.encode(self.parse_text(s)?)?,
            other => self.encode(scalar_to_scaled(&self.meta, other)?)?,
        };
        self.data = data;
        tracing::trace!(field = %self.meta.short_name(), bytes = ?self.data, "set packed");
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn string(&self) -> String {
        let Ok(raw) = self.raw() else {
            return String::new();
        };
        match self.meta.ada_type.kind() {
            FieldKind::Date => date_to_string(raw),
            FieldKind::Time => time_to_string(raw),
            _ => format_scaled(raw as i128, self.meta.ada_type.fractional()),
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
                helper.put_bytes(&[2, self.meta.platform.packed_signs().positive]);
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
        tracing::trace!(field = %self.meta.short_name(), offset = helper.offset(), "parsed packed");
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ByteOrder, Platform};
    use crate::value::AdaValue;

    fn value(kind: FieldKind, length: u32, platform: Platform) -> AdaValue {
        Arc::new(AdaType::new(kind, "PA").with_length(length)).new_value(&platform)
    }

    #[test]
    fn test_set_string() {
        let mut v = value(FieldKind::Packed, 4, Platform::default());
        v.set_string("234560").unwrap();
        assert_eq!(v.bytes(), vec![0x02, 0x34, 0x56, 0x0C]);
        assert_eq!(v.int64().unwrap(), 234560);
    }

    #[test]
    fn test_parse_known_bytes() {
        let mut v = value(FieldKind::Packed, 5, Platform::default());
        let mut reader = BufferHelper::from_bytes(&[0x00, 0x00, 0x24, 0x61, 0x5C], ByteOrder::Big);
        v.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(v.int64().unwrap(), 24615);
    }

    #[test]
    fn test_negative_and_signs() {
        let mut v = value(FieldKind::Packed, 4, Platform::default());
        v.set_value(Scalar::from(-10)).unwrap();
        assert_eq!(v.bytes(), vec![0x00, 0x00, 0x01, 0x0B]);

        let mut m = value(FieldKind::Packed, 4, Platform::mainframe());
        m.set_value(Scalar::from(9)).unwrap();
        assert_eq!(m.bytes(), vec![0x00, 0x00, 0x00, 0x9F]);
        m.set_value(Scalar::from(-9)).unwrap();
        assert_eq!(m.bytes(), vec![0x00, 0x00, 0x00, 0x9D]);
        assert_eq!(m.int64().unwrap(), -9);
    }

    #[test]
    fn test_range() {
        let mut v = value(FieldKind::Packed, 2, Platform::default());
        v.set_value(Scalar::from(999)).unwrap();
        let err = v.set_value(Scalar::from(1000)).unwrap_err();
        assert_eq!(err.code(), 57);
        assert_eq!(v.int64().unwrap(), 999);
    }

    #[test]
    fn test_fractional() {
        let t = Arc::new(
            AdaType::new(FieldKind::Packed, "PF")
                .with_length(4)
                .with_fractional(2),
        );
        let mut v = t.new_value(&Platform::default());
        v.set_string("123.45").unwrap();
        assert_eq!(v.bytes(), vec![0x00, 0x12, 0x34, 0x5C]);
        assert_eq!(v.string(), "123.45");
        assert_eq!(v.int64().unwrap_err().code(), 112);
        v.set_string("12").unwrap();
        assert_eq!(v.int64().unwrap(), 12);
    }

    #[test]
    fn test_variable() {
        let mut v = value(FieldKind::Packed, 0, Platform::default());
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.as_bytes(), &[2, 0x0C]);

        v.set_value(Scalar::from(12345)).unwrap();
        assert_eq!(v.bytes(), vec![0x12, 0x34, 0x5C]);
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.as_bytes(), &[4, 0x12, 0x34, 0x5C]);

        let mut parsed = value(FieldKind::Packed, 0, Platform::default());
        let mut reader = BufferHelper::from_bytes(helper.as_bytes(), ByteOrder::Big);
        parsed.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(parsed.int64().unwrap(), 12345);

        let mut out = String::new();
        assert_eq!(parsed.format_buffer(&mut out, &BufferOption::default()), 15);
        assert_eq!(out, "PA,0,P");
    }

    #[test]
    fn test_date() {
        let mut v = value(FieldKind::Date, 10, Platform::default());
        v.set_value(Scalar::from(712981)).unwrap();
        assert_eq!(v.string(), "1952/01/30");
        v.set_string("2019/10/30").unwrap();
        assert_eq!(v.int64().unwrap(), 737726);
        assert_eq!(v.set_string("2019-10-30").unwrap_err().code(), 106);
    }

    #[test]
    fn test_time() {
        let mut v = value(FieldKind::Time, 7, Platform::default());
        v.set_value(Scalar::from(635812935348i64)).unwrap();
        assert_eq!(v.string(), "2014/10/24 14:25:34.8");
        v.set_string("2014/10/24 14:25:34.8").unwrap();
        assert_eq!(v.int64().unwrap(), 635812935348);
    }

    #[test]
    fn test_set_bytes() {
        let mut v = value(FieldKind::Packed, 4, Platform::default());
        v.set_value(Scalar::Bytes(vec![0x12, 0x3D])).unwrap();
        assert_eq!(v.bytes(), vec![0, 0, 0x12, 0x3D]);
        assert_eq!(v.int64().unwrap(), -123);
        assert_eq!(v.set_value(Scalar::Bytes(vec![0xFF, 0x0C])).unwrap_err().code(), 103);
        assert_eq!(v.set_value(Scalar::Bytes(vec![0; 5])).unwrap_err().code(), 59);
    }
}
