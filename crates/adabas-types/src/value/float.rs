//! IEEE floating point fields (`G`, length 4 or 8).

use std::sync::Arc;

use super::{BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::platform::ByteOrder;
use crate::types::{AdaType, FieldKind};
use crate::{AdabasError, Result};

/// Float or double value.
#[derive(Debug, Clone)]
pub struct FloatValue {
    pub(crate) meta: ValueMeta,
    value: f64,
}

impl FloatValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        Self { meta, value: 0.0 }
    }

    fn is_single(&self) -> bool {
        self.meta.ada_type.kind() == FieldKind::Float
    }

    fn width(&self) -> usize {
        if self.is_single() {
            4
        } else {
            8
        }
    }

    fn from_bytes(&self, data: &[u8]) -> Result<f64> {
        let width = self.width();
        if data.len() != width {
            return Err(AdabasError::BytesTooLong {
                field: self.meta.short_name().to_string(),
                actual: data.len(),
                length: width as u32,
            });
        }
        let little = self.meta.platform.byte_order() == ByteOrder::Little;
        let mut raw = data.to_vec();
        if little {
            raw.reverse();
        }
        Ok(if width == 4 {
            let mut b = [0u8; 4];
            b.copy_from_slice(&raw);
            f32::from_be_bytes(b) as f64
        } else {
            let mut b = [0u8; 8];
            b.copy_from_slice(&raw);
            f64::from_be_bytes(b)
        })
    }

    fn integral(&self, target: &'static str) -> Result<i128> {
        if self.value.fract() != 0.0 {
            return Err(AdabasError::FractionalInteger {
                field: self.meta.short_name().to_string(),
            });
        }
        if !self.value.is_finite() {
            return Err(self.meta.not_numeric(target));
        }
        Ok(self.value as i128)
    }
}

impl ValueCodec for FloatValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        let v = match &value {
            Scalar::Int(v) => *v as f64,
            Scalar::UInt(v) => *v as f64,
            Scalar::Float(v) => *v,
            Scalar::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| self.meta.type_mismatch(&value))?,
            Scalar::Bytes(b) => self.from_bytes(b)?,
        };
        if self.is_single() && v.is_finite() && v.abs() > f32::MAX as f64 {
            return Err(self.meta.out_of_range(v));
        }
        self.value = v;
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        let mut out = if self.is_single() {
            (self.value as f32).to_be_bytes().to_vec()
        } else {
            self.value.to_be_bytes().to_vec()
        };
        if self.meta.platform.byte_order() == ByteOrder::Little {
            out.reverse();
        }
        out
    }

    fn string(&self) -> String {
        if self.is_single() {
            (self.value as f32).to_string()
        } else {
            self.value.to_string()
        }
    }

    fn int64(&self) -> Result<i64> {
        let v = self.integral("i64")?;
        i64::try_from(v).map_err(|_| self.meta.out_of_range(v))
    }

    fn uint64(&self) -> Result<u64> {
        let v = self.integral("u64")?;
        u64::try_from(v).map_err(|_| self.meta.out_of_range(v))
    }

    fn float64(&self) -> Result<f64> {
        Ok(self.value)
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        self.meta.common_format(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if opt.is_second_call() {
            return Ok(());
        }
        if self.is_single() {
            helper.put_f32(self.value as f32);
        } else {
            helper.put_f64(self.value);
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
        self.value = if self.is_single() {
            helper.receive_f32()? as f64
        } else {
            helper.receive_f64()?
        };
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Platform, ARCH_OPEN_LOW};
    use crate::value::AdaValue;

    fn value(kind: FieldKind, platform: Platform) -> AdaValue {
        Arc::new(AdaType::new(kind, "FL")).new_value(&platform)
    }

    #[test]
    fn test_double() {
        let mut v = value(FieldKind::Double, Platform::default());
        v.set_string("21.5").unwrap();
        assert_eq!(v.float64().unwrap(), 21.5);
        assert_eq!(v.bytes(), 21.5f64.to_be_bytes().to_vec());
        assert_eq!(v.int64().unwrap_err().code(), 112);
        v.set_value(Scalar::from(4)).unwrap();
        assert_eq!(v.int64().unwrap(), 4);
    }

    #[test]
    fn test_float_bytes_little_endian() {
        let mut v = value(FieldKind::Float, Platform::new(ARCH_OPEN_LOW));
        v.set_value(Scalar::Bytes(1.25f32.to_le_bytes().to_vec())).unwrap();
        assert_eq!(v.float64().unwrap(), 1.25);
        assert_eq!(v.set_value(Scalar::Bytes(vec![0; 8])).unwrap_err().code(), 59);
    }

    #[test]
    fn test_float_range() {
        let mut v = value(FieldKind::Float, Platform::default());
        assert_eq!(v.set_value(Scalar::from(1e300)).unwrap_err().code(), 57);
        assert_eq!(v.set_string("x").unwrap_err().code(), 103);
    }

    #[test]
    fn test_store_parse() {
        let mut v = value(FieldKind::Float, Platform::default());
        v.set_value(Scalar::from(-0.5)).unwrap();
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.len(), 4);
        let mut parsed = value(FieldKind::Float, Platform::default());
        let mut reader = BufferHelper::from_bytes(helper.as_bytes(), ByteOrder::Big);
        parsed.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(parsed.float64().unwrap(), -0.5);
    }
}
