//! Raw byte fields (`B` of a non-integer length).

use std::fmt::Write;
use std::sync::Arc;

use super::{BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::platform::ByteOrder;
use crate::types::AdaType;
use crate::{AdabasError, Result};

/// Longest payload of a variable byte field (1-byte header).
const MAX_VARIABLE: usize = 253;

/// Byte array value.
#[derive(Debug, Clone)]
pub struct ByteArrayValue {
    pub(crate) meta: ValueMeta,
    data: Vec<u8>,
}

impl ByteArrayValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        let data = vec![0u8; meta.ada_type.length() as usize];
        Self { meta, data }
    }

    fn too_long(&self, actual: usize) -> AdabasError {
        AdabasError::BytesTooLong {
            field: self.meta.short_name().to_string(),
            actual,
            length: self.meta.ada_type.length(),
        }
    }

    fn layout(&self, input: &[u8]) -> Result<Vec<u8>> {
        let length = self.meta.ada_type.length() as usize;
        if length == 0 {
            if input.len() > MAX_VARIABLE {
                return Err(self.too_long(input.len()));
            }
            return Ok(input.to_vec());
        }
        if input.len() > length {
            return Err(self.too_long(input.len()));
        }
        let mut data = vec![0u8; length];
        data[..input.len()].copy_from_slice(input);
        Ok(data)
    }

    fn layout_number(&self, v: u64, scalar: &Scalar) -> Result<Vec<u8>> {
        let length = match self.meta.ada_type.length() as usize {
            0 => 8,
            n => n,
        };
        let significant = 8 - (v.leading_zeros() / 8) as usize;
        if significant > length {
            return Err(self.meta.out_of_range(scalar_text(scalar)));
        }
        let width = length.min(8);
        let mut out = vec![0u8; length];
        let be = v.to_be_bytes();
        match self.meta.platform.byte_order() {
            ByteOrder::Big => out[length - width..].copy_from_slice(&be[8 - width..]),
            ByteOrder::Little => {
                for (i, b) in be[8 - width..].iter().rev().enumerate() {
                    out[i] = *b;
                }
            }
        }
        Ok(out)
    }

    fn as_u64(&self) -> Result<u64> {
        if self.data.len() > 8 {
            return Err(self.meta.not_numeric("u64"));
        }
        let fold = |acc: u64, b: &u8| (acc << 8) | *b as u64;
        Ok(match self.meta.platform.byte_order() {
            ByteOrder::Big => self.data.iter().fold(0, fold),
            ByteOrder::Little => self.data.iter().rev().fold(0, fold),
        })
    }
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Int(v) => v.to_string(),
        Scalar::UInt(v) => v.to_string(),
        Scalar::Str(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

/// Decode a hex digit string (without `0x`).
pub(crate) fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            let high = (pair[0] as char).to_digit(16)?;
            let low = (pair[1] as char).to_digit(16)?;
            Some((high * 16 + low) as u8)
        })
        .collect()
}

impl ValueCodec for ByteArrayValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        let data = match &value {
            Scalar::Bytes(b) => self.layout(b)?,
            Scalar::Str(s) => {
                let s = s.trim();
                if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                    let decoded = decode_hex(hex).ok_or_else(|| self.meta.type_mismatch(&value))?;
                    self.layout(&decoded)?
                } else if let Ok(n) = s.parse::<u64>() {
                    self.layout_number(n, &value)?
                } else {
                    self.layout(s.as_bytes())?
                }
            }
            Scalar::UInt(n) => self.layout_number(*n, &value)?,
            Scalar::Int(n) if *n >= 0 => self.layout_number(*n as u64, &value)?,
            other => return Err(self.meta.type_mismatch(other)),
        };
        self.data = data;
        Ok(())
    }

    fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn string(&self) -> String {
        let mut out = String::with_capacity(2 + self.data.len() * 2);
        out.push_str("0x");
        for b in &self.data {
            let _ = write!(out, "{:02x}", b);
        }
        out
    }

    fn int64(&self) -> Result<i64> {
        let v = self.as_u64()?;
        i64::try_from(v).map_err(|_| self.meta.out_of_range(v))
    }

    fn uint64(&self) -> Result<u64> {
        self.as_u64()
    }

    fn float64(&self) -> Result<f64> {
        Ok(self.as_u64()? as f64)
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        self.meta.common_format(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if opt.is_second_call() {
            return Ok(());
        }
        if self.meta.ada_type.is_variable() {
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
        tracing::trace!(field = %self.meta.short_name(), len = length, "parsed byte array");
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::types::FieldKind;
    use crate::value::AdaValue;

    fn value(length: u32) -> AdaValue {
        Arc::new(AdaType::new(FieldKind::ByteArray, "BA").with_length(length))
            .new_value(&Platform::default())
    }

    #[test]
    fn test_default_length() {
        let v = Arc::new(AdaType::new(FieldKind::ByteArray, "BA")).new_value(&Platform::default());
        assert_eq!(v.bytes().len(), 126);
    }

    #[test]
    fn test_hex_string() {
        let mut v = value(4);
        v.set_string("0x0a0B").unwrap();
        assert_eq!(v.bytes(), vec![0x0A, 0x0B, 0, 0]);
        assert_eq!(v.string(), "0x0a0b0000");
        assert_eq!(v.set_string("0x0").unwrap_err().code(), 103);
        assert_eq!(v.set_string("0x0102030405").unwrap_err().code(), 59);
    }

    #[test]
    fn test_number() {
        let mut v = value(3);
        v.set_value(Scalar::from(0x010203u32)).unwrap();
        assert_eq!(v.bytes(), vec![1, 2, 3]);
        assert_eq!(v.uint64().unwrap(), 0x010203);
        assert_eq!(v.set_value(Scalar::from(0x01020304u32)).unwrap_err().code(), 57);
        assert_eq!(v.set_value(Scalar::from(1.5)).unwrap_err().code(), 103);
    }

    #[test]
    fn test_not_numeric_when_wide() {
        let v = value(10);
        assert_eq!(v.uint64().unwrap_err().code(), 105);
    }

    #[test]
    fn test_variable_store_parse() {
        let mut v = value(0);
        v.set_value(Scalar::Bytes(vec![9, 8, 7])).unwrap();
        let mut helper = BufferHelper::new(ByteOrder::Big);
        v.store_buffer(&mut helper, &mut BufferOption::new(true, 0)).unwrap();
        assert_eq!(helper.as_bytes(), &[4, 9, 8, 7]);

        let mut parsed = value(0);
        let mut reader = BufferHelper::from_bytes(helper.as_bytes(), ByteOrder::Big);
        parsed.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(parsed.bytes(), vec![9, 8, 7]);
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("ff00"), Some(vec![0xFF, 0]));
        assert_eq!(decode_hex("f"), None);
        assert_eq!(decode_hex("zz"), None);
    }
}
