//! Super- and sub-descriptor values.

use std::sync::Arc;

use super::{AdaValue, BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::types::AdaType;
use crate::{AdabasError, Result};

/// Concatenated parent byte ranges.
///
/// Values only come from parsed records, from [`SuperDescValue::compose`],
/// or from a search operand.
#[derive(Debug, Clone)]
pub struct SuperDescValue {
    pub(crate) meta: ValueMeta,
    data: Vec<u8>,
}

impl SuperDescValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        Self {
            meta,
            data: Vec::new(),
        }
    }

    /// Raw operand bytes for a search.
    pub(crate) fn set_operand(&mut self, value: Scalar) -> Result<()> {
        self.data = match value {
            Scalar::Str(s) => s.into_bytes(),
            Scalar::Bytes(b) => b,
            Scalar::Int(v) => v.to_string().into_bytes(),
            Scalar::UInt(v) => v.to_string().into_bytes(),
            Scalar::Float(v) => v.to_string().into_bytes(),
        };
        Ok(())
    }

    /// Build the descriptor bytes from parent values found by `lookup`.
    pub fn compose<'a, F>(&self, lookup: F) -> Result<Vec<u8>>
    where
        F: Fn(&str) -> Option<&'a AdaValue>,
    {
        let mut out = Vec::with_capacity(self.meta.ada_type.length() as usize);
        for entry in self.meta.ada_type.super_entries() {
            let parent = lookup(&entry.parent).ok_or_else(|| AdabasError::FieldNotFound {
                name: entry.parent.clone(),
            })?;
            if parent.ada_type().is_variable() {
                return Err(AdabasError::VariableSuperParent {
                    descriptor: self.meta.short_name().to_string(),
                    parent: entry.parent.clone(),
                });
            }
            let bytes = parent.bytes();
            if entry.from == 0 || entry.from > entry.to || bytes.len() < entry.to as usize {
                return Err(AdabasError::ShortBuffer {
                    requested: entry.to as usize,
                    remaining: bytes.len(),
                });
            }
            out.extend_from_slice(&bytes[entry.from as usize - 1..entry.to as usize]);
        }
        Ok(out)
    }

    pub(crate) fn assign_derived(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    fn read_only(&self) -> AdabasError {
        AdabasError::ReadOnly {
            field: self.meta.short_name().to_string(),
        }
    }
}

impl ValueCodec for SuperDescValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, _value: Scalar) -> Result<()> {
        Err(self.read_only())
    }

    fn set_string(&mut self, _value: &str) -> Result<()> {
        Err(self.read_only())
    }

    fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn string(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    fn int64(&self) -> Result<i64> {
        Err(self.meta.not_numeric("i64"))
    }

    fn uint64(&self) -> Result<u64> {
        Err(self.meta.not_numeric("u64"))
    }

    fn float64(&self) -> Result<f64> {
        Err(self.meta.not_numeric("f64"))
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        self.meta.common_format(out, opt)
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        if !opt.is_second_call() {
            helper.put_bytes(&self.data);
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
        self.data = helper.receive_bytes(self.meta.ada_type.length() as usize)?;
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ByteOrder, Platform};
    use crate::types::{FieldKind, SuperEntry};

    fn parents() -> Vec<AdaValue> {
        let platform = Platform::default();
        let mut aa = Arc::new(AdaType::new(FieldKind::Alpha, "AA").with_length(4))
            .new_value(&platform);
        aa.set_string("ABCD").unwrap();
        let mut ab = Arc::new(AdaType::new(FieldKind::UInt2, "AB")).new_value(&platform);
        ab.set_value(Scalar::from(0x0102)).unwrap();
        let av = Arc::new(AdaType::new(FieldKind::Alpha, "AV").with_length(0)).new_value(&platform);
        vec![aa, ab, av]
    }

    fn superdesc(entries: Vec<SuperEntry>) -> SuperDescValue {
        let t = Arc::new(AdaType::super_descriptor("S1", entries));
        SuperDescValue::new(ValueMeta::new(&t, &Platform::default()))
    }

    #[test]
    fn test_compose() {
        let values = parents();
        let s = superdesc(vec![SuperEntry::new("AA", 2, 3), SuperEntry::new("AB", 1, 2)]);
        let bytes = s
            .compose(|n| values.iter().find(|v| v.short_name() == n))
            .unwrap();
        let number = match Platform::default().byte_order() {
            ByteOrder::Big => [1, 2],
            ByteOrder::Little => [2, 1],
        };
        assert_eq!(bytes, vec![b'B', b'C', number[0], number[1]]);
    }

    #[test]
    fn test_compose_errors() {
        let values = parents();
        let lookup = |n: &str| values.iter().find(|v| v.short_name() == n);
        let s = superdesc(vec![SuperEntry::new("AV", 1, 2)]);
        assert_eq!(s.compose(lookup).unwrap_err().code(), 172);
        let s = superdesc(vec![SuperEntry::new("AA", 1, 6)]);
        assert_eq!(s.compose(lookup).unwrap_err().code(), 38);
        let s = superdesc(vec![SuperEntry::new("AA", 3, 1)]);
        assert_eq!(s.compose(lookup).unwrap_err().code(), 38);
        let s = superdesc(vec![SuperEntry::new("AA", 0, 2)]);
        assert_eq!(s.compose(lookup).unwrap_err().code(), 38);
        let s = superdesc(vec![SuperEntry::new("ZZ", 1, 1)]);
        assert_eq!(s.compose(lookup).unwrap_err().code(), 42);
    }

    #[test]
    fn test_read_only() {
        let mut s = superdesc(vec![SuperEntry::new("AA", 1, 2)]);
        assert_eq!(s.set_value(Scalar::from(1)).unwrap_err().code(), 37);
        assert_eq!(s.set_string("AB").unwrap_err().code(), 37);
        s.set_operand(Scalar::from("AB")).unwrap();
        assert_eq!(s.bytes(), b"AB".to_vec());
        assert_eq!(s.int64().unwrap_err().code(), 105);
    }

    #[test]
    fn test_parse_and_format() {
        let mut s = superdesc(vec![SuperEntry::new("AA", 1, 3)]);
        let mut out = String::new();
        assert_eq!(s.format_buffer(&mut out, &BufferOption::default()), 3);
        assert_eq!(out, "S1,3,A");
        let mut reader = BufferHelper::from_bytes(b"XYZ", ByteOrder::Big);
        s.parse_buffer(&mut reader, &mut BufferOption::default()).unwrap();
        assert_eq!(s.string(), "XYZ");
    }
}
