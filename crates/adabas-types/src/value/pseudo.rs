//! Phonetic, collation, hyper-exit and referential fields.
//!
//! These exist so a schema can be described completely. They hold no data
//! and take no part in record buffers.

use std::sync::Arc;

use super::{BufferOption, Scalar, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::types::AdaType;
use crate::{AdabasError, Result};

/// Placeholder value of a pseudo field.
#[derive(Debug, Clone)]
pub struct PseudoValue {
    pub(crate) meta: ValueMeta,
}

impl PseudoValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        Self { meta }
    }

    fn read_only(&self) -> AdabasError {
        AdabasError::ReadOnly {
            field: self.meta.short_name().to_string(),
        }
    }
}

impl ValueCodec for PseudoValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, _value: Scalar) -> Result<()> {
        Err(self.read_only())
    }

    fn bytes(&self) -> Vec<u8> {
        Vec::new()
    }

    fn string(&self) -> String {
        String::new()
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

    fn format_buffer(&self, _out: &mut String, _opt: &BufferOption) -> u32 {
        0
    }

    fn store_buffer(&self, _helper: &mut BufferHelper, _opt: &mut BufferOption) -> Result<()> {
        Err(self.read_only())
    }

    fn parse_buffer(
        &mut self,
        _helper: &mut BufferHelper,
        _opt: &mut BufferOption,
    ) -> Result<TraverseResult> {
        Ok(TraverseResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ByteOrder, Platform};
    use crate::types::FieldKind;

    #[test]
    fn test_pseudo_is_inert() {
        for kind in [
            FieldKind::Phonetic,
            FieldKind::Collation,
            FieldKind::HyperExit,
            FieldKind::Referential,
        ] {
            let mut v = Arc::new(AdaType::new(kind, "PH")).new_value(&Platform::default());
            assert_eq!(v.set_string("x").unwrap_err().code(), 37);
            assert!(v.ada_type().is_read_only());

            let mut out = String::new();
            assert_eq!(v.format_buffer(&mut out, &BufferOption::default()), 0);
            assert!(out.is_empty());

            let mut helper = BufferHelper::new(ByteOrder::Big);
            let err = v.store_buffer(&mut helper, &mut BufferOption::new(true, 0));
            assert_eq!(err.unwrap_err().code(), 37);
            assert!(helper.is_empty());
            assert_eq!(v.int64().unwrap_err().code(), 105);
        }
    }
}
