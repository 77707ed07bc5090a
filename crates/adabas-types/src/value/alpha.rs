//! Alphanumeric and unicode fields, including large objects.
//!
//! Fixed fields are padded to their declared length. Variable fields carry
//! a length header of 1, 2 or 4 bytes (A, LA, LB), counting the header
//! itself. LB fields of length 0 are LOBs and move in chunks:
//!
//! - read: `<S>L,4,<S>(1,partial)` fetches the size and a leading part; a
//!   follow-up call fetches `<S>(partial+1,rest)`
//! - store: payloads above the chunk size go out as `<S>(start,chunk)`
//!   pieces, one per call

use std::sync::Arc;

use adabas_encoding::Charset;

use super::{push_separator, BufferOption, Scalar, SecondCall, TraverseResult, ValueCodec, ValueMeta};
use crate::buffer::BufferHelper;
use crate::types::{AdaType, FieldKind};
use crate::{AdabasError, Result};

/// Text value of kind A, LA, LB, W, LA-W or LB-W.
#[derive(Debug, Clone)]
pub struct StringValue {
    pub(crate) meta: ValueMeta,
    data: Vec<u8>,
    lob_size: u32,
}

impl StringValue {
    pub(crate) fn new(meta: ValueMeta) -> Self {
        let mut value = Self {
            meta,
            data: Vec::new(),
            lob_size: 0,
        };
        value.data = vec![value.pad_byte(); value.meta.ada_type.length() as usize];
        value
    }

    fn is_unicode(&self) -> bool {
        matches!(
            self.meta.ada_type.kind(),
            FieldKind::Unicode | FieldKind::LaUnicode | FieldKind::LbUnicode
        )
    }

    fn charset(&self) -> Option<Charset> {
        if self.is_unicode() {
            return None;
        }
        self.meta.ada_type.charset().or(self.meta.platform.charset())
    }

    fn pad_byte(&self) -> u8 {
        match self.charset() {
            Some(cs) if cs.is_ebcdic() => 0x40,
            _ if self.is_unicode() => b' ',
            _ => self.meta.platform.space(),
        }
    }

    fn max_variable(&self) -> usize {
        match self.meta.ada_type.kind().length_header() {
            1 => 253,
            2 => u16::MAX as usize - 2,
            _ => u32::MAX as usize - 4,
        }
    }

    fn layout(&self, payload: Vec<u8>) -> Result<Vec<u8>> {
        let t = &self.meta.ada_type;
        if t.partial().is_some() {
            return Ok(payload);
        }
        let (limit, pad) = match t.length() {
            0 => (self.max_variable(), false),
            n => (n as usize, true),
        };
        if payload.len() > limit {
            return Err(AdabasError::Truncation {
                field: self.meta.short_name().to_string(),
                actual: payload.len(),
                length: limit as u32,
            });
        }
        let mut data = payload;
        if pad {
            data.resize(limit, self.pad_byte());
        }
        Ok(data)
    }

    fn assign(&mut self, payload: Vec<u8>) -> Result<()> {
        let data = self.layout(payload)?;
        self.lob_size = data.len() as u32;
        self.data = data;
        Ok(())
    }

    /// Total LOB size reported by the last read or set by the last assignment.
    pub fn lob_size(&self) -> u32 {
        self.lob_size
    }

    /// Whether a LOB read still misses bytes.
    pub fn is_incomplete(&self) -> bool {
        self.meta.ada_type.is_lob() && (self.data.len() as u32) < self.lob_size
    }

    fn format_lob_store(&self, out: &mut String, opt: &BufferOption) -> u32 {
        let len = self.data.len() as u32;
        let chunk = opt.lob_chunk_size.max(1);
        if len <= chunk {
            if opt.is_second_call() {
                return 0;
            }
            self.meta.push_token(out);
            return len + 4;
        }
        let start = opt.second_call * chunk + 1;
        if start > len {
            return 0;
        }
        let part = chunk.min(len - start + 1);
        self.meta.push_partial(out, start, part);
        part
    }

    fn store_lob_chunk(&self, helper: &mut BufferHelper, opt: &mut BufferOption) {
        let len = self.data.len();
        let chunk = opt.lob_chunk_size.max(1) as usize;
        let start = opt.second_call as usize * chunk;
        if start >= len {
            return;
        }
        let end = (start + chunk).min(len);
        helper.put_bytes(&self.data[start..end]);
        if end < len {
            opt.need_second_call = SecondCall::Store;
        }
        tracing::debug!(
            field = %self.meta.short_name(),
            call = opt.second_call,
            from = start + 1,
            to = end,
            total = len,
            "stored LOB chunk"
        );
    }
}

impl ValueCodec for StringValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        &self.meta.ada_type
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        match value {
            Scalar::Str(s) => self.set_string(&s),
            Scalar::Bytes(b) => self.assign(b),
            Scalar::Int(v) => self.set_string(&v.to_string()),
            Scalar::UInt(v) => self.set_string(&v.to_string()),
            Scalar::Float(v) => self.set_string(&v.to_string()),
        }
    }

    fn set_string(&mut self, value: &str) -> Result<()> {
        let payload = match self.charset() {
            Some(cs) => cs.encode(value)?,
            None => value.as_bytes().to_vec(),
        };
        self.assign(payload)
    }

    fn bytes(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn string(&self) -> String {
        match self.charset() {
            Some(cs) => cs
                .decode(&self.data)
                .unwrap_or_else(|_| String::from_utf8_lossy(&self.data).into_owned()),
            None => String::from_utf8_lossy(&self.data).into_owned(),
        }
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
        let t = &self.meta.ada_type;
        if let Some(range) = t.partial() {
            if opt.is_second_call() {
                return 0;
            }
            self.meta.push_partial(out, range.from, range.len());
            return range.len();
        }
        if !t.is_lob() {
            return self.meta.common_format(out, opt);
        }
        if opt.store_call {
            return self.format_lob_store(out, opt);
        }
        if opt.is_second_call() {
            let have = self.data.len() as u32;
            if self.lob_size <= have {
                return 0;
            }
            let rest = self.lob_size - have;
            self.meta.push_partial(out, have + 1, rest);
            return rest;
        }
        let name = self.meta.short_name();
        push_separator(out);
        out.push_str(&format!(
            "{}L,4,{}(1,{})",
            name, name, opt.partial_lob_size
        ));
        4 + opt.partial_lob_size
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        let t = &self.meta.ada_type;
        if let Some(range) = t.partial() {
            if opt.is_second_call() {
                return Ok(());
            }
            if self.data.len() != range.len() as usize {
                return Err(AdabasError::PartialRangeMismatch {
                    field: self.meta.short_name().to_string(),
                    expected: range.len(),
                    actual: self.data.len(),
                });
            }
            helper.put_bytes(&self.data);
            return Ok(());
        }
        if t.is_lob() && self.data.len() > opt.lob_chunk_size.max(1) as usize {
            self.store_lob_chunk(helper, opt);
            return Ok(());
        }
        if opt.is_second_call() {
            return Ok(());
        }

        let payload: &[u8] = if self.data.is_empty() {
            &[b' ']
        } else {
            &self.data
        };
        if t.is_variable() {
            let len = payload.len();
            match t.kind().length_header() {
                1 => helper.put_u8(len as u8 + 1),
                2 => helper.put_u16(len as u16 + 2),
                _ => helper.put_u32(len as u32 + 4),
            }
        }
        helper.put_bytes(payload);
        Ok(())
    }

    fn parse_buffer(
        &mut self,
        helper: &mut BufferHelper,
        opt: &mut BufferOption,
    ) -> Result<TraverseResult> {
        let t = Arc::clone(&self.meta.ada_type);
        if opt.is_second_call() {
            if !self.is_incomplete() {
                return Ok(TraverseResult::SkipTree);
            }
            let needed = self.lob_size as usize - self.data.len();
            let take = needed.min(helper.remaining());
            let rest = helper.receive_bytes(take)?;
            self.data.extend_from_slice(&rest);
            if self.data.len() != self.lob_size as usize {
                return Err(AdabasError::LobLengthMismatch {
                    field: self.meta.short_name().to_string(),
                    expected: self.lob_size as u64,
                    actual: self.data.len() as u64,
                });
            }
            tracing::debug!(field = %self.meta.short_name(), size = self.lob_size, "LOB complete");
            return Ok(TraverseResult::Continue);
        }

        if let Some(range) = t.partial() {
            self.data = helper.receive_bytes(range.len() as usize)?;
            return Ok(TraverseResult::Continue);
        }

        if t.is_lob() {
            self.lob_size = helper.receive_u32()?;
            let mut data = helper.receive_bytes(opt.partial_lob_size as usize)?;
            if self.lob_size as usize <= data.len() {
                data.truncate(self.lob_size as usize);
            } else {
                tracing::debug!(
                    field = %self.meta.short_name(),
                    size = self.lob_size,
                    partial = opt.partial_lob_size,
                    "LOB needs second read call"
                );
                opt.need_second_call = SecondCall::Read;
            }
            self.data = data;
            return Ok(TraverseResult::Continue);
        }

        let length = match t.length() {
            0 => match t.kind().length_header() {
                1 => helper.receive_u8()?.saturating_sub(1) as usize,
                2 => helper.receive_u16()?.saturating_sub(2) as usize,
                _ => helper.receive_u32()?.saturating_sub(4) as usize,
            },
            n => n as usize,
        };
        self.data = helper.receive_bytes(length)?;
        self.lob_size = self.data.len() as u32;
        tracing::trace!(field = %self.meta.short_name(), len = length, offset = helper.offset(), "parsed string");
        Ok(TraverseResult::Continue)
    }
}
