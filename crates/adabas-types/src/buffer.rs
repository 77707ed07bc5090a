//! Byte cursor used for record, value and search buffers.
//!
//! The helper owns a growable [`BytesMut`]. Reads advance an offset;
//! writes append. Multi-byte integers use the byte order chosen at
//! construction.

use bytes::{Buf, BufMut, BytesMut};

use crate::platform::ByteOrder;
use crate::{AdabasError, Result};

macro_rules! receive_int {
    ($name:ident, $ty:ty, $be:ident, $le:ident) => {
        #[doc = concat!("Read a `", stringify!($ty), "` in the helper's byte order.")]
        pub fn $name(&mut self) -> Result<$ty> {
            let order = self.order;
            let mut slice = self.take(std::mem::size_of::<$ty>())?;
            Ok(match order {
                ByteOrder::Big => slice.$be(),
                ByteOrder::Little => slice.$le(),
            })
        }
    };
}

macro_rules! put_int {
    ($name:ident, $ty:ty, $be:ident, $le:ident) => {
        #[doc = concat!("Append a `", stringify!($ty), "` in the helper's byte order.")]
        pub fn $name(&mut self, value: $ty) {
            match self.order {
                ByteOrder::Big => self.buf.$be(value),
                ByteOrder::Little => self.buf.$le(value),
            }
        }
    };
}

/// Cursor over a byte buffer.
#[derive(Debug, Clone)]
pub struct BufferHelper {
    buf: BytesMut,
    offset: usize,
    order: ByteOrder,
}

impl BufferHelper {
    /// Create an empty helper for writing.
    pub fn new(order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::new(),
            offset: 0,
            order,
        }
    }

    /// Create a helper positioned at the start of `data`.
    pub fn from_bytes(data: &[u8], order: ByteOrder) -> Self {
        Self {
            buf: BytesMut::from(data),
            offset: 0,
            order,
        }
    }

    /// Byte order used for integers.
    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Current read offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the helper and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.remaining() {
            return Err(AdabasError::ShortBuffer {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let start = self.offset;
        self.offset += n;
        Ok(&self.buf[start..start + n])
    }

    /// Read `n` raw bytes.
    pub fn receive_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        self.take(n).map(<[u8]>::to_vec)
    }

    /// Skip `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Read one byte.
    pub fn receive_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read one signed byte.
    pub fn receive_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    receive_int!(receive_u16, u16, get_u16, get_u16_le);
    receive_int!(receive_u32, u32, get_u32, get_u32_le);
    receive_int!(receive_u64, u64, get_u64, get_u64_le);
    receive_int!(receive_i16, i16, get_i16, get_i16_le);
    receive_int!(receive_i32, i32, get_i32, get_i32_le);
    receive_int!(receive_i64, i64, get_i64, get_i64_le);
    receive_int!(receive_f32, f32, get_f32, get_f32_le);
    receive_int!(receive_f64, f64, get_f64, get_f64_le);

    /// Append raw bytes.
    pub fn put_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Append one byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Append one signed byte.
    pub fn put_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    put_int!(put_u16, u16, put_u16, put_u16_le);
    put_int!(put_u32, u32, put_u32, put_u32_le);
    put_int!(put_u64, u64, put_u64, put_u64_le);
    put_int!(put_i16, i16, put_i16, put_i16_le);
    put_int!(put_i32, i32, put_i32, put_i32_le);
    put_int!(put_i64, i64, put_i64, put_i64_le);
    put_int!(put_f32, f32, put_f32, put_f32_le);
    put_int!(put_f64, f64, put_f64, put_f64_le);
}
