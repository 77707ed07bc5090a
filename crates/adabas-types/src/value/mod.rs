//! Field values and the buffer protocol.
//!
//! Every field kind has a concrete value type implementing [`ValueCodec`].
//! [`AdaValue`] is the tagged sum of them and forwards each operation to
//! the active variant.
//!
//! # Buffer protocol
//!
//! - `format_buffer` appends the field's format token and returns the
//!   record buffer bytes it occupies
//! - `store_buffer` writes wire bytes for a store request
//! - `parse_buffer` reads wire bytes of a read request
//!
//! A non-zero [`BufferOption::second_call`] marks a follow-up call; only
//! LOB fields take part in those.

mod alpha;
mod binary;
mod bytearray;
mod datetime;
mod float;
mod packed;
mod pseudo;
mod structure;
mod superdesc;
mod unpacked;

pub use alpha::StringValue;
pub use binary::BinaryValue;
pub use bytearray::ByteArrayValue;
pub(crate) use bytearray::decode_hex;
pub use datetime::{date_to_string, string_to_date, string_to_time, time_to_string};
pub use float::FloatValue;
pub use packed::PackedValue;
pub use pseudo::PseudoValue;
pub use structure::StructureValue;
pub use superdesc::SuperDescValue;
pub use unpacked::UnpackedValue;

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::buffer::BufferHelper;
use crate::platform::Platform;
use crate::types::{AdaType, FieldKind};
use crate::{AdabasError, Result};

// ── Buffer options ─────────────────────────────────────────────────

/// Whether a request needs a follow-up call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecondCall {
    /// Request complete.
    #[default]
    None,
    /// A LOB read needs the remaining bytes.
    Read,
    /// A LOB store needs further chunks.
    Store,
}

/// Outcome of parsing one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraverseResult {
    /// Continue with the next value.
    Continue,
    /// Value took no part in this call.
    SkipTree,
}

/// Per-request options threaded through the buffer protocol.
#[derive(Debug, Clone)]
pub struct BufferOption {
    /// Generating a store request rather than a read.
    pub store_call: bool,
    /// Follow-up call number, 0 for the first call.
    pub second_call: u32,
    /// Set by values that need another call.
    pub need_second_call: SecondCall,
    /// Bytes requested by the first LOB read.
    pub partial_lob_size: u32,
    /// Bytes written per LOB store call.
    pub lob_chunk_size: u32,
    /// Record bytes reserved for a PE or MU field.
    pub multiple_size: u32,
    /// Target is a mainframe.
    pub mainframe: bool,
}

impl BufferOption {
    /// Options for a store (`true`) or read (`false`) request.
    pub fn new(store_call: bool, second_call: u32) -> Self {
        Self {
            store_call,
            second_call,
            need_second_call: SecondCall::None,
            partial_lob_size: 4096,
            lob_chunk_size: 40960,
            multiple_size: 32768,
            mainframe: false,
        }
    }

    /// Whether this is a follow-up call.
    pub fn is_second_call(&self) -> bool {
        self.second_call > 0
    }
}

impl Default for BufferOption {
    fn default() -> Self {
        Self::new(false, 0)
    }
}

// ── Scalar input ───────────────────────────────────────────────────

/// Input accepted by [`ValueCodec::set_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// Text, parsed lexically by numeric kinds.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl Scalar {
    fn describe(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::UInt(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Str(s) => format!("'{}'", s),
            Self::Bytes(b) => format!("{} bytes", b.len()),
        }
    }
}

macro_rules! scalar_from {
    ($variant:ident, $target:ty, $($ty:ty),*) => {
        $(impl From<$ty> for Scalar {
            fn from(v: $ty) -> Self {
                Scalar::$variant(v as $target)
            }
        })*
    };
}

scalar_from!(Int, i64, i8, i16, i32, i64);
scalar_from!(UInt, u64, u8, u16, u32, u64);
scalar_from!(Float, f64, f32, f64);

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(v: Vec<u8>) -> Self {
        Scalar::Bytes(v)
    }
}

impl From<&[u8]> for Scalar {
    fn from(v: &[u8]) -> Self {
        Scalar::Bytes(v.to_vec())
    }
}

// ── Value protocol ─────────────────────────────────────────────────

/// Operations shared by every field value.
pub trait ValueCodec {
    /// The field's type.
    fn ada_type(&self) -> &Arc<AdaType>;

    /// Assign a scalar, coercing numerically or lexically.
    ///
    /// On error the previous contents are kept.
    fn set_value(&mut self, value: Scalar) -> Result<()>;

    /// Assign from text.
    fn set_string(&mut self, value: &str) -> Result<()> {
        self.set_value(Scalar::Str(value.to_string()))
    }

    /// Wire bytes of the value.
    fn bytes(&self) -> Vec<u8>;

    /// Text rendering.
    fn string(&self) -> String;

    /// Value as signed integer.
    fn int64(&self) -> Result<i64>;

    /// Value as unsigned integer.
    fn uint64(&self) -> Result<u64>;

    /// Value as float.
    fn float64(&self) -> Result<f64>;

    /// Append the format token; returns the record buffer length.
    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32;

    /// Write the store bytes.
    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()>;

    /// Read the value from a record buffer.
    fn parse_buffer(
        &mut self,
        helper: &mut BufferHelper,
        opt: &mut BufferOption,
    ) -> Result<TraverseResult>;
}

/// Data shared by every concrete value.
#[derive(Debug, Clone)]
pub(crate) struct ValueMeta {
    pub(crate) ada_type: Arc<AdaType>,
    pub(crate) platform: Platform,
    pub(crate) pe_index: u32,
    pub(crate) mu_index: u32,
}

impl ValueMeta {
    pub(crate) fn new(ada_type: &Arc<AdaType>, platform: &Platform) -> Self {
        Self {
            ada_type: Arc::clone(ada_type),
            platform: *platform,
            pe_index: 0,
            mu_index: 0,
        }
    }

    pub(crate) fn short_name(&self) -> &str {
        self.ada_type.short_name()
    }

    /// Index part of a token: `p(m)`, `p` or `m`.
    pub(crate) fn index_suffix(&self) -> String {
        match (self.pe_index, self.mu_index) {
            (0, 0) => String::new(),
            (p, 0) => p.to_string(),
            (0, m) => m.to_string(),
            (p, m) => format!("{}({})", p, m),
        }
    }

    /// Append `<S><index>,<length>,<format>`.
    pub(crate) fn push_token(&self, out: &mut String) {
        push_separator(out);
        out.push_str(self.short_name());
        out.push_str(&self.index_suffix());
        out.push_str(&format!(
            ",{},{}",
            self.ada_type.length(),
            self.ada_type.format_char()
        ));
    }

    /// Append `<S>(from,len)` for a partial range.
    pub(crate) fn push_partial(&self, out: &mut String, from: u32, len: u32) {
        push_separator(out);
        out.push_str(self.short_name());
        out.push_str(&self.index_suffix());
        out.push_str(&format!("({},{})", from, len));
    }

    /// Standard token for fixed-layout kinds; nothing on follow-up calls.
    pub(crate) fn common_format(&self, out: &mut String, opt: &BufferOption) -> u32 {
        if opt.is_second_call() {
            return 0;
        }
        self.push_token(out);
        match self.ada_type.length() {
            0 => self.ada_type.kind().variable_read_length(),
            n => n,
        }
    }

    pub(crate) fn type_mismatch(&self, input: &Scalar) -> AdabasError {
        AdabasError::TypeMismatch {
            field: self.short_name().to_string(),
            input: input.describe(),
        }
    }

    pub(crate) fn not_numeric(&self, target: &'static str) -> AdabasError {
        AdabasError::NotNumeric {
            field: self.short_name().to_string(),
            target,
        }
    }

    pub(crate) fn out_of_range(&self, value: impl ToString) -> AdabasError {
        AdabasError::OutOfRange {
            field: self.short_name().to_string(),
            value: value.to_string(),
            length: self.ada_type.length(),
        }
    }
}

pub(crate) fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with(',') {
        out.push(',');
    }
}

// ── Numeric helpers ────────────────────────────────────────────────

pub(crate) fn pow10(exp: u32) -> i128 {
    10i128.pow(exp)
}

/// Convert a scalar to the stored integer, scaled by `fractional` digits.
pub(crate) fn scalar_to_scaled(meta: &ValueMeta, scalar: &Scalar) -> Result<i128> {
    let fractional = meta.ada_type.fractional();
    let scale = pow10(fractional);
    match scalar {
        Scalar::Int(v) => Ok(*v as i128 * scale),
        Scalar::UInt(v) => Ok(*v as i128 * scale),
        Scalar::Float(v) => {
            let scaled = v * scale as f64;
            if !scaled.is_finite()
                || (scaled - scaled.round()).abs() > 1e-9
                || scaled.abs() >= i128::MAX as f64
            {
                return Err(meta.type_mismatch(scalar));
            }
            Ok(scaled.round() as i128)
        }
        Scalar::Str(s) => parse_scaled(meta, s),
        Scalar::Bytes(_) => Err(meta.type_mismatch(scalar)),
    }
}

/// Parse a decimal string into an integer scaled by the field's fractional
/// digits.
pub(crate) fn parse_scaled(meta: &ValueMeta, text: &str) -> Result<i128> {
    let fractional = meta.ada_type.fractional();
    let mismatch = || AdabasError::TypeMismatch {
        field: meta.short_name().to_string(),
        input: format!("'{}'", text),
    };
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if fractional == 0 {
        if let Ok(v) = trimmed.parse::<i128>() {
            return Ok(v);
        }
    }
    let mut decimal = Decimal::from_str(trimmed).map_err(|_| mismatch())?;
    decimal = decimal.normalize();
    if decimal.scale() > fractional {
        return Err(mismatch());
    }
    decimal.rescale(fractional);
    Ok(decimal.mantissa())
}

/// Render a scaled integer with its decimal point.
pub(crate) fn format_scaled(raw: i128, fractional: u32) -> String {
    if fractional == 0 {
        return raw.to_string();
    }
    match Decimal::try_from_i128_with_scale(raw, fractional) {
        Ok(d) => d.to_string(),
        Err(_) => {
            let digits = raw.unsigned_abs().to_string();
            let width = fractional as usize + 1;
            let digits = format!("{:0>width$}", digits, width = width);
            let (int, frac) = digits.split_at(digits.len() - fractional as usize);
            let sign = if raw < 0 { "-" } else { "" };
            format!("{}{}.{}", sign, int, frac)
        }
    }
}

/// Strip the fractional scale for an integer accessor.
pub(crate) fn scaled_to_integer(meta: &ValueMeta, raw: i128) -> Result<i128> {
    let fractional = meta.ada_type.fractional();
    if fractional == 0 {
        return Ok(raw);
    }
    let scale = pow10(fractional);
    if raw % scale != 0 {
        return Err(AdabasError::FractionalInteger {
            field: meta.short_name().to_string(),
        });
    }
    Ok(raw / scale)
}

pub(crate) fn to_i64(meta: &ValueMeta, v: i128) -> Result<i64> {
    i64::try_from(v).map_err(|_| meta.out_of_range(v))
}

pub(crate) fn to_u64(meta: &ValueMeta, v: i128) -> Result<u64> {
    u64::try_from(v).map_err(|_| meta.out_of_range(v))
}

// ── AdaValue ───────────────────────────────────────────────────────

/// A field value of any kind.
#[derive(Debug, Clone)]
pub enum AdaValue {
    /// 1, 2, 4 or 8 byte integer.
    Binary(BinaryValue),
    /// Raw bytes.
    ByteArray(ByteArrayValue),
    /// IEEE float.
    Float(FloatValue),
    /// Packed decimal, date or time.
    Packed(PackedValue),
    /// Unpacked decimal.
    Unpacked(UnpackedValue),
    /// Alpha or unicode text, including LOBs.
    String(StringValue),
    /// Group, periodic group or multiple-value field.
    Structure(StructureValue),
    /// Super- or sub-descriptor.
    SuperDesc(SuperDescValue),
    /// Read-only placeholder.
    Pseudo(PseudoValue),
}

macro_rules! dispatch {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            AdaValue::Binary($v) => $body,
            AdaValue::ByteArray($v) => $body,
            AdaValue::Float($v) => $body,
            AdaValue::Packed($v) => $body,
            AdaValue::Unpacked($v) => $body,
            AdaValue::String($v) => $body,
            AdaValue::Structure($v) => $body,
            AdaValue::SuperDesc($v) => $body,
            AdaValue::Pseudo($v) => $body,
        }
    };
}

impl ValueCodec for AdaValue {
    fn ada_type(&self) -> &Arc<AdaType> {
        dispatch!(self, v => v.ada_type())
    }

    fn set_value(&mut self, value: Scalar) -> Result<()> {
        dispatch!(self, v => v.set_value(value))
    }

    fn set_string(&mut self, value: &str) -> Result<()> {
        dispatch!(self, v => v.set_string(value))
    }

    fn bytes(&self) -> Vec<u8> {
        dispatch!(self, v => v.bytes())
    }

    fn string(&self) -> String {
        dispatch!(self, v => v.string())
    }

    fn int64(&self) -> Result<i64> {
        dispatch!(self, v => v.int64())
    }

    fn uint64(&self) -> Result<u64> {
        dispatch!(self, v => v.uint64())
    }

    fn float64(&self) -> Result<f64> {
        dispatch!(self, v => v.float64())
    }

    fn format_buffer(&self, out: &mut String, opt: &BufferOption) -> u32 {
        dispatch!(self, v => v.format_buffer(out, opt))
    }

    fn store_buffer(&self, helper: &mut BufferHelper, opt: &mut BufferOption) -> Result<()> {
        dispatch!(self, v => v.store_buffer(helper, opt))
    }

    fn parse_buffer(
        &mut self,
        helper: &mut BufferHelper,
        opt: &mut BufferOption,
    ) -> Result<TraverseResult> {
        dispatch!(self, v => v.parse_buffer(helper, opt))
    }
}

macro_rules! narrow_accessor {
    ($name:ident, $ty:ty, $wide:ident) => {
        #[doc = concat!("Value as `", stringify!($ty), "`; fails with 57 when out of range.")]
        pub fn $name(&self) -> Result<$ty> {
            let v = self.$wide()?;
            <$ty>::try_from(v).map_err(|_| AdabasError::OutOfRange {
                field: self.short_name().to_string(),
                value: v.to_string(),
                length: std::mem::size_of::<$ty>() as u32,
            })
        }
    };
}

impl AdaValue {
    fn meta(&self) -> &ValueMeta {
        dispatch!(self, v => &v.meta)
    }

    fn meta_mut(&mut self) -> &mut ValueMeta {
        dispatch!(self, v => &mut v.meta)
    }

    /// Short name of the field.
    pub fn short_name(&self) -> &str {
        self.meta().short_name()
    }

    /// Kind of the field.
    pub fn kind(&self) -> FieldKind {
        self.meta().ada_type.kind()
    }

    /// Periodic group index, 0 outside a PE.
    pub fn pe_index(&self) -> u32 {
        self.meta().pe_index
    }

    /// Multiple-value index, 0 outside an MU.
    pub fn mu_index(&self) -> u32 {
        self.meta().mu_index
    }

    /// Set PE and MU indexes here and on all nested group members.
    pub(crate) fn set_indexes(&mut self, pe_index: u32, mu_index: u32) {
        {
            let meta = self.meta_mut();
            meta.pe_index = pe_index;
            meta.mu_index = mu_index;
        }
        if let AdaValue::Structure(s) = self {
            s.propagate_pe_index(pe_index);
        }
    }

    narrow_accessor!(int8, i8, int64);
    narrow_accessor!(int16, i16, int64);
    narrow_accessor!(int32, i32, int64);
    narrow_accessor!(uint8, u8, uint64);
    narrow_accessor!(uint16, u16, uint64);
    narrow_accessor!(uint32, u32, uint64);

    /// Structure view, if this is a group, PE or MU.
    pub fn as_structure(&self) -> Option<&StructureValue> {
        match self {
            AdaValue::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Mutable structure view.
    pub fn as_structure_mut(&mut self) -> Option<&mut StructureValue> {
        match self {
            AdaValue::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// LOB total size reported by the last read, if this is a text value.
    pub fn lob_size(&self) -> Option<u32> {
        match self {
            AdaValue::String(s) => Some(s.lob_size()),
            _ => None,
        }
    }

    /// Find `name` here or in nested structures (first occurrence).
    pub fn find(&self, name: &str) -> Option<&AdaValue> {
        if self.short_name() == name || self.meta().ada_type.name() == name {
            return Some(self);
        }
        match self {
            AdaValue::Structure(s) => s.find(name),
            _ => None,
        }
    }

    /// Mutable variant of [`AdaValue::find`].
    pub fn find_mut(&mut self, name: &str) -> Option<&mut AdaValue> {
        if self.short_name() == name || self.meta().ada_type.name() == name {
            return Some(self);
        }
        match self {
            AdaValue::Structure(s) => s.find_mut(name),
            _ => None,
        }
    }

    /// Append the search buffer field token `<S><index>,<len>,<fmt>`.
    ///
    /// Super-descriptors report the length of their operand.
    pub(crate) fn search_token(&self, out: &mut String) {
        match self {
            AdaValue::SuperDesc(s) => {
                push_separator(out);
                out.push_str(&format!(
                    "{},{},{}",
                    s.meta.short_name(),
                    s.bytes().len(),
                    s.meta.ada_type.format_char()
                ));
            }
            other => other.meta().push_token(out),
        }
    }

    /// Assignment used for search operands.
    ///
    /// Super-descriptors take the raw operand bytes; every other kind
    /// goes through [`ValueCodec::set_value`].
    pub(crate) fn assign_search_operand(&mut self, scalar: Scalar) -> Result<()> {
        match self {
            AdaValue::SuperDesc(s) => s.set_operand(scalar),
            other => other.set_value(scalar),
        }
    }
}

impl AdaType {
    /// Create an empty value of this type for `platform`.
    pub fn new_value(self: &Arc<Self>, platform: &Platform) -> AdaValue {
        let meta = ValueMeta::new(self, platform);
        match self.kind() {
            FieldKind::UByte
            | FieldKind::Byte
            | FieldKind::UInt2
            | FieldKind::Int2
            | FieldKind::UInt4
            | FieldKind::Int4
            | FieldKind::UInt8
            | FieldKind::Int8 => AdaValue::Binary(BinaryValue::new(meta)),
            FieldKind::ByteArray => AdaValue::ByteArray(ByteArrayValue::new(meta)),
            FieldKind::Float | FieldKind::Double => AdaValue::Float(FloatValue::new(meta)),
            FieldKind::Packed | FieldKind::Date | FieldKind::Time => {
                AdaValue::Packed(PackedValue::new(meta))
            }
            FieldKind::Unpacked => AdaValue::Unpacked(UnpackedValue::new(meta)),
            FieldKind::Alpha
            | FieldKind::LaAlpha
            | FieldKind::LbAlpha
            | FieldKind::Unicode
            | FieldKind::LaUnicode
            | FieldKind::LbUnicode => AdaValue::String(StringValue::new(meta)),
            FieldKind::Group | FieldKind::PeriodGroup | FieldKind::Multiple => {
                AdaValue::Structure(StructureValue::new(meta))
            }
            FieldKind::SuperDesc => AdaValue::SuperDesc(SuperDescValue::new(meta)),
            FieldKind::Phonetic
            | FieldKind::Collation
            | FieldKind::HyperExit
            | FieldKind::Referential => AdaValue::Pseudo(PseudoValue::new(meta)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(fractional: u32) -> ValueMeta {
        let t = Arc::new(
            AdaType::new(FieldKind::Packed, "PF")
                .with_length(6)
                .with_fractional(fractional),
        );
        ValueMeta::new(&t, &Platform::default())
    }

    #[test]
    fn test_parse_scaled() {
        assert_eq!(parse_scaled(&meta(0), "234560").unwrap(), 234560);
        assert_eq!(parse_scaled(&meta(0), "-17").unwrap(), -17);
        assert_eq!(parse_scaled(&meta(2), "1.5").unwrap(), 150);
        assert_eq!(parse_scaled(&meta(2), "12").unwrap(), 1200);
        assert_eq!(parse_scaled(&meta(2), "1.250").unwrap(), 125);
        assert_eq!(parse_scaled(&meta(2), "1.234").unwrap_err().code(), 103);
        assert_eq!(parse_scaled(&meta(0), "abc").unwrap_err().code(), 103);
    }

    #[test]
    fn test_format_scaled() {
        assert_eq!(format_scaled(150, 2), "1.50");
        assert_eq!(format_scaled(-5, 2), "-0.05");
        assert_eq!(format_scaled(42, 0), "42");
    }

    #[test]
    fn test_scaled_to_integer() {
        assert_eq!(scaled_to_integer(&meta(2), 1200).unwrap(), 12);
        assert_eq!(scaled_to_integer(&meta(2), 1250).unwrap_err().code(), 112);
    }

    #[test]
    fn test_scalar_conversions() {
        assert_eq!(Scalar::from(5u8), Scalar::UInt(5));
        assert_eq!(Scalar::from(-5i16), Scalar::Int(-5));
        assert_eq!(Scalar::from("x"), Scalar::Str("x".into()));
        assert_eq!(Scalar::from(&[1u8, 2][..]), Scalar::Bytes(vec![1, 2]));
        assert_eq!(scalar_to_scaled(&meta(1), &Scalar::Float(2.5)).unwrap(), 25);
        assert_eq!(
            scalar_to_scaled(&meta(0), &Scalar::Float(2.5)).unwrap_err().code(),
            103
        );
    }

    #[test]
    fn test_index_suffix() {
        let mut m = meta(0);
        assert_eq!(m.index_suffix(), "");
        m.pe_index = 2;
        assert_eq!(m.index_suffix(), "2");
        m.mu_index = 3;
        assert_eq!(m.index_suffix(), "2(3)");
        m.pe_index = 0;
        assert_eq!(m.index_suffix(), "3");
    }

    #[test]
    fn test_buffer_option_defaults() {
        let opt = BufferOption::new(true, 0);
        assert!(opt.store_call);
        assert!(!opt.is_second_call());
        assert_eq!(opt.need_second_call, SecondCall::None);
        assert_eq!(opt.partial_lob_size, 4096);
        assert_eq!(opt.lob_chunk_size, 40960);
    }
}
