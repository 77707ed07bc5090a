//! Field type descriptors.
//!
//! An [`AdaType`] is the static metadata of one field: kind, short name,
//! length, options and, for composites, the child types. Types are built
//! once, wrapped in `Arc` by the [`Definition`](crate::Definition), and
//! shared by every value created from them.

mod ada_type;
mod structure;
mod superdesc;

pub use ada_type::AdaType;
pub use structure::Occurrence;
pub use superdesc::SuperEntry;

use crate::{AdabasError, Result};

// ── FieldKind ──────────────────────────────────────────────────────

/// Semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Unsigned 1-byte binary.
    UByte,
    /// Signed 1-byte binary.
    Byte,
    /// Unsigned 2-byte binary.
    UInt2,
    /// Signed 2-byte binary.
    Int2,
    /// Unsigned 4-byte binary.
    UInt4,
    /// Signed 4-byte binary.
    Int4,
    /// Unsigned 8-byte binary.
    UInt8,
    /// Signed 8-byte binary.
    Int8,
    /// Raw bytes of any other length.
    ByteArray,
    /// 4-byte IEEE float.
    Float,
    /// 8-byte IEEE float.
    Double,
    /// Packed decimal.
    Packed,
    /// Packed decimal holding a day number.
    Date,
    /// Packed decimal holding tenth-of-second ticks.
    Time,
    /// Unpacked (zoned) decimal.
    Unpacked,
    /// Alphanumeric with a 1-byte length header when variable.
    Alpha,
    /// Long alpha, 2-byte length header.
    LaAlpha,
    /// Large object, 4-byte length header.
    LbAlpha,
    /// UTF-8 text with a 1-byte length header when variable.
    Unicode,
    /// Long unicode, 2-byte length header.
    LaUnicode,
    /// Large unicode object, 4-byte length header.
    LbUnicode,
    /// Plain group.
    Group,
    /// Periodic group (PE).
    PeriodGroup,
    /// Multiple-value field (MU).
    Multiple,
    /// Super- or sub-descriptor.
    SuperDesc,
    /// Phonetic descriptor.
    Phonetic,
    /// Collation descriptor.
    Collation,
    /// Hyper-exit descriptor.
    HyperExit,
    /// Referential constraint.
    Referential,
}

impl FieldKind {
    /// Format character used in format and search buffers.
    pub fn format_char(self) -> char {
        match self {
            Self::UByte | Self::UInt2 | Self::UInt4 | Self::UInt8 | Self::ByteArray => 'B',
            Self::Byte | Self::Int2 | Self::Int4 | Self::Int8 => 'F',
            Self::Float | Self::Double => 'G',
            Self::Packed | Self::Date | Self::Time => 'P',
            Self::Unpacked => 'U',
            Self::Unicode | Self::LaUnicode | Self::LbUnicode => 'W',
            Self::Alpha
            | Self::LaAlpha
            | Self::LbAlpha
            | Self::SuperDesc
            | Self::Phonetic
            | Self::Collation
            | Self::HyperExit => 'A',
            Self::Group | Self::PeriodGroup | Self::Multiple | Self::Referential => ' ',
        }
    }

    /// Length given to a type that is created without one.
    pub fn default_length(self) -> u32 {
        match self {
            Self::UInt2 | Self::Int2 => 2,
            Self::UInt4 | Self::Int4 | Self::Float | Self::Date => 4,
            Self::UInt8 | Self::Int8 | Self::Double => 8,
            Self::Time => 7,
            Self::ByteArray => 126,
            Self::LaAlpha | Self::LbAlpha | Self::LaUnicode | Self::LbUnicode => 0,
            Self::Group | Self::PeriodGroup | Self::Multiple | Self::SuperDesc => 0,
            Self::Referential => 0,
            _ => 1,
        }
    }

    /// Width and signedness of the fixed binary kinds.
    pub fn binary_width(self) -> Option<(usize, bool)> {
        match self {
            Self::UByte => Some((1, false)),
            Self::Byte => Some((1, true)),
            Self::UInt2 => Some((2, false)),
            Self::Int2 => Some((2, true)),
            Self::UInt4 => Some((4, false)),
            Self::Int4 => Some((4, true)),
            Self::UInt8 => Some((8, false)),
            Self::Int8 => Some((8, true)),
            _ => None,
        }
    }

    /// Whether values of this kind contain other values.
    pub fn is_structure(self) -> bool {
        matches!(self, Self::Group | Self::PeriodGroup | Self::Multiple)
    }

    /// Whether values of this kind are read-only placeholders.
    pub fn is_pseudo(self) -> bool {
        matches!(
            self,
            Self::Phonetic | Self::Collation | Self::HyperExit | Self::Referential
        )
    }

    /// Bytes in the length header of a variable-length field.
    pub fn length_header(self) -> usize {
        match self {
            Self::LaAlpha | Self::LaUnicode => 2,
            Self::LbAlpha | Self::LbUnicode => 4,
            _ => 1,
        }
    }

    /// Record buffer length assumed for a variable field in a read.
    pub fn variable_read_length(self) -> u32 {
        match self {
            Self::LaAlpha | Self::LaUnicode => 1114,
            Self::LbAlpha | Self::LbUnicode => 16381,
            Self::Packed | Self::Date | Self::Time => 15,
            Self::Unpacked => 29,
            _ => 253,
        }
    }
}

/// Map a format character and length to a field kind.
///
/// # Errors
/// Fails with code 103 for an unknown format character.
pub fn evaluate_field_type(format: char, length: u32) -> Result<FieldKind> {
    let kind = match format {
        'A' => FieldKind::Alpha,
        'W' => FieldKind::Unicode,
        'P' => FieldKind::Packed,
        'D' => FieldKind::Date,
        'T' => FieldKind::Time,
        'U' => FieldKind::Unpacked,
        'G' if length == 4 => FieldKind::Float,
        'G' if length == 8 => FieldKind::Double,
        'B' | 'F' => {
            let signed = format == 'F';
            match (length, signed) {
                (1, false) => FieldKind::UByte,
                (1, true) => FieldKind::Byte,
                (2, false) => FieldKind::UInt2,
                (2, true) => FieldKind::Int2,
                (4, false) => FieldKind::UInt4,
                (4, true) => FieldKind::Int4,
                (8, false) => FieldKind::UInt8,
                (8, true) => FieldKind::Int8,
                _ => FieldKind::ByteArray,
            }
        }
        _ => return Err(AdabasError::UnknownFormat { format, length }),
    };
    Ok(kind)
}

// ── Options & flags ────────────────────────────────────────────────

/// Field options as declared in the field definition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldOption {
    /// UQ: unique descriptor.
    Unique,
    /// NU: null suppression.
    NullSuppression,
    /// FI: fixed storage.
    Fixed,
    /// DE: descriptor.
    Descriptor,
    /// NC: SQL null.
    SqlNull,
    /// NN: not null.
    NotNull,
    /// HF: high-order first.
    HighOrderFirst,
    /// NV: native value, no conversion.
    NativeValue,
    /// NB: no blank compression.
    NoBlankCompression,
    /// HE: hyper exit.
    HyperExit,
    /// PE: periodic group.
    Periodic,
    /// MU: multiple value.
    Multiple,
    /// LA: long alpha.
    LongAlpha,
    /// LB: large object.
    LargeObject,
}

impl FieldOption {
    /// All options in declaration order.
    pub const ALL: [FieldOption; 14] = [
        Self::Unique,
        Self::NullSuppression,
        Self::Fixed,
        Self::Descriptor,
        Self::SqlNull,
        Self::NotNull,
        Self::HighOrderFirst,
        Self::NativeValue,
        Self::NoBlankCompression,
        Self::HyperExit,
        Self::Periodic,
        Self::Multiple,
        Self::LongAlpha,
        Self::LargeObject,
    ];

    /// Two-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Unique => "UQ",
            Self::NullSuppression => "NU",
            Self::Fixed => "FI",
            Self::Descriptor => "DE",
            Self::SqlNull => "NC",
            Self::NotNull => "NN",
            Self::HighOrderFirst => "HF",
            Self::NativeValue => "NV",
            Self::NoBlankCompression => "NB",
            Self::HyperExit => "HE",
            Self::Periodic => "PE",
            Self::Multiple => "MU",
            Self::LongAlpha => "LA",
            Self::LargeObject => "LB",
        }
    }

    /// Parse a two-letter code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|o| o.code().eq_ignore_ascii_case(code.trim()))
    }
}

/// Internal processing flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldFlag {
    /// Member of a periodic group.
    Periodic,
    /// Element type of a multiple-value field.
    MuGhost,
    /// Excluded from store requests; removed when the definition is
    /// restricted.
    ToBeRemoved,
    /// Not writable.
    ReadOnly,
    /// Partial range access.
    Part,
    /// Single PE or MU index only.
    SingleIndex,
}

macro_rules! bit_set {
    ($(#[$meta:meta])* $set:ident, $item:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $set(u32);

        impl $set {
            /// Whether `item` is in the set.
            pub fn contains(&self, item: $item) -> bool {
                self.0 & (1 << item as u32) != 0
            }

            /// Add `item`.
            pub fn insert(&mut self, item: $item) {
                self.0 |= 1 << item as u32;
            }

            /// Remove `item`.
            pub fn remove(&mut self, item: $item) {
                self.0 &= !(1 << item as u32);
            }

            /// Whether the set is empty.
            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

bit_set!(
    /// Set of [`FieldOption`]s.
    OptionSet,
    FieldOption
);
bit_set!(
    /// Set of [`FieldFlag`]s.
    FlagSet,
    FieldFlag
);

impl OptionSet {
    /// Comma-separated option codes, e.g. `UQ,DE`.
    pub fn codes(&self) -> String {
        FieldOption::ALL
            .iter()
            .filter(|o| self.contains(**o))
            .map(|o| o.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

// ── PartialRange ───────────────────────────────────────────────────

/// Byte range `[from, to]` (1-based, inclusive) of a partial field access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialRange {
    /// First byte, 1-based.
    pub from: u32,
    /// Last byte, inclusive.
    pub to: u32,
}

impl PartialRange {
    /// Create a range; `to` is clamped to at least `from`.
    pub fn new(from: u32, to: u32) -> Self {
        let from = from.max(1);
        Self {
            from,
            to: to.max(from),
        }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> u32 {
        self.to - self.from + 1
    }

    /// Always false; a range covers at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Format buffer suffix `(from,len)`.
    pub fn format_buffer(&self) -> String {
        format!("({},{})", self.from, self.len())
    }
}
