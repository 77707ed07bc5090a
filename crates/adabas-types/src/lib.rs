#![forbid(unsafe_code)]
//! Adabas field types, record codecs and search compilation.
//!
//! This crate provides:
//!
//! - **Platform**: architecture byte, byte order, space byte, sign nibbles
//! - **Buffer Helper**: cursor with typed reads and writes in either order
//! - **Type System**: field kinds, options, groups, PE/MU, super-descriptors
//! - **Values**: binary, packed, unpacked, date/time, alpha, unicode, LOB
//! - **Definition**: ordered field list driving format/record buffers
//! - **Search Compiler**: query text to search buffer and value buffer
//! - **Configuration**: TOML-loadable codec settings

pub mod buffer;
pub mod config;
pub mod definition;
pub mod dump;
pub mod platform;
pub mod search;
pub mod types;
pub mod value;

// ── Re-exports ─────────────────────────────────────────────────────

pub use buffer::BufferHelper;
pub use config::CodecConfig;
pub use definition::Definition;
pub use platform::{ByteOrder, Platform};
pub use search::{Comparator, Logic, SearchInfo, SearchNode, SearchTree, SearchValue};
pub use types::{
    evaluate_field_type, AdaType, FieldFlag, FieldKind, FieldOption, Occurrence, PartialRange,
    SuperEntry,
};
pub use value::{AdaValue, BufferOption, Scalar, SecondCall, TraverseResult};

use adabas_encoding::EncodingError;

// ── Error ──────────────────────────────────────────────────────────

/// Errors produced by the type and search subsystem.
///
/// Every variant carries a stable numeric code, rendered as `ADG<code>`.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum AdabasError {
    /// Write attempted on a read-only or pseudo field.
    #[error("ADG0000037: field '{field}' is read-only")]
    #[diagnostic(code(adabas::read_only))]
    ReadOnly {
        /// The field short name.
        field: String,
    },

    /// Not enough bytes left in the buffer.
    #[error("ADG0000038: buffer too short, need {requested} bytes but {remaining} remain")]
    #[diagnostic(code(adabas::short_buffer))]
    ShortBuffer {
        /// Bytes requested.
        requested: usize,
        /// Bytes remaining.
        remaining: usize,
    },

    /// Field not present in the definition.
    #[error("ADG0000042: no field {name} found in file definition")]
    #[diagnostic(code(adabas::field_not_found))]
    FieldNotFound {
        /// The missing name.
        name: String,
    },

    /// LOB payload does not match the announced size.
    #[error("ADG0000056: LOB field '{field}' announced {expected} bytes but received {actual}")]
    #[diagnostic(code(adabas::lob_length))]
    LobLengthMismatch {
        /// The field short name.
        field: String,
        /// Size from the length header.
        expected: u64,
        /// Bytes actually collected.
        actual: u64,
    },

    /// Numeric value does not fit the declared length.
    #[error("ADG0000057: value {value} out of range for field '{field}' of length {length}")]
    #[diagnostic(code(adabas::out_of_range))]
    OutOfRange {
        /// The field short name.
        field: String,
        /// The rejected value.
        value: String,
        /// Declared length.
        length: u32,
    },

    /// Byte input longer than the declared field length.
    #[error("ADG0000059: {actual} bytes exceed length {length} of field '{field}'")]
    #[diagnostic(code(adabas::bytes_too_long))]
    BytesTooLong {
        /// The field short name.
        field: String,
        /// Supplied byte count.
        actual: usize,
        /// Declared length.
        length: u32,
    },

    /// String longer than a fixed alpha field.
    #[error("ADG0000077: string of {actual} bytes exceeds length {length} of field '{field}'")]
    #[diagnostic(code(adabas::truncation))]
    Truncation {
        /// The field short name.
        field: String,
        /// Supplied byte count.
        actual: usize,
        /// Declared length.
        length: u32,
    },

    /// Negative value assigned to an unsigned field.
    #[error("ADG0000101: negative value {value} for unsigned field '{field}'")]
    #[diagnostic(code(adabas::negative_unsigned))]
    NegativeUnsigned {
        /// The field short name.
        field: String,
        /// The rejected value.
        value: String,
    },

    /// Source value cannot be represented by the field.
    #[error("ADG0000103: input {input} not valid for field '{field}'")]
    #[diagnostic(code(adabas::type_mismatch))]
    TypeMismatch {
        /// The field short name.
        field: String,
        /// Description of the input.
        input: String,
    },

    /// Unknown format character.
    #[error("ADG0000103: unknown format '{format}' with length {length}")]
    #[diagnostic(code(adabas::unknown_format))]
    UnknownFormat {
        /// The format character.
        format: char,
        /// The declared length.
        length: u32,
    },

    /// Numeric accessor used on a non-numeric field.
    #[error("ADG0000105: field '{field}' cannot be converted to {target}")]
    #[diagnostic(code(adabas::not_numeric))]
    NotNumeric {
        /// The field short name.
        field: String,
        /// The requested target type.
        target: &'static str,
    },

    /// Date or time string does not follow `YYYY/MM/DD[ HH:MM[:SS[.f]]]`.
    #[error("ADG0000106: invalid date/time '{input}' for field '{field}'")]
    #[diagnostic(code(adabas::invalid_datetime))]
    InvalidDateTime {
        /// The field short name.
        field: String,
        /// The rejected input.
        input: String,
    },

    /// Character set conversion failed or the charset is unknown.
    #[error("ADG0000108: {0}")]
    #[diagnostic(code(adabas::charset))]
    Encoding(#[from] EncodingError),

    /// Integer accessor used on a value with a fractional part.
    #[error("ADG0000112: field '{field}' has fractional digits, integer access not possible")]
    #[diagnostic(code(adabas::fractional))]
    FractionalInteger {
        /// The field short name.
        field: String,
    },

    /// Partial write payload does not match the range length.
    #[error("ADG0000135: partial range of field '{field}' expects {expected} bytes, got {actual}")]
    #[diagnostic(code(adabas::partial_range))]
    PartialRangeMismatch {
        /// The field short name.
        field: String,
        /// Range length.
        expected: u32,
        /// Payload length.
        actual: usize,
    },

    /// Comparator missing or not recognised.
    #[error("ADG0000170: invalid comparator in search expression '{expression}'")]
    #[diagnostic(code(adabas::invalid_comparator))]
    InvalidComparator {
        /// The offending predicate.
        expression: String,
    },

    /// Literal in a search expression cannot be parsed.
    #[error("ADG0000171: invalid literal '{literal}': {reason}")]
    #[diagnostic(code(adabas::invalid_literal))]
    InvalidLiteral {
        /// The offending literal.
        literal: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Super-descriptor parent has no fixed length.
    #[error("ADG0000172: parent '{parent}' of super-descriptor '{descriptor}' is variable length")]
    #[diagnostic(code(adabas::variable_super_parent))]
    VariableSuperParent {
        /// The super-descriptor short name.
        descriptor: String,
        /// The parent short name.
        parent: String,
    },

    /// Same short name defined twice.
    #[error("ADG0000173: duplicate field '{name}' in definition")]
    #[diagnostic(code(adabas::duplicate_field))]
    DuplicateField {
        /// The duplicate name.
        name: String,
    },
}

impl AdabasError {
    /// Stable numeric error code.
    pub fn code(&self) -> u16 {
        match self {
            Self::ReadOnly { .. } => 37,
            Self::ShortBuffer { .. } => 38,
            Self::FieldNotFound { .. } => 42,
            Self::LobLengthMismatch { .. } => 56,
            Self::OutOfRange { .. } => 57,
            Self::BytesTooLong { .. } => 59,
            Self::Truncation { .. } => 77,
            Self::NegativeUnsigned { .. } => 101,
            Self::TypeMismatch { .. } | Self::UnknownFormat { .. } => 103,
            Self::NotNumeric { .. } => 105,
            Self::InvalidDateTime { .. } => 106,
            Self::Encoding(_) => 108,
            Self::FractionalInteger { .. } => 112,
            Self::PartialRangeMismatch { .. } => 135,
            Self::InvalidComparator { .. } => 170,
            Self::InvalidLiteral { .. } => 171,
            Self::VariableSuperParent { .. } => 172,
            Self::DuplicateField { .. } => 173,
        }
    }
}

/// Result type for the type subsystem.
pub type Result<T> = std::result::Result<T, AdabasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_matches_prefix() {
        let errors = vec![
            AdabasError::ReadOnly { field: "PH".into() },
            AdabasError::ShortBuffer { requested: 4, remaining: 1 },
            AdabasError::FieldNotFound { name: "CC".into() },
            AdabasError::OutOfRange { field: "AC".into(), value: "1000".into(), length: 2 },
            AdabasError::Truncation { field: "AD".into(), actual: 7, length: 6 },
            AdabasError::UnknownFormat { format: 'X', length: 4 },
            AdabasError::Encoding(EncodingError::InvalidCodePage("nope".into())),
            AdabasError::DuplicateField { name: "AA".into() },
        ];
        for err in errors {
            let rendered = err.to_string();
            let prefix = format!("ADG{:07}:", err.code());
            assert!(rendered.starts_with(&prefix), "{rendered} vs {prefix}");
        }
    }

    #[test]
    fn test_field_not_found_message() {
        let err = AdabasError::FieldNotFound { name: "CC".into() };
        assert_eq!(err.to_string(), "ADG0000042: no field CC found in file definition");
    }
}
