//! Encoding crate error types.

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by the byte-level codecs.
#[derive(Debug, Error, Diagnostic)]
pub enum EncodingError {
    /// Characters or bytes could not be converted.
    #[error("conversion failed: {message}")]
    #[diagnostic(code(encoding::conversion_failed))]
    ConversionFailed {
        /// What went wrong.
        message: String,
    },

    /// The charset alias is not known.
    #[error("unknown charset '{0}'")]
    #[diagnostic(code(encoding::invalid_code_page))]
    InvalidCodePage(String),

    /// A decimal magnitude needs more digits than the field provides.
    #[error("value {value} needs {digits} digits, field holds {capacity}")]
    #[diagnostic(code(encoding::overflow))]
    Overflow {
        /// The rejected value.
        value: i128,
        /// Digits the value needs.
        digits: usize,
        /// Digits the field can hold.
        capacity: usize,
    },

    /// A nibble outside `0..=9` appeared in a digit position.
    #[error("invalid digit nibble 0x{nibble:X} at byte {position}")]
    #[diagnostic(code(encoding::invalid_digit))]
    InvalidDigit {
        /// The offending nibble.
        nibble: u8,
        /// Byte index within the field.
        position: usize,
    },
}
