#![forbid(unsafe_code)]
//! Byte-level codecs for the Adabas client.
//!
//! This crate knows nothing about Adabas fields; it only turns bytes into
//! text and integers and back.
//!
//! # Features
//!
//! - **Character sets**: about 240 aliases resolving to IBM single-byte
//!   pages, WHATWG encodings or UTF-16
//! - **Packed Decimal**: BCD with configurable sign nibbles
//! - **Unpacked Decimal**: zoned digits with configurable zones
//!
//! # Example
//!
//! ```rust
//! use adabas_encoding::charset::Charset;
//! use adabas_encoding::decimal::{pack_i64, packed_to_i64, PackedSigns};
//!
//! let cp037 = Charset::by_name("cp037").unwrap();
//! let ebcdic = cp037.encode("HELLO").unwrap();
//! assert_eq!(cp037.decode(&ebcdic).unwrap(), "HELLO");
//!
//! let packed = pack_i64(-10, 4, PackedSigns::OPEN).unwrap();
//! assert_eq!(packed, vec![0x00, 0x00, 0x01, 0x0B]);
//! assert_eq!(packed_to_i64(&packed).unwrap(), -10);
//! ```

pub mod charset;
pub mod decimal;
pub mod error;

pub use charset::{Charset, CharsetId, CodePage};
pub use decimal::{
    pack_i64, packed_len_for, packed_to_i64, unzone_i64, zone_i64, zoned_len_for, PackedSigns,
    ZonedSigns,
};
pub use error::EncodingError;

/// Result type for encoding operations.
pub type Result<T> = std::result::Result<T, EncodingError>;
