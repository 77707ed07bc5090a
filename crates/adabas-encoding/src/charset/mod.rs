//! Character set support for alphanumeric field conversion.
//!
//! Alpha values travel as raw bytes in the record buffer; a [`Charset`]
//! converts them to and from Rust strings when the field definition or the
//! platform names an encoding.
//!
//! # Supported encodings
//!
//! - **IBM single-byte pages:** CP037, CP1047, CP1140 (EBCDIC) and
//!   CP437, CP850, CP852, CP855, CP858, CP860 (PC), table-driven
//! - **WHATWG encodings:** ISO-8859-x, Windows-125x, KOI8, Shift_JIS,
//!   EUC-JP, GBK, Big5, EUC-KR and friends via `encoding_rs`
//! - **Unicode:** UTF-8 and UTF-16 (both byte orders)
//!
//! Use [`Charset::by_name`] to resolve any of the known aliases.

mod aliases;
mod tables;

pub use aliases::{alias_count, lookup, CharsetId};
pub use tables::{
    CodePage, CODE_PAGES, CP037, CP1047, CP1140, CP437, CP850, CP852, CP855, CP858, CP860,
};

use crate::error::EncodingError;
use crate::Result;

impl CodePage {
    /// Decode bytes of this code page to a UTF-8 string.
    pub fn decode(&self, bytes: &[u8]) -> String {
        bytes.iter().map(|&b| self.table[b as usize]).collect()
    }

    /// Encode a string into this code page.
    ///
    /// # Errors
    /// Returns `EncodingError::ConversionFailed` if a character has no
    /// position in the page.
    pub fn encode(&self, s: &str) -> Result<Vec<u8>> {
        s.chars()
            .map(|ch| {
                self.encode_char(ch).ok_or_else(|| EncodingError::ConversionFailed {
                    message: format!(
                        "Character '{}' (U+{:04X}) cannot be encoded in {}",
                        ch, ch as u32, self.name
                    ),
                })
            })
            .collect()
    }

    /// Convert a single byte to its Unicode character.
    #[inline]
    pub fn decode_byte(&self, b: u8) -> char {
        self.table[b as usize]
    }

    /// Convert a single character to its byte, if the page contains it.
    pub fn encode_char(&self, ch: char) -> Option<u8> {
        // ASCII letters and digits sit at the same index in the PC pages.
        if !self.ebcdic && ch.is_ascii() && self.table[ch as usize] == ch {
            return Some(ch as u8);
        }
        self.table.iter().position(|&c| c == ch).map(|i| i as u8)
    }

    /// The byte used for padding in this page.
    pub fn space(&self) -> u8 {
        if self.ebcdic {
            0x40
        } else {
            0x20
        }
    }
}

/// A resolved character set.
#[derive(Debug, Clone, Copy)]
pub enum Charset {
    /// UTF-8, passed through after validation.
    Utf8,
    /// UTF-16 without byte order mark.
    Utf16 {
        /// High-order byte first.
        big_endian: bool,
    },
    /// Table-driven IBM code page.
    CodePage(&'static CodePage),
    /// An `encoding_rs` codec.
    Web(&'static encoding_rs::Encoding),
}

impl Charset {
    /// Resolve a charset alias such as `"utf-8"`, `"latin1"` or `"cp037"`.
    ///
    /// # Errors
    /// Returns `EncodingError::InvalidCodePage` for an unknown alias.
    pub fn by_name(name: &str) -> Result<Self> {
        lookup(name)
            .map(Self::from_id)
            .ok_or_else(|| EncodingError::InvalidCodePage(name.to_string()))
    }

    /// Map a codec index to its implementation.
    pub fn from_id(id: CharsetId) -> Self {
        use encoding_rs as e;
        match id {
            CharsetId::Utf8 => Self::Utf8,
            CharsetId::Utf16Be => Self::Utf16 { big_endian: true },
            CharsetId::Utf16Le => Self::Utf16 { big_endian: false },
            CharsetId::Ibm037 => Self::CodePage(&CP037),
            CharsetId::Ibm1047 => Self::CodePage(&CP1047),
            CharsetId::Ibm1140 => Self::CodePage(&CP1140),
            CharsetId::Ibm437 => Self::CodePage(&CP437),
            CharsetId::Ibm850 => Self::CodePage(&CP850),
            CharsetId::Ibm852 => Self::CodePage(&CP852),
            CharsetId::Ibm855 => Self::CodePage(&CP855),
            CharsetId::Ibm858 => Self::CodePage(&CP858),
            CharsetId::Ibm860 => Self::CodePage(&CP860),
            CharsetId::Ibm866 => Self::Web(e::IBM866),
            CharsetId::Iso8859_2 => Self::Web(e::ISO_8859_2),
            CharsetId::Iso8859_3 => Self::Web(e::ISO_8859_3),
            CharsetId::Iso8859_4 => Self::Web(e::ISO_8859_4),
            CharsetId::Iso8859_5 => Self::Web(e::ISO_8859_5),
            CharsetId::Iso8859_6 => Self::Web(e::ISO_8859_6),
            CharsetId::Iso8859_7 => Self::Web(e::ISO_8859_7),
            CharsetId::Iso8859_8 => Self::Web(e::ISO_8859_8),
            CharsetId::Iso8859_8I => Self::Web(e::ISO_8859_8_I),
            CharsetId::Iso8859_10 => Self::Web(e::ISO_8859_10),
            CharsetId::Iso8859_13 => Self::Web(e::ISO_8859_13),
            CharsetId::Iso8859_14 => Self::Web(e::ISO_8859_14),
            CharsetId::Iso8859_15 => Self::Web(e::ISO_8859_15),
            CharsetId::Iso8859_16 => Self::Web(e::ISO_8859_16),
            CharsetId::Koi8R => Self::Web(e::KOI8_R),
            CharsetId::Koi8U => Self::Web(e::KOI8_U),
            CharsetId::Macintosh => Self::Web(e::MACINTOSH),
            CharsetId::Windows874 => Self::Web(e::WINDOWS_874),
            CharsetId::Windows1250 => Self::Web(e::WINDOWS_1250),
            CharsetId::Windows1251 => Self::Web(e::WINDOWS_1251),
            CharsetId::Windows1252 => Self::Web(e::WINDOWS_1252),
            CharsetId::Windows1253 => Self::Web(e::WINDOWS_1253),
            CharsetId::Windows1254 => Self::Web(e::WINDOWS_1254),
            CharsetId::Windows1255 => Self::Web(e::WINDOWS_1255),
            CharsetId::Windows1256 => Self::Web(e::WINDOWS_1256),
            CharsetId::Windows1257 => Self::Web(e::WINDOWS_1257),
            CharsetId::Windows1258 => Self::Web(e::WINDOWS_1258),
            CharsetId::MacCyrillic => Self::Web(e::X_MAC_CYRILLIC),
            CharsetId::Gbk => Self::Web(e::GBK),
            CharsetId::Gb18030 => Self::Web(e::GB18030),
            CharsetId::Big5 => Self::Web(e::BIG5),
            CharsetId::EucJp => Self::Web(e::EUC_JP),
            CharsetId::Iso2022Jp => Self::Web(e::ISO_2022_JP),
            CharsetId::ShiftJis => Self::Web(e::SHIFT_JIS),
            CharsetId::EucKr => Self::Web(e::EUC_KR),
            CharsetId::Replacement => Self::Web(e::REPLACEMENT),
            CharsetId::XUserDefined => Self::Web(e::X_USER_DEFINED),
        }
    }

    /// Canonical name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16 { big_endian: true } => "UTF-16BE",
            Self::Utf16 { big_endian: false } => "UTF-16LE",
            Self::CodePage(cp) => cp.name,
            Self::Web(enc) => enc.name(),
        }
    }

    /// Whether the charset is an EBCDIC code page.
    pub fn is_ebcdic(&self) -> bool {
        matches!(self, Self::CodePage(cp) if cp.ebcdic)
    }

    /// Decode bytes in this charset to a string.
    ///
    /// # Errors
    /// Returns `EncodingError::ConversionFailed` for malformed input.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| {
                EncodingError::ConversionFailed {
                    message: format!("invalid UTF-8: {}", e),
                }
            }),
            Self::Utf16 { big_endian } => {
                if bytes.len() % 2 != 0 {
                    return Err(EncodingError::ConversionFailed {
                        message: format!("odd UTF-16 length {}", bytes.len()),
                    });
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| {
                        if *big_endian {
                            u16::from_be_bytes([c[0], c[1]])
                        } else {
                            u16::from_le_bytes([c[0], c[1]])
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| EncodingError::ConversionFailed {
                    message: format!("invalid UTF-16: {}", e),
                })
            }
            Self::CodePage(cp) => Ok(cp.decode(bytes)),
            Self::Web(enc) => enc
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|s| s.into_owned())
                .ok_or_else(|| EncodingError::ConversionFailed {
                    message: format!("malformed {} input", enc.name()),
                }),
        }
    }

    /// Encode a string into this charset.
    ///
    /// # Errors
    /// Returns `EncodingError::ConversionFailed` if a character cannot be
    /// represented.
    pub fn encode(&self, s: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(s.as_bytes().to_vec()),
            Self::Utf16 { big_endian } => Ok(s
                .encode_utf16()
                .flat_map(|u| {
                    if *big_endian {
                        u.to_be_bytes()
                    } else {
                        u.to_le_bytes()
                    }
                })
                .collect()),
            Self::CodePage(cp) => cp.encode(s),
            Self::Web(enc) => {
                let (bytes, _, had_errors) = enc.encode(s);
                if had_errors {
                    return Err(EncodingError::ConversionFailed {
                        message: format!("'{}' cannot be encoded in {}", s, enc.name()),
                    });
                }
                Ok(bytes.into_owned())
            }
        }
    }
}
