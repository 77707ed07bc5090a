//! Target platform description.
//!
//! Everything that differs between a mainframe and an open-system database
//! (byte order, space byte, decimal sign nibbles and character set) hangs
//! off a single [`Platform`] value that is passed explicitly to value
//! constructors and the search compiler.

use adabas_encoding::{Charset, PackedSigns, ZonedSigns};

/// Architecture byte of a mainframe nucleus.
pub const ARCH_MAINFRAME: u8 = 0x00;
/// Architecture byte of an open-system, high-order-first nucleus.
pub const ARCH_OPEN_HIGH: u8 = 0x20;
/// Architecture byte of an open-system, low-order-first nucleus.
pub const ARCH_OPEN_LOW: u8 = 0x21;

/// Byte order of multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

impl ByteOrder {
    /// Byte order of the running host.
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }
}

/// Platform descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Platform {
    arch: u8,
    packed_signs: PackedSigns,
    charset: Option<Charset>,
}

impl Platform {
    /// Create a platform from its architecture byte.
    pub fn new(arch: u8) -> Self {
        let packed_signs = if arch & 0xF0 == 0 {
            PackedSigns::MAINFRAME
        } else {
            PackedSigns::OPEN
        };
        Self {
            arch,
            packed_signs,
            charset: None,
        }
    }

    /// Mainframe platform (`0x00`).
    pub fn mainframe() -> Self {
        Self::new(ARCH_MAINFRAME)
    }

    /// Open-system high-order-first platform (`0x20`).
    pub fn open_system() -> Self {
        Self::new(ARCH_OPEN_HIGH)
    }

    /// Derive the platform from a session ISL token.
    ///
    /// The architecture sits in bits 24..31.
    pub fn from_isl(isl: u64) -> Self {
        Self::new(((isl >> 24) & 0xFF) as u8)
    }

    /// Override the packed sign nibbles.
    pub fn with_packed_signs(mut self, signs: PackedSigns) -> Self {
        self.packed_signs = signs;
        self
    }

    /// Attach a character set used for alpha conversion.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Raw architecture byte.
    pub fn arch(&self) -> u8 {
        self.arch
    }

    /// Whether this is a mainframe.
    pub fn is_mainframe(&self) -> bool {
        self.arch & 0xF0 == 0
    }

    /// Byte order of binary fields on this platform.
    pub fn byte_order(&self) -> ByteOrder {
        if self.arch == ARCH_OPEN_LOW {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    /// Padding byte for fixed alpha fields.
    pub fn space(&self) -> u8 {
        if self.is_mainframe() {
            0x40
        } else {
            0x20
        }
    }

    /// Sign nibbles for packed fields.
    pub fn packed_signs(&self) -> PackedSigns {
        self.packed_signs
    }

    /// Zone nibbles for unpacked fields.
    pub fn zoned_signs(&self) -> ZonedSigns {
        if self.is_mainframe() {
            ZonedSigns::MAINFRAME
        } else {
            ZonedSigns::OPEN
        }
    }

    /// Character set for alpha conversion, if any.
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::open_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainframe() {
        let p = Platform::mainframe();
        assert!(p.is_mainframe());
        assert_eq!(p.byte_order(), ByteOrder::Big);
        assert_eq!(p.space(), 0x40);
        assert_eq!(p.packed_signs(), PackedSigns::MAINFRAME);
        assert_eq!(p.zoned_signs(), ZonedSigns::MAINFRAME);
    }

    #[test]
    fn test_open_systems() {
        let high = Platform::open_system();
        assert!(!high.is_mainframe());
        assert_eq!(high.byte_order(), ByteOrder::Big);
        assert_eq!(high.space(), 0x20);
        assert_eq!(high.packed_signs(), PackedSigns::OPEN);

        let low = Platform::new(ARCH_OPEN_LOW);
        assert_eq!(low.byte_order(), ByteOrder::Little);
    }

    #[test]
    fn test_from_isl() {
        assert_eq!(Platform::from_isl(0x0000_0000_2100_0000).arch(), 0x21);
        assert!(Platform::from_isl(0x1234_5678_0012_3456).is_mainframe());
    }

    #[test]
    fn test_sign_override() {
        let p = Platform::open_system().with_packed_signs(PackedSigns::MAINFRAME);
        assert_eq!(p.packed_signs().positive, 0x0F);
        assert_eq!(p.space(), 0x20);
    }

    #[test]
    fn test_charset() {
        let cs = Charset::by_name("cp037").unwrap();
        let p = Platform::mainframe().with_charset(cs);
        assert_eq!(p.charset().map(|c| c.name()), Some("CP037"));
        assert!(Platform::default().charset().is_none());
    }
}
