//! Decimal integer codecs for Adabas numeric formats.
//!
//! - **Packed (`P`)**: two BCD digits per byte, sign in the last low nibble
//! - **Unpacked (`U`)**: one zoned digit per byte, sign in the last high nibble
//!
//! Both codecs work on integer magnitudes; the fractional digit count of a
//! field is applied by the caller. The sign and zone nibbles are passed in
//! because they differ between mainframe and open systems.

mod packed;
mod zoned;

pub use packed::{pack_i64, packed_len_for, packed_to_i64, PackedSigns};
pub use zoned::{unzone_i64, zone_i64, zoned_len_for, ZonedSigns};

/// Number of decimal digits needed for `magnitude` (at least one).
pub fn digit_count(magnitude: u128) -> usize {
    let mut digits = 1;
    let mut m = magnitude / 10;
    while m > 0 {
        digits += 1;
        m /= 10;
    }
    digits
}
