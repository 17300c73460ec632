//! 16.16 fixed-point value stored as two signed halves

use std::fmt::{Display, Formatter, Result};

/// A 16.16 fixed-point number kept as its integer (`high`) and fractional
/// (`low`) halves, exactly as they appear on disk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fixed {
    pub high: i16,
    pub low: i16,
}

impl Fixed {
    pub const fn new(high: i16, low: i16) -> Self {
        Self { high, low }
    }

    /// Split raw 32-bit bits into halves without masking.
    pub const fn from_bits(bits: i32) -> Self {
        Self { high: (bits >> 16) as i16, low: bits as i16 }
    }

    pub const fn to_bits(self) -> i32 {
        ((self.high as i32) << 16) | (self.low as u16 as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.to_bits() as f64 / 65536.0
    }
}

impl Display for Fixed {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_round_trip() {
        let version = Fixed::from_bits(0x0002_0000);
        assert_eq!(version, Fixed::new(2, 0));
        assert_eq!(version.to_bits(), 0x0002_0000);

        let angle = Fixed::from_bits(-0x000c_8000);
        assert_eq!(angle.to_bits(), -0x000c_8000);
        assert_eq!(angle.to_f64(), -12.5);
    }
}
