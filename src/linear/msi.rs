//! # MSI Plessey
//!
//! Binary-coded-decimal symbology: each digit is emitted as four wide/narrow
//! bar pairs, most significant bit first. This is the minimal variant with
//! no check digit.

use crate::error::Error;
use crate::geometry::TextAlign;
use crate::linear::{check_charset, check_length, one_d_symbol, DEFAULT_HEIGHT};
use crate::symbol::{Encoder, Symbol};

/// MSI encoder.
#[derive(Debug, Clone)]
pub struct Msi {
    height: i32,
}

impl Default for Msi {
    fn default() -> Self {
        Self::new()
    }
}

impl Msi {
    pub fn new() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
        }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for Msi {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 18, "MSI")?;
        check_charset(content, "0123456789", "MSI")?;

        // Start: wide bar, narrow space.
        let mut pattern = String::from("21");
        for b in content.bytes() {
            let d = b - b'0';
            for bit in (0..4).rev() {
                // Set bit: wide bar, narrow space. Clear bit: the reverse.
                pattern.push_str(if d >> bit & 1 != 0 { "21" } else { "12" });
            }
        }
        // Stop: narrow bar, wide bar after a narrow space.
        pattern.push_str("121");

        one_d_symbol(
            content,
            content,
            &pattern,
            self.height,
            TextAlign::Center,
            String::new(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_widths() {
        let symbol = Msi::new().encode("7").unwrap();
        // Start (3) + one digit (4 bit pairs, 3 modules each) + stop (4).
        assert_eq!(symbol.width, 3 + 12 + 4);
        assert_eq!(symbol.readable, "7");
    }

    #[test]
    fn test_bit_order_is_msb_first() {
        // Digit 8 = 1000: one wide pair then three narrow-bar pairs.
        let symbol = Msi::new().encode("8").unwrap();
        let bars: Vec<i32> = symbol.rectangles.iter().map(|r| r.width).collect();
        // start(2), 1000 -> 2,1,1,1, stop bars (1,1)
        assert_eq!(bars, vec![2, 2, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_rejects_non_digits() {
        assert!(Msi::new().encode("12X").is_err());
    }
}
