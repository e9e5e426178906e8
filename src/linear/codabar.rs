//! # Codabar
//!
//! Classic blood-bank/library symbology. Payloads are framed by the caller
//! with start/stop letters A-D and hold at least one interior character
//! from the numeric set.

use crate::error::Error;
use crate::geometry::TextAlign;
use crate::linear::{check_length, one_d_symbol, DEFAULT_HEIGHT};
use crate::symbol::{Encoder, Symbol};

const CODABAR_CHARSET: &str = "0123456789-$:/.+ABCD";

/// Width patterns in [`CODABAR_CHARSET`] order; seven elements per
/// character (four bars, three spaces).
const CODABAR_TABLE: [&str; 20] = [
    "1111122", "1111221", "1112112", "2211111", "1121121", "2111121", "1211112", "1211211",
    "1221111", "2112111", "1112211", "1122111", "2111212", "2121112", "2121211", "1122221",
    "1122121", "1112122", "1212112", "1112221",
];

/// Codabar encoder.
///
/// The start and stop characters are part of the payload (`A…B` etc.); the
/// interior may not be empty.
#[derive(Debug, Clone)]
pub struct Codabar {
    height: i32,
}

impl Default for Codabar {
    fn default() -> Self {
        Self::new()
    }
}

impl Codabar {
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

impl Encoder for Codabar {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 60, "Codabar")?;
        if content.len() < 3 {
            return Err(Error::LengthOutOfRange(
                "Codabar needs start, stop and at least one interior character".into(),
            ));
        }
        let bytes: Vec<char> = content.chars().collect();
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if !('A'..='D').contains(&first) || !('A'..='D').contains(&last) {
            return Err(Error::InvalidCharacter(
                "Codabar must start and stop with A, B, C or D".into(),
            ));
        }
        for &c in &bytes[1..bytes.len() - 1] {
            if !"0123456789-$:/.+".contains(c) {
                return Err(Error::InvalidCharacter(format!(
                    "character {c:?} not valid inside Codabar"
                )));
            }
        }

        let mut pattern = String::new();
        for (i, c) in content.chars().enumerate() {
            if i > 0 {
                pattern.push('1');
            }
            let idx = CODABAR_CHARSET.find(c).unwrap();
            pattern.push_str(CODABAR_TABLE[idx]);
        }

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
    use crate::plot::pattern_width;

    #[test]
    fn test_readable_matches_content() {
        let symbol = Codabar::new().encode("A12345B").unwrap();
        assert_eq!(symbol.readable, "A12345B");
        assert_eq!(symbol.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_width_includes_framing() {
        let symbol = Codabar::new().encode("A1B").unwrap();
        // A + gap + 1 + gap + B
        let a = pattern_width(CODABAR_TABLE[16]);
        let one = pattern_width(CODABAR_TABLE[1]);
        let b = pattern_width(CODABAR_TABLE[17]);
        assert_eq!(symbol.width, a + one + b + 2);
    }

    #[test]
    fn test_empty_interior_rejected() {
        let err = Codabar::new().encode("AB").unwrap_err();
        assert_eq!(err.category(), "LengthOutOfRange");
    }

    #[test]
    fn test_missing_frame_rejected() {
        let err = Codabar::new().encode("12345").unwrap_err();
        assert_eq!(err.category(), "InvalidCharacter");
    }

    #[test]
    fn test_interior_letters_rejected() {
        assert!(Codabar::new().encode("A1C2B").is_err());
    }
}
