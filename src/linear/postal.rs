//! # Postal Symbologies
//!
//! Japan Post four-state customer barcode and the Korea Post barcode.
//!
//! Japan Post bars come in four height classes on an eight-module grid:
//! full, ascender, descender and tracker. The translated "kasut" sequence
//! (digits, dash and eight control codes) carries a MOD-19 check value.

use crate::error::Error;
use crate::geometry::{Rectangle, TextAlign, TextBox};
use crate::linear::{check_charset, check_length, one_d_symbol, QUIET_H, QUIET_V};
use crate::symbol::{Encoder, Symbol};

/// Kasut alphabet in check-value order: digits, dash, control codes a-h.
const KASUT_SET: &str = "1234567890-abcdefgh";

/// Bar-triple table indexed by kasut value. Digits select the bar shape:
/// 1 = full, 2 = ascender, 3 = descender, 4 = tracker.
const JAPAN_TABLE: [&str; 19] = [
    "114", "132", "312", "123", "141", "321", "213", "231", "411", "144", "414", "324", "342",
    "234", "432", "243", "423", "441", "111",
];

/// Total bar height of the four-state grid, in modules.
const JAPAN_HEIGHT: i32 = 8;

/// Japan Post customer barcode encoder.
///
/// Accepts digits, uppercase letters and dash; the translated sequence is
/// padded with control code CC4 to the fixed 20-symbol field.
#[derive(Debug, Clone)]
pub struct JapanPost;

impl Default for JapanPost {
    fn default() -> Self {
        Self::new()
    }
}

impl JapanPost {
    pub fn new() -> Self {
        Self
    }

    /// Translate one content character to kasut characters.
    fn translate(c: char, out: &mut String) {
        match c {
            '0'..='9' | '-' => out.push(c),
            'A'..='J' => {
                out.push('a');
                out.push(digit_for_offset(c as u8 - b'A'));
            }
            'K'..='T' => {
                out.push('b');
                out.push(digit_for_offset(c as u8 - b'K'));
            }
            'U'..='Z' => {
                out.push('c');
                out.push(digit_for_offset(c as u8 - b'U'));
            }
            _ => unreachable!("charset checked before translation"),
        }
    }
}

/// Second character of a letter pair: '1' for the first letter of the block
/// through '0' for the tenth.
fn digit_for_offset(offset: u8) -> char {
    if offset == 9 { '0' } else { (b'1' + offset) as char }
}

/// Append the three bars of one kasut character.
fn push_bars(triple: &str, x: &mut i32, rects: &mut Vec<Rectangle>) {
    for shape in triple.bytes() {
        let (y, h) = match shape {
            b'1' => (0, JAPAN_HEIGHT),
            b'2' => (0, 5),
            b'3' => (3, 5),
            b'4' => (3, 2),
            _ => unreachable!("bar tables only hold shapes 1-4"),
        };
        rects.push(Rectangle::new(*x, y, 1, h));
        // One module bar, one module gap.
        *x += 2;
    }
}

impl Encoder for JapanPost {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 20, "Japan Post")?;
        check_charset(
            content,
            "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-",
            "Japan Post",
        )?;

        let mut kasut = String::new();
        for c in content.chars() {
            Self::translate(c, &mut kasut);
        }
        if kasut.len() > 20 {
            return Err(Error::LengthOutOfRange(
                "Japan Post data exceeds the 20-symbol field".into(),
            ));
        }
        while kasut.len() < 20 {
            kasut.push('d');
        }

        let sum: usize = kasut.chars().map(|c| KASUT_SET.find(c).unwrap()).sum();
        let check_value = (19 - sum % 19) % 19;
        let check_char = KASUT_SET.as_bytes()[check_value] as char;

        let mut rects = Vec::new();
        let mut x = 0;
        // Start: full bar, descender.
        push_bars("13", &mut x, &mut rects);
        for c in kasut.chars() {
            push_bars(JAPAN_TABLE[KASUT_SET.find(c).unwrap()], &mut x, &mut rects);
        }
        push_bars(JAPAN_TABLE[check_value], &mut x, &mut rects);
        // Stop: descender, full bar.
        push_bars("31", &mut x, &mut rects);

        Ok(Symbol {
            content: content.to_string(),
            readable: content.to_string(),
            width: x - 1,
            height: JAPAN_HEIGHT,
            rectangles: rects,
            texts: vec![TextBox::new(
                0,
                JAPAN_HEIGHT,
                x - 1,
                content,
                TextAlign::Center,
            )],
            encode_info: format!("Check Digit: {check_char}\n"),
            quiet_zone_h: QUIET_H,
            quiet_zone_v: QUIET_V,
            ..Default::default()
        })
    }
}

/// Korea Post barcode: six digits plus a MOD-10 complement check digit,
/// each digit emitted as four wide/narrow bar pairs.
#[derive(Debug, Clone)]
pub struct KoreaPost {
    height: i32,
}

impl Default for KoreaPost {
    fn default() -> Self {
        Self::new()
    }
}

impl KoreaPost {
    pub fn new() -> Self {
        Self {
            height: crate::linear::DEFAULT_HEIGHT,
        }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for KoreaPost {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.len() != 6 {
            return Err(Error::LengthOutOfRange(
                "Korea Post input must hold exactly 6 digits".into(),
            ));
        }
        check_charset(content, "0123456789", "Korea Post")?;

        let sum: u32 = content.bytes().map(|b| u32::from(b - b'0')).sum();
        let check = (10 - sum % 10) % 10;

        let mut pattern = String::new();
        for (i, b) in content
            .bytes()
            .chain(std::iter::once(b'0' + check as u8))
            .enumerate()
        {
            if i > 0 {
                pattern.push('1');
            }
            let d = b - b'0';
            for bit in (0..4).rev() {
                pattern.push_str(if d >> bit & 1 != 0 { "21" } else { "12" });
            }
            // Strip the trailing space of the final pair; the inter-digit
            // gap supplies it instead.
            pattern.pop();
        }

        let readable = format!("{content}{check}");
        let info = format!("Check Digit: {check}\n");
        one_d_symbol(
            content,
            readable,
            &pattern,
            self.height,
            TextAlign::Center,
            info,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod japan_tests {
        use super::*;

        #[test]
        fn test_bar_count_is_fixed() {
            let symbol = JapanPost::new().encode("15400233").unwrap();
            // start(2) + 20 data symbols + check, 3 bars each, + stop(2).
            assert_eq!(symbol.rectangles.len(), 2 + 21 * 3 + 2);
            assert_eq!(symbol.height, 8);
        }

        #[test]
        fn test_heights_are_four_state() {
            let symbol = JapanPost::new().encode("123").unwrap();
            for r in &symbol.rectangles {
                assert!(matches!(
                    (r.y, r.height),
                    (0, 8) | (0, 5) | (3, 5) | (3, 2)
                ));
            }
        }

        #[test]
        fn test_check_value_closes_mod_19() {
            let symbol = JapanPost::new().encode("2640011").unwrap();
            let check = symbol.info("Check Digit: ").unwrap();
            assert_eq!(check.chars().count(), 1);
            // Recompute: padded kasut + check sums to 0 mod 19.
            let mut kasut = String::new();
            for c in "2640011".chars() {
                JapanPost::translate(c, &mut kasut);
            }
            while kasut.len() < 20 {
                kasut.push('d');
            }
            kasut.push_str(check);
            let sum: usize = kasut.chars().map(|c| KASUT_SET.find(c).unwrap()).sum();
            assert_eq!(sum % 19, 0);
        }

        #[test]
        fn test_letters_double_occupancy() {
            // Eleven letters translate to 22 kasut symbols.
            let err = JapanPost::new().encode("ABCDEFGHIJK").unwrap_err();
            assert_eq!(err.category(), "LengthOutOfRange");
        }
    }

    mod korea_tests {
        use super::*;

        #[test]
        fn test_check_digit_complement() {
            // 123456: sum 21, check (10 - 1) % 10 = 9.
            let symbol = KoreaPost::new().encode("123456").unwrap();
            assert_eq!(symbol.info("Check Digit: "), Some("9"));
            assert_eq!(symbol.readable, "1234569");
        }

        #[test]
        fn test_wrong_length_rejected() {
            assert!(KoreaPost::new().encode("12345").is_err());
        }
    }
}
