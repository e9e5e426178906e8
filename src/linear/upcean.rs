//! # EAN / UPC
//!
//! The retail point-of-sale symbologies: EAN-13, EAN-8, UPC-A and UPC-E,
//! each with the optional 2- or 5-digit add-on appended after a `+` in the
//! payload (`501234567890+12`).
//!
//! Digits are drawn from two pattern sets. Set A is used on the left with
//! odd parity, set B with even parity (the EAN-13 leading digit and the
//! UPC-E check digit select the parity string), and the right half reuses
//! the set A strings — ink/paper polarity is positional, so the same width
//! fragment serves both sides.

use crate::error::Error;
use crate::geometry::{TextAlign, TextBox};
use crate::linear::{check_charset, one_d_symbol};
use crate::symbol::{Encoder, Symbol};

/// Set A digit patterns (four elements, seven modules).
const EAN_SET_A: [&str; 10] = [
    "3211", "2221", "2122", "1411", "1132", "1231", "1114", "1312", "1213", "3112",
];

/// Set B digit patterns.
const EAN_SET_B: [&str; 10] = [
    "1123", "1222", "2212", "1141", "2311", "1321", "4111", "2131", "3121", "2113",
];

/// EAN-13 left-half parity strings indexed by the leading digit.
const EAN13_PARITY: [&str; 10] = [
    "AAAAAA", "AABABB", "AABBAB", "AABBBA", "ABAABB", "ABBAAB", "ABBBAA", "ABABAB", "ABABBA",
    "ABBABA",
];

/// UPC-E parity strings for number system 0, indexed by the check digit.
/// Number system 1 swaps A and B.
const UPCE_PARITY: [&str; 10] = [
    "BBBAAA", "BBABAA", "BBAABA", "BBAAAB", "BABBAA", "BAABBA", "BAAABB", "BABABA", "BABAAB",
    "BAABAB",
];

/// Two-digit add-on parity by value mod 4.
const ADDON2_PARITY: [&str; 4] = ["AA", "AB", "BA", "BB"];

/// Five-digit add-on parity by weighted checksum.
const ADDON5_PARITY: [&str; 10] = [
    "BBAAA", "BABAA", "BAABA", "BAAAB", "ABBAA", "AABBA", "AAABB", "ABABA", "ABAAB", "AABAB",
];

/// Default bar height for the retail codes.
const EAN_HEIGHT: i32 = 60;

fn digits_of(content: &str) -> Vec<u8> {
    content.bytes().map(|b| b - b'0').collect()
}

/// Weighted EAN/UPC check digit: weights alternate `first`, `second` from
/// the leftmost digit.
fn weighted_mod10(digits: &[u8], first: u32, second: u32) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| u32::from(d) * if i % 2 == 0 { first } else { second })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn push_digit(pattern: &mut String, set: char, d: u8) {
    let table = match set {
        'A' => EAN_SET_A,
        _ => EAN_SET_B,
    };
    pattern.push_str(table[d as usize]);
}

/// Append an add-on (2 or 5 digits) after a 9-module gap, returning the
/// add-on's pattern.
fn addon_pattern(addon: &str) -> Result<String, Error> {
    check_charset(addon, "0123456789", "EAN add-on")?;
    let digits = digits_of(addon);
    let parity: String = match digits.len() {
        2 => {
            let value = u32::from(digits[0]) * 10 + u32::from(digits[1]);
            ADDON2_PARITY[(value % 4) as usize].to_string()
        }
        5 => {
            let check = (3 * (u32::from(digits[0]) + u32::from(digits[2]) + u32::from(digits[4]))
                + 9 * (u32::from(digits[1]) + u32::from(digits[3])))
                % 10;
            ADDON5_PARITY[check as usize].to_string()
        }
        n => {
            return Err(Error::LengthOutOfRange(format!(
                "add-on must hold 2 or 5 digits, found {n}"
            )));
        }
    };

    let mut pattern = String::from("112");
    for (i, (&d, p)) in digits.iter().zip(parity.chars()).enumerate() {
        if i > 0 {
            // Delineator between add-on digits.
            pattern.push_str("11");
        }
        push_digit(&mut pattern, p, d);
    }
    Ok(pattern)
}

/// Split payload into main digits and optional add-on.
fn split_addon(content: &str) -> (&str, Option<&str>) {
    match content.split_once('+') {
        Some((main, addon)) => (main, Some(addon)),
        None => (content, None),
    }
}

/// Shared assembly: main pattern plus optional add-on, justify-aligned
/// human-readable text, check-digit diagnostics.
fn retail_symbol(
    content: &str,
    readable: String,
    main_pattern: String,
    addon: Option<&str>,
    check: u8,
    height: i32,
) -> Result<Symbol, Error> {
    let mut pattern = main_pattern;
    let mut addon_text: Option<String> = None;
    if let Some(a) = addon {
        pattern.push('9');
        pattern.push_str(&addon_pattern(a)?);
        addon_text = Some(a.to_string());
    }

    let mut symbol = one_d_symbol(
        content,
        readable,
        &pattern,
        height,
        TextAlign::Justify,
        format!("Check Digit: {check}\n"),
    )?;

    if let Some(text) = addon_text {
        let addon_width: i32 = crate::plot::pattern_width(&addon_pattern(&text)?);
        symbol.texts.push(TextBox::new(
            symbol.width - addon_width,
            height,
            addon_width,
            text,
            TextAlign::Center,
        ));
    }
    Ok(symbol)
}

/// EAN-13 encoder. Accepts 12 payload digits (the check digit is computed)
/// or 13 digits with a valid check.
#[derive(Debug, Clone)]
pub struct Ean13 {
    height: i32,
}

impl Default for Ean13 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ean13 {
    pub fn new() -> Self {
        Self { height: EAN_HEIGHT }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for Ean13 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        let (main, addon) = split_addon(content);
        check_charset(main, "0123456789", "EAN-13")?;
        let mut digits = digits_of(main);
        match digits.len() {
            12 => digits.push(weighted_mod10(&digits, 1, 3)),
            13 => {
                let check = weighted_mod10(&digits[..12], 1, 3);
                if digits[12] != check {
                    return Err(Error::InvalidCharacter(format!(
                        "EAN-13 check digit should be {check}"
                    )));
                }
            }
            n => {
                return Err(Error::LengthOutOfRange(format!(
                    "EAN-13 requires 12 or 13 digits, found {n}"
                )));
            }
        }

        let parity = EAN13_PARITY[digits[0] as usize];
        let mut pattern = String::from("111");
        for (i, p) in parity.chars().enumerate() {
            push_digit(&mut pattern, p, digits[i + 1]);
        }
        pattern.push_str("11111");
        for &d in &digits[7..13] {
            push_digit(&mut pattern, 'A', d);
        }
        pattern.push_str("111");

        let readable: String = digits.iter().map(|d| (b'0' + d) as char).collect();
        retail_symbol(content, readable, pattern, addon, digits[12], self.height)
    }
}

/// EAN-8 encoder. Accepts 7 payload digits or 8 with a valid check.
#[derive(Debug, Clone)]
pub struct Ean8 {
    height: i32,
}

impl Default for Ean8 {
    fn default() -> Self {
        Self::new()
    }
}

impl Ean8 {
    pub fn new() -> Self {
        Self { height: EAN_HEIGHT }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for Ean8 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        let (main, addon) = split_addon(content);
        check_charset(main, "0123456789", "EAN-8")?;
        let mut digits = digits_of(main);
        match digits.len() {
            7 => digits.push(weighted_mod10(&digits, 3, 1)),
            8 => {
                let check = weighted_mod10(&digits[..7], 3, 1);
                if digits[7] != check {
                    return Err(Error::InvalidCharacter(format!(
                        "EAN-8 check digit should be {check}"
                    )));
                }
            }
            n => {
                return Err(Error::LengthOutOfRange(format!(
                    "EAN-8 requires 7 or 8 digits, found {n}"
                )));
            }
        }

        let mut pattern = String::from("111");
        for &d in &digits[..4] {
            push_digit(&mut pattern, 'A', d);
        }
        pattern.push_str("11111");
        for &d in &digits[4..8] {
            push_digit(&mut pattern, 'A', d);
        }
        pattern.push_str("111");

        let readable: String = digits.iter().map(|d| (b'0' + d) as char).collect();
        retail_symbol(content, readable, pattern, addon, digits[7], self.height)
    }
}

/// UPC-A encoder. Accepts 11 payload digits or 12 with a valid check.
#[derive(Debug, Clone)]
pub struct UpcA {
    height: i32,
}

impl Default for UpcA {
    fn default() -> Self {
        Self::new()
    }
}

impl UpcA {
    pub fn new() -> Self {
        Self { height: EAN_HEIGHT }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for UpcA {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        let (main, addon) = split_addon(content);
        check_charset(main, "0123456789", "UPC-A")?;
        let mut digits = digits_of(main);
        match digits.len() {
            11 => digits.push(weighted_mod10(&digits, 3, 1)),
            12 => {
                let check = weighted_mod10(&digits[..11], 3, 1);
                if digits[11] != check {
                    return Err(Error::InvalidCharacter(format!(
                        "UPC-A check digit should be {check}"
                    )));
                }
            }
            n => {
                return Err(Error::LengthOutOfRange(format!(
                    "UPC-A requires 11 or 12 digits, found {n}"
                )));
            }
        }

        let mut pattern = String::from("111");
        for &d in &digits[..6] {
            push_digit(&mut pattern, 'A', d);
        }
        pattern.push_str("11111");
        for &d in &digits[6..12] {
            push_digit(&mut pattern, 'A', d);
        }
        pattern.push_str("111");

        let readable: String = digits.iter().map(|d| (b'0' + d) as char).collect();
        retail_symbol(content, readable, pattern, addon, digits[11], self.height)
    }
}

/// UPC-E encoder: the zero-suppressed compressed form. Accepts 6 digits
/// (number system 0 assumed), 7 (with number system) or 8 (with check).
#[derive(Debug, Clone)]
pub struct UpcE {
    height: i32,
}

impl Default for UpcE {
    fn default() -> Self {
        Self::new()
    }
}

impl UpcE {
    pub fn new() -> Self {
        Self { height: EAN_HEIGHT }
    }

    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }

    /// Expand the six compressed digits to the eleven UPC-A payload digits.
    fn expand(number_system: u8, d: &[u8]) -> Vec<u8> {
        let mut upca = vec![number_system];
        match d[5] {
            0..=2 => {
                upca.extend_from_slice(&[d[0], d[1], d[5], 0, 0, 0, 0, d[2], d[3], d[4]]);
            }
            3 => {
                upca.extend_from_slice(&[d[0], d[1], d[2], 0, 0, 0, 0, 0, d[3], d[4]]);
            }
            4 => {
                upca.extend_from_slice(&[d[0], d[1], d[2], d[3], 0, 0, 0, 0, 0, d[4]]);
            }
            _ => {
                upca.extend_from_slice(&[d[0], d[1], d[2], d[3], d[4], 0, 0, 0, 0, d[5]]);
            }
        }
        upca
    }
}

impl Encoder for UpcE {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        let (main, addon) = split_addon(content);
        check_charset(main, "0123456789", "UPC-E")?;
        let digits = digits_of(main);
        let (number_system, body, given_check) = match digits.len() {
            6 => (0u8, digits.clone(), None),
            7 => (digits[0], digits[1..].to_vec(), None),
            8 => (digits[0], digits[1..7].to_vec(), Some(digits[7])),
            n => {
                return Err(Error::LengthOutOfRange(format!(
                    "UPC-E requires 6 to 8 digits, found {n}"
                )));
            }
        };
        if number_system > 1 {
            return Err(Error::InvalidCharacter(
                "UPC-E number system must be 0 or 1".into(),
            ));
        }

        let upca = Self::expand(number_system, &body);
        let check = weighted_mod10(&upca, 3, 1);
        if let Some(given) = given_check {
            if given != check {
                return Err(Error::InvalidCharacter(format!(
                    "UPC-E check digit should be {check}"
                )));
            }
        }

        let parity = UPCE_PARITY[check as usize];
        let mut pattern = String::from("111");
        for (&d, p) in body.iter().zip(parity.chars()) {
            // Number system 1 inverts the parity pattern.
            let set = if (p == 'A') ^ (number_system == 1) {
                'A'
            } else {
                'B'
            };
            push_digit(&mut pattern, set, d);
        }
        pattern.push_str("111111");

        let readable: String = std::iter::once(number_system)
            .chain(body.iter().copied())
            .chain(std::iter::once(check))
            .map(|d| (b'0' + d) as char)
            .collect();
        retail_symbol(content, readable, pattern, addon, check, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;

    mod ean13_tests {
        use super::*;

        #[test]
        fn test_check_digit_and_guards() {
            let symbol = Ean13::new().encode("501234567890").unwrap();
            assert_eq!(symbol.readable, "5012345678900");
            assert_eq!(symbol.info("Check Digit: "), Some("0"));
            assert_eq!(symbol.width, 95);
            // Left guard bars at 0 and 2.
            assert_eq!(symbol.rectangles[0], Rectangle::new(0, 0, 1, 60));
            assert_eq!(symbol.rectangles[1], Rectangle::new(2, 0, 1, 60));
            // Right guard ends at the symbol edge.
            let last = symbol.rectangles.last().unwrap();
            assert_eq!(last.x + last.width, 95);
        }

        #[test]
        fn test_given_check_digit_validated() {
            assert!(Ean13::new().encode("5012345678900").is_ok());
            let err = Ean13::new().encode("5012345678901").unwrap_err();
            assert_eq!(err.category(), "InvalidCharacter");
        }

        #[test]
        fn test_justify_alignment() {
            let symbol = Ean13::new().encode("501234567890").unwrap();
            assert_eq!(symbol.texts[0].alignment, TextAlign::Justify);
        }

        #[test]
        fn test_five_digit_addon() {
            let plain = Ean13::new().encode("501234567890").unwrap();
            let symbol = Ean13::new().encode("501234567890+12345").unwrap();
            assert!(symbol.width > plain.width + 9);
            assert_eq!(symbol.texts.len(), 2);
            assert_eq!(symbol.texts[1].text, "12345");
        }
    }

    mod ean8_tests {
        use super::*;

        #[test]
        fn test_check_digit() {
            // 7 digits 1234567: 3+2+9+4+15+6+21 = 60, check 0.
            let symbol = Ean8::new().encode("1234567").unwrap();
            assert_eq!(symbol.readable, "12345670");
            assert_eq!(symbol.width, 67);
        }
    }

    mod upca_tests {
        use super::*;

        #[test]
        fn test_known_upc() {
            let symbol = UpcA::new().encode("01234567890").unwrap();
            assert_eq!(symbol.readable, "012345678905");
            assert_eq!(symbol.width, 95);
        }
    }

    mod upce_tests {
        use super::*;

        #[test]
        fn test_expansion_matches_upca_check() {
            // 425261 expands (last digit 1) to 04252610000 with check 4.
            let symbol = UpcE::new().encode("425261").unwrap();
            assert_eq!(symbol.readable, "04252614");
            assert_eq!(symbol.width, 51);
        }

        #[test]
        fn test_number_system_above_one_rejected() {
            let err = UpcE::new().encode("2123456").unwrap_err();
            assert_eq!(err.category(), "InvalidCharacter");
        }
    }

    mod addon_tests {
        use super::*;

        #[test]
        fn test_two_digit_parity() {
            // Value 12 mod 4 = 0 -> "AA".
            assert_eq!(ADDON2_PARITY[12 % 4], "AA");
            let pattern = addon_pattern("12").unwrap();
            // Guard (4) + digit (7) + delineator (2) + digit (7).
            assert_eq!(crate::plot::pattern_width(&pattern), 20);
        }

        #[test]
        fn test_addon_other_lengths_rejected() {
            assert!(addon_pattern("123").is_err());
        }
    }
}
