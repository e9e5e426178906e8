//! # Code 39 Family
//!
//! Code 39 and the symbologies layered on top of it: Extended Code 39
//! (full ASCII via shift pairs), LOGMARS (uppercase, mandatory MOD-43
//! check), Pharmazentralnummer and Code 32 (Italian pharmacode).
//!
//! ## Example
//!
//! ```
//! use cebra::linear::code39::Code39;
//! use cebra::symbol::Encoder;
//!
//! let symbol = Code39::new().encode("HELLO").unwrap();
//! assert_eq!(symbol.readable, "*HELLO*");
//! ```

use crate::error::Error;
use crate::geometry::TextAlign;
use crate::input::{mod43_check, CODE39_CHARSET};
use crate::linear::{check_charset, check_length, one_d_symbol, DEFAULT_HEIGHT};
use crate::symbol::{Encoder, Symbol};

/// Width patterns indexed by position in [`CODE39_CHARSET`]; nine elements
/// per character, bars and spaces alternating, three wide.
const CODE39_TABLE: [&str; 43] = [
    "111221211", "211211112", "112211112", "212211111", "111221112", "211221111", "112221111",
    "111211212", "211211211", "112211211", "211112112", "112112112", "212112111", "111122112",
    "211122111", "112122111", "111112212", "211112211", "112112211", "111122211", "211111122",
    "112111122", "212111121", "111121122", "211121121", "112121121", "111111222", "211111221",
    "112111221", "111121221", "221111112", "122111112", "222111111", "121121112", "221121111",
    "122121111", "121111212", "221111211", "122111211", "121212111", "121211121", "121112121",
    "111212121",
];

/// Start/stop character `*`.
const CODE39_START_STOP: &str = "121121211";

/// Extended Code 39 shift pairs for the 128 ASCII code points.
const EXT39_TABLE: [&str; 128] = [
    "%U", "$A", "$B", "$C", "$D", "$E", "$F", "$G", "$H", "$I", "$J", "$K", "$L", "$M", "$N",
    "$O", "$P", "$Q", "$R", "$S", "$T", "$U", "$V", "$W", "$X", "$Y", "$Z", "%A", "%B", "%C",
    "%D", "%E", " ", "/A", "/B", "/C", "/D", "/E", "/F", "/G", "/H", "/I", "/J", "/K", "/L",
    "-", ".", "/O", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "/Z", "%F", "%G", "%H",
    "%I", "%J", "%V", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N",
    "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "%K", "%L", "%M", "%N", "%O",
    "%W", "+A", "+B", "+C", "+D", "+E", "+F", "+G", "+H", "+I", "+J", "+K", "+L", "+M", "+N",
    "+O", "+P", "+Q", "+R", "+S", "+T", "+U", "+V", "+W", "+X", "+Y", "+Z", "%P", "%Q", "%R",
    "%S", "%T",
];

/// Build the framed width pattern for a Code 39 body, with the one-module
/// inter-character gap after every character.
fn assemble(body: &str) -> String {
    let mut pattern = String::from(CODE39_START_STOP);
    for c in body.chars() {
        let idx = CODE39_CHARSET.find(c).unwrap();
        pattern.push('1');
        pattern.push_str(CODE39_TABLE[idx]);
    }
    pattern.push('1');
    pattern.push_str(CODE39_START_STOP);
    pattern
}

/// Code 39 encoder.
///
/// Accepts the 43-character alphabet (digits, uppercase letters and
/// `- . $ / + %` plus space). The MOD-43 check digit is optional and off by
/// default.
#[derive(Debug, Clone)]
pub struct Code39 {
    mod43: bool,
    height: i32,
}

impl Default for Code39 {
    fn default() -> Self {
        Self::new()
    }
}

impl Code39 {
    pub fn new() -> Self {
        Self {
            mod43: false,
            height: DEFAULT_HEIGHT,
        }
    }

    /// Append the optional MOD-43 check character.
    pub fn mod43_check(mut self, enabled: bool) -> Self {
        self.mod43 = enabled;
        self
    }

    /// Set the bar height in modules.
    pub fn height(mut self, height: i32) -> Self {
        self.height = height.max(1);
        self
    }
}

impl Encoder for Code39 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 80, "Code 39")?;
        check_charset(content, CODE39_CHARSET, "Code 39")?;

        let mut body = content.to_string();
        let mut info = String::new();
        if self.mod43 {
            let check = mod43_check(content)?;
            body.push(check);
            info.push_str(&format!("Check Digit: {check}\n"));
        }

        one_d_symbol(
            content,
            format!("*{body}*"),
            &assemble(&body),
            self.height,
            TextAlign::Center,
            info,
        )
    }
}

/// Extended Code 39: full ASCII, each code point expanded to a shift pair
/// from [`EXT39_TABLE`] before regular Code 39 encoding.
#[derive(Debug, Clone)]
pub struct ExtendedCode39 {
    height: i32,
}

impl Default for ExtendedCode39 {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtendedCode39 {
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

impl Encoder for ExtendedCode39 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 40, "Extended Code 39")?;
        let mut body = String::with_capacity(content.len() * 2);
        for c in content.chars() {
            let idx = c as usize;
            if idx >= 128 {
                return Err(Error::InvalidCharacter(format!(
                    "character {c:?} not valid in Extended Code 39"
                )));
            }
            body.push_str(EXT39_TABLE[idx]);
        }

        one_d_symbol(
            content,
            content,
            &assemble(&body),
            self.height,
            TextAlign::Center,
            String::new(),
        )
    }
}

/// LOGMARS: the US military Code 39 profile — input is uppercased and the
/// MOD-43 check character is mandatory.
#[derive(Debug, Clone)]
pub struct Logmars {
    height: i32,
}

impl Default for Logmars {
    fn default() -> Self {
        Self::new()
    }
}

impl Logmars {
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

impl Encoder for Logmars {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        let upper = content.to_ascii_uppercase();
        Code39::new()
            .mod43_check(true)
            .height(self.height)
            .encode(&upper)
    }
}

/// Pharmazentralnummer: a seven-digit German pharmaceutical number carried
/// in Code 39. Input is the six payload digits; the MOD-11 check digit is
/// computed with weights 2..7 and a weighted value of 10 is rejected.
#[derive(Debug, Clone)]
pub struct Pzn {
    height: i32,
}

impl Default for Pzn {
    fn default() -> Self {
        Self::new()
    }
}

impl Pzn {
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

impl Encoder for Pzn {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.len() != 6 {
            return Err(Error::LengthOutOfRange(
                "PZN input must hold exactly 6 digits".into(),
            ));
        }
        check_charset(content, "0123456789", "PZN")?;

        let sum: u32 = content
            .bytes()
            .enumerate()
            .map(|(i, b)| (i as u32 + 2) * u32::from(b - b'0'))
            .sum();
        let check = sum % 11;
        if check == 10 {
            return Err(Error::InvalidCharacter(
                "PZN check value 10 is not assigned".into(),
            ));
        }

        let body = format!("-{content}{check}");
        let symbol = Code39::new().height(self.height).encode(&body)?;
        Ok(Symbol {
            content: content.to_string(),
            readable: format!("PZN - {content}{check}"),
            texts: {
                let mut texts = symbol.texts.clone();
                if let Some(t) = texts.first_mut() {
                    t.text = format!("PZN - {content}{check}");
                }
                texts
            },
            encode_info: format!("Check Digit: {check}\n"),
            ..symbol
        })
    }
}

/// Code 32 alphabet: base-32 digits with the vowels removed.
const CODE32_CHARSET: &[u8; 32] = b"0123456789BCDFGHJKLMNPQRSTUVWXYZ";

/// Code 32 (Italian pharmacode): eight digits plus a MOD-10 check, the
/// nine-digit value recoded in base 32 and carried in Code 39.
#[derive(Debug, Clone)]
pub struct Code32 {
    height: i32,
}

impl Default for Code32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Code32 {
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

impl Encoder for Code32 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.len() != 8 {
            return Err(Error::LengthOutOfRange(
                "Code 32 input must hold exactly 8 digits".into(),
            ));
        }
        check_charset(content, "0123456789", "Code 32")?;

        // Odd positions count once, even positions doubled with digit sum.
        let mut sum = 0u32;
        for (i, b) in content.bytes().enumerate() {
            let d = u32::from(b - b'0');
            if i % 2 == 0 {
                sum += d;
            } else {
                let dd = d * 2;
                sum += dd / 10 + dd % 10;
            }
        }
        let check = sum % 10;

        let value: u64 = format!("{content}{check}").parse().map_err(|_| {
            Error::InternalInvariant("Code 32 numeric conversion failed".into())
        })?;
        let mut recoded = [b'0'; 6];
        let mut v = value;
        for slot in recoded.iter_mut().rev() {
            *slot = CODE32_CHARSET[(v % 32) as usize];
            v /= 32;
        }
        let body = String::from_utf8_lossy(&recoded).into_owned();

        let symbol = Code39::new().height(self.height).encode(&body)?;
        let readable = format!("A{content}{check}");
        Ok(Symbol {
            content: content.to_string(),
            readable: readable.clone(),
            texts: {
                let mut texts = symbol.texts.clone();
                if let Some(t) = texts.first_mut() {
                    t.text = readable;
                }
                texts
            },
            encode_info: format!("Check Digit: {check}\n"),
            ..symbol
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::pattern_width;

    mod code39_tests {
        use super::*;

        #[test]
        fn test_hello_frame() {
            let symbol = Code39::new().encode("HELLO").unwrap();
            assert_eq!(symbol.readable, "*HELLO*");
            assert_eq!(symbol.texts.len(), 1);
            // Start character plus gap, then the body.
            let first = &symbol.rectangles[0];
            assert_eq!((first.x, first.width), (0, 1));
        }

        #[test]
        fn test_pattern_edges() {
            let body = assemble("HELLO");
            assert!(body.starts_with("1211212111"));
            assert!(body.ends_with("121121211"));
        }

        #[test]
        fn test_width_accounts_for_gaps() {
            // Each character is 13 modules including its gap; the stop
            // character has no trailing gap.
            let symbol = Code39::new().encode("AB").unwrap();
            assert_eq!(symbol.width, 13 * 3 + 12);
        }

        #[test]
        fn test_mod43_check_digit() {
            let symbol = Code39::new().mod43_check(true).encode("CODE39").unwrap();
            let check = symbol.info("Check Digit: ").unwrap();
            assert_eq!(check.len(), 1);
            // The check character participates in the readable body.
            assert!(symbol.readable.contains(check));
        }

        #[test]
        fn test_rejects_lowercase() {
            let err = Code39::new().encode("hello").unwrap_err();
            assert_eq!(err.category(), "InvalidCharacter");
        }
    }

    mod extended_tests {
        use super::*;

        #[test]
        fn test_lowercase_expands_to_pairs() {
            let plain = Code39::new().encode("+A").unwrap();
            let ext = ExtendedCode39::new().encode("a").unwrap();
            assert_eq!(ext.width, plain.width);
        }

        #[test]
        fn test_rejects_non_ascii() {
            assert!(ExtendedCode39::new().encode("é").is_err());
        }
    }

    mod logmars_tests {
        use super::*;

        #[test]
        fn test_uppercases_and_checks() {
            let symbol = Logmars::new().encode("abc").unwrap();
            assert!(symbol.readable.starts_with("*ABC"));
            assert!(symbol.info("Check Digit: ").is_some());
        }
    }

    mod pzn_tests {
        use super::*;

        #[test]
        fn test_check_digit_weights() {
            // 123456: 1*2+2*3+3*4+4*5+5*6+6*7 = 112, 112 % 11 = 2
            let symbol = Pzn::new().encode("123456").unwrap();
            assert_eq!(symbol.info("Check Digit: "), Some("2"));
            assert_eq!(symbol.readable, "PZN - 1234562");
        }

        #[test]
        fn test_check_ten_rejected() {
            // 006600: 6*4 + 6*5 = 54, 54 % 11 = 10
            let err = Pzn::new().encode("006600").unwrap_err();
            assert_eq!(err.category(), "InvalidCharacter");
        }

        #[test]
        fn test_wrong_length_rejected() {
            assert!(Pzn::new().encode("12345").is_err());
        }
    }

    mod code32_tests {
        use super::*;

        #[test]
        fn test_readable_carries_a_prefix() {
            let symbol = Code32::new().encode("01234567").unwrap();
            assert!(symbol.readable.starts_with("A01234567"));
            assert_eq!(symbol.readable.len(), 10);
        }

        #[test]
        fn test_six_code39_characters() {
            let symbol = Code32::new().encode("01234567").unwrap();
            // Start + 6 characters + stop, 13 modules each with gap, stop
            // without gap.
            assert_eq!(symbol.width, 13 * 7 + 12);
        }

        #[test]
        fn test_rejects_non_digits() {
            assert!(Code32::new().encode("1234567X").is_err());
        }
    }

    #[test]
    fn test_table_widths_are_twelve_modules() {
        for pattern in CODE39_TABLE {
            assert_eq!(pattern_width(pattern), 12);
        }
        assert_eq!(pattern_width(CODE39_START_STOP), 12);
    }
}
