//! # Code 93
//!
//! Continuous full-ASCII symbology with two mandatory modulo-47 check
//! characters. Non-native ASCII is reached through four shift characters,
//! mirroring the Extended Code 39 pairing.

use crate::error::Error;
use crate::geometry::TextAlign;
use crate::linear::{check_length, one_d_symbol, DEFAULT_HEIGHT};
use crate::symbol::{Encoder, Symbol};

/// Native character values 0..46: the Code 39 set followed by the four
/// shift characters ($), (%), (/) and (+).
const CODE93_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Width patterns for values 0..47; value 47 is the start/stop character.
/// Six elements per character (three bars, three spaces), nine modules.
const CODE93_TABLE: [&str; 48] = [
    "131112", "111213", "111312", "111411", "121113", "121212", "121311", "111114", "131211",
    "141111", "211113", "211212", "211311", "221112", "221211", "231111", "112113", "112212",
    "112311", "122112", "132111", "111123", "111222", "111321", "121122", "131121", "212112",
    "212211", "211122", "211221", "221121", "222111", "112122", "112221", "122121", "123121",
    "121131", "311112", "311211", "321111", "112131", "113121", "211131", "121221", "312111",
    "311121", "122211", "111141",
];

/// Shift pairs for the 128 ASCII code points; the first character of a pair
/// is one of the shift values 43..46.
const EXT93_TABLE: [&str; 128] = [
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

/// Value of the shift character that introduces an extended pair.
fn shift_value(c: char) -> u8 {
    match c {
        '$' => 43,
        '%' => 44,
        '/' => 45,
        '+' => 46,
        _ => unreachable!("extended table only uses the four shift characters"),
    }
}

/// Code 93 encoder.
#[derive(Debug, Clone)]
pub struct Code93 {
    height: i32,
}

impl Default for Code93 {
    fn default() -> Self {
        Self::new()
    }
}

impl Code93 {
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

impl Encoder for Code93 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 80, "Code 93")?;

        // Expand to native values, shifting non-native ASCII.
        let mut values: Vec<u8> = Vec::with_capacity(content.len());
        for c in content.chars() {
            let idx = c as usize;
            if idx >= 128 {
                return Err(Error::InvalidCharacter(format!(
                    "character {c:?} not valid in Code 93"
                )));
            }
            match CODE93_CHARSET.find(c) {
                // Shift characters themselves are encoded through the
                // extended table so a reader sees the literal glyph.
                Some(v) if !"$%/+".contains(c) => values.push(v as u8),
                _ => {
                    let pair = EXT93_TABLE[idx];
                    if pair.len() == 2 {
                        let mut it = pair.chars();
                        values.push(shift_value(it.next().unwrap()));
                        values.push(CODE93_CHARSET.find(it.next().unwrap()).unwrap() as u8);
                    } else {
                        values.push(CODE93_CHARSET.find(pair.chars().next().unwrap()).unwrap()
                            as u8);
                    }
                }
            }
        }

        // Check character C: weights cycle 1..20 from the rightmost value.
        let c_check = weighted_check(&values, 20);
        let mut with_c = values.clone();
        with_c.push(c_check);
        // Check character K: weights cycle 1..15, C included.
        let k_check = weighted_check(&with_c, 15);

        let mut pattern = String::from(CODE93_TABLE[47]);
        for &v in values.iter().chain([c_check, k_check].iter()) {
            pattern.push_str(CODE93_TABLE[v as usize]);
        }
        pattern.push_str(CODE93_TABLE[47]);
        // Termination bar.
        pattern.push('1');

        let info = format!(
            "Check Digit C: {}\nCheck Digit K: {}\n",
            CODE93_CHARSET.as_bytes()[c_check as usize] as char,
            CODE93_CHARSET.as_bytes()[k_check as usize] as char
        );

        one_d_symbol(
            content,
            content,
            &pattern,
            self.height,
            TextAlign::Center,
            info,
        )
    }
}

/// Modulo-47 weighted sum with weights cycling 1..`max_weight` from the
/// rightmost value.
fn weighted_check(values: &[u8], max_weight: u32) -> u8 {
    let mut sum = 0u32;
    for (i, &v) in values.iter().rev().enumerate() {
        let weight = (i as u32) % max_weight + 1;
        sum += weight * u32::from(v);
    }
    (sum % 47) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::pattern_width;

    #[test]
    fn test_all_characters_are_nine_modules() {
        for pattern in CODE93_TABLE {
            assert_eq!(pattern_width(pattern), 9);
        }
    }

    #[test]
    fn test_check_weights_cycle() {
        // "TEST93": values T=29, E=14, S=28, T=29, 9=9, 3=3.
        let values = [29u8, 14, 28, 29, 9, 3];
        let c = weighted_check(&values, 20);
        // 3*1 + 9*2 + 29*3 + 28*4 + 14*5 + 29*6 = 464, 464 % 47 = 41
        assert_eq!(c, 41);
    }

    #[test]
    fn test_symbol_layout() {
        let symbol = Code93::new().encode("TEST93").unwrap();
        // start + 6 data + C + K + stop, 9 modules each, plus termination.
        assert_eq!(symbol.width, 9 * 10 + 1);
        assert_eq!(symbol.readable, "TEST93");
        assert!(symbol.info("Check Digit C: ").is_some());
        assert!(symbol.info("Check Digit K: ").is_some());
    }

    #[test]
    fn test_extended_ascii_shifts() {
        let symbol = Code93::new().encode("a").unwrap();
        // One shift pair: start + 2 + C + K + stop + termination.
        assert_eq!(symbol.width, 9 * 5 + 1);
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert!(Code93::new().encode("ü").is_err());
    }
}
