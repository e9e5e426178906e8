//! # Code 11
//!
//! Numeric symbology (digits plus dash) used for telecom equipment
//! labelling, with the C and K dual check digits.

use crate::error::Error;
use crate::geometry::TextAlign;
use crate::linear::{check_charset, check_length, one_d_symbol, DEFAULT_HEIGHT};
use crate::symbol::{Encoder, Symbol};

const CODE11_CHARSET: &str = "0123456789-";

/// Width patterns in charset order; five elements per character.
const CODE11_TABLE: [&str; 11] = [
    "11112", "21112", "12112", "22111", "11212", "21211", "12211", "11122", "21121", "21111",
    "11211",
];

/// Start/stop character.
const CODE11_START_STOP: &str = "11221";

/// Code 11 encoder.
#[derive(Debug, Clone)]
pub struct Code11 {
    height: i32,
}

impl Default for Code11 {
    fn default() -> Self {
        Self::new()
    }
}

impl Code11 {
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

/// Modulo-11 weighted sum, weights cycling 1..`max_weight` from the
/// rightmost value.
fn weighted_check(values: &[u8], max_weight: u32) -> u8 {
    let mut sum = 0u32;
    for (i, &v) in values.iter().rev().enumerate() {
        let weight = (i as u32) % max_weight + 1;
        sum += weight * u32::from(v);
    }
    (sum % 11) as u8
}

impl Encoder for Code11 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        check_length(content, 80, "Code 11")?;
        check_charset(content, CODE11_CHARSET, "Code 11")?;

        let values: Vec<u8> = content
            .chars()
            .map(|c| CODE11_CHARSET.find(c).unwrap() as u8)
            .collect();

        let c_check = weighted_check(&values, 10);
        let mut with_c = values.clone();
        with_c.push(c_check);
        let k_check = weighted_check(&with_c, 9);
        with_c.push(k_check);

        let mut pattern = String::from(CODE11_START_STOP);
        for &v in &with_c {
            pattern.push('1');
            pattern.push_str(CODE11_TABLE[v as usize]);
        }
        pattern.push('1');
        pattern.push_str(CODE11_START_STOP);

        let check_char = |v: u8| CODE11_CHARSET.as_bytes()[v as usize] as char;
        let readable = format!(
            "{content}{}{}",
            check_char(c_check),
            check_char(k_check)
        );
        let info = format!(
            "Check Digit C: {}\nCheck Digit K: {}\n",
            check_char(c_check),
            check_char(k_check)
        );

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

    #[test]
    fn test_check_digits() {
        // "123-45": values 1,2,3,10,4,5.
        // C: 5*1 + 4*2 + 10*3 + 3*4 + 2*5 + 1*6 = 71, 71 % 11 = 5
        // K over 1,2,3,10,4,5,5:
        //    5*1 + 5*2 + 4*3 + 10*4 + 3*5 + 2*6 + 1*7 = 101, 101 % 11 = 2
        let symbol = Code11::new().encode("123-45").unwrap();
        assert_eq!(symbol.info("Check Digit C: "), Some("5"));
        assert_eq!(symbol.info("Check Digit K: "), Some("2"));
        assert_eq!(symbol.readable, "123-4552");
    }

    #[test]
    fn test_dash_is_value_ten() {
        let symbol = Code11::new().encode("-").unwrap();
        // C over [10]: 10 % 11 = 10 -> '-', K over [10, 10]:
        // 10*1 + 10*2 = 30 % 11 = 8.
        assert_eq!(symbol.readable, "--8");
    }

    #[test]
    fn test_rejects_letters() {
        assert_eq!(
            Code11::new().encode("12A").unwrap_err().category(),
            "InvalidCharacter"
        );
    }
}
