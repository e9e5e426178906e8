//! # Input Layer
//!
//! Payload preprocessing shared by the symbology encoders: escape-sequence
//! expansion for front ends, ECI byte mapping, GS1 Application Identifier
//! parsing and HIBC framing.
//!
//! ## GS1
//!
//! GS1 payloads use bracket syntax: `[01]98898765432106[3202]012345`. The
//! brackets are stripped, AI syntax and well-known AI lengths are validated,
//! and a group separator (0x1D) is inserted after every variable-length
//! field that is not the last one. Symbology encoders translate the leading
//! position and each separator into FNC1.
//!
//! ## HIBC
//!
//! HIBC payloads are wrapped as `+<data><check>` where the check character
//! is the MOD-43 sum over the Code 39 alphabet, computed across the leading
//! `+` and the data.

use crate::error::Error;

/// Group separator byte standing in for FNC1 inside processed GS1 content.
pub const GS1_SEPARATOR: char = '\u{1d}';

/// The 43-character Code 39 alphabet, also used for MOD-43 checks.
pub(crate) const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Expand backslash escape sequences as the command-line front end defines
/// them: named single-byte escapes, `\xNN` and `\uNNNN`.
pub fn unescape(input: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\u{00}'),
            Some('E') => out.push('\u{04}'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('t') => out.push('\u{09}'),
            Some('n') => out.push('\u{0a}'),
            Some('v') => out.push('\u{0b}'),
            Some('f') => out.push('\u{0c}'),
            Some('r') => out.push('\u{0d}'),
            Some('e') => out.push('\u{1b}'),
            Some('G') => out.push('\u{1d}'),
            Some('R') => out.push('\u{1e}'),
            Some('\\') => out.push('\\'),
            Some('x') => out.push(hex_escape(&mut chars, 2)?),
            Some('u') => out.push(hex_escape(&mut chars, 4)?),
            Some(other) => {
                return Err(Error::InvalidCharacter(format!(
                    "unknown escape sequence \\{other}"
                )));
            }
            None => {
                return Err(Error::InvalidCharacter(
                    "trailing backslash in input".into(),
                ));
            }
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, Error> {
    let mut value = 0u32;
    for _ in 0..digits {
        let d = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| Error::InvalidCharacter("malformed hex escape".into()))?;
        value = value * 16 + d;
    }
    char::from_u32(value)
        .ok_or_else(|| Error::InvalidCharacter(format!("escape U+{value:04X} is not a character")))
}

/// Map content to the ISO-8859-1 byte stream (ECI 3, the default).
///
/// Characters outside Latin-1 cannot be represented and fail validation.
pub fn to_latin1(content: &str) -> Result<Vec<u8>, Error> {
    content
        .chars()
        .map(|c| {
            u8::try_from(c as u32).map_err(|_| {
                Error::InvalidCharacter(format!(
                    "character {c:?} cannot be encoded in ISO-8859-1"
                ))
            })
        })
        .collect()
}

/// AI prefixes with a predefined total length (AI digits + data digits), per
/// the GS1 General Specifications fixed-length table.
const GS1_FIXED_LENGTHS: [(u8, usize); 22] = [
    (0, 20),
    (1, 16),
    (2, 16),
    (3, 16),
    (4, 18),
    (11, 8),
    (12, 8),
    (13, 8),
    (14, 8),
    (15, 8),
    (16, 8),
    (17, 8),
    (18, 8),
    (19, 8),
    (20, 4),
    (31, 10),
    (32, 10),
    (33, 10),
    (34, 10),
    (35, 10),
    (36, 10),
    (41, 16),
];

fn gs1_fixed_length(prefix: u8) -> Option<usize> {
    GS1_FIXED_LENGTHS
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, len)| *len)
}

/// Parse and validate GS1 bracket syntax, returning the processed content:
/// brackets stripped, with a group separator after each variable-length
/// field that another AI follows.
pub fn gs1_process(content: &str) -> Result<String, Error> {
    if !content.starts_with('[') {
        return Err(Error::InvalidCharacter(
            "GS1 data must start with an AI in brackets".into(),
        ));
    }
    for c in content.chars() {
        if c.is_ascii_control() || !c.is_ascii() {
            return Err(Error::InvalidCharacter(format!(
                "character {c:?} not permitted in GS1 data"
            )));
        }
    }

    struct Field {
        ai: String,
        data: String,
    }
    let mut fields: Vec<Field> = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(Error::InvalidCharacter(
                "data outside brackets must follow an AI".into(),
            ));
        };
        let Some(close) = inner.find(']') else {
            return Err(Error::InvalidCharacter("unterminated AI bracket".into()));
        };
        let ai = &inner[..close];
        if !(2..=4).contains(&ai.len()) || !ai.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCharacter(format!(
                "malformed application identifier [{ai}]"
            )));
        }
        let after = &inner[close + 1..];
        let data_end = after.find('[').unwrap_or(after.len());
        let data = &after[..data_end];
        if data.is_empty() || data.len() > 90 {
            return Err(Error::LengthOutOfRange(format!(
                "AI [{ai}] field must hold 1 to 90 characters"
            )));
        }
        fields.push(Field {
            ai: ai.to_string(),
            data: data.to_string(),
        });
        rest = &after[data_end..];
    }

    // Well-known AI length rules.
    for f in &fields {
        let prefix: u8 = f.ai[..2].parse().unwrap_or(u8::MAX);
        if let Some(total) = gs1_fixed_length(prefix) {
            let expected = total - f.ai.len();
            if f.data.len() != expected {
                return Err(Error::LengthOutOfRange(format!(
                    "AI [{}] requires exactly {expected} characters",
                    f.ai
                )));
            }
        }
        if f.ai == "253" && !(13..=17).contains(&f.data.len()) {
            return Err(Error::LengthOutOfRange(
                "AI [253] requires 13 to 17 characters".into(),
            ));
        }
    }

    let mut out = String::new();
    for (i, f) in fields.iter().enumerate() {
        out.push_str(&f.ai);
        out.push_str(&f.data);
        let variable = gs1_fixed_length(f.ai[..2].parse().unwrap_or(u8::MAX)).is_none();
        if variable && i + 1 < fields.len() {
            out.push(GS1_SEPARATOR);
        }
    }
    Ok(out)
}

/// MOD-43 check character over the Code 39 alphabet.
pub(crate) fn mod43_check(data: &str) -> Result<char, Error> {
    let mut sum = 0usize;
    for c in data.chars() {
        let v = CODE39_CHARSET.find(c).ok_or_else(|| {
            Error::InvalidCharacter(format!("character {c:?} not in the MOD-43 alphabet"))
        })?;
        sum += v;
    }
    Ok(CODE39_CHARSET.as_bytes()[sum % 43] as char)
}

/// Wrap content in HIBC framing: leading `+`, trailing MOD-43 check
/// character computed across the `+` and the data.
pub fn hibc_wrap(content: &str) -> Result<String, Error> {
    if content.is_empty() || content.len() > 36 {
        return Err(Error::LengthOutOfRange(
            "HIBC data must hold 1 to 36 characters".into(),
        ));
    }
    let framed = format!("+{content}");
    // '+' carries its alphabet value in the sum.
    let check = mod43_check(&framed)?;
    Ok(format!("{framed}{check}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod unescape_tests {
        use super::*;

        #[test]
        fn test_named_escapes() {
            assert_eq!(unescape(r"A\tB\nC").unwrap(), "A\tB\nC");
            assert_eq!(unescape(r"\G\R").unwrap(), "\u{1d}\u{1e}");
            assert_eq!(unescape(r"\\").unwrap(), "\\");
        }

        #[test]
        fn test_hex_escapes() {
            assert_eq!(unescape(r"\x41é").unwrap(), "Aé");
        }

        #[test]
        fn test_bad_escape_rejected() {
            assert_eq!(
                unescape(r"\q").unwrap_err().category(),
                "InvalidCharacter"
            );
            assert!(unescape(r"\x4").is_err());
        }
    }

    mod latin1_tests {
        use super::*;

        #[test]
        fn test_maps_high_latin1() {
            assert_eq!(to_latin1("Aé").unwrap(), vec![0x41, 0xE9]);
        }

        #[test]
        fn test_rejects_outside_latin1() {
            assert_eq!(
                to_latin1("€").unwrap_err().category(),
                "InvalidCharacter"
            );
        }
    }

    mod gs1_tests {
        use super::*;

        #[test]
        fn test_strips_brackets_fixed_length() {
            // Fixed-length AI 01 followed by AI 10: no separator after 01.
            let out = gs1_process("[01]98898765432106[10]ABC123").unwrap();
            assert_eq!(out, "019889876543210610ABC123");
        }

        #[test]
        fn test_separator_after_variable_field() {
            let out = gs1_process("[10]ABC123[21]54321").unwrap();
            assert_eq!(out, format!("10ABC123{GS1_SEPARATOR}2154321"));
        }

        #[test]
        fn test_ai_253_length_rule() {
            assert!(gs1_process("[253]1234567890123").is_ok());
            let err = gs1_process("[253]123456").unwrap_err();
            assert_eq!(err.category(), "LengthOutOfRange");
        }

        #[test]
        fn test_fixed_length_mismatch_rejected() {
            let err = gs1_process("[01]123").unwrap_err();
            assert_eq!(err.category(), "LengthOutOfRange");
        }

        #[test]
        fn test_malformed_brackets_rejected() {
            assert!(gs1_process("0198898765432106").is_err());
            assert!(gs1_process("[01").is_err());
            assert!(gs1_process("[ABC]123").is_err());
        }
    }

    mod hibc_tests {
        use super::*;

        #[test]
        fn test_wrap_appends_plus_and_check() {
            let wrapped = hibc_wrap("A99912345").unwrap();
            assert!(wrapped.starts_with("+A99912345"));
            assert_eq!(wrapped.len(), 11);
            // Recompute by hand: '+' = 41, then the data values.
            let check = wrapped.chars().last().unwrap();
            assert_eq!(mod43_check("+A99912345").unwrap(), check);
        }

        #[test]
        fn test_wrap_rejects_bad_alphabet() {
            assert!(hibc_wrap("lowercase").is_err());
        }
    }
}
