//! # Code 16K
//!
//! Stacked variant of Code 128: 2 to 16 rows of five codewords each,
//! fenced by two-module binding bars and separated by two-module paper
//! binders. The first codeword encodes the row count together with the
//! starting code set; two modulo-107 check characters close the symbol.

use crate::error::Error;
use crate::plot;
use crate::symbol::{DataType, Encoder, Symbol};

use super::{mark_extended, runs_to_codewords, sequence, to_glyphs, CodeSet, C128_TABLE};

/// Pad codeword.
const PAD: u8 = 106;

/// Codewords per row.
const ROW_CODEWORDS: usize = 5;

/// Maximum data capacity in codewords (16 rows x 5, minus the mode
/// codeword and the two checks).
const MAX_CODEWORDS: usize = 77;

/// Row start/stop characters: seven-module guard patterns cycling by row.
const ROW_GUARDS: [&str; 8] = [
    "3211", "2221", "2122", "1411", "1132", "1231", "1114", "3112",
];

/// Starting-set modes carried in the first codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowMode {
    A = 0,
    B = 1,
    C = 2,
    /// Set B with a leading FNC1 (GS1).
    BFnc1 = 3,
    /// Set C with a leading FNC1 (GS1).
    CFnc1 = 4,
}

/// Code 16K encoder.
#[derive(Debug, Clone)]
pub struct Code16K {
    data_type: DataType,
    row_height: i32,
}

impl Default for Code16K {
    fn default() -> Self {
        Self::new()
    }
}

impl Code16K {
    pub fn new() -> Self {
        Self {
            data_type: DataType::Eci,
            row_height: 10,
        }
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Height of each data row, in modules.
    pub fn row_height(mut self, height: i32) -> Self {
        self.row_height = height.max(4);
        self
    }

    /// The padded codeword sequence: mode, data, pad and both checks.
    pub fn codewords(&self, content: &str) -> Result<Vec<u8>, Error> {
        let (glyphs, _) = to_glyphs(content, self.data_type)?;
        let gs1 = self.data_type == DataType::Gs1;
        // The GS1 FNC1 is folded into the mode codeword rather than spent
        // as a data position.
        let body = if gs1 { &glyphs[1..] } else { &glyphs[..] };

        let runs = sequence(body, CodeSet::Abc);
        let ext = mark_extended(
            &runs
                .iter()
                .flat_map(|r| r.glyphs.iter().copied())
                .collect::<Vec<_>>(),
        );
        let with_start = runs_to_codewords(&runs, &ext)?;

        // Swap the Code 128 start character for the 16K mode value; the GS1
        // FNC1 is part of the mode, not a data codeword.
        let mode = match (with_start[0], gs1) {
            (super::START_A, false) => RowMode::A,
            (super::START_B, false) => RowMode::B,
            (super::START_C, false) => RowMode::C,
            (super::START_C, true) => RowMode::CFnc1,
            (super::START_B, true) => RowMode::BFnc1,
            _ => {
                return Err(Error::IncompatibleOptions(
                    "GS1 Code 16K cannot start in set A".into(),
                ));
            }
        };
        let data: Vec<u8> = with_start[1..].to_vec();

        if data.len() > MAX_CODEWORDS {
            return Err(Error::CapacityExceeded(format!(
                "Code 16K holds at most {MAX_CODEWORDS} codewords, need {}",
                data.len()
            )));
        }

        // Rows hold five codewords; two rows minimum.
        let used = data.len() + 3;
        let rows = used.div_ceil(ROW_CODEWORDS).max(2);
        let mut cw = Vec::with_capacity(rows * ROW_CODEWORDS);
        cw.push((rows as u8 - 2) * 7 + mode as u8);
        cw.extend_from_slice(&data);
        while cw.len() < rows * ROW_CODEWORDS - 2 {
            cw.push(PAD);
        }

        let (c1, c2) = check_characters(&cw);
        cw.push(c1);
        cw.push(c2);
        Ok(cw)
    }
}

/// The dual modulo-107 checks: C over the position-weighted symbol
/// characters, K over the same sequence with C appended at its own weight.
pub(crate) fn check_characters(values: &[u8]) -> (u8, u8) {
    let weighted = |vals: &[u8]| -> u8 {
        let sum: u32 = vals
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as u32 + 2) * u32::from(v))
            .sum();
        (sum % 107) as u8
    };
    let c1 = weighted(values);
    let mut extended = values.to_vec();
    extended.push(c1);
    let c2 = weighted(&extended);
    (c1, c2)
}

impl Encoder for Code16K {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.is_empty() {
            return Err(Error::LengthOutOfRange("Code 16K input is empty".into()));
        }
        let cw = self.codewords(content)?;
        let rows = cw.len() / ROW_CODEWORDS;

        let mut row_patterns = Vec::with_capacity(rows);
        for (r, chunk) in cw.chunks(ROW_CODEWORDS).enumerate() {
            let mut pattern = String::from(ROW_GUARDS[r % 8]);
            for &c in chunk {
                pattern.push_str(C128_TABLE[c as usize]);
            }
            let stop: String = ROW_GUARDS[r % 8].chars().rev().collect();
            pattern.push_str(&stop);
            // Trailing guard bar.
            pattern.push('1');
            row_patterns.push(pattern);
        }

        let mut rectangles = Vec::new();
        let (width, height) =
            plot::plot_stack(&row_patterns, self.row_height, 2, &mut rectangles)?;

        let mut info = format!("Symbol Rows: {rows}\n");
        let (c1, c2) = (cw[cw.len() - 2], cw[cw.len() - 1]);
        info.push_str(&format!("Check Digit C: {c1}\nCheck Digit K: {c2}\n"));

        Ok(Symbol {
            content: content.to_string(),
            width,
            height,
            rectangles,
            encode_info: info,
            quiet_zone_h: 10,
            quiet_zone_v: 2,
            data_type: self.data_type,
            ..Default::default()
        })
    }
}
