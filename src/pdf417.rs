//! # PDF417
//!
//! Stacked symbology over a 929-codeword alphabet. Payloads are compacted
//! through three schemes (Text with its four sub-modes, Byte and Numeric),
//! protected by Reed-Solomon codewords over the prime field GF(929), and
//! laid out in rows of symbol characters fenced by start/stop patterns and
//! row indicators carrying the symbol geometry.
//!
//! ## Symbol-character tables
//!
//! Everything up to the codeword matrix — compaction, error correction,
//! length descriptor, pads, row indicators — follows ISO/IEC 15438. The
//! bar-space patterns of the 929 symbol characters, however, are defined
//! by tables in that standard which this crate does not redistribute;
//! scanner-conformant bar emission is out of scope unless the integrator
//! supplies them. Pass the published tables through
//! [`ClusterPatterns::new`] (validated against the structural invariants)
//! to emit standard symbols. Without them the encoder falls back to
//! [`ClusterPatterns::placeholder`], a deterministic ranking that keeps
//! every structural invariant — 17 modules, four bars, element widths
//! 1..=6, the cluster discriminant (x₁ − x₃ + x₅ − x₇) mod 9 — and serves
//! layout and geometry consumers, but is not readable by standard
//! decoders.

use std::sync::OnceLock;

use crate::error::Error;
use crate::geometry::Rectangle;
use crate::plot;
use crate::symbol::{Encoder, Symbol};

/// Prime field modulus.
const GF: u32 = 929;

/// Mode latch codewords.
const LATCH_TEXT: u32 = 900;
const LATCH_BYTE: u32 = 901;
const LATCH_NUMERIC: u32 = 902;
const LATCH_BYTE_FULL: u32 = 924;
/// Pad codeword.
const PAD: u32 = 900;

/// Start and stop patterns, as width strings.
const START_PATTERN: &str = "81111113";
const STOP_PATTERN: &str = "711311121";

/// Digit runs at least this long compact numerically.
const NUMERIC_THRESHOLD: usize = 13;

// ============================================================================
// TEXT COMPACTION
// ============================================================================

/// Text compaction sub-mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubMode {
    Alpha,
    Lower,
    Mixed,
    Punct,
}

const MIXED_CHARS: &[u8] = b"0123456789&\r\t,:#-.$/+%*=^";
const PUNCT_CHARS: &[u8] = b";<>@[\\]_`~!\r\t,:\n-.$/\"|*()?{}'";

/// Sub-mode value of a byte, if it is native to that sub-mode.
fn submode_value(sub: SubMode, b: u8) -> Option<u32> {
    match sub {
        SubMode::Alpha => match b {
            b'A'..=b'Z' => Some(u32::from(b - b'A')),
            b' ' => Some(26),
            _ => None,
        },
        SubMode::Lower => match b {
            b'a'..=b'z' => Some(u32::from(b - b'a')),
            b' ' => Some(26),
            _ => None,
        },
        SubMode::Mixed => MIXED_CHARS
            .iter()
            .position(|&c| c == b)
            .map(|i| i as u32)
            .or(if b == b' ' { Some(26) } else { None }),
        SubMode::Punct => PUNCT_CHARS.iter().position(|&c| c == b).map(|i| i as u32),
    }
}

/// Emit the sub-mode switch values that take `from` to `to` as a latch.
fn latch_path(from: SubMode, to: SubMode, out: &mut Vec<u32>) -> SubMode {
    if from == to {
        return to;
    }
    match (from, to) {
        (SubMode::Alpha, SubMode::Lower) => out.push(27),
        (SubMode::Alpha, SubMode::Mixed) => out.push(28),
        (SubMode::Alpha, SubMode::Punct) => out.extend([28, 25]),
        (SubMode::Lower, SubMode::Mixed) => out.push(28),
        (SubMode::Lower, SubMode::Punct) => out.extend([28, 25]),
        (SubMode::Lower, SubMode::Alpha) => out.extend([28, 28]),
        (SubMode::Mixed, SubMode::Alpha) => out.push(28),
        (SubMode::Mixed, SubMode::Lower) => out.push(27),
        (SubMode::Mixed, SubMode::Punct) => out.push(25),
        (SubMode::Punct, SubMode::Alpha) => out.push(29),
        (SubMode::Punct, SubMode::Lower) => {
            out.push(29);
            out.push(27);
        }
        (SubMode::Punct, SubMode::Mixed) => {
            out.push(29);
            out.push(28);
        }
        _ => {}
    }
    to
}

/// Compact a text stretch into codewords (the leading 900 latch is the
/// caller's concern).
fn text_compact(bytes: &[u8]) -> Vec<u32> {
    let mut values: Vec<u32> = Vec::new();
    let mut sub = SubMode::Alpha;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(v) = submode_value(sub, b) {
            values.push(v);
            i += 1;
            continue;
        }
        // Punctuation reachable in one shift stays a shift when the next
        // character returns to the current sub-mode.
        if let Some(v) = submode_value(SubMode::Punct, b) {
            let next_native = bytes
                .get(i + 1)
                .map(|&n| submode_value(sub, n).is_some())
                .unwrap_or(true);
            if sub != SubMode::Punct && next_native {
                values.push(29);
                values.push(v);
                i += 1;
                continue;
            }
        }
        // Latch to whichever sub-mode carries the character.
        let target = [SubMode::Lower, SubMode::Alpha, SubMode::Mixed, SubMode::Punct]
            .into_iter()
            .find(|&s| submode_value(s, b).is_some())
            .unwrap_or(SubMode::Alpha);
        sub = latch_path(sub, target, &mut values);
        values.push(submode_value(sub, b).unwrap_or(0));
        i += 1;
    }
    if values.len() % 2 == 1 {
        values.push(29);
    }
    values
        .chunks(2)
        .map(|pair| pair[0] * 30 + pair[1])
        .collect()
}

/// True when the text compaction tables cover the byte.
fn is_text_byte(b: u8) -> bool {
    submode_value(SubMode::Alpha, b).is_some()
        || submode_value(SubMode::Lower, b).is_some()
        || submode_value(SubMode::Mixed, b).is_some()
        || submode_value(SubMode::Punct, b).is_some()
}

// ============================================================================
// BYTE AND NUMERIC COMPACTION
// ============================================================================

/// Six bytes become five base-900 codewords; a trailing group under six
/// bytes is appended verbatim.
fn byte_compact(bytes: &[u8], out: &mut Vec<u32>) {
    out.push(if bytes.len() % 6 == 0 {
        LATCH_BYTE_FULL
    } else {
        LATCH_BYTE
    });
    let mut chunks = bytes.chunks_exact(6);
    for chunk in &mut chunks {
        let mut value = 0u64;
        for &b in chunk {
            value = value << 8 | u64::from(b);
        }
        let mut group = [0u32; 5];
        for slot in group.iter_mut().rev() {
            *slot = (value % 900) as u32;
            value /= 900;
        }
        out.extend(group);
    }
    for &b in chunks.remainder() {
        out.push(u32::from(b));
    }
}

/// Digit groups of up to 44 become base-900 codewords of the value
/// `1<digits>`.
fn numeric_compact(digits: &[u8], out: &mut Vec<u32>) {
    out.push(LATCH_NUMERIC);
    for group in digits.chunks(44) {
        // Big-number base conversion over decimal digit strings.
        let mut decimal: Vec<u8> = Vec::with_capacity(group.len() + 1);
        decimal.push(1);
        decimal.extend(group.iter().map(|&d| d - b'0'));
        let mut codewords_rev: Vec<u32> = Vec::new();
        while !decimal.is_empty() {
            let mut quotient: Vec<u8> = Vec::with_capacity(decimal.len());
            let mut rem = 0u32;
            for &d in &decimal {
                let cur = rem * 10 + u32::from(d);
                quotient.push((cur / 900) as u8);
                rem = cur % 900;
            }
            codewords_rev.push(rem);
            while quotient.first() == Some(&0) {
                quotient.remove(0);
            }
            decimal = quotient;
        }
        out.extend(codewords_rev.iter().rev());
    }
}

/// High-level compaction: split the payload into numeric, text and byte
/// stretches and compact each.
fn compact(bytes: &[u8]) -> Vec<u32> {
    let mut out: Vec<u32> = Vec::new();
    let mut i = 0;
    let mut first = true;
    while i < bytes.len() {
        let digit_run = bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digit_run >= NUMERIC_THRESHOLD {
            numeric_compact(&bytes[i..i + digit_run], &mut out);
            i += digit_run;
            first = false;
            continue;
        }
        let text_run = bytes[i..]
            .iter()
            .take_while(|&&b| is_text_byte(b))
            .take_while({
                // A long digit prefix inside the run belongs to numeric.
                let mut digits = 0usize;
                move |&&b| {
                    if b.is_ascii_digit() {
                        digits += 1;
                    } else {
                        digits = 0;
                    }
                    digits < NUMERIC_THRESHOLD
                }
            })
            .count();
        if text_run > 0 {
            // Symbols start in text mode; no latch needed up front.
            if !first {
                out.push(LATCH_TEXT);
            }
            out.extend(text_compact(&bytes[i..i + text_run]));
            i += text_run;
            first = false;
            continue;
        }
        let byte_run = bytes[i..]
            .iter()
            .take_while(|&&b| !b.is_ascii_digit() && !is_text_byte(b))
            .count()
            .max(1);
        byte_compact(&bytes[i..i + byte_run], &mut out);
        i += byte_run;
        first = false;
    }
    out
}

// ============================================================================
// ERROR CORRECTION OVER GF(929)
// ============================================================================

/// Generator coefficients for 2^(level+1) ECC codewords: the product of
/// (x − 3ⁱ) for i in 1..=k, constant term first, leading term omitted.
fn gf929_generator(k: usize) -> Vec<u32> {
    let mut coefs = vec![1u32];
    let mut root = 3u32;
    for _ in 0..k {
        let mut next = vec![0u32; coefs.len() + 1];
        for (j, &c) in coefs.iter().enumerate() {
            // Multiply by x.
            next[j + 1] = (next[j + 1] + c) % GF;
            // Multiply by -root.
            next[j] = (next[j] + (GF - root) * c % GF) % GF;
        }
        coefs = next;
        root = root * 3 % GF;
    }
    coefs.truncate(coefs.len() - 1);
    coefs
}

/// ECC codewords for the data sequence at the given level.
fn gf929_ecc(data: &[u32], level: u8) -> Vec<u32> {
    let k = 1usize << (level + 1);
    let g = gf929_generator(k);
    let mut e = vec![0u32; k];
    for &d in data {
        let t = (d + e[k - 1]) % GF;
        for j in (1..k).rev() {
            e[j] = (e[j - 1] + GF - t * g[j] % GF) % GF;
        }
        e[0] = (GF - t * g[0] % GF) % GF;
    }
    e.iter().rev().map(|&x| (GF - x) % GF).collect()
}

// ============================================================================
// SYMBOL CHARACTER PATTERNS
// ============================================================================

/// Cluster discriminant of an element-width sequence: (x₁ − x₃ + x₅ − x₇)
/// mod 9, which is 0, 3 or 6 for every valid symbol character.
fn cluster_of(widths: &[u8; 8]) -> i32 {
    (i32::from(widths[0]) - i32::from(widths[2]) + i32::from(widths[4]) - i32::from(widths[6]))
        .rem_euclid(9)
}

/// The placeholder ranking: all 17-module four-bar compositions with
/// element widths 1..=6, lexicographic, split by cluster discriminant.
fn placeholder_table() -> &'static [Vec<[u8; 8]>; 3] {
    static TABLE: OnceLock<[Vec<[u8; 8]>; 3]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut clusters: [Vec<[u8; 8]>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        let mut widths = [1u8; 8];
        loop {
            let total: u8 = widths.iter().sum();
            if total == 17 {
                match cluster_of(&widths) {
                    0 => clusters[0].push(widths),
                    3 => clusters[1].push(widths),
                    6 => clusters[2].push(widths),
                    _ => {}
                }
            }
            // Next composition in lexicographic order.
            let mut idx = 7;
            loop {
                widths[idx] += 1;
                if widths[idx] <= 6 {
                    break;
                }
                widths[idx] = 1;
                if idx == 0 {
                    for c in &mut clusters {
                        c.truncate(929);
                    }
                    return clusters;
                }
                idx -= 1;
            }
        }
    })
}

/// The three symbol-character pattern tables (published clusters 0, 3 and
/// 6), each mapping a codeword 0..=928 to its eight bar/space element
/// widths, bars first.
///
/// Build one from the ISO/IEC 15438 tables with [`ClusterPatterns::new`]
/// to emit scanner-conformant symbols; the crate does not carry those
/// tables itself (see the module documentation).
#[derive(Debug, Clone)]
pub struct ClusterPatterns {
    tables: [Vec<[u8; 8]>; 3],
}

impl ClusterPatterns {
    /// Wrap caller-supplied tables, validating the structural invariants:
    /// 929 entries per cluster, 17 modules per entry, element widths
    /// 1..=6, and the cluster discriminant of every entry.
    pub fn new(tables: [Vec<[u8; 8]>; 3]) -> Result<Self, Error> {
        for (c, table) in tables.iter().enumerate() {
            if table.len() != 929 {
                return Err(Error::IncompatibleOptions(format!(
                    "cluster {} table holds {} patterns, expected 929",
                    c * 3,
                    table.len()
                )));
            }
            for (cw, widths) in table.iter().enumerate() {
                let total: u8 = widths.iter().sum();
                if total != 17 || widths.iter().any(|&w| w == 0 || w > 6) {
                    return Err(Error::IncompatibleOptions(format!(
                        "cluster {} codeword {cw} is not a 17-module pattern",
                        c * 3
                    )));
                }
                if cluster_of(widths) != (c * 3) as i32 {
                    return Err(Error::IncompatibleOptions(format!(
                        "cluster {} codeword {cw} fails the cluster discriminant",
                        c * 3
                    )));
                }
            }
        }
        Ok(Self { tables })
    }

    /// The built-in deterministic ranking. Structurally valid and stable
    /// across runs, but not the standard's codeword assignment: symbols
    /// emitted with it are for layout and geometry consumers only.
    pub fn placeholder() -> Self {
        Self {
            tables: placeholder_table().clone(),
        }
    }

    fn widths(&self, cluster: usize, codeword: u32) -> [u8; 8] {
        self.tables[cluster][codeword as usize]
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// PDF417 encoder.
///
/// ## Example
///
/// ```
/// use cebra::pdf417::Pdf417;
/// use cebra::symbol::Encoder;
///
/// let symbol = Pdf417::new().columns(3).encode("PDF417").unwrap();
/// assert!(symbol.info("Symbol Rows: ").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Pdf417 {
    ecc_level: Option<u8>,
    columns: Option<u32>,
    rows: Option<u32>,
    truncated: bool,
    row_height: i32,
    patterns: Option<ClusterPatterns>,
}

impl Default for Pdf417 {
    fn default() -> Self {
        Self::new()
    }
}

impl Pdf417 {
    pub fn new() -> Self {
        Self {
            ecc_level: None,
            columns: None,
            rows: None,
            truncated: false,
            row_height: 3,
            patterns: None,
        }
    }

    /// Supply the symbol-character tables to emit scanner-conformant bars;
    /// the placeholder ranking is used otherwise (see the module
    /// documentation).
    pub fn patterns(mut self, patterns: ClusterPatterns) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// Pin the error-correction level (0..=8); automatic otherwise.
    pub fn ecc_level(mut self, level: u8) -> Self {
        self.ecc_level = Some(level);
        self
    }

    /// Data columns (1..=30); automatic otherwise.
    pub fn columns(mut self, columns: u32) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Rows (3..=90); automatic otherwise.
    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Truncated PDF417: drop the right row indicator and stop pattern.
    pub fn truncated(mut self, enabled: bool) -> Self {
        self.truncated = enabled;
        self
    }

    /// Module height of each row.
    pub fn row_height(mut self, height: i32) -> Self {
        self.row_height = height.max(1);
        self
    }

    /// Recommended ECC level for a data codeword count.
    fn auto_ecc_level(data_len: usize) -> u8 {
        match data_len {
            0..=40 => 2,
            41..=160 => 3,
            161..=320 => 4,
            _ => 5,
        }
    }

    /// The complete codeword matrix: length descriptor, data, pads and ECC,
    /// shaped rows x columns.
    pub fn codeword_rows(&self, content: &str) -> Result<(Vec<Vec<u32>>, u8), Error> {
        let bytes = crate::input::to_latin1(content)?;
        let data = compact(&bytes);

        let level = match self.ecc_level {
            Some(l) if l <= 8 => l,
            Some(l) => {
                return Err(Error::IncompatibleOptions(format!(
                    "PDF417 ECC level {l} is outside 0..=8"
                )));
            }
            None => Self::auto_ecc_level(data.len()),
        };
        let k = 1usize << (level + 1);

        let cols = match self.columns {
            Some(c) if (1..=30).contains(&c) => c as usize,
            Some(c) => {
                return Err(Error::IncompatibleOptions(format!(
                    "PDF417 column count {c} is outside 1..=30"
                )));
            }
            None => {
                // Aim for a roughly 2:1 width-to-height footprint.
                let total = data.len() + 1 + k;
                (1..=30)
                    .find(|&c| total.div_ceil(c) <= c * 3)
                    .unwrap_or(30)
            }
        };

        let needed = data.len() + 1 + k;
        let rows = match self.rows {
            Some(r) if (3..=90).contains(&r) => r as usize,
            Some(r) => {
                return Err(Error::IncompatibleOptions(format!(
                    "PDF417 row count {r} is outside 3..=90"
                )));
            }
            None => needed.div_ceil(cols).clamp(3, 90),
        };

        let total = rows * cols;
        if total > 928 {
            return Err(Error::CapacityExceeded(format!(
                "{rows} rows x {cols} columns exceeds 928 codewords"
            )));
        }
        if total < needed {
            return Err(Error::CapacityExceeded(format!(
                "payload needs {needed} codewords, {rows}x{cols} holds {total}"
            )));
        }

        // Length descriptor covers itself, the data and the pads.
        let mut stream: Vec<u32> = Vec::with_capacity(total);
        stream.push((total - k) as u32);
        stream.extend(&data);
        while stream.len() < total - k {
            stream.push(PAD);
        }
        stream.extend(gf929_ecc(&stream, level));

        Ok((
            stream.chunks(cols).map(|c| c.to_vec()).collect(),
            level,
        ))
    }

    /// Left or right row indicator value for a row.
    fn row_indicator(
        row: usize,
        rows: usize,
        cols: usize,
        level: u8,
        left: bool,
    ) -> u32 {
        let block = (row / 3) as u32 * 30;
        let variant = if left { row % 3 } else { (row + 2) % 3 };
        match variant {
            0 => block + (rows as u32 - 1) / 3,
            1 => block + u32::from(level) * 3 + (rows as u32 - 1) % 3,
            _ => block + cols as u32 - 1,
        }
    }
}

impl Encoder for Pdf417 {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.is_empty() {
            return Err(Error::LengthOutOfRange("PDF417 input is empty".into()));
        }
        let (rows, level) = self.codeword_rows(content)?;
        let n_rows = rows.len();
        let n_cols = rows[0].len();

        let pattern_for = |cluster: usize, cw: u32| -> String {
            let widths = match &self.patterns {
                Some(p) => p.widths(cluster, cw),
                None => placeholder_table()[cluster][cw as usize],
            };
            widths.iter().map(|w| char::from(b'0' + w)).collect()
        };

        let mut rectangles: Vec<Rectangle> = Vec::new();
        let mut width = 0;
        for (r, row) in rows.iter().enumerate() {
            let cluster = r % 3;
            let mut pattern = String::from(START_PATTERN);
            pattern.push_str(&pattern_for(
                cluster,
                Self::row_indicator(r, n_rows, n_cols, level, true),
            ));
            for &cw in row {
                pattern.push_str(&pattern_for(cluster, cw));
            }
            if self.truncated {
                pattern.push('1');
            } else {
                pattern.push_str(&pattern_for(
                    cluster,
                    Self::row_indicator(r, n_rows, n_cols, level, false),
                ));
                pattern.push_str(STOP_PATTERN);
            }
            width = plot::plot_row(&pattern, r as i32 * self.row_height, self.row_height, &mut rectangles)?;
        }

        Ok(Symbol {
            content: content.to_string(),
            width,
            height: n_rows as i32 * self.row_height,
            rectangles,
            encode_info: format!("Symbol Rows: {n_rows}\nECC Level: {level}\n"),
            quiet_zone_h: 2,
            quiet_zone_v: 2,
            ..Default::default()
        })
    }
}
