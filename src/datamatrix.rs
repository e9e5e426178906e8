//! # Data Matrix ECC200
//!
//! Mode-switched encoder over the six ECC200 encodation schemes (ASCII with
//! digit pairs, C40, Text, X12, EDIFACT and Base 256), automatic or forced
//! size selection across the 24 square and 6 rectangular symbols, Reed-
//! Solomon ECC over GF(2⁸) with the Data Matrix polynomial and offset-1
//! generator roots, the standard codeword placement walk, and the "L"
//! finder with alternating timing edges.

use crate::ecc::ReedSolomon;
use crate::error::Error;
use crate::input::{self, GS1_SEPARATOR};
use crate::plot;
use crate::symbol::{DataType, Encoder, Symbol};

/// Field polynomial for ECC200.
const DM_PRIME: u32 = 0x12D;

/// Latch and control codewords.
const LATCH_C40: u8 = 230;
const LATCH_BASE256: u8 = 231;
const FNC1: u8 = 232;
const READER_INIT: u8 = 234;
const UPPER_SHIFT: u8 = 235;
const LATCH_X12: u8 = 238;
const LATCH_TEXT: u8 = 239;
const LATCH_EDIFACT: u8 = 240;
const UNLATCH: u8 = 254;
const PAD: u8 = 129;

/// Encodation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmMode {
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
}

/// Symbol shape preference for automatic size selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolShape {
    #[default]
    Auto,
    Square,
    Rectangular,
}

/// One ECC200 symbol size.
#[derive(Debug, Clone, Copy)]
struct DmSize {
    rows: i32,
    cols: i32,
    data_codewords: usize,
    ecc_codewords: usize,
    blocks: usize,
    /// Data regions vertically and horizontally.
    regions_v: i32,
    regions_h: i32,
}

static DM_SIZES: [DmSize; 30] = [
    DmSize { rows: 10, cols: 10, data_codewords: 3, ecc_codewords: 5, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 12, cols: 12, data_codewords: 5, ecc_codewords: 7, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 8, cols: 18, data_codewords: 5, ecc_codewords: 7, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 14, cols: 14, data_codewords: 8, ecc_codewords: 10, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 8, cols: 32, data_codewords: 10, ecc_codewords: 11, blocks: 1, regions_v: 1, regions_h: 2 },
    DmSize { rows: 16, cols: 16, data_codewords: 12, ecc_codewords: 12, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 12, cols: 26, data_codewords: 16, ecc_codewords: 14, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 18, cols: 18, data_codewords: 18, ecc_codewords: 14, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 20, cols: 20, data_codewords: 22, ecc_codewords: 18, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 12, cols: 36, data_codewords: 22, ecc_codewords: 18, blocks: 1, regions_v: 1, regions_h: 2 },
    DmSize { rows: 22, cols: 22, data_codewords: 30, ecc_codewords: 20, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 16, cols: 36, data_codewords: 32, ecc_codewords: 24, blocks: 1, regions_v: 1, regions_h: 2 },
    DmSize { rows: 24, cols: 24, data_codewords: 36, ecc_codewords: 24, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 26, cols: 26, data_codewords: 44, ecc_codewords: 28, blocks: 1, regions_v: 1, regions_h: 1 },
    DmSize { rows: 16, cols: 48, data_codewords: 49, ecc_codewords: 28, blocks: 1, regions_v: 1, regions_h: 2 },
    DmSize { rows: 32, cols: 32, data_codewords: 62, ecc_codewords: 36, blocks: 1, regions_v: 2, regions_h: 2 },
    DmSize { rows: 36, cols: 36, data_codewords: 86, ecc_codewords: 42, blocks: 1, regions_v: 2, regions_h: 2 },
    DmSize { rows: 40, cols: 40, data_codewords: 114, ecc_codewords: 48, blocks: 1, regions_v: 2, regions_h: 2 },
    DmSize { rows: 44, cols: 44, data_codewords: 144, ecc_codewords: 56, blocks: 1, regions_v: 2, regions_h: 2 },
    DmSize { rows: 48, cols: 48, data_codewords: 174, ecc_codewords: 68, blocks: 1, regions_v: 2, regions_h: 2 },
    DmSize { rows: 52, cols: 52, data_codewords: 204, ecc_codewords: 84, blocks: 2, regions_v: 2, regions_h: 2 },
    DmSize { rows: 64, cols: 64, data_codewords: 280, ecc_codewords: 112, blocks: 2, regions_v: 4, regions_h: 4 },
    DmSize { rows: 72, cols: 72, data_codewords: 368, ecc_codewords: 144, blocks: 4, regions_v: 4, regions_h: 4 },
    DmSize { rows: 80, cols: 80, data_codewords: 456, ecc_codewords: 192, blocks: 4, regions_v: 4, regions_h: 4 },
    DmSize { rows: 88, cols: 88, data_codewords: 576, ecc_codewords: 224, blocks: 4, regions_v: 4, regions_h: 4 },
    DmSize { rows: 96, cols: 96, data_codewords: 696, ecc_codewords: 272, blocks: 4, regions_v: 4, regions_h: 4 },
    DmSize { rows: 104, cols: 104, data_codewords: 816, ecc_codewords: 336, blocks: 6, regions_v: 4, regions_h: 4 },
    DmSize { rows: 120, cols: 120, data_codewords: 1050, ecc_codewords: 408, blocks: 6, regions_v: 6, regions_h: 6 },
    DmSize { rows: 132, cols: 132, data_codewords: 1304, ecc_codewords: 496, blocks: 8, regions_v: 6, regions_h: 6 },
    DmSize { rows: 144, cols: 144, data_codewords: 1558, ecc_codewords: 620, blocks: 10, regions_v: 6, regions_h: 6 },
];

fn is_native_c40(b: u8) -> bool {
    b == b' ' || b.is_ascii_digit() || b.is_ascii_uppercase()
}

fn is_native_text(b: u8) -> bool {
    b == b' ' || b.is_ascii_digit() || b.is_ascii_lowercase()
}

fn is_native_x12(b: u8) -> bool {
    b == 13 || b == b'*' || b == b'>' || b == b' ' || b.is_ascii_digit() || b.is_ascii_uppercase()
}

fn is_native_edifact(b: u8) -> bool {
    (32..=94).contains(&b)
}

/// Look-ahead mode selection: fractional codeword costs per scheme, the
/// cheapest clear winner taking over once four characters are examined.
fn look_ahead(data: &[u8], start: usize, current: DmMode) -> DmMode {
    let mut counts: [f32; 6] = if current == DmMode::Ascii {
        [0.0, 1.0, 1.0, 1.0, 1.0, 1.25]
    } else {
        [1.0, 2.0, 2.0, 2.0, 2.0, 2.25]
    };
    match current {
        DmMode::Ascii => {}
        DmMode::C40 => counts[1] = 0.0,
        DmMode::Text => counts[2] = 0.0,
        DmMode::X12 => counts[3] = 0.0,
        DmMode::Edifact => counts[4] = 0.0,
        DmMode::Base256 => counts[5] = 0.0,
    }

    let order = [
        DmMode::Ascii,
        DmMode::C40,
        DmMode::Text,
        DmMode::X12,
        DmMode::Edifact,
        DmMode::Base256,
    ];
    let mut processed = 0usize;
    for &b in &data[start..] {
        processed += 1;

        if b.is_ascii_digit() {
            counts[0] += 0.5;
        } else if b >= 128 {
            counts[0] = counts[0].ceil() + 2.0;
        } else {
            counts[0] = counts[0].ceil() + 1.0;
        }

        counts[1] += if is_native_c40(b) {
            2.0 / 3.0
        } else if b >= 128 {
            8.0 / 3.0
        } else {
            4.0 / 3.0
        };
        counts[2] += if is_native_text(b) {
            2.0 / 3.0
        } else if b >= 128 {
            8.0 / 3.0
        } else {
            4.0 / 3.0
        };
        counts[3] += if is_native_x12(b) {
            2.0 / 3.0
        } else if b >= 128 {
            13.0 / 3.0
        } else {
            10.0 / 3.0
        };
        counts[4] += if is_native_edifact(b) {
            0.75
        } else if b >= 128 {
            4.25
        } else {
            3.25
        };
        counts[5] += 1.0;

        if processed >= 4 {
            let mut best = DmMode::Ascii;
            let mut best_count = f32::MAX;
            for (i, &mode) in order.iter().enumerate() {
                if counts[i] + 1.0 < best_count {
                    best_count = counts[i] + 1.0;
                    best = mode;
                }
            }
            // A clear winner by a full codeword ends the look-ahead.
            let runner_up = order
                .iter()
                .enumerate()
                .filter(|&(_, m)| *m != best)
                .map(|(i, _)| counts[i])
                .fold(f32::MAX, f32::min);
            if best_count + 1.0 <= runner_up {
                return best;
            }
        }
    }

    let mut best = DmMode::Ascii;
    let mut best_count = f32::MAX;
    for (i, &mode) in order.iter().enumerate() {
        if counts[i] < best_count {
            best_count = counts[i];
            best = mode;
        }
    }
    best
}

/// C40/Text values for one byte, including shifts; `text` selects the
/// lower-case basic set.
fn c40_values(b: u8, text: bool) -> Vec<u8> {
    let (basic_alpha, shift3_alpha) = if text {
        (b.is_ascii_lowercase(), b.is_ascii_uppercase())
    } else {
        (b.is_ascii_uppercase(), b.is_ascii_lowercase())
    };
    if b >= 128 {
        // Upper shift lives in shift 2.
        let mut v = vec![1, 30];
        v.extend(c40_values(b - 128, text));
        return v;
    }
    if b == b' ' {
        vec![3]
    } else if b.is_ascii_digit() {
        vec![b - b'0' + 4]
    } else if basic_alpha {
        vec![(b.to_ascii_uppercase()) - b'A' + 14]
    } else if b < 32 {
        vec![0, b]
    } else if b <= 47 {
        vec![1, b - 33]
    } else if b <= 64 {
        vec![1, b - 43]
    } else if shift3_alpha {
        vec![2, if text { b - 64 } else { b - 96 }]
    } else if b <= 95 {
        vec![1, b - 69]
    } else if b == 96 && text {
        vec![2, 0]
    } else {
        vec![2, b - 96]
    }
}

fn x12_value(b: u8) -> u8 {
    match b {
        13 => 0,
        b'*' => 1,
        b'>' => 2,
        b' ' => 3,
        b'0'..=b'9' => b - b'0' + 4,
        _ => b - b'A' + 14,
    }
}

/// Pack value triples into codeword pairs: v = 1600 a + 40 b + c + 1.
fn pack_triple(a: u8, b: u8, c: u8) -> [u8; 2] {
    let v = 1600 * u16::from(a) + 40 * u16::from(b) + u16::from(c) + 1;
    [(v >> 8) as u8, (v & 0xFF) as u8]
}

/// Data Matrix encoder.
#[derive(Debug, Clone)]
pub struct DataMatrix {
    shape: SymbolShape,
    preferred_size: Option<(i32, i32)>,
    force_mode: Option<DmMode>,
    reader_init: bool,
    data_type: DataType,
}

impl Default for DataMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl DataMatrix {
    pub fn new() -> Self {
        Self {
            shape: SymbolShape::Auto,
            preferred_size: None,
            force_mode: None,
            reader_init: false,
            data_type: DataType::Eci,
        }
    }

    /// Restrict automatic size selection to square or rectangular symbols.
    pub fn shape(mut self, shape: SymbolShape) -> Self {
        self.shape = shape;
        self
    }

    /// Request an exact symbol size in (rows, columns).
    pub fn preferred_size(mut self, rows: i32, cols: i32) -> Self {
        self.preferred_size = Some((rows, cols));
        self
    }

    /// Skip look-ahead and encode the whole payload in one scheme.
    pub fn force_mode(mut self, mode: DmMode) -> Self {
        self.force_mode = Some(mode);
        self
    }

    /// Lead with the reader-programming codeword.
    pub fn reader_init(mut self, enabled: bool) -> Self {
        self.reader_init = enabled;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// High-level encodation: payload bytes to data codewords.
    fn encode_stream(&self, bytes: &[u8], gs1: bool) -> Result<Vec<u8>, Error> {
        let mut cw: Vec<u8> = Vec::new();
        if self.reader_init {
            if gs1 {
                return Err(Error::IncompatibleOptions(
                    "reader initialisation cannot be combined with GS1".into(),
                ));
            }
            cw.push(READER_INIT);
        }
        if gs1 {
            cw.push(FNC1);
        }

        let forced = self.force_mode.is_some();
        let mut pos = 0usize;
        while pos < bytes.len() {
            let target = match self.force_mode {
                Some(m) => m,
                None => look_ahead(bytes, pos, DmMode::Ascii),
            };
            if target == DmMode::Ascii {
                pos = self.encode_ascii(bytes, pos, gs1, &mut cw);
                continue;
            }

            let mark = cw.len();
            cw.push(match target {
                DmMode::C40 => LATCH_C40,
                DmMode::Text => LATCH_TEXT,
                DmMode::X12 => LATCH_X12,
                DmMode::Edifact => LATCH_EDIFACT,
                DmMode::Base256 => LATCH_BASE256,
                DmMode::Ascii => unreachable!(),
            });
            let next = match target {
                DmMode::C40 | DmMode::Text | DmMode::X12 => {
                    Self::encode_c40ish(bytes, pos, &mut cw, target, forced)
                }
                DmMode::Edifact => Self::encode_edifact(bytes, pos, &mut cw, forced),
                DmMode::Base256 => Self::encode_base256(bytes, pos, &mut cw, forced),
                DmMode::Ascii => unreachable!(),
            };
            if next == pos {
                // The scheme could not consume anything (a foreign X12
                // character, or a sub-triple tail); take one character in
                // ASCII instead of an empty latch/unlatch round trip.
                cw.truncate(mark);
                pos = self.encode_ascii_one(bytes, pos, gs1, &mut cw);
            } else {
                pos = next;
            }
        }
        Ok(cw)
    }

    /// Encode exactly one position's worth of ASCII (a digit pair counts as
    /// one position step of two characters).
    fn encode_ascii_one(&self, bytes: &[u8], pos: usize, gs1: bool, cw: &mut Vec<u8>) -> usize {
        let b = bytes[pos];
        if gs1 && b == GS1_SEPARATOR as u8 {
            cw.push(FNC1);
            pos + 1
        } else if b.is_ascii_digit() && pos + 1 < bytes.len() && bytes[pos + 1].is_ascii_digit() {
            cw.push((b - b'0') * 10 + (bytes[pos + 1] - b'0') + 130);
            pos + 2
        } else if b >= 128 {
            cw.push(UPPER_SHIFT);
            cw.push(b - 128 + 1);
            pos + 1
        } else {
            cw.push(b + 1);
            pos + 1
        }
    }

    /// ASCII encodation: digit pairs, plain bytes, upper shift. Returns the
    /// next unprocessed position, stopping when look-ahead wants a switch.
    fn encode_ascii(&self, bytes: &[u8], mut pos: usize, gs1: bool, cw: &mut Vec<u8>) -> usize {
        let start = pos;
        while pos < bytes.len() {
            if pos > start
                && self.force_mode.is_none()
                && look_ahead(bytes, pos, DmMode::Ascii) != DmMode::Ascii
            {
                break;
            }
            pos = self.encode_ascii_one(bytes, pos, gs1, cw);
        }
        pos
    }

    /// C40, Text and X12: triples of 6-bit values packed two codewords per
    /// three values. The flushed stream always ends on a character boundary
    /// at a whole triple; trailing characters are handed back for ASCII
    /// encodation after the unlatch.
    fn encode_c40ish(
        bytes: &[u8],
        start: usize,
        cw: &mut Vec<u8>,
        scheme: DmMode,
        forced: bool,
    ) -> usize {
        let mut values: Vec<u8> = Vec::new();
        // Character boundaries: (position after char, cumulative values).
        let mut boundaries: Vec<(usize, usize)> = Vec::new();
        let mut pos = start;
        while pos < bytes.len() {
            let b = bytes[pos];
            // X12 has no shifts; a foreign character forces the unlatch.
            if scheme == DmMode::X12 && !is_native_x12(b) {
                break;
            }
            let vals = match scheme {
                DmMode::X12 => vec![x12_value(b)],
                DmMode::C40 => c40_values(b, false),
                _ => c40_values(b, true),
            };
            values.extend(vals);
            pos += 1;
            boundaries.push((pos, values.len()));
            if values.len() % 3 == 0 && !forced && look_ahead(bytes, pos, scheme) != scheme {
                break;
            }
        }

        // The longest prefix of whole characters that fills whole triples.
        let mut flush = 0usize;
        let mut consumed_to = start;
        for &(p, cum) in &boundaries {
            if cum % 3 == 0 {
                flush = cum;
                consumed_to = p;
            }
        }
        if flush == 0 {
            return start;
        }
        for t in values[..flush].chunks(3) {
            cw.extend_from_slice(&pack_triple(t[0], t[1], t[2]));
        }
        cw.push(UNLATCH);
        consumed_to
    }

    /// EDIFACT: four 6-bit values in three codewords, terminated by the
    /// 6-bit unlatch value 31.
    fn encode_edifact(bytes: &[u8], mut pos: usize, cw: &mut Vec<u8>, forced: bool) -> usize {
        let mut values: Vec<u8> = Vec::new();
        while pos < bytes.len() && is_native_edifact(bytes[pos]) {
            values.push(bytes[pos] & 0x3F);
            pos += 1;
            if !forced
                && values.len() % 4 == 0
                && look_ahead(bytes, pos, DmMode::Edifact) != DmMode::Edifact
            {
                break;
            }
        }
        if values.is_empty() {
            return pos;
        }
        values.push(31);
        for group in values.chunks(4) {
            let mut packed = 0u32;
            for (i, &v) in group.iter().enumerate() {
                packed |= u32::from(v) << (18 - 6 * i);
            }
            let n_bytes = (group.len() * 6).div_ceil(8);
            for i in 0..n_bytes {
                cw.push((packed >> (16 - 8 * i)) as u8);
            }
        }
        pos
    }

    /// Base 256: length header then data, all 255-state randomised by final
    /// stream position.
    fn encode_base256(bytes: &[u8], pos: usize, cw: &mut Vec<u8>, forced: bool) -> usize {
        let mut end = pos;
        while end < bytes.len() {
            end += 1;
            if !forced
                && end - pos >= 4
                && look_ahead(bytes, end, DmMode::Base256) != DmMode::Base256
            {
                break;
            }
        }
        let n = end - pos;

        let mut raw: Vec<u8> = Vec::with_capacity(n + 2);
        if n <= 249 {
            raw.push(n as u8);
        } else {
            raw.push((n / 250 + 249) as u8);
            raw.push((n % 250) as u8);
        }
        raw.extend_from_slice(&bytes[pos..end]);

        for v in raw {
            let position = cw.len() + 1;
            let pseudo = ((149 * position) % 255 + 1) as u16;
            cw.push(((u16::from(v) + pseudo) % 256) as u8);
        }
        end
    }

    /// Pick the smallest size that fits, honouring shape and preference.
    fn select_size(&self, data_len: usize) -> Result<&'static DmSize, Error> {
        if let Some((rows, cols)) = self.preferred_size {
            let size = DM_SIZES
                .iter()
                .find(|s| s.rows == rows && s.cols == cols)
                .ok_or_else(|| {
                    Error::IncompatibleOptions(format!(
                        "no Data Matrix symbol is {rows}x{cols}"
                    ))
                })?;
            if data_len > size.data_codewords {
                return Err(Error::CapacityExceeded(format!(
                    "payload needs {data_len} codewords, {rows}x{cols} holds {}",
                    size.data_codewords
                )));
            }
            return Ok(size);
        }
        DM_SIZES
            .iter()
            .filter(|s| match self.shape {
                SymbolShape::Auto => true,
                SymbolShape::Square => s.rows == s.cols,
                SymbolShape::Rectangular => s.rows != s.cols,
            })
            .find(|s| s.data_codewords >= data_len)
            .ok_or_else(|| {
                Error::CapacityExceeded(
                    "payload does not fit any permitted Data Matrix size".into(),
                )
            })
    }
}

/// Pad to the symbol capacity: a literal pad codeword, then 253-state
/// randomised pads.
fn add_padding(cw: &mut Vec<u8>, capacity: usize) {
    if cw.len() < capacity {
        cw.push(PAD);
    }
    while cw.len() < capacity {
        let position = cw.len() + 1;
        let pseudo = ((149 * position) % 253 + 1) as u16;
        cw.push((((u16::from(PAD) + pseudo) - 1) % 254 + 1) as u8);
    }
}

/// Split into RS blocks round-robin, append block ECC, and produce the
/// interleaved ECC stream.
fn dm_ecc(data: &[u8], size: &DmSize) -> Result<Vec<u8>, Error> {
    let blocks = size.blocks;
    let ecc_per_block = size.ecc_codewords / blocks;
    let rs = ReedSolomon::new(DM_PRIME, ecc_per_block, 1)?;

    let mut block_data: Vec<Vec<u8>> = vec![Vec::new(); blocks];
    for (i, &b) in data.iter().enumerate() {
        block_data[i % blocks].push(b);
    }
    let block_ecc: Vec<Vec<u8>> = block_data.iter().map(|d| rs.encode(d)).collect();

    let mut ecc = Vec::with_capacity(size.ecc_codewords);
    for i in 0..ecc_per_block {
        for b in &block_ecc {
            ecc.push(b[i]);
        }
    }
    Ok(ecc)
}

/// The ECC200 placement walk over the mapping matrix.
struct Placement {
    rows: i32,
    cols: i32,
    /// Module values; None marks still-unvisited cells.
    bits: Vec<Option<bool>>,
}

impl Placement {
    fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            bits: vec![None; (rows * cols) as usize],
        }
    }

    fn module(&mut self, mut row: i32, mut col: i32, cw: &[u8], chr: usize, bit: u8) {
        if row < 0 {
            row += self.rows;
            col += 4 - ((self.rows + 4) % 8);
        }
        if col < 0 {
            col += self.cols;
            row += 4 - ((self.cols + 4) % 8);
        }
        let dark = (cw[chr] >> (8 - bit)) & 1 != 0;
        self.bits[(row * self.cols + col) as usize] = Some(dark);
    }

    fn utah(&mut self, row: i32, col: i32, cw: &[u8], chr: usize) {
        self.module(row - 2, col - 2, cw, chr, 1);
        self.module(row - 2, col - 1, cw, chr, 2);
        self.module(row - 1, col - 2, cw, chr, 3);
        self.module(row - 1, col - 1, cw, chr, 4);
        self.module(row - 1, col, cw, chr, 5);
        self.module(row, col - 2, cw, chr, 6);
        self.module(row, col - 1, cw, chr, 7);
        self.module(row, col, cw, chr, 8);
    }

    fn corner1(&mut self, cw: &[u8], chr: usize) {
        self.module(self.rows - 1, 0, cw, chr, 1);
        self.module(self.rows - 1, 1, cw, chr, 2);
        self.module(self.rows - 1, 2, cw, chr, 3);
        self.module(0, self.cols - 2, cw, chr, 4);
        self.module(0, self.cols - 1, cw, chr, 5);
        self.module(1, self.cols - 1, cw, chr, 6);
        self.module(2, self.cols - 1, cw, chr, 7);
        self.module(3, self.cols - 1, cw, chr, 8);
    }

    fn corner2(&mut self, cw: &[u8], chr: usize) {
        self.module(self.rows - 3, 0, cw, chr, 1);
        self.module(self.rows - 2, 0, cw, chr, 2);
        self.module(self.rows - 1, 0, cw, chr, 3);
        self.module(0, self.cols - 4, cw, chr, 4);
        self.module(0, self.cols - 3, cw, chr, 5);
        self.module(0, self.cols - 2, cw, chr, 6);
        self.module(0, self.cols - 1, cw, chr, 7);
        self.module(1, self.cols - 1, cw, chr, 8);
    }

    fn corner3(&mut self, cw: &[u8], chr: usize) {
        self.module(self.rows - 3, 0, cw, chr, 1);
        self.module(self.rows - 2, 0, cw, chr, 2);
        self.module(self.rows - 1, 0, cw, chr, 3);
        self.module(0, self.cols - 2, cw, chr, 4);
        self.module(0, self.cols - 1, cw, chr, 5);
        self.module(1, self.cols - 1, cw, chr, 6);
        self.module(2, self.cols - 1, cw, chr, 7);
        self.module(3, self.cols - 1, cw, chr, 8);
    }

    fn corner4(&mut self, cw: &[u8], chr: usize) {
        self.module(self.rows - 1, 0, cw, chr, 1);
        self.module(self.rows - 1, self.cols - 1, cw, chr, 2);
        self.module(0, self.cols - 3, cw, chr, 3);
        self.module(0, self.cols - 2, cw, chr, 4);
        self.module(0, self.cols - 1, cw, chr, 5);
        self.module(1, self.cols - 3, cw, chr, 6);
        self.module(1, self.cols - 2, cw, chr, 7);
        self.module(1, self.cols - 1, cw, chr, 8);
    }

    fn is_free(&self, row: i32, col: i32) -> bool {
        self.bits[(row * self.cols + col) as usize].is_none()
    }

    /// Place all codewords; returns the filled mapping matrix.
    fn place(mut self, cw: &[u8]) -> Vec<bool> {
        let (nr, nc) = (self.rows, self.cols);
        let mut chr = 0usize;
        let mut row = 4i32;
        let mut col = 0i32;
        loop {
            if row == nr && col == 0 {
                self.corner1(cw, chr);
                chr += 1;
            } else if row == nr - 2 && col == 0 && nc % 4 != 0 {
                self.corner2(cw, chr);
                chr += 1;
            } else if row == nr - 2 && col == 0 && nc % 8 == 4 {
                self.corner3(cw, chr);
                chr += 1;
            } else if row == nr + 4 && col == 2 && nc % 8 == 0 {
                self.corner4(cw, chr);
                chr += 1;
            }
            // Sweep up and to the right.
            loop {
                if row < nr && col >= 0 && self.is_free(row, col) {
                    self.utah(row, col, cw, chr);
                    chr += 1;
                }
                row -= 2;
                col += 2;
                if row < 0 || col >= nc {
                    break;
                }
            }
            row += 1;
            col += 3;
            // Sweep down and to the left.
            loop {
                if row >= 0 && col < nc && self.is_free(row, col) {
                    self.utah(row, col, cw, chr);
                    chr += 1;
                }
                row += 2;
                col -= 2;
                if row >= nr || col < 0 {
                    break;
                }
            }
            row += 3;
            col += 1;
            if row >= nr && col >= nc {
                break;
            }
        }

        // Fixed checker pattern if the lower-right corner came up empty.
        if self.is_free(nr - 1, nc - 1) {
            self.bits[((nr - 1) * nc + nc - 1) as usize] = Some(true);
            self.bits[((nr - 2) * nc + nc - 2) as usize] = Some(true);
            self.bits[((nr - 2) * nc + nc - 1) as usize] = Some(false);
            self.bits[((nr - 1) * nc + nc - 2) as usize] = Some(false);
        }

        self.bits.into_iter().map(|b| b.unwrap_or(false)).collect()
    }
}

/// Wrap the mapping matrix in finder and timing edges, one "L" per data
/// region.
fn assemble_symbol(size: &DmSize, mapping: &[bool]) -> Vec<bool> {
    let map_cols = size.cols - 2 * size.regions_h;
    let region_rows = (size.rows - 2 * size.regions_v) / size.regions_v;
    let region_cols = map_cols / size.regions_h;

    let mut grid = vec![false; (size.rows * size.cols) as usize];
    for ry in 0..size.regions_v {
        for rx in 0..size.regions_h {
            let base_y = ry * (region_rows + 2);
            let base_x = rx * (region_cols + 2);
            for y in 0..region_rows + 2 {
                for x in 0..region_cols + 2 {
                    let dark = if x == 0 {
                        // Solid left finder bar.
                        true
                    } else if y == region_rows + 1 {
                        // Solid bottom finder bar.
                        true
                    } else if y == 0 {
                        // Alternating top timing edge.
                        x % 2 == 0
                    } else if x == region_cols + 1 {
                        // Alternating right timing edge.
                        y % 2 == 1
                    } else {
                        let my = ry * region_rows + y - 1;
                        let mx = rx * region_cols + x - 1;
                        mapping[(my * map_cols + mx) as usize]
                    };
                    grid[((base_y + y) * size.cols + base_x + x) as usize] = dark;
                }
            }
        }
    }
    grid
}

impl Encoder for DataMatrix {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.is_empty() {
            return Err(Error::LengthOutOfRange("Data Matrix input is empty".into()));
        }
        let gs1 = self.data_type == DataType::Gs1;
        let processed = match self.data_type {
            DataType::Gs1 => input::gs1_process(content)?,
            DataType::Hibc => input::hibc_wrap(content)?,
            DataType::Eci => content.to_string(),
        };
        let bytes = input::to_latin1(&processed)?;

        let mut cw = self.encode_stream(&bytes, gs1)?;
        let size = self.select_size(cw.len())?;
        add_padding(&mut cw, size.data_codewords);
        let ecc = dm_ecc(&cw, size)?;
        cw.extend(ecc);

        let map_rows = size.rows - 2 * size.regions_v;
        let map_cols = size.cols - 2 * size.regions_h;
        let mapping = Placement::new(map_rows, map_cols).place(&cw);
        let grid = assemble_symbol(size, &mapping);

        let rectangles = plot::plot_grid(size.cols, size.rows, |x, y| {
            grid[(y * size.cols + x) as usize]
        });
        Ok(Symbol {
            content: content.to_string(),
            width: size.cols,
            height: size.rows,
            rectangles,
            encode_info: format!("Symbol Rows: {}\nSymbol Columns: {}\n", size.rows, size.cols),
            quiet_zone_h: 1,
            quiet_zone_v: 1,
            data_type: self.data_type,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod encodation_tests {
        use super::*;

        #[test]
        fn test_ascii_digit_pairs() {
            let dm = DataMatrix::new();
            let cw = dm.encode_stream(b"123456", false).unwrap();
            assert_eq!(cw, vec![142, 164, 186]);
        }

        #[test]
        fn test_ascii_mixed() {
            let dm = DataMatrix::new().force_mode(DmMode::Ascii);
            let cw = dm.encode_stream(b"A1B2", false).unwrap();
            assert_eq!(cw, vec![66, 50, 67, 51]);
        }

        #[test]
        fn test_upper_shift() {
            let dm = DataMatrix::new().force_mode(DmMode::Ascii);
            let cw = dm.encode_stream(&[0xE9], false).unwrap();
            assert_eq!(cw, vec![UPPER_SHIFT, 0xE9 - 128 + 1]);
        }

        #[test]
        fn test_c40_triple_packing() {
            // "AIM": values 14+0, 22, 26 -> 1600*14 + 40*22 + 26 + 1.
            let dm = DataMatrix::new().force_mode(DmMode::C40);
            let cw = dm.encode_stream(b"AIMAIM", false).unwrap();
            assert_eq!(cw[0], LATCH_C40);
            let v = 1600u16 * 14 + 40 * 22 + 26 + 1;
            assert_eq!(cw[1], (v >> 8) as u8);
            assert_eq!(cw[2], (v & 0xFF) as u8);
            assert_eq!(*cw.last().unwrap(), UNLATCH);
        }

        #[test]
        fn test_x12_values() {
            assert_eq!(x12_value(13), 0);
            assert_eq!(x12_value(b'*'), 1);
            assert_eq!(x12_value(b'>'), 2);
            assert_eq!(x12_value(b'Z'), 39);
        }

        #[test]
        fn test_edifact_packs_four_into_three() {
            let dm = DataMatrix::new().force_mode(DmMode::Edifact);
            let cw = dm.encode_stream(b"DATAMATR", false).unwrap();
            // latch + 8 values + unlatch value 31 = 9 six-bit values in 7
            // codewords.
            assert_eq!(cw[0], LATCH_EDIFACT);
            assert_eq!(cw.len(), 1 + 7);
        }

        #[test]
        fn test_base256_header_and_randomisation() {
            let dm = DataMatrix::new().force_mode(DmMode::Base256);
            let cw = dm.encode_stream(&[0x00, 0xFF, 0x80], false).unwrap();
            assert_eq!(cw[0], LATCH_BASE256);
            // Length header 3, randomised at position 2.
            let expected = (3u16 + ((149 * 2) % 255 + 1) as u16) % 256;
            assert_eq!(cw[1], expected as u8);
            assert_eq!(cw.len(), 1 + 1 + 3);
        }

        #[test]
        fn test_gs1_leads_with_fnc1() {
            let dm = DataMatrix::new().data_type(DataType::Gs1);
            let processed = input::gs1_process("[20]12").unwrap();
            let bytes = input::to_latin1(&processed).unwrap();
            let cw = dm.encode_stream(&bytes, true).unwrap();
            assert_eq!(cw[0], FNC1);
        }
    }

    mod size_tests {
        use super::*;

        #[test]
        fn test_smallest_square() {
            let dm = DataMatrix::new();
            let size = dm.select_size(3).unwrap();
            assert_eq!((size.rows, size.cols), (10, 10));
        }

        #[test]
        fn test_rectangular_preference() {
            let dm = DataMatrix::new().shape(SymbolShape::Rectangular);
            let size = dm.select_size(5).unwrap();
            assert_eq!((size.rows, size.cols), (8, 18));
        }

        #[test]
        fn test_preferred_size_capacity_check() {
            let dm = DataMatrix::new().preferred_size(10, 10);
            assert_eq!(
                dm.select_size(4).unwrap_err().category(),
                "CapacityExceeded"
            );
        }

        #[test]
        fn test_block_arithmetic() {
            for s in &DM_SIZES {
                assert_eq!(s.ecc_codewords % s.blocks, 0);
                // The mapping area holds all codeword modules; four sizes
                // carry the fixed 2x2 corner pattern on top.
                let map = (s.rows - 2 * s.regions_v) * (s.cols - 2 * s.regions_h);
                let slack = map as usize - (s.data_codewords + s.ecc_codewords) * 8;
                assert!(slack == 0 || slack == 4, "size {}x{}", s.rows, s.cols);
            }
        }
    }

    mod symbol_tests {
        use super::*;

        #[test]
        fn test_digits_fill_10x10() {
            let symbol = DataMatrix::new().encode("123456").unwrap();
            assert_eq!(symbol.width, 10);
            assert_eq!(symbol.height, 10);
            assert_eq!(symbol.readable, "");
            assert_eq!(symbol.info("Symbol Rows: "), Some("10"));
        }

        #[test]
        fn test_finder_l_edges() {
            let symbol = DataMatrix::new().encode("123456").unwrap();
            let dark = |x: i32, y: i32| {
                symbol
                    .rectangles
                    .iter()
                    .any(|r| y == r.y && x >= r.x && x < r.x + r.width)
            };
            // Left column and bottom row are solid.
            for i in 0..10 {
                assert!(dark(0, i), "left finder at y={i}");
                assert!(dark(i, 9), "bottom finder at x={i}");
            }
            // Top edge alternates starting dark.
            for x in 0..10 {
                assert_eq!(dark(x, 0), x % 2 == 0, "top timing at x={x}");
            }
        }

        #[test]
        fn test_reader_init_conflicts_with_gs1() {
            let err = DataMatrix::new()
                .reader_init(true)
                .data_type(DataType::Gs1)
                .encode("[20]12")
                .unwrap_err();
            assert_eq!(err.category(), "IncompatibleOptions");
        }

        #[test]
        fn test_capacity_error() {
            let long = "x".repeat(3000);
            let err = DataMatrix::new().encode(&long).unwrap_err();
            assert_eq!(err.category(), "CapacityExceeded");
        }
    }
}
