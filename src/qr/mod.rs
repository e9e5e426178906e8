//! # QR Code
//!
//! Model 2 QR encoder covering versions 1..=40 with automatic version and
//! mask selection. Payloads are classified per character into Numeric,
//! Alphanumeric, Byte and Kanji runs, short runs are demoted to avoid
//! mode-switch overhead, and the resulting tagged stream is expanded with
//! the version-specific indicator widths once the version is known.
//!
//! Micro QR shares the classification and bit machinery (see [`microqr`]).
//!
//! ## Example
//!
//! ```
//! use cebra::qr::{EccLevel, Qr};
//! use cebra::symbol::Encoder;
//!
//! let symbol = Qr::new().ecc_level(EccLevel::L).encode("HELLO WORLD").unwrap();
//! assert_eq!(symbol.width, 21);
//! assert_eq!(symbol.info("Version: "), Some("1"));
//! ```

use crate::bits::BitBuffer;
use crate::ecc::ReedSolomon;
use crate::error::Error;
use crate::input;
use crate::plot;
use crate::symbol::{DataType, Encoder, Symbol};

pub mod microqr;
pub(crate) mod tables;

/// Field polynomial shared by the QR family.
pub(crate) const QR_PRIME: u32 = 0x11D;

/// Error-correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EccLevel {
    L,
    M,
    Q,
    H,
}

impl EccLevel {
    pub(crate) fn ordinal(self) -> usize {
        match self {
            EccLevel::L => 0,
            EccLevel::M => 1,
            EccLevel::Q => 2,
            EccLevel::H => 3,
        }
    }

    fn format_bits(self) -> u32 {
        match self {
            EccLevel::L => 1,
            EccLevel::M => 0,
            EccLevel::Q => 3,
            EccLevel::H => 2,
        }
    }

    pub(crate) fn letter(self) -> char {
        match self {
            EccLevel::L => 'L',
            EccLevel::M => 'M',
            EccLevel::Q => 'Q',
            EccLevel::H => 'H',
        }
    }
}

/// Segment mode of a run in the tagged stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QrMode {
    Numeric,
    Alphanumeric,
    Byte,
    Kanji,
}

impl QrMode {
    pub(crate) fn indicator(self) -> u32 {
        match self {
            QrMode::Numeric => 1,
            QrMode::Alphanumeric => 2,
            QrMode::Byte => 4,
            QrMode::Kanji => 8,
        }
    }

    /// Character-count width for full QR at a version.
    fn count_bits(self, version: u8) -> u8 {
        let widths = match self {
            QrMode::Numeric => [10, 12, 14],
            QrMode::Alphanumeric => [9, 11, 13],
            QrMode::Byte => [8, 16, 16],
            QrMode::Kanji => [8, 10, 12],
        };
        match version {
            1..=9 => widths[0],
            10..=26 => widths[1],
            _ => widths[2],
        }
    }

    /// How specific the mode is; demotion moves toward Byte.
    fn rank(self) -> u8 {
        match self {
            QrMode::Byte => 0,
            QrMode::Alphanumeric => 1,
            QrMode::Numeric => 2,
            QrMode::Kanji => 3,
        }
    }
}

/// A run of same-mode glyphs. Glyph values are bytes, except Kanji where
/// they are the packed 13-bit Shift JIS values.
#[derive(Debug, Clone)]
pub(crate) struct Run {
    pub mode: QrMode,
    pub glyphs: Vec<u16>,
}

/// Runs shorter than this are demoted toward a neighbouring weaker mode.
const DEMOTE_THRESHOLD: usize = 6;

/// Map content to the byte stream of the selected ECI.
pub(crate) fn byte_stream(content: &str, eci: u32) -> Result<Vec<u8>, Error> {
    match eci {
        3 | 20 => input::to_latin1(content),
        26 => Ok(content.as_bytes().to_vec()),
        other => Err(Error::IncompatibleOptions(format!(
            "ECI designator {other} is not supported"
        ))),
    }
}

fn is_alphanumeric(b: u8) -> bool {
    tables::ALPHANUMERIC_CHARSET.contains(&b)
}

/// Pack a Shift JIS pair into the 13-bit kanji-mode value, when the pair
/// lies in the encodable ranges.
fn kanji_value(hi: u8, lo: u8) -> Option<u16> {
    let pair = u16::from(hi) << 8 | u16::from(lo);
    let base = match pair {
        0x8140..=0x9FFC => pair - 0x8140,
        0xE040..=0xEBBF => pair - 0xC140,
        _ => return None,
    };
    Some((base >> 8) * 0xC0 + (base & 0xFF))
}

/// Classify the byte stream into mode runs; Kanji pairs are recognised only
/// when the payload is Shift JIS (ECI 20).
pub(crate) fn classify_stream(bytes: &[u8], allow_kanji: bool) -> Vec<Run> {
    let mut glyphs: Vec<(QrMode, u16)> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if allow_kanji && i + 1 < bytes.len() {
            if let Some(v) = kanji_value(bytes[i], bytes[i + 1]) {
                glyphs.push((QrMode::Kanji, v));
                i += 2;
                continue;
            }
        }
        let b = bytes[i];
        let mode = if b.is_ascii_digit() {
            QrMode::Numeric
        } else if is_alphanumeric(b) {
            QrMode::Alphanumeric
        } else {
            QrMode::Byte
        };
        glyphs.push((mode, u16::from(b)));
        i += 1;
    }

    let mut runs: Vec<Run> = Vec::new();
    for (mode, v) in glyphs {
        match runs.last_mut() {
            Some(r) if r.mode == mode => r.glyphs.push(v),
            _ => runs.push(Run {
                mode,
                glyphs: vec![v],
            }),
        }
    }

    // Demote short text runs toward the weakest adjacent text mode until
    // the run list is stable; Kanji never demotes.
    loop {
        let mut changed = false;
        for i in 0..runs.len() {
            if runs[i].mode == QrMode::Kanji || runs[i].glyphs.len() >= DEMOTE_THRESHOLD {
                continue;
            }
            let weakest = [i.wrapping_sub(1), i + 1]
                .iter()
                .filter_map(|&j| runs.get(j))
                .filter(|r| r.mode != QrMode::Kanji)
                .map(|r| r.mode.rank())
                .min();
            if let Some(rank) = weakest {
                if rank < runs[i].mode.rank() {
                    runs[i].mode = match rank {
                        0 => QrMode::Byte,
                        _ => QrMode::Alphanumeric,
                    };
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
        // Merge neighbours that now share a mode.
        let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
        for run in runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.mode == run.mode => last.glyphs.extend(run.glyphs),
                _ => merged.push(run),
            }
        }
        runs = merged;
    }
    runs
}

/// Payload bit length of a run.
pub(crate) fn payload_bits(mode: QrMode, n: usize) -> usize {
    match mode {
        QrMode::Numeric => 10 * (n / 3) + [0, 4, 7][n % 3],
        QrMode::Alphanumeric => 11 * (n / 2) + 6 * (n % 2),
        QrMode::Byte => 8 * n,
        QrMode::Kanji => 13 * n,
    }
}

/// Append one run's payload (no header) to the bit buffer.
pub(crate) fn append_payload(bb: &mut BitBuffer, run: &Run) -> Result<(), Error> {
    match run.mode {
        QrMode::Numeric => {
            for chunk in run.glyphs.chunks(3) {
                let mut value = 0u32;
                for &g in chunk {
                    value = value * 10 + u32::from(g - u16::from(b'0'));
                }
                bb.append_bits(value, [0u8, 4, 7, 10][chunk.len()])?;
            }
        }
        QrMode::Alphanumeric => {
            for chunk in run.glyphs.chunks(2) {
                let index = |g: u16| {
                    tables::ALPHANUMERIC_CHARSET
                        .iter()
                        .position(|&c| u16::from(c) == g)
                        .unwrap_or(0) as u32
                };
                match chunk {
                    [a, b] => bb.append_bits(index(*a) * 45 + index(*b), 11)?,
                    [a] => bb.append_bits(index(*a), 6)?,
                    _ => unreachable!(),
                }
            }
        }
        QrMode::Byte => {
            for &g in &run.glyphs {
                bb.append_byte(g as u8);
            }
        }
        QrMode::Kanji => {
            for &g in &run.glyphs {
                bb.append_bits(u32::from(g), 13)?;
            }
        }
    }
    Ok(())
}

/// Split data codewords into RS blocks, compute ECC, and interleave data
/// then ECC across blocks.
pub(crate) fn add_ecc_and_interleave(
    data: &[u8],
    version: u8,
    ecc_ordinal: usize,
) -> Result<Vec<u8>, Error> {
    let num_blocks =
        tables::NUM_ERROR_CORRECTION_BLOCKS[ecc_ordinal][version as usize] as usize;
    let block_ecc_len = tables::ECC_CODEWORDS_PER_BLOCK[ecc_ordinal][version as usize] as usize;
    let raw_codewords = tables::num_raw_data_modules(version) / 8;
    let num_short_blocks = num_blocks - raw_codewords % num_blocks;
    let short_block_len = raw_codewords / num_blocks;

    let rs = ReedSolomon::new(QR_PRIME, block_ecc_len, 0)?;
    let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(num_blocks);
    let mut k = 0usize;
    for i in 0..num_blocks {
        let data_len = short_block_len - block_ecc_len + usize::from(i >= num_short_blocks);
        let mut block = data[k..k + data_len].to_vec();
        k += data_len;
        let ecc = rs.encode(&block);
        if i < num_short_blocks {
            // Placeholder so every block has equal length for interleaving.
            block.push(0);
        }
        block.extend_from_slice(&ecc);
        blocks.push(block);
    }

    let mut result = Vec::with_capacity(raw_codewords);
    for i in 0..short_block_len + 1 {
        for (j, block) in blocks.iter().enumerate() {
            if i != short_block_len - block_ecc_len || j >= num_short_blocks {
                result.push(block[i]);
            }
        }
    }
    Ok(result)
}

/// A square module grid with a parallel function-module map.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    pub size: i32,
    modules: Vec<bool>,
    func: Vec<bool>,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        Self {
            size,
            modules: vec![false; (size * size) as usize],
            func: vec![false; (size * size) as usize],
        }
    }

    pub fn module(&self, x: i32, y: i32) -> bool {
        self.modules[(y * self.size + x) as usize]
    }

    pub fn set(&mut self, x: i32, y: i32, dark: bool) {
        self.modules[(y * self.size + x) as usize] = dark;
    }

    pub fn set_function(&mut self, x: i32, y: i32, dark: bool) {
        self.set(x, y, dark);
        self.func[(y * self.size + x) as usize] = true;
    }

    pub fn is_function(&self, x: i32, y: i32) -> bool {
        self.func[(y * self.size + x) as usize]
    }

    /// Draw a finder pattern (with separator ring) centred at (x, y),
    /// clipping at the edges.
    pub fn draw_finder(&mut self, x: i32, y: i32) {
        for dy in -4..=4 {
            for dx in -4..=4 {
                let (xx, yy) = (x + dx, y + dy);
                if xx >= 0 && xx < self.size && yy >= 0 && yy < self.size {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }
}

/// Fifteen-bit format value: BCH(15, 5) remainder appended to the five data
/// bits, before the symbology-specific XOR mask.
pub(crate) fn format_bch(data5: u32) -> u32 {
    let mut rem = data5;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    data5 << 10 | rem
}

/// QR mask condition for pattern 0..=7.
pub(crate) fn qr_mask_bit(mask: u8, x: i32, y: i32) -> bool {
    match mask {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => x * y % 2 + x * y % 3 == 0,
        6 => (x * y % 2 + x * y % 3) % 2 == 0,
        7 => ((x + y) % 2 + x * y % 3) % 2 == 0,
        _ => unreachable!("mask patterns are 0..=7"),
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// The four standard mask penalties, summed.
fn penalty_score(grid: &Grid) -> i32 {
    let size = grid.size;
    let mut result = 0;

    // Runs of five or more like modules, both axes.
    for y in 0..size {
        let mut run_colour = false;
        let mut run = 0;
        for x in 0..size {
            if x == 0 || grid.module(x, y) != run_colour {
                run_colour = grid.module(x, y);
                run = 1;
            } else {
                run += 1;
                if run == 5 {
                    result += PENALTY_N1;
                } else if run > 5 {
                    result += 1;
                }
            }
        }
    }
    for x in 0..size {
        let mut run_colour = false;
        let mut run = 0;
        for y in 0..size {
            if y == 0 || grid.module(x, y) != run_colour {
                run_colour = grid.module(x, y);
                run = 1;
            } else {
                run += 1;
                if run == 5 {
                    result += PENALTY_N1;
                } else if run > 5 {
                    result += 1;
                }
            }
        }
    }

    // 2x2 blocks of one colour.
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let c = grid.module(x, y);
            if c == grid.module(x + 1, y)
                && c == grid.module(x, y + 1)
                && c == grid.module(x + 1, y + 1)
            {
                result += PENALTY_N2;
            }
        }
    }

    // Finder-like 1:1:3:1:1 sequences with light flanks, both axes.
    for y in 0..size {
        let mut bits = 0u32;
        for x in 0..size {
            bits = ((bits << 1) & 0x7FF) | grid.module(x, y) as u32;
            if x >= 10 && (bits == 0x05D || bits == 0x5D0) {
                result += PENALTY_N3;
            }
        }
    }
    for x in 0..size {
        let mut bits = 0u32;
        for y in 0..size {
            bits = ((bits << 1) & 0x7FF) | grid.module(x, y) as u32;
            if y >= 10 && (bits == 0x05D || bits == 0x5D0) {
                result += PENALTY_N3;
            }
        }
    }

    // Dark/light balance in 5% steps away from half.
    let dark: i32 = grid.modules.iter().map(|&m| m as i32).sum();
    let total = size * size;
    let mut k = 0;
    while dark * 20 < (9 - k) * total || dark * 20 > (11 + k) * total {
        result += PENALTY_N4;
        k += 1;
    }
    result
}

/// QR Code encoder.
#[derive(Debug, Clone)]
pub struct Qr {
    ecc_level: Option<EccLevel>,
    preferred_version: Option<u8>,
    data_type: DataType,
    eci: u32,
}

impl Default for Qr {
    fn default() -> Self {
        Self::new()
    }
}

impl Qr {
    pub fn new() -> Self {
        Self {
            ecc_level: None,
            preferred_version: None,
            data_type: DataType::Eci,
            eci: 3,
        }
    }

    /// Pin the error-correction level. Without this the encoder starts at L
    /// and raises to M or Q when the chosen version has room.
    pub fn ecc_level(mut self, level: EccLevel) -> Self {
        self.ecc_level = Some(level);
        self
    }

    /// Request a specific version (1..=40); the payload must fit it.
    pub fn preferred_version(mut self, version: u8) -> Self {
        self.preferred_version = Some(version);
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Select the ECI byte mapping: 3 (ISO-8859-1, default), 20 (Shift JIS,
    /// enables Kanji mode) or 26 (UTF-8).
    pub fn eci(mut self, eci: u32) -> Self {
        self.eci = eci;
        self
    }

    /// Header overhead in bits that precedes the first segment.
    fn header_bits(&self) -> usize {
        let mut bits = 0;
        if self.eci != 3 {
            bits += 4 + 8; // designators below 128 only
        }
        if self.data_type == DataType::Gs1 {
            bits += 4;
        }
        bits
    }

    /// Total stream length in bits for the runs at a version.
    fn stream_bits(&self, runs: &[Run], version: u8) -> Option<usize> {
        let mut total = self.header_bits();
        for run in runs {
            let ccbits = run.mode.count_bits(version);
            if run.glyphs.len() >= 1 << ccbits {
                return None;
            }
            total += 4 + ccbits as usize + payload_bits(run.mode, run.glyphs.len());
        }
        Some(total)
    }

    fn build_stream(&self, runs: &[Run], version: u8, capacity_bits: usize) -> Result<BitBuffer, Error> {
        let mut bb = BitBuffer::with_capacity(capacity_bits);
        if self.eci != 3 {
            bb.append_bits(0b0111, 4)?;
            bb.append_bits(self.eci, 8)?;
        }
        if self.data_type == DataType::Gs1 {
            // FNC1 in first position.
            bb.append_bits(0b0101, 4)?;
        }
        for run in runs {
            bb.append_bits(run.mode.indicator(), 4)?;
            bb.append_bits(run.glyphs.len() as u32, run.mode.count_bits(version))?;
            append_payload(&mut bb, run)?;
        }
        let terminator = 4.min(capacity_bits - bb.len());
        bb.append_bits(0, terminator as u8)?;
        bb.pad_to_byte(false);
        bb.pad_to_length(capacity_bits, &[0xEC, 0x11]);
        Ok(bb)
    }

    fn build_grid(version: u8, ecc: EccLevel, codewords: &[u8]) -> (Grid, u8) {
        let size = i32::from(version) * 4 + 17;
        let mut grid = Grid::new(size);

        // Timing patterns.
        for i in 0..size {
            grid.set_function(6, i, i % 2 == 0);
            grid.set_function(i, 6, i % 2 == 0);
        }
        // Finder patterns overwrite timing ends.
        grid.draw_finder(3, 3);
        grid.draw_finder(size - 4, 3);
        grid.draw_finder(3, size - 4);

        // Alignment patterns, skipping the three finder corners.
        let positions = tables::alignment_positions(version);
        let n = positions.len();
        for (i, &py) in positions.iter().enumerate() {
            for (j, &px) in positions.iter().enumerate() {
                let corner = (i == 0 && j == 0)
                    || (i == 0 && j == n - 1)
                    || (i == n - 1 && j == 0);
                if !corner {
                    grid.draw_alignment(px, py);
                }
            }
        }

        // Reserve format areas with a placeholder, draw version info.
        draw_format(&mut grid, ecc, 0);
        draw_version(&mut grid, version);

        place_data(&mut grid, codewords);

        // Try every mask; lowest penalty wins.
        let mut best_mask = 0u8;
        let mut best_penalty = i32::MAX;
        for mask in 0..8u8 {
            draw_format(&mut grid, ecc, mask);
            apply_mask(&mut grid, mask);
            let penalty = penalty_score(&grid);
            if penalty < best_penalty {
                best_penalty = penalty;
                best_mask = mask;
            }
            // XOR involution restores the unmasked grid.
            apply_mask(&mut grid, mask);
        }
        draw_format(&mut grid, ecc, best_mask);
        apply_mask(&mut grid, best_mask);
        (grid, best_mask)
    }
}

/// Draw both copies of the format information for the given mask.
fn draw_format(grid: &mut Grid, ecc: EccLevel, mask: u8) {
    let size = grid.size;
    let data = format_bch(ecc.format_bits() << 3 | u32::from(mask)) ^ 0x5412;

    let bit = |i: u32| (data >> i) & 1 != 0;
    for i in 0..6 {
        grid.set_function(8, i, bit(i as u32));
    }
    grid.set_function(8, 7, bit(6));
    grid.set_function(8, 8, bit(7));
    grid.set_function(7, 8, bit(8));
    for i in 9..15 {
        grid.set_function(14 - i, 8, bit(i as u32));
    }

    for i in 0..8 {
        grid.set_function(size - 1 - i, 8, bit(i as u32));
    }
    for i in 8..15 {
        grid.set_function(8, size - 15 + i, bit(i as u32));
    }
    // The dark module.
    grid.set_function(8, size - 8, true);
}

/// Draw the version information blocks for versions 7 and above.
fn draw_version(grid: &mut Grid, version: u8) {
    if version < 7 {
        return;
    }
    let mut rem = u32::from(version);
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    let data = u32::from(version) << 12 | rem;
    for i in 0..18 {
        let bit = (data >> i) & 1 != 0;
        let a = grid.size - 11 + i % 3;
        let b = i / 3;
        grid.set_function(a, b, bit);
        grid.set_function(b, a, bit);
    }
}

/// Walk the two-module columns right to left, flipping direction at each
/// column end, writing one bit per non-function cell.
pub(crate) fn place_data(grid: &mut Grid, codewords: &[u8]) {
    let size = grid.size;
    let mut i = 0usize;
    let mut right = size - 1;
    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        for vert in 0..size {
            for j in 0..2 {
                let x = right - j;
                let upward = (right + 1) & 2 == 0;
                let y = if upward { size - 1 - vert } else { vert };
                if !grid.is_function(x, y) && i < codewords.len() * 8 {
                    grid.set(x, y, (codewords[i >> 3] >> (7 - (i & 7))) & 1 != 0);
                    i += 1;
                }
            }
        }
        right -= 2;
    }
}

/// XOR the mask over all data modules. Involutive.
pub(crate) fn apply_mask(grid: &mut Grid, mask: u8) {
    for y in 0..grid.size {
        for x in 0..grid.size {
            if !grid.is_function(x, y) && qr_mask_bit(mask, x, y) {
                let m = grid.module(x, y);
                grid.set(x, y, !m);
            }
        }
    }
}

impl Encoder for Qr {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.is_empty() {
            return Err(Error::LengthOutOfRange("QR input is empty".into()));
        }
        let processed = match self.data_type {
            DataType::Gs1 => input::gs1_process(content)?,
            DataType::Hibc => input::hibc_wrap(content)?,
            DataType::Eci => content.to_string(),
        };
        // GS1 separators travel as GS bytes and decode as FNC1.
        let bytes = byte_stream(&processed, self.eci)?;
        let runs = classify_stream(&bytes, self.eci == 20);

        let base_ecc = self.ecc_level.unwrap_or(EccLevel::L);
        let versions: Vec<u8> = match self.preferred_version {
            Some(v) if (1..=40).contains(&v) => vec![v],
            Some(v) => {
                return Err(Error::IncompatibleOptions(format!(
                    "QR version {v} is outside 1..=40"
                )));
            }
            None => (1..=40).collect(),
        };

        let mut chosen: Option<(u8, usize)> = None;
        for v in versions {
            if let Some(bits) = self.stream_bits(&runs, v) {
                if bits <= tables::num_data_codewords(v, base_ecc.ordinal()) * 8 {
                    chosen = Some((v, bits));
                    break;
                }
            }
        }
        let Some((version, used_bits)) = chosen else {
            return Err(Error::CapacityExceeded(
                "payload does not fit any permitted QR version".into(),
            ));
        };

        // Raise ECC while the stream still fits, unless pinned.
        let mut ecc = base_ecc;
        if self.ecc_level.is_none() {
            for candidate in [EccLevel::M, EccLevel::Q] {
                if used_bits <= tables::num_data_codewords(version, candidate.ordinal()) * 8 {
                    ecc = candidate;
                }
            }
        }

        let capacity_bits = tables::num_data_codewords(version, ecc.ordinal()) * 8;
        let bb = self.build_stream(&runs, version, capacity_bits)?;
        let data = bb.to_codewords();
        let all = add_ecc_and_interleave(&data, version, ecc.ordinal())?;
        let (grid, mask) = Self::build_grid(version, ecc, &all);

        let size = grid.size;
        let rectangles = plot::plot_grid(size, size, |x, y| grid.module(x, y));
        Ok(Symbol {
            content: content.to_string(),
            width: size,
            height: size,
            rectangles,
            encode_info: format!(
                "Version: {version}\nECC Level: {}\nMask Pattern: {mask:03b}\n",
                ecc.letter()
            ),
            quiet_zone_h: 4,
            quiet_zone_v: 4,
            data_type: self.data_type,
            eci_mode: self.eci,
            ..Default::default()
        })
    }
}
