//! # Micro QR
//!
//! The reduced QR variant: versions M1..M4, a single finder pattern, four
//! mask candidates and a 15-bit format word indexed by symbol number and
//! mask. Shares classification, bit assembly and Reed-Solomon with the full
//! QR encoder.
//!
//! Mode availability narrows with size: M1 carries numeric data only, M2
//! adds alphanumeric, M3 and M4 carry all four modes.

use crate::bits::BitBuffer;
use crate::ecc::ReedSolomon;
use crate::error::Error;
use crate::plot;
use crate::symbol::{DataType, Encoder, Symbol};

use super::{
    append_payload, byte_stream, classify_stream, format_bch, payload_bits, EccLevel, Grid,
    QrMode, Run, QR_PRIME,
};

/// Micro QR version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MicroVersion {
    M1,
    M2,
    M3,
    M4,
}

impl MicroVersion {
    const ALL: [MicroVersion; 4] = [
        MicroVersion::M1,
        MicroVersion::M2,
        MicroVersion::M3,
        MicroVersion::M4,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Side length in modules: 11, 13, 15, 17.
    pub fn size(self) -> i32 {
        11 + 2 * self.index() as i32
    }

    pub fn name(self) -> &'static str {
        ["M1", "M2", "M3", "M4"][self.index()]
    }

    /// Mode indicator width in bits.
    fn mode_bits(self) -> u8 {
        self.index() as u8
    }

    /// Terminator width in bits.
    fn terminator_bits(self) -> usize {
        3 + 2 * self.index()
    }

    fn mode_indicator(self, mode: QrMode) -> u32 {
        match mode {
            QrMode::Numeric => 0,
            QrMode::Alphanumeric => 1,
            QrMode::Byte => 2,
            QrMode::Kanji => 3,
        }
    }

    fn supports(self, mode: QrMode) -> bool {
        match mode {
            QrMode::Numeric => true,
            QrMode::Alphanumeric => self >= MicroVersion::M2,
            QrMode::Byte | QrMode::Kanji => self >= MicroVersion::M3,
        }
    }

    /// Character-count width for a mode.
    fn count_bits(self, mode: QrMode) -> u8 {
        let row = match mode {
            QrMode::Numeric => [3, 4, 5, 6],
            QrMode::Alphanumeric => [0, 3, 4, 5],
            QrMode::Byte => [0, 0, 4, 5],
            QrMode::Kanji => [0, 0, 3, 4],
        };
        row[self.index()]
    }
}

/// Per-(version, level) capacity: data bits, data codewords (the last one
/// is 4 bits wide for M1 and M3), ECC codewords and the format symbol
/// number.
struct Capacity {
    version: MicroVersion,
    level: EccLevel,
    data_bits: usize,
    data_codewords: usize,
    ecc_codewords: usize,
    symbol_number: u32,
}

static CAPACITIES: [Capacity; 8] = [
    Capacity {
        version: MicroVersion::M1,
        level: EccLevel::L,
        data_bits: 20,
        data_codewords: 3,
        ecc_codewords: 2,
        symbol_number: 0,
    },
    Capacity {
        version: MicroVersion::M2,
        level: EccLevel::L,
        data_bits: 40,
        data_codewords: 5,
        ecc_codewords: 5,
        symbol_number: 1,
    },
    Capacity {
        version: MicroVersion::M2,
        level: EccLevel::M,
        data_bits: 32,
        data_codewords: 4,
        ecc_codewords: 6,
        symbol_number: 2,
    },
    Capacity {
        version: MicroVersion::M3,
        level: EccLevel::L,
        data_bits: 84,
        data_codewords: 11,
        ecc_codewords: 6,
        symbol_number: 3,
    },
    Capacity {
        version: MicroVersion::M3,
        level: EccLevel::M,
        data_bits: 68,
        data_codewords: 9,
        ecc_codewords: 8,
        symbol_number: 4,
    },
    Capacity {
        version: MicroVersion::M4,
        level: EccLevel::L,
        data_bits: 128,
        data_codewords: 16,
        ecc_codewords: 8,
        symbol_number: 5,
    },
    Capacity {
        version: MicroVersion::M4,
        level: EccLevel::M,
        data_bits: 112,
        data_codewords: 14,
        ecc_codewords: 10,
        symbol_number: 6,
    },
    Capacity {
        version: MicroVersion::M4,
        level: EccLevel::Q,
        data_bits: 80,
        data_codewords: 10,
        ecc_codewords: 14,
        symbol_number: 7,
    },
];

fn capacity(version: MicroVersion, level: EccLevel) -> Option<&'static Capacity> {
    CAPACITIES
        .iter()
        .find(|c| c.version == version && c.level == level)
}

/// Micro QR mask condition for patterns 0..=3.
fn micro_mask_bit(mask: u8, x: i32, y: i32) -> bool {
    match mask {
        0 => y % 2 == 0,
        1 => (y / 2 + x / 3) % 2 == 0,
        2 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        3 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => unreachable!("micro mask patterns are 0..=3"),
    }
}

/// Micro QR encoder.
///
/// ## Example
///
/// ```
/// use cebra::qr::microqr::MicroQr;
/// use cebra::symbol::Encoder;
///
/// let symbol = MicroQr::new().encode("01234").unwrap();
/// assert_eq!(symbol.info("Version: "), Some("M1"));
/// assert_eq!(symbol.width, 11);
/// ```
#[derive(Debug, Clone)]
pub struct MicroQr {
    ecc_level: Option<EccLevel>,
    preferred_version: Option<MicroVersion>,
    eci: u32,
}

impl Default for MicroQr {
    fn default() -> Self {
        Self::new()
    }
}

impl MicroQr {
    pub fn new() -> Self {
        Self {
            ecc_level: None,
            preferred_version: None,
            eci: 3,
        }
    }

    /// Pin the error-correction level. L fits every version, M needs M2 or
    /// larger, Q only M4; H is not defined for Micro QR.
    pub fn ecc_level(mut self, level: EccLevel) -> Self {
        self.ecc_level = Some(level);
        self
    }

    pub fn preferred_version(mut self, version: MicroVersion) -> Self {
        self.preferred_version = Some(version);
        self
    }

    /// Byte mapping: 3 (ISO-8859-1) or 20 (Shift JIS, enables Kanji).
    pub fn eci(mut self, eci: u32) -> Self {
        self.eci = eci;
        self
    }

    /// Stream length in bits at a version, if every mode is available and
    /// every count fits its field.
    fn stream_bits(runs: &[Run], version: MicroVersion) -> Option<usize> {
        let mut total = 0usize;
        for run in runs {
            if !version.supports(run.mode) {
                return None;
            }
            let ccbits = version.count_bits(run.mode);
            if run.glyphs.len() >= 1 << ccbits {
                return None;
            }
            total += version.mode_bits() as usize
                + ccbits as usize
                + payload_bits(run.mode, run.glyphs.len());
        }
        Some(total)
    }

    fn build_stream(
        runs: &[Run],
        cap: &Capacity,
    ) -> Result<BitBuffer, Error> {
        let mut bb = BitBuffer::with_capacity(cap.data_bits);
        for run in runs {
            bb.append_bits(
                cap.version.mode_indicator(run.mode),
                cap.version.mode_bits(),
            )?;
            bb.append_bits(
                run.glyphs.len() as u32,
                cap.version.count_bits(run.mode),
            )?;
            append_payload(&mut bb, run)?;
        }
        let terminator = cap.version.terminator_bits().min(cap.data_bits - bb.len());
        bb.append_bits(0, terminator as u8)?;
        // Zero-fill the current codeword, then alternate pad codewords;
        // the final half codeword of M1/M3 zero-fills.
        while bb.len() % 8 != 0 && bb.len() < cap.data_bits {
            bb.append_bit(false);
        }
        let mut pad = 0xECu8;
        while bb.len() + 8 <= cap.data_bits {
            bb.append_byte(pad);
            pad ^= 0xEC ^ 0x11;
        }
        while bb.len() < cap.data_bits {
            bb.append_bit(false);
        }
        Ok(bb)
    }

    /// Cut the data stream into codewords; for M1 and M3 the final data
    /// codeword is the trailing 4-bit value.
    fn stream_codewords(bb: &BitBuffer, cap: &Capacity) -> Vec<u8> {
        let mut cw = Vec::with_capacity(cap.data_codewords);
        let mut bit = 0usize;
        for i in 0..cap.data_codewords {
            let width = if bb.len() % 8 == 4 && i == cap.data_codewords - 1 {
                4
            } else {
                8
            };
            let mut value = 0u8;
            for _ in 0..width {
                value = value << 1 | bb.bit(bit) as u8;
                bit += 1;
            }
            cw.push(value);
        }
        cw
    }

    fn build_grid(cap: &Capacity, bits: &BitBuffer) -> (Grid, u8) {
        let size = cap.version.size();
        let mut grid = Grid::new(size);

        // Timing along the top row and left column.
        for i in 8..size {
            grid.set_function(i, 0, i % 2 == 0);
            grid.set_function(0, i, i % 2 == 0);
        }
        grid.draw_finder(3, 3);
        // Reserve the format strip.
        draw_micro_format(&mut grid, cap.symbol_number, 0);

        place_micro_bits(&mut grid, bits);

        let mut best_mask = 0u8;
        let mut best_score = -1i32;
        for mask in 0..4u8 {
            draw_micro_format(&mut grid, cap.symbol_number, mask);
            apply_micro_mask(&mut grid, mask);
            let score = edge_score(&grid);
            if score > best_score {
                best_score = score;
                best_mask = mask;
            }
            apply_micro_mask(&mut grid, mask);
        }
        draw_micro_format(&mut grid, cap.symbol_number, best_mask);
        apply_micro_mask(&mut grid, best_mask);
        (grid, best_mask)
    }
}

/// Place the fifteen format bits around the finder.
fn draw_micro_format(grid: &mut Grid, symbol_number: u32, mask: u8) {
    let data = format_bch(symbol_number << 2 | u32::from(mask)) ^ 0x4445;
    for i in 0..15u32 {
        let bit = (data >> i) & 1 != 0;
        if i < 8 {
            grid.set_function(8, i as i32 + 1, bit);
        } else {
            grid.set_function(15 - i as i32, 8, bit);
        }
    }
}

/// Two-module column walk from the right edge; no timing column interrupts
/// the stride, so no column skip is needed.
fn place_micro_bits(grid: &mut Grid, bits: &BitBuffer) {
    let size = grid.size;
    let mut i = 0usize;
    let mut upward = true;
    let mut right = size - 1;
    while right >= 1 {
        for vert in 0..size {
            for j in 0..2 {
                let x = right - j;
                let y = if upward { size - 1 - vert } else { vert };
                if !grid.is_function(x, y) && i < bits.len() {
                    grid.set(x, y, bits.bit(i));
                    i += 1;
                }
            }
        }
        upward = !upward;
        right -= 2;
    }
}

fn apply_micro_mask(grid: &mut Grid, mask: u8) {
    for y in 0..grid.size {
        for x in 0..grid.size {
            if !grid.is_function(x, y) && micro_mask_bit(mask, x, y) {
                let m = grid.module(x, y);
                grid.set(x, y, !m);
            }
        }
    }
}

/// Mask evaluation: dark counts along the right and bottom edges, favouring
/// the balanced maximum.
fn edge_score(grid: &Grid) -> i32 {
    let size = grid.size;
    let sum1: i32 = (1..size).map(|y| grid.module(size - 1, y) as i32).sum();
    let sum2: i32 = (1..size).map(|x| grid.module(x, size - 1) as i32).sum();
    sum1.min(sum2) * 16 + sum1.max(sum2)
}

impl Encoder for MicroQr {
    fn encode(&self, content: &str) -> Result<Symbol, Error> {
        if content.is_empty() {
            return Err(Error::LengthOutOfRange("Micro QR input is empty".into()));
        }
        if self.ecc_level == Some(EccLevel::H) {
            return Err(Error::IncompatibleOptions(
                "Micro QR does not define ECC level H".into(),
            ));
        }

        let bytes = byte_stream(content, self.eci)?;
        let runs = classify_stream(&bytes, self.eci == 20);

        let base_ecc = self.ecc_level.unwrap_or(EccLevel::L);
        let versions: Vec<MicroVersion> = match self.preferred_version {
            Some(v) => vec![v],
            None => MicroVersion::ALL.to_vec(),
        };

        let mut chosen: Option<(&Capacity, usize)> = None;
        for v in versions {
            let Some(cap) = capacity(v, base_ecc) else {
                continue;
            };
            if let Some(bits) = Self::stream_bits(&runs, v) {
                if bits <= cap.data_bits {
                    chosen = Some((cap, bits));
                    break;
                }
            }
        }
        let Some((mut cap, used_bits)) = chosen else {
            return Err(Error::CapacityExceeded(
                "payload does not fit any permitted Micro QR version".into(),
            ));
        };

        // Raise the level within the chosen version when space allows.
        if self.ecc_level.is_none() {
            for level in [EccLevel::M, EccLevel::Q] {
                if let Some(better) = capacity(cap.version, level) {
                    if used_bits <= better.data_bits {
                        cap = better;
                    }
                }
            }
        }

        let bb = Self::build_stream(&runs, cap)?;
        let data_cw = Self::stream_codewords(&bb, cap);
        let rs = ReedSolomon::new(QR_PRIME, cap.ecc_codewords, 0)?;
        let ecc = rs.encode(&data_cw);

        let mut bits = bb.clone();
        for &e in &ecc {
            bits.append_byte(e);
        }

        let (grid, mask) = Self::build_grid(cap, &bits);
        let size = grid.size;
        let rectangles = plot::plot_grid(size, size, |x, y| grid.module(x, y));

        Ok(Symbol {
            content: content.to_string(),
            width: size,
            height: size,
            rectangles,
            encode_info: format!(
                "Version: {}\nECC Level: {}\nMask Pattern: {mask:02b}\n",
                cap.version.name(),
                cap.level.letter()
            ),
            quiet_zone_h: 2,
            quiet_zone_v: 2,
            data_type: DataType::Eci,
            eci_mode: self.eci,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_five_digits_select_m1() {
        let symbol = MicroQr::new().ecc_level(EccLevel::L).encode("01234").unwrap();
        assert_eq!(symbol.info("Version: "), Some("M1"));
        assert_eq!(symbol.width, 11);
        assert_eq!(symbol.height, 11);
    }

    #[test]
    fn test_m1_stream_is_exactly_full() {
        // 3-bit count + 5 digits (10 + 7 bits) = 20 bits: M1 has no slack.
        let runs = classify_stream(b"01234", false);
        assert_eq!(MicroQr::stream_bits(&runs, MicroVersion::M1), Some(20));
    }

    #[test]
    fn test_byte_content_needs_m3() {
        let symbol = MicroQr::new().ecc_level(EccLevel::L).encode("abc").unwrap();
        assert_eq!(symbol.info("Version: "), Some("M3"));
        assert_eq!(symbol.width, 15);
    }

    #[test]
    fn test_alphanumeric_needs_m2() {
        let symbol = MicroQr::new().ecc_level(EccLevel::L).encode("AB").unwrap();
        assert_eq!(symbol.info("Version: "), Some("M2"));
    }

    #[test]
    fn test_ecc_h_rejected() {
        let err = MicroQr::new()
            .ecc_level(EccLevel::H)
            .encode("1")
            .unwrap_err();
        assert_eq!(err.category(), "IncompatibleOptions");
    }

    #[test]
    fn test_q_only_at_m4() {
        let symbol = MicroQr::new().ecc_level(EccLevel::Q).encode("1").unwrap();
        assert_eq!(symbol.info("Version: "), Some("M4"));
        assert_eq!(symbol.info("ECC Level: "), Some("Q"));
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = MicroQr::new().encode(&"7".repeat(80)).unwrap_err();
        assert_eq!(err.category(), "CapacityExceeded");
    }

    #[test]
    fn test_m1_codeword_cut() {
        let runs = classify_stream(b"01234", false);
        let cap = capacity(MicroVersion::M1, EccLevel::L).unwrap();
        let bb = MicroQr::build_stream(&runs, cap).unwrap();
        assert_eq!(bb.len(), 20);
        let cw = MicroQr::stream_codewords(&bb, cap);
        assert_eq!(cw.len(), 3);
        assert!(cw[2] < 16);
    }

    #[test]
    fn test_placement_covers_all_bits() {
        // M2-L: 10 codewords, 80 bits of data area.
        let cap = capacity(MicroVersion::M2, EccLevel::L).unwrap();
        let mut grid = Grid::new(cap.version.size());
        let size = grid.size;
        for i in 8..size {
            grid.set_function(i, 0, i % 2 == 0);
            grid.set_function(0, i, i % 2 == 0);
        }
        grid.draw_finder(3, 3);
        draw_micro_format(&mut grid, cap.symbol_number, 0);

        let free: usize = (0..size * size)
            .filter(|i| !grid.is_function(i % size, i / size))
            .count();
        assert_eq!(free, (cap.data_codewords + cap.ecc_codewords) * 8);
    }
}
