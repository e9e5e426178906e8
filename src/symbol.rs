//! # Symbol
//!
//! The owned, immutable result of a successful encode: symbol extents in
//! module units, the geometric primitives, human-readable text, and the
//! diagnostic trail.
//!
//! Encoders are plain option structs with builder-style setters (see the
//! individual symbology modules); they all implement [`Encoder`], whose one
//! method consumes a payload and returns a fully populated [`Symbol`] or a
//! single [`Error`]. Nothing in a `Symbol` is mutated after `encode`
//! returns.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{Circle, Hexagon, Rectangle, TextBox};

/// Interpretation applied to the payload before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Plain text mapped through the selected ECI (default ISO-8859-1).
    #[default]
    Eci,
    /// GS1 Application Identifier data using `[nn]` bracket syntax.
    Gs1,
    /// HIBC: leading `+`, trailing MOD-43 check character.
    Hibc,
}

/// Default ECI designator: ISO-8859-1.
pub const DEFAULT_ECI: u32 = 3;

/// An encoded barcode symbol.
///
/// Extents and rectangle/text coordinates are in module units; device
/// scaling, colour and quiet-zone rendering belong to the renderer. The
/// quiet-zone fields are carried through unchanged for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// The logical payload, after unescaping and data-type preprocessing.
    pub content: String,
    /// Human-readable interpretation; empty for matrix codes.
    pub readable: String,
    /// Symbol width in modules, excluding quiet zones.
    pub width: i32,
    /// Symbol height in modules, excluding quiet zones.
    pub height: i32,
    /// Ink runs; empty for symbols emitted as hexagons.
    pub rectangles: Vec<Rectangle>,
    /// Hexagonal modules (offset-hex lattice symbologies).
    pub hexagons: Vec<Hexagon>,
    /// Bullseye circles; consecutive pairs form an annulus.
    pub target: Vec<Circle>,
    /// Human-readable text boxes.
    pub texts: Vec<TextBox>,
    /// Diagnostic trail: one `Key: value` entry per line.
    pub encode_info: String,
    /// Horizontal quiet zone, in modules per side.
    pub quiet_zone_h: i32,
    /// Vertical quiet zone, in modules per side.
    pub quiet_zone_v: i32,
    /// Payload interpretation that produced this symbol.
    pub data_type: DataType,
    /// ECI designator in effect.
    pub eci_mode: u32,
}

impl Default for Symbol {
    fn default() -> Self {
        Self {
            content: String::new(),
            readable: String::new(),
            width: 0,
            height: 0,
            rectangles: Vec::new(),
            hexagons: Vec::new(),
            target: Vec::new(),
            texts: Vec::new(),
            encode_info: String::new(),
            quiet_zone_h: 0,
            quiet_zone_v: 0,
            data_type: DataType::Eci,
            eci_mode: DEFAULT_ECI,
        }
    }
}

impl Symbol {
    /// Look up a diagnostic value by its line prefix, e.g.
    /// `info("Check Digit: ")`.
    pub fn info(&self, prefix: &str) -> Option<&str> {
        self.encode_info
            .lines()
            .find_map(|line| line.strip_prefix(prefix))
    }
}

/// The single polymorphic seam of the library: one encoder, one method.
pub trait Encoder {
    /// Encode `content` into a symbol.
    ///
    /// On failure exactly one diagnostic is produced and no geometry.
    fn encode(&self, content: &str) -> Result<Symbol, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_prefix_lookup() {
        let symbol = Symbol {
            encode_info: "Check Digit: 7\nSymbol Rows: 4\n".into(),
            ..Default::default()
        };
        assert_eq!(symbol.info("Check Digit: "), Some("7"));
        assert_eq!(symbol.info("Symbol Rows: "), Some("4"));
        assert_eq!(symbol.info("Mask Pattern: "), None);
    }

    #[test]
    fn test_default_eci_is_latin1() {
        assert_eq!(Symbol::default().eci_mode, 3);
    }
}
