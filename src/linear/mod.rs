//! # Linear Symbologies
//!
//! The table-driven 1D codes. Each encoder follows the same scheme:
//! validate the character set, map characters (and computed check digits)
//! through the symbology table into width-pattern fragments, frame with
//! start/stop codes, and hand the pattern to the shared plotter.

use crate::error::Error;
use crate::geometry::{TextAlign, TextBox};
use crate::plot;
use crate::symbol::Symbol;

pub mod codabar;
pub mod code11;
pub mod code39;
pub mod code93;
pub mod msi;
pub mod postal;
pub mod upcean;

/// Default bar height for linear codes, in modules.
pub(crate) const DEFAULT_HEIGHT: i32 = 50;

/// Default quiet zones for linear codes, in modules per side.
pub(crate) const QUIET_H: i32 = 10;
pub(crate) const QUIET_V: i32 = 2;

/// Assemble a single-row symbol from a width pattern.
pub(crate) fn one_d_symbol(
    content: impl Into<String>,
    readable: impl Into<String>,
    pattern: &str,
    height: i32,
    align: TextAlign,
    encode_info: String,
) -> Result<Symbol, Error> {
    let mut rectangles = Vec::new();
    let width = plot::plot_row(pattern, 0, height, &mut rectangles)?;
    let readable = readable.into();
    let mut texts = Vec::new();
    if !readable.is_empty() {
        texts.push(TextBox::new(0, height, width, readable.clone(), align));
    }
    Ok(Symbol {
        content: content.into(),
        readable,
        width,
        height,
        rectangles,
        texts,
        encode_info,
        quiet_zone_h: QUIET_H,
        quiet_zone_v: QUIET_V,
        ..Default::default()
    })
}

/// Reject content whose characters fall outside `charset`.
pub(crate) fn check_charset(content: &str, charset: &str, name: &str) -> Result<(), Error> {
    match content.chars().find(|c| !charset.contains(*c)) {
        Some(c) => Err(Error::InvalidCharacter(format!(
            "character {c:?} not valid in {name}"
        ))),
        None => Ok(()),
    }
}

/// Reject content that is empty or longer than `max` characters.
pub(crate) fn check_length(content: &str, max: usize, name: &str) -> Result<(), Error> {
    if content.is_empty() {
        return Err(Error::LengthOutOfRange(format!("{name} input is empty")));
    }
    if content.len() > max {
        return Err(Error::LengthOutOfRange(format!(
            "{name} input exceeds {max} characters"
        )));
    }
    Ok(())
}
