//! # Geometric Model
//!
//! Value types for the device-independent geometry an encoder emits:
//! rectangles, hexagons, circles and human-readable text boxes.
//!
//! All types derive `Serialize + Deserialize` so the same structs serve the
//! Rust API and any JSON surface a renderer wants to consume. Coordinates for
//! rectangles and text are integers in module units; hexagons and circles use
//! doubles. Nothing here references a drawing API — colours, stroke widths
//! and device pixels are the renderer's concern.

use serde::{Deserialize, Serialize};

/// A contiguous run of ink modules in one logical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Unit vertex offsets of a module hexagon, clockwise from the top.
const HEX_OFFSETS: [(f64, f64); 6] = [
    (0.0, 1.0),
    (0.86, 0.5),
    (0.86, -0.5),
    (0.0, -1.0),
    (-0.86, -0.5),
    (-0.86, 0.5),
];

/// Ink spread applied to hexagon vertices, in module units.
const HEX_INK_SPREAD: f64 = 1.25;

/// One ink module on an offset-hex lattice. Only the centre is stored; the
/// outline is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hexagon {
    pub cx: f64,
    pub cy: f64,
}

impl Hexagon {
    pub fn new(cx: f64, cy: f64) -> Self {
        Self { cx, cy }
    }

    /// The six outline vertices, clockwise from the top.
    pub fn vertices(&self) -> [(f64, f64); 6] {
        HEX_OFFSETS.map(|(dx, dy)| {
            (
                self.cx + dx * HEX_INK_SPREAD,
                self.cy + dy * HEX_INK_SPREAD,
            )
        })
    }
}

/// A circle outline. Consecutive pairs in a symbol's target list form an
/// annulus (outer radius first).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self { cx, cy, radius }
    }
}

/// Horizontal alignment of a human-readable text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Right,
    #[default]
    Center,
    /// Spread the glyphs across the full box width (EAN/UPC digit groups).
    Justify,
}

/// Human-readable text positioned below (or beside) the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub text: String,
    pub alignment: TextAlign,
}

impl TextBox {
    pub fn new(x: i32, y: i32, width: i32, text: impl Into<String>, alignment: TextAlign) -> Self {
        Self {
            x,
            y,
            width,
            text: text.into(),
            alignment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_equality_is_structural() {
        assert_eq!(Rectangle::new(1, 2, 3, 4), Rectangle::new(1, 2, 3, 4));
        assert_ne!(Rectangle::new(1, 2, 3, 4), Rectangle::new(1, 2, 3, 5));
    }

    #[test]
    fn test_hexagon_vertices_scale_from_centre() {
        let hex = Hexagon::new(10.0, 20.0);
        let v = hex.vertices();
        assert_eq!(v[0], (10.0, 21.25));
        assert_eq!(v[3], (10.0, 18.75));
        assert_eq!(v[1], (10.0 + 0.86 * 1.25, 20.0 + 0.5 * 1.25));
        // Opposite vertices mirror through the centre.
        for i in 0..3 {
            let (ax, ay) = v[i];
            let (bx, by) = v[i + 3];
            assert!((ax + bx - 20.0).abs() < 1e-9);
            assert!((ay + by - 40.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let tb = TextBox::new(0, 52, 90, "*HELLO*", TextAlign::Center);
        let json = serde_json::to_string(&tb).unwrap();
        assert!(json.contains("\"center\""));
        let back: TextBox = serde_json::from_str(&json).unwrap();
        assert_eq!(tb, back);
    }
}
