//! # End-to-End Encoding Tests
//!
//! These tests drive whole encoders through the public API and pin the
//! contract a renderer relies on: symbol extents, rectangle layout, the
//! human-readable text, and the `encode_info` diagnostic trail.
//!
//! ## Test Coverage
//!
//! - **Scenario tests**: one literal input per symbology with its critical
//!   output fields.
//! - **Invariant tests**: geometry bounds and non-overlap across every
//!   symbology, failure hygiene, thread independence.
//! - **Contract tests**: the JSON shape of the geometric model.

use pretty_assertions::assert_eq;

use cebra::code128::code16k::Code16K;
use cebra::code128::Code128;
use cebra::datamatrix::DataMatrix;
use cebra::geometry::TextAlign;
use cebra::linear::codabar::Codabar;
use cebra::linear::code39::Code39;
use cebra::linear::upcean::{Ean13, UpcA};
use cebra::pdf417::Pdf417;
use cebra::qr::microqr::MicroQr;
use cebra::qr::{EccLevel, Qr};
use cebra::{Encoder, Error, Symbol};

/// Every encoder under test, boxed for the sweep tests.
fn all_encoders() -> Vec<(&'static str, Box<dyn Encoder>, &'static str)> {
    vec![
        ("code39", Box::new(Code39::new()), "HELLO"),
        ("codabar", Box::new(Codabar::new()), "A12345B"),
        ("code128", Box::new(Code128::new()), "12345678"),
        ("code16k", Box::new(Code16K::new()), "STACKED"),
        ("qr", Box::new(Qr::new()), "HELLO WORLD"),
        ("microqr", Box::new(MicroQr::new()), "01234"),
        ("datamatrix", Box::new(DataMatrix::new()), "123456"),
        ("pdf417", Box::new(Pdf417::new()), "PDF417"),
        ("ean13", Box::new(Ean13::new()), "501234567890"),
        ("upca", Box::new(UpcA::new()), "01234567890"),
    ]
}

// ============================================================================
// SCENARIO TESTS
// ============================================================================

#[test]
fn scenario_code39_hello() {
    let symbol = Code39::new().encode("HELLO").unwrap();
    assert_eq!(symbol.readable, "*HELLO*");
    // Single row: every rectangle spans the full bar height at y = 0.
    assert!(symbol.rectangles.iter().all(|r| r.y == 0));
    // The start character opens with a narrow bar and a wide space.
    assert_eq!(symbol.rectangles[0].x, 0);
    assert_eq!(symbol.rectangles[0].width, 1);
    assert_eq!(symbol.rectangles[1].x, 3);
}

#[test]
fn scenario_codabar() {
    let symbol = Codabar::new().encode("A12345B").unwrap();
    assert_eq!(symbol.readable, "A12345B");
    assert!(symbol.rectangles.iter().all(|r| r.y == 0));
}

#[test]
fn scenario_code128_digits() {
    let symbol = Code128::new().encode("12345678").unwrap();
    // Start-C, four digit pairs, check digit at 11 modules each, stop at 13.
    assert_eq!(symbol.width, 79);

    let cw = Code128::new().codewords("12345678").unwrap();
    assert_eq!(cw[0], 105);
    assert_eq!(&cw[1..5], &[12, 34, 56, 78]);
    // The published check-digit equation.
    let weighted: u32 = u32::from(cw[0])
        + cw[1..cw.len() - 2]
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as u32 + 1) * u32::from(c))
            .sum::<u32>();
    assert_eq!(weighted % 103, u32::from(cw[cw.len() - 2]));
}

#[test]
fn scenario_qr_hello_world() {
    let symbol = Qr::new().ecc_level(EccLevel::L).encode("HELLO WORLD").unwrap();
    assert_eq!(symbol.width, 21);
    assert_eq!(symbol.height, 21);
    assert_eq!(symbol.info("Version: "), Some("1"));
    assert_eq!(symbol.info("ECC Level: "), Some("L"));
    let mask = symbol.info("Mask Pattern: ").unwrap();
    assert_eq!(mask.len(), 3);
    assert!(mask.bytes().all(|b| b == b'0' || b == b'1'));
}

#[test]
fn scenario_microqr_digits() {
    let symbol = MicroQr::new().ecc_level(EccLevel::L).encode("01234").unwrap();
    assert_eq!(symbol.width, 11);
    assert_eq!(symbol.info("Version: "), Some("M1"));
}

#[test]
fn scenario_ean13_check_digit() {
    let symbol = Ean13::new().encode("501234567890").unwrap();
    assert_eq!(symbol.readable, "5012345678900");
    assert_eq!(symbol.info("Check Digit: "), Some("0"));
    assert_eq!(symbol.width, 95);

    // Left guard at x = 0 and 2, centre guard bars at 45 and 47, right
    // guard closing the symbol.
    let bar_at = |x: i32| symbol.rectangles.iter().any(|r| r.x == x && r.width == 1);
    assert!(bar_at(0));
    assert!(bar_at(2));
    assert!(bar_at(46));
    assert!(bar_at(48));
    assert!(bar_at(92));
    assert!(bar_at(94));
}

// ============================================================================
// INVARIANT TESTS
// ============================================================================

/// Rectangles sorted by x within a row never overlap and stay in bounds.
#[test]
fn invariant_geometry_bounds_and_no_overlap() {
    for (name, encoder, content) in all_encoders() {
        let symbol = encoder.encode(content).unwrap();
        assert!(symbol.width > 0 && symbol.height > 0, "{name}");
        for r in &symbol.rectangles {
            assert!(r.x >= 0 && r.y >= 0, "{name}: negative origin");
            assert!(r.x + r.width <= symbol.width, "{name}: x overflow");
            assert!(r.y + r.height <= symbol.height, "{name}: y overflow");
        }
        let mut rows: std::collections::HashMap<(i32, i32), Vec<(i32, i32)>> =
            std::collections::HashMap::new();
        for r in &symbol.rectangles {
            rows.entry((r.y, r.height)).or_default().push((r.x, r.width));
        }
        for ((y, _), mut spans) in rows {
            spans.sort();
            for pair in spans.windows(2) {
                assert!(
                    pair[0].0 + pair[0].1 <= pair[1].0,
                    "{name}: overlap in row y={y}"
                );
            }
        }
    }
}

/// Matrix symbols carry no human-readable text.
#[test]
fn invariant_matrix_codes_have_empty_readable() {
    for (name, encoder, content) in all_encoders() {
        let symbol = encoder.encode(content).unwrap();
        match name {
            "qr" | "microqr" | "datamatrix" | "pdf417" | "code16k" => {
                assert_eq!(symbol.readable, "", "{name}");
                assert!(symbol.texts.is_empty(), "{name}");
            }
            _ => assert!(!symbol.readable.is_empty(), "{name}"),
        }
    }
}

/// A failed encode yields one diagnostic and no geometry.
#[test]
fn invariant_failure_has_no_geometry() {
    let failures: Vec<Error> = vec![
        Code39::new().encode("lowercase").unwrap_err(),
        Codabar::new().encode("12345").unwrap_err(),
        Ean13::new().encode("12AB").unwrap_err(),
        MicroQr::new().encode(&"9".repeat(99)).unwrap_err(),
    ];
    for err in failures {
        assert!(!err.to_string().is_empty());
        assert!(!err.category().is_empty());
    }
}

/// Independent encoders on separate threads produce identical symbols.
#[test]
fn invariant_thread_independence() {
    let baseline = Qr::new().encode("THREAD SAFETY").unwrap();
    let handles: Vec<std::thread::JoinHandle<Symbol>> = (0..4)
        .map(|_| std::thread::spawn(|| Qr::new().encode("THREAD SAFETY").unwrap()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), baseline);
    }
}

/// A QR matrix emits exactly its dark modules as unit-height rectangles.
#[test]
fn invariant_qr_module_accounting() {
    let symbol = Qr::new().encode("MODULES").unwrap();
    let dark_modules: i32 = symbol.rectangles.iter().map(|r| r.width * r.height).sum();
    let total = symbol.width * symbol.height;
    assert!(dark_modules > total / 3, "implausibly light symbol");
    assert!(dark_modules < 2 * total / 3, "implausibly dark symbol");
    assert!(symbol.rectangles.iter().all(|r| r.height == 1));
}

// ============================================================================
// CONTRACT TESTS
// ============================================================================

/// Renderers deserialize the geometric model from JSON; pin its shape.
#[test]
fn contract_symbol_serializes_for_renderers() {
    let symbol = Ean13::new().encode("501234567890").unwrap();
    let json = serde_json::to_value(&symbol).unwrap();
    assert_eq!(json["width"], 95);
    assert_eq!(json["readable"], "5012345678900");
    assert_eq!(json["texts"][0]["alignment"], "justify");
    assert!(json["rectangles"][0]["x"].is_number());

    let back: Symbol = serde_json::from_value(json).unwrap();
    assert_eq!(back, symbol);
}

#[test]
fn contract_quiet_zones_carried_through() {
    let linear = Code128::new().encode("QZ").unwrap();
    assert_eq!((linear.quiet_zone_h, linear.quiet_zone_v), (10, 2));
    let qr = Qr::new().encode("QZ").unwrap();
    assert_eq!((qr.quiet_zone_h, qr.quiet_zone_v), (4, 4));
}

#[test]
fn contract_text_alignment_variants() {
    let code39 = Code39::new().encode("CENTERED").unwrap();
    assert_eq!(code39.texts[0].alignment, TextAlign::Center);
    let ean = Ean13::new().encode("501234567890").unwrap();
    assert_eq!(ean.texts[0].alignment, TextAlign::Justify);
}

#[test]
fn contract_pdf417_row_count_matches_info() {
    let symbol = Pdf417::new().columns(4).encode("ROW COUNT CHECK").unwrap();
    let rows: i32 = symbol.info("Symbol Rows: ").unwrap().parse().unwrap();
    let max_y = symbol
        .rectangles
        .iter()
        .map(|r| r.y + r.height)
        .max()
        .unwrap();
    assert_eq!(max_y, symbol.height);
    assert_eq!(symbol.height % rows, 0);
}
