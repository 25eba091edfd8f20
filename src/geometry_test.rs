#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// --- PageSize tables ---

#[test]
fn a4_portrait_mm() {
    assert_eq!(PageSize::A4.size_mm(), (210.0, 297.0));
}

#[test]
fn a3_is_a4_doubled() {
    let (w3, h3) = PageSize::A3.size_mm();
    let (w4, h4) = PageSize::A4.size_mm();
    assert_eq!(w3, h4);
    assert_eq!(h3, 2.0 * w4);
}

#[test]
fn letter_mm() {
    assert_eq!(PageSize::Letter.size_mm(), (215.9, 279.4));
}

#[test]
fn default_page_size_is_a4() {
    assert_eq!(PageSize::default(), PageSize::A4);
}

#[test]
fn default_orientation_is_portrait() {
    assert_eq!(Orientation::default(), Orientation::Portrait);
}

#[test]
fn default_unit_is_mm() {
    assert_eq!(Unit::default(), Unit::Mm);
}

// --- page_dimensions ---

#[test]
fn a4_portrait_px() {
    let dims = page_dimensions(PageSize::A4, Orientation::Portrait);
    assert!(approx_eq(dims.width_px, 210.0 * PX_PER_MM));
    assert!(approx_eq(dims.height_px, 297.0 * PX_PER_MM));
    assert_eq!(dims.width_mm, 210.0);
    assert_eq!(dims.height_mm, 297.0);
    assert_eq!(dims.px_per_mm, PX_PER_MM);
}

#[test]
fn landscape_swaps_axes() {
    let portrait = page_dimensions(PageSize::A4, Orientation::Portrait);
    let landscape = page_dimensions(PageSize::A4, Orientation::Landscape);
    assert_eq!(landscape.width_mm, portrait.height_mm);
    assert_eq!(landscape.height_mm, portrait.width_mm);
    assert!(approx_eq(landscape.width_px, portrait.height_px));
}

#[test]
fn px_and_mm_stay_consistent() {
    for size in [
        PageSize::A3,
        PageSize::A4,
        PageSize::A5,
        PageSize::Letter,
        PageSize::Legal,
        PageSize::Tabloid,
    ] {
        let dims = page_dimensions(size, Orientation::Portrait);
        assert!(approx_eq(dims.width_px, dims.width_mm * dims.px_per_mm));
        assert!(approx_eq(dims.height_px, dims.height_mm * dims.px_per_mm));
    }
}

#[test]
fn px_per_mm_is_96_dpi() {
    assert!(approx_eq(PX_PER_MM, 96.0 / 25.4));
}

// --- to_px ---

#[test]
fn px_passes_through() {
    assert_eq!(to_px(42.5, Unit::Px, PX_PER_MM), 42.5);
}

#[test]
fn mm_converts() {
    assert!(approx_eq(to_px(10.0, Unit::Mm, PX_PER_MM), 10.0 * PX_PER_MM));
}

#[test]
fn cm_equals_ten_mm() {
    let cm = to_px(2.0, Unit::Cm, PX_PER_MM);
    let mm = to_px(20.0, Unit::Mm, PX_PER_MM);
    assert_eq!(cm, mm);
}

#[test]
fn inch_equals_25_4_mm() {
    let inch = to_px(1.0, Unit::In, PX_PER_MM);
    let mm = to_px(25.4, Unit::Mm, PX_PER_MM);
    assert!(approx_eq(inch, mm));
}

#[test]
fn one_inch_is_96_px() {
    assert!(approx_eq(to_px(1.0, Unit::In, PX_PER_MM), 96.0));
}

#[test]
fn zero_converts_to_zero_in_every_unit() {
    for unit in [Unit::Px, Unit::Mm, Unit::Cm, Unit::In] {
        assert_eq!(to_px(0.0, unit, PX_PER_MM), 0.0);
    }
}

// --- serde ---

#[test]
fn page_size_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&PageSize::A4).unwrap(), "\"a4\"");
    assert_eq!(serde_json::to_string(&PageSize::Letter).unwrap(), "\"letter\"");
}

#[test]
fn page_size_deserializes_lowercase() {
    let size: PageSize = serde_json::from_str("\"tabloid\"").unwrap();
    assert_eq!(size, PageSize::Tabloid);
}

#[test]
fn orientation_round_trips() {
    let json = serde_json::to_string(&Orientation::Landscape).unwrap();
    let back: Orientation = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Orientation::Landscape);
}

#[test]
fn unknown_page_size_is_rejected() {
    assert!(serde_json::from_str::<PageSize>("\"b5\"").is_err());
}
