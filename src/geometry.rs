//! Page geometry: size codes, physical dimensions, default margins, and
//! margin unit conversion.
//!
//! Everything here is a pure function of its inputs. The managers in
//! [`crate::dimension`] and [`crate::margins`] own the reactive state built
//! on top of these tables.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// Pixels per millimeter at the crate's reference resolution (96 dpi).
pub const PX_PER_MM: f64 = 96.0 / 25.4;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Millimeters per centimeter.
pub const MM_PER_CM: f64 = 10.0;

/// Default page margins in millimeters: top, right, bottom, left.
pub const DEFAULT_MARGINS_MM: [f64; 4] = [20.0, 15.0, 20.0, 15.0];

/// Supported page size codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageSize {
    /// Physical size in millimeters, portrait orientation: (width, height).
    #[must_use]
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            Self::A3 => (297.0, 420.0),
            Self::A4 => (210.0, 297.0),
            Self::A5 => (148.0, 210.0),
            Self::Letter => (215.9, 279.4),
            Self::Legal => (215.9, 355.6),
            Self::Tabloid => (279.4, 431.8),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Length units accepted for margin input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Px,
    #[default]
    Mm,
    Cm,
    In,
}

/// Full pixel/physical dimensions for one page size + orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    /// Page width in pixels.
    pub width_px: f64,
    /// Page height in pixels.
    pub height_px: f64,
    /// Page width in millimeters.
    pub width_mm: f64,
    /// Page height in millimeters.
    pub height_mm: f64,
    /// Conversion factor keeping the px and mm pairs consistent.
    pub px_per_mm: f64,
}

/// Resolve a page size code and orientation to concrete dimensions.
#[must_use]
pub fn page_dimensions(size: PageSize, orientation: Orientation) -> PageDimensions {
    let (w_mm, h_mm) = size.size_mm();
    let (width_mm, height_mm) = match orientation {
        Orientation::Portrait => (w_mm, h_mm),
        Orientation::Landscape => (h_mm, w_mm),
    };
    PageDimensions {
        width_px: width_mm * PX_PER_MM,
        height_px: height_mm * PX_PER_MM,
        width_mm,
        height_mm,
        px_per_mm: PX_PER_MM,
    }
}

/// Convert a length in `unit` to pixels, using `px_per_mm` for physical units.
///
/// Non-px units go through millimeters, so a value in cm and its equivalent
/// in mm always land on the identical pixel result.
#[must_use]
pub fn to_px(value: f64, unit: Unit, px_per_mm: f64) -> f64 {
    match unit {
        Unit::Px => value,
        Unit::Mm => value * px_per_mm,
        Unit::Cm => value * MM_PER_CM * px_per_mm,
        Unit::In => value * MM_PER_INCH * px_per_mm,
    }
}
