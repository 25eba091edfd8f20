//! Input model: modifier keys, wheel deltas and their normalization, and the
//! grab-mode drag-pan state.
//!
//! Wheel events arrive in one of three delta modes; everything downstream
//! works in pixels, so normalization happens here. The zoom mapping clamps
//! the normalized delta and feeds it through an exponential so trackpads and
//! clicky wheels both land on smooth factors.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{LINE_SCROLL_PX, WHEEL_DELTA_CLAMP, WHEEL_ZOOM_RATE};
use crate::viewport::Point;

/// Keyboard/mouse modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Meta / Command key is held.
    pub meta: bool,
    /// Shift key is held.
    pub shift: bool,
    /// Alt / Option key is held.
    pub alt: bool,
}

impl Modifiers {
    /// Whether this modifier set turns a wheel gesture into a zoom.
    #[must_use]
    pub fn zooms(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Wheel delta units, per the DOM `deltaMode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelMode {
    /// `deltaMode == 0`: values are pixels.
    #[default]
    Pixel,
    /// `deltaMode == 1`: values are lines.
    Line,
    /// `deltaMode == 2`: values are pages.
    Page,
}

impl WheelMode {
    /// Map a DOM `deltaMode` value; unknown values fall back to pixels.
    #[must_use]
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount, in `mode` units.
    pub dx: f64,
    /// Vertical scroll amount, in `mode` units (positive = down).
    pub dy: f64,
    /// Units the deltas are expressed in.
    pub mode: WheelMode,
}

impl WheelDelta {
    /// Vertical delta in pixels: line mode scales by a fixed line height,
    /// page mode by the screen height.
    #[must_use]
    pub fn normalized_dy(&self, screen_height: f64) -> f64 {
        match self.mode {
            WheelMode::Pixel => self.dy,
            WheelMode::Line => self.dy * LINE_SCROLL_PX,
            WheelMode::Page => self.dy * screen_height,
        }
    }
}

/// Map a normalized wheel delta (pixels) to a multiplicative zoom factor.
///
/// The delta is clamped to ±[`WHEEL_DELTA_CLAMP`] so one wild event cannot
/// teleport the scale; scrolling up (negative delta) zooms in.
#[must_use]
pub fn wheel_zoom_factor(normalized_dy: f64) -> f64 {
    let clamped = normalized_dy.clamp(-WHEEL_DELTA_CLAMP, WHEEL_DELTA_CLAMP);
    (-clamped * WHEEL_ZOOM_RATE).exp()
}

/// Typed pan/drag capability exposed to grab-mode toggles.
pub trait PanControl {
    fn enable(&mut self);
    fn disable(&mut self);
    fn is_enabled(&self) -> bool;
}

/// Drag-to-pan state machine: tracks the previous pointer position between
/// pointer-down and pointer-up while grab mode is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragPan {
    enabled: bool,
    /// Screen-space position of the previous pointer event during an active
    /// drag; `None` while idle.
    last_screen: Option<Point>,
}

impl DragPan {
    /// Begin a drag at `screen`. Ignored while disabled.
    pub fn begin(&mut self, screen: Point) {
        if self.enabled {
            self.last_screen = Some(screen);
        }
    }

    /// Advance the drag to `screen`, returning the screen-space delta since
    /// the previous event. `None` when no drag is active.
    pub fn advance(&mut self, screen: Point) -> Option<(f64, f64)> {
        let last = self.last_screen?;
        self.last_screen = Some(screen);
        Some((screen.x - last.x, screen.y - last.y))
    }

    /// End the active drag, if any.
    pub fn end(&mut self) {
        self.last_screen = None;
    }

    /// Whether a drag is currently active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.last_screen.is_some()
    }
}

impl PanControl for DragPan {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.last_screen = None;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
