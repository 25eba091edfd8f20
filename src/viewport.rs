//! Pan/zoom camera over a bounded world.
//!
//! The viewport maps between screen space (CSS pixels on the render surface)
//! and world space (the zoom/pan-independent coordinate system the document
//! lives in). Unlike an infinite-canvas camera, the world here is bounded:
//! it is at least as large as the base document, and the view center is
//! always clamped so the visible region stays inside world bounds — except
//! when an axis underflows (the whole world fits on screen), in which case
//! the world is centered on that axis.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_EPSILON};

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn center(self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Camera state: scale, world-space center, and the screen/world/base extents.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    scale: f64,
    center: Point,
    screen: Size,
    world: Size,
    base: Size,
    default_zoom: f64,
}

impl Viewport {
    /// Create a viewport over a world exactly the base document size,
    /// centered, at scale 1.
    #[must_use]
    pub fn new(base: Size) -> Self {
        Self {
            scale: 1.0,
            center: base.center(),
            screen: Size::new(0.0, 0.0),
            world: base,
            base,
            default_zoom: 1.0,
        }
    }

    // --- Transforms ---

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: self.center.x + (screen.x - self.screen.width * 0.5) / self.scale,
            y: self.center.y + (screen.y - self.screen.height * 0.5) / self.scale,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: (world.x - self.center.x) * self.scale + self.screen.width * 0.5,
            y: (world.y - self.center.y) * self.scale + self.screen.height * 0.5,
        }
    }

    // --- Accessors ---

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn screen_size(&self) -> Size {
        self.screen
    }

    #[must_use]
    pub fn world_size(&self) -> Size {
        self.world
    }

    #[must_use]
    pub fn base_size(&self) -> Size {
        self.base
    }

    /// World-space center of the world extent.
    #[must_use]
    pub fn world_center(&self) -> Point {
        self.world.center()
    }

    /// The scale at which the base document exactly fits the container, as
    /// recorded by the last [`Self::apply_fit`].
    #[must_use]
    pub fn default_zoom(&self) -> f64 {
        self.default_zoom
    }

    /// Record a newly computed fit scale as the default zoom without
    /// touching the current scale. Non-finite input is ignored.
    pub fn set_default_zoom(&mut self, default_zoom: f64) {
        if !default_zoom.is_finite() {
            return;
        }
        self.default_zoom = default_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    // --- Sizing ---

    /// Update the measured container size, keeping the world and re-clamping
    /// the center for the new visible extent.
    pub fn set_screen_size(&mut self, screen: Size) {
        self.screen = screen;
        self.clamp_center();
    }

    /// Replace the base document size. The world grows where needed so
    /// neither dimension falls below the new base.
    pub fn set_base_size(&mut self, base: Size) {
        self.base = base;
        self.world.width = self.world.width.max(base.width);
        self.world.height = self.world.height.max(base.height);
        self.clamp_center();
    }

    /// Set the pannable world extent. Each dimension is clamped so it is
    /// never smaller than the base document size.
    pub fn set_world_size(&mut self, world: Size) {
        self.world = Size {
            width: world.width.max(self.base.width),
            height: world.height.max(self.base.height),
        };
        self.clamp_center();
    }

    /// Shrink the world back to exactly the base document size.
    pub fn reset_world_size(&mut self) {
        self.set_world_size(self.base);
    }

    // --- Zoom ---

    /// The fit-to-container scale for a container of `width` × `height`,
    /// clamped to the zoom bounds.
    #[must_use]
    pub fn fit_scale(&self, width: f64, height: f64) -> f64 {
        if self.base.width <= 0.0 || self.base.height <= 0.0 {
            return 1.0f64.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        (width / self.base.width)
            .min(height / self.base.height)
            .clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Apply fit-to-container for the current screen size: the fit scale
    /// becomes both the current scale and the new default zoom, and the view
    /// centers on the world.
    pub fn apply_fit(&mut self) {
        let fit = self.fit_scale(self.screen.width, self.screen.height);
        self.default_zoom = fit;
        self.scale = fit;
        self.center = self.world.center();
        self.clamp_center();
    }

    /// Set the scale, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input
    /// and changes smaller than the zoom epsilon are ignored. Returns
    /// whether the scale changed. The center is re-clamped for the new
    /// visible extent.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        if !scale.is_finite() {
            return false;
        }
        let clamped = scale.clamp(MIN_ZOOM, MAX_ZOOM);
        if (clamped - self.scale).abs() <= ZOOM_EPSILON {
            return false;
        }
        self.scale = clamped;
        self.clamp_center();
        true
    }

    /// Zoom to `scale` keeping the world point under `anchor_screen` pinned
    /// to the same screen position. Returns whether the scale changed.
    pub fn anchored_zoom(&mut self, scale: f64, anchor_screen: Point) -> bool {
        let before = self.screen_to_world(anchor_screen);
        if !self.set_scale(scale) {
            return false;
        }
        let after = self.screen_to_world(anchor_screen);
        self.center.x += before.x - after.x;
        self.center.y += before.y - after.y;
        self.clamp_center();
        true
    }

    // --- Pan ---

    /// Move the view center by a world-space offset, then clamp. Non-finite
    /// offsets are ignored.
    pub fn pan_by_world(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.center.x += dx;
        self.center.y += dy;
        self.clamp_center();
    }

    /// Move the view center to a world-space point, then clamp. Non-finite
    /// points are ignored.
    pub fn set_center(&mut self, center: Point) {
        if !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        self.center = center;
        self.clamp_center();
    }

    /// Whether the visible world region is smaller than the screen on either
    /// axis, exposing area beyond world bounds.
    #[must_use]
    pub fn underflows(&self) -> bool {
        self.world.width * self.scale < self.screen.width
            || self.world.height * self.scale < self.screen.height
    }

    /// Clamp the center so the view stays inside world bounds; an axis whose
    /// whole world fits on screen snaps to the world midpoint instead.
    pub fn clamp_center(&mut self) {
        self.center.x = clamp_axis(self.center.x, self.world.width, self.screen.width, self.scale);
        self.center.y =
            clamp_axis(self.center.y, self.world.height, self.screen.height, self.scale);
    }
}

fn clamp_axis(center: f64, world: f64, screen: f64, scale: f64) -> f64 {
    let half_visible = screen / (2.0 * scale);
    if world <= half_visible * 2.0 {
        world * 0.5
    } else {
        center.clamp(half_visible, world - half_visible)
    }
}
