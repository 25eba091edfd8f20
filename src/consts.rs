//! Shared numeric constants for the pagecanvas crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Lower bound for the viewport scale.
pub const MIN_ZOOM: f64 = 0.05;

/// Upper bound for the viewport scale.
pub const MAX_ZOOM: f64 = 8.0;

/// Scale changes smaller than this are treated as no-ops.
pub const ZOOM_EPSILON: f64 = 1e-4;

/// Multiplicative step for `zoom_in` / `zoom_out` when none is configured.
pub const DEFAULT_ZOOM_STEP: f64 = 1.2;

// ── Wheel input ─────────────────────────────────────────────────

/// Exponent coefficient mapping a normalized wheel delta to a zoom factor.
pub const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Normalized wheel deltas are clamped to ±this before the zoom mapping.
pub const WHEEL_DELTA_CLAMP: f64 = 800.0;

/// Pixels per line for line-mode (`deltaMode == 1`) wheel events.
pub const LINE_SCROLL_PX: f64 = 16.0;

// ── Render surface ──────────────────────────────────────────────

/// Minimum device pixel ratio for the backing canvas, for crispness on 1x displays.
pub const MIN_DPR: f64 = 2.0;

/// Stage background color behind the page.
pub const STAGE_FILL: &str = "#e8e9ec";

/// Page (document) background fill.
pub const PAGE_FILL: &str = "#ffffff";

// ── Scene z bands ───────────────────────────────────────────────

/// z-index for layout blocks; keeps them under every user-added object.
pub const LAYOUT_Z: i64 = -1_000;

/// z-index for the interaction-lock overlay; keeps it above all UI nodes.
pub const OVERLAY_Z: i64 = 1_000;

// ── Interaction lock ────────────────────────────────────────────

/// Tint drawn over the world while interaction is locked.
pub const LOCK_TINT: &str = "#1f2933";

/// Overlay opacity while locked. Unlocked overlays are fully transparent.
pub const LOCK_OPACITY: f64 = 0.08;

// ── Flash ───────────────────────────────────────────────────────

/// Opacity an object dips to while flashing.
pub const FLASH_OPACITY: f64 = 0.25;

/// Flash duration in milliseconds.
pub const FLASH_MS: u32 = 180;
