#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// Viewport over a large world so center clamping never interferes.
fn roomy() -> Viewport {
    let mut vp = Viewport::new(Size::new(4000.0, 4000.0));
    vp.set_screen_size(Size::new(800.0, 600.0));
    vp
}

/// Viewport sized like a page document inside a small container.
fn page() -> Viewport {
    let mut vp = Viewport::new(Size::new(954.0, 1351.0));
    vp.set_screen_size(Size::new(500.0, 500.0));
    vp
}

// --- Construction ---

#[test]
fn new_viewport_is_centered_at_scale_one() {
    let vp = Viewport::new(Size::new(1000.0, 500.0));
    assert_eq!(vp.scale(), 1.0);
    assert_eq!(vp.center(), Point::new(500.0, 250.0));
    assert_eq!(vp.world_size(), Size::new(1000.0, 500.0));
    assert_eq!(vp.base_size(), Size::new(1000.0, 500.0));
}

// --- Transforms ---

#[test]
fn screen_center_maps_to_view_center() {
    let vp = roomy();
    let world = vp.screen_to_world(Point::new(400.0, 300.0));
    assert!(point_approx_eq(world, vp.center()));
}

#[test]
fn round_trip_world_to_screen() {
    let mut vp = roomy();
    vp.set_scale(1.7);
    let world = Point::new(2100.0, 1900.0);
    let back = vp.screen_to_world(vp.world_to_screen(world));
    assert!(point_approx_eq(world, back));
}

#[test]
fn round_trip_screen_to_world() {
    let mut vp = roomy();
    vp.set_scale(0.8);
    let screen = Point::new(123.0, 456.0);
    let back = vp.world_to_screen(vp.screen_to_world(screen));
    assert!(point_approx_eq(screen, back));
}

#[test]
fn transform_accounts_for_scale() {
    let mut vp = roomy();
    vp.set_scale(2.0);
    // 100 screen px to the right of center is 50 world units.
    let world = vp.screen_to_world(Point::new(500.0, 300.0));
    assert!(approx_eq(world.x, vp.center().x + 50.0));
}

// --- fit_scale / apply_fit ---

#[test]
fn fit_scale_uses_the_tighter_axis() {
    let vp = page();
    // Height is the binding constraint: 500 / 1351.
    assert!(approx_eq(vp.fit_scale(500.0, 500.0), 500.0 / 1351.0));
}

#[test]
fn fit_scale_of_page_in_small_container() {
    let vp = page();
    let fit = vp.fit_scale(500.0, 500.0);
    assert!((fit - 0.3701).abs() < 1e-3);
}

#[test]
fn fit_scale_clamps_to_zoom_bounds() {
    let vp = Viewport::new(Size::new(10.0, 10.0));
    assert_eq!(vp.fit_scale(1e9, 1e9), MAX_ZOOM);
    let vp = Viewport::new(Size::new(1e9, 1e9));
    assert_eq!(vp.fit_scale(1.0, 1.0), MIN_ZOOM);
}

#[test]
fn fit_scale_of_degenerate_base_is_clamped_one() {
    let vp = Viewport::new(Size::new(0.0, 0.0));
    assert_eq!(vp.fit_scale(500.0, 500.0), 1.0);
}

#[test]
fn apply_fit_sets_scale_default_and_center() {
    let mut vp = page();
    vp.set_scale(3.0);
    vp.apply_fit();
    assert!(approx_eq(vp.scale(), 500.0 / 1351.0));
    assert!(approx_eq(vp.default_zoom(), 500.0 / 1351.0));
    assert!(point_approx_eq(vp.center(), vp.world_center()));
}

#[test]
fn set_default_zoom_does_not_touch_scale() {
    let mut vp = roomy();
    vp.set_default_zoom(0.5);
    assert_eq!(vp.default_zoom(), 0.5);
    assert_eq!(vp.scale(), 1.0);
}

#[test]
fn set_default_zoom_clamps() {
    let mut vp = roomy();
    vp.set_default_zoom(100.0);
    assert_eq!(vp.default_zoom(), MAX_ZOOM);
    vp.set_default_zoom(0.0);
    assert_eq!(vp.default_zoom(), MIN_ZOOM);
}

// --- set_scale ---

#[test]
fn set_scale_clamps_low() {
    let mut vp = roomy();
    assert!(vp.set_scale(0.0001));
    assert_eq!(vp.scale(), MIN_ZOOM);
}

#[test]
fn set_scale_clamps_high() {
    let mut vp = roomy();
    assert!(vp.set_scale(1000.0));
    assert_eq!(vp.scale(), MAX_ZOOM);
}

#[test]
fn tiny_scale_change_is_a_no_op() {
    let mut vp = roomy();
    vp.set_scale(1.5);
    assert!(!vp.set_scale(1.5 + ZOOM_EPSILON * 0.5));
    assert_eq!(vp.scale(), 1.5);
}

#[test]
fn same_scale_is_a_no_op() {
    let mut vp = roomy();
    assert!(!vp.set_scale(1.0));
}

#[test]
fn clamped_to_current_scale_reports_unchanged() {
    let mut vp = roomy();
    vp.set_scale(MAX_ZOOM);
    assert!(!vp.set_scale(MAX_ZOOM * 2.0));
}

#[test]
fn non_finite_scale_is_rejected() {
    let mut vp = roomy();
    assert!(!vp.set_scale(f64::NAN));
    assert!(!vp.set_scale(f64::INFINITY));
    assert!(!vp.set_scale(f64::NEG_INFINITY));
    assert_eq!(vp.scale(), 1.0);
    // The center math must still be usable afterwards.
    vp.pan_by_world(10.0, 10.0);
    assert!(vp.center().x.is_finite());
    assert!(vp.center().y.is_finite());
}

#[test]
fn non_finite_center_is_ignored() {
    let mut vp = roomy();
    let before = vp.center();
    vp.set_center(Point::new(f64::NAN, 100.0));
    vp.set_center(Point::new(100.0, f64::INFINITY));
    assert_eq!(vp.center(), before);
}

#[test]
fn non_finite_pan_is_ignored() {
    let mut vp = roomy();
    let before = vp.center();
    vp.pan_by_world(f64::NAN, 0.0);
    vp.pan_by_world(0.0, f64::NEG_INFINITY);
    assert_eq!(vp.center(), before);
}

#[test]
fn non_finite_default_zoom_is_ignored() {
    let mut vp = roomy();
    vp.set_default_zoom(f64::NAN);
    assert_eq!(vp.default_zoom(), 1.0);
}

// --- anchored_zoom ---

#[test]
fn anchored_zoom_pins_the_world_point() {
    let mut vp = roomy();
    let anchor = Point::new(200.0, 150.0);
    let before = vp.screen_to_world(anchor);
    assert!(vp.anchored_zoom(2.0, anchor));
    let after = vp.screen_to_world(anchor);
    assert!(point_approx_eq(before, after));
}

#[test]
fn anchored_zoom_out_pins_too() {
    let mut vp = roomy();
    vp.set_scale(2.0);
    let anchor = Point::new(600.0, 450.0);
    let before = vp.screen_to_world(anchor);
    assert!(vp.anchored_zoom(1.1, anchor));
    assert!(point_approx_eq(before, vp.screen_to_world(anchor)));
}

#[test]
fn anchored_zoom_with_no_scale_change_keeps_center() {
    let mut vp = roomy();
    let center = vp.center();
    assert!(!vp.anchored_zoom(1.0, Point::new(10.0, 10.0)));
    assert_eq!(vp.center(), center);
}

#[test]
fn anchored_zoom_near_edge_still_clamps() {
    let mut vp = roomy();
    // Anchor in the far corner pushes the center toward the world edge;
    // the visible region must stay inside world bounds.
    vp.anchored_zoom(4.0, Point::new(795.0, 595.0));
    let half_w = 800.0 / (2.0 * vp.scale());
    let half_h = 600.0 / (2.0 * vp.scale());
    assert!(vp.center().x <= 4000.0 - half_w + EPSILON);
    assert!(vp.center().y <= 4000.0 - half_h + EPSILON);
}

// --- Pan / clamping ---

#[test]
fn pan_moves_the_center() {
    let mut vp = roomy();
    let before = vp.center();
    vp.pan_by_world(25.0, -40.0);
    assert!(approx_eq(vp.center().x, before.x + 25.0));
    assert!(approx_eq(vp.center().y, before.y - 40.0));
}

#[test]
fn pan_cannot_escape_world_bounds() {
    let mut vp = roomy();
    vp.pan_by_world(-1e7, -1e7);
    assert!(approx_eq(vp.center().x, 400.0));
    assert!(approx_eq(vp.center().y, 300.0));
    vp.pan_by_world(1e7, 1e7);
    assert!(approx_eq(vp.center().x, 4000.0 - 400.0));
    assert!(approx_eq(vp.center().y, 4000.0 - 300.0));
}

#[test]
fn set_center_clamps() {
    let mut vp = roomy();
    vp.set_center(Point::new(-500.0, 10000.0));
    assert!(approx_eq(vp.center().x, 400.0));
    assert!(approx_eq(vp.center().y, 3700.0));
}

#[test]
fn underflow_axis_snaps_to_world_midpoint() {
    let mut vp = Viewport::new(Size::new(100.0, 5000.0));
    vp.set_screen_size(Size::new(500.0, 500.0));
    // x underflows (100 < 500 visible), y does not.
    vp.set_center(Point::new(0.0, 2500.0));
    assert!(approx_eq(vp.center().x, 50.0));
    assert!(approx_eq(vp.center().y, 2500.0));
}

#[test]
fn underflows_reports_per_extent() {
    let mut vp = page();
    vp.set_scale(MIN_ZOOM);
    assert!(vp.underflows());
    let mut vp = roomy();
    vp.set_scale(1.0);
    assert!(!vp.underflows());
}

#[test]
fn zooming_out_past_fit_recenters() {
    let mut vp = page();
    vp.apply_fit();
    vp.set_scale(MIN_ZOOM);
    assert!(point_approx_eq(vp.center(), vp.world_center()));
}

// --- World sizing ---

#[test]
fn world_never_shrinks_below_base() {
    let mut vp = page();
    vp.set_world_size(Size::new(100.0, 100.0));
    assert_eq!(vp.world_size(), Size::new(954.0, 1351.0));
}

#[test]
fn world_grows_per_axis() {
    let mut vp = page();
    vp.set_world_size(Size::new(2000.0, 500.0));
    assert_eq!(vp.world_size(), Size::new(2000.0, 1351.0));
}

#[test]
fn reset_world_size_returns_to_base() {
    let mut vp = page();
    vp.set_world_size(Size::new(5000.0, 5000.0));
    vp.reset_world_size();
    assert_eq!(vp.world_size(), vp.base_size());
}

#[test]
fn shrinking_world_reclamps_center() {
    let mut vp = roomy();
    vp.set_world_size(Size::new(10000.0, 10000.0));
    vp.set_center(Point::new(9000.0, 9000.0));
    vp.reset_world_size();
    let half_w = 800.0 / 2.0;
    assert!(vp.center().x <= 4000.0 - half_w + EPSILON);
}

#[test]
fn set_base_size_grows_world() {
    let mut vp = page();
    vp.set_base_size(Size::new(2000.0, 1000.0));
    assert_eq!(vp.base_size(), Size::new(2000.0, 1000.0));
    assert_eq!(vp.world_size(), Size::new(2000.0, 1351.0));
}

#[test]
fn set_screen_size_reclamps() {
    let mut vp = roomy();
    vp.set_center(Point::new(400.0, 300.0));
    vp.set_screen_size(Size::new(1600.0, 1200.0));
    assert!(approx_eq(vp.center().x, 800.0));
    assert!(approx_eq(vp.center().y, 600.0));
}
