//! The viewport engine: lifecycle, object registry, resize handling, and the
//! browser shell that binds everything to a host element.
//!
//! Split in two, so the interesting logic runs under plain `cargo test`:
//!
//! * [`EngineCore`] — pure state machine: the pan/zoom [`Viewport`], the
//!   retained [`Scene`], the object registry, the interaction/lock flags,
//!   and the resize/fit logic. No browser types.
//! * [`ViewportEngine`] — the shell. Owns the canvas element, the DOM
//!   listeners, the coalesced animation-frame slot, and the subscriptions to
//!   the two configuration managers. It is a cheap clonable handle and the
//!   single capability surface the host hands to outside UI controls.
//!
//! Everything is single-threaded and event-driven; `destroy()` is the sole
//! cancellation point and takes effect synchronously.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    PointerEvent, ResizeObserver, WheelEvent, Window,
};

use crate::consts::{
    DEFAULT_ZOOM_STEP, FLASH_MS, FLASH_OPACITY, LOCK_OPACITY, MIN_DPR, OVERLAY_Z, PAGE_FILL,
    ZOOM_EPSILON,
};
use crate::dimension::{DimensionManager, DimensionState};
use crate::dom::{self, DomListener, ListenerOptions};
use crate::geometry::Unit;
use crate::input::{DragPan, Modifiers, PanControl, WheelDelta, WheelMode, wheel_zoom_factor};
use crate::layout::{BandLayoutRenderer, LayoutBlocks, LayoutConfig, LayoutRenderer};
use crate::margins::{MarginInput, MarginManager};
use crate::notify::{Listeners, Subscription};
use crate::render;
use crate::scene::{Layer, MediaKind, Node, NodeId, NodeKind, Scene};
use crate::schedule::{FrameGate, RafSlot};
use crate::viewport::{Point, Size, Viewport};

/// Pointer event types intercepted while interaction is locked.
const POINTER_EVENTS: [&str; 8] = [
    "pointerdown",
    "pointermove",
    "pointerup",
    "pointercancel",
    "pointerover",
    "pointerout",
    "pointerenter",
    "pointerleave",
];

/// Default size of a video placeholder tile, world units.
const VIDEO_PLACEHOLDER: Size = Size { width: 320.0, height: 180.0 };

/// Default size of an audio placeholder tile, world units.
const AUDIO_PLACEHOLDER: Size = Size { width: 320.0, height: 56.0 };

/// Engine lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    /// Inert until the next `init()`.
    Destroyed,
}

/// A registered canvas object: its opaque id and owning layer. The id is
/// also the handle to the underlying scene node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasObject {
    pub id: NodeId,
    pub layer: Layer,
}

/// Options for [`EngineCore::zoom_to`].
#[derive(Debug, Clone, Copy)]
pub struct ZoomOptions {
    /// Restore the pre-zoom center afterwards so the view does not jump.
    pub keep_centered: bool,
    /// Whether this zoom counts as a user interaction (programmatic
    /// fit/reset calls pass `false` so resizes keep auto-fitting).
    pub mark_interaction: bool,
    /// Explicit world-space center to move to after the scale change; takes
    /// precedence over `keep_centered`.
    pub target_center: Option<Point>,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self { keep_centered: true, mark_interaction: true, target_center: None }
    }
}

/// Parameters for [`ViewportEngine::add_text`].
#[derive(Debug, Clone)]
pub struct TextSpec {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: String,
    pub layer: Layer,
}

impl Default for TextSpec {
    fn default() -> Self {
        Self {
            content: String::new(),
            x: 0.0,
            y: 0.0,
            font_size: 16.0,
            color: "#1f2933".to_owned(),
            layer: Layer::Content,
        }
    }
}

/// Parameters for [`ViewportEngine::add_image`]. The node takes the decoded
/// image's natural size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageSpec {
    pub x: f64,
    pub y: f64,
    pub layer: Layer,
}

// =============================================================
// EngineCore
// =============================================================

/// Core engine state — all logic that doesn't depend on the DOM.
///
/// Separated from [`ViewportEngine`] so it can be tested without a browser.
pub struct EngineCore {
    pub scene: Scene,
    pub viewport: Viewport,
    phase: Phase,
    objects: BTreeMap<NodeId, CanvasObject>,
    /// Set on any manual pan/zoom; gates auto-fit on resize.
    interacted: bool,
    locked: bool,
    overlay: Option<NodeId>,
    background: Option<NodeId>,
    blocks: Option<LayoutBlocks>,
    pan: DragPan,
    zoom_step: f64,
    /// Last measured integer container size, for resize dedup.
    last_measured: Option<(u32, u32)>,
    flash_saved: HashMap<NodeId, f64>,
}

impl EngineCore {
    /// Create a core for a document of the given base size.
    #[must_use]
    pub fn new(base: Size) -> Self {
        Self {
            scene: Scene::new(),
            viewport: Viewport::new(base),
            phase: Phase::Uninitialized,
            objects: BTreeMap::new(),
            interacted: false,
            locked: false,
            overlay: None,
            background: None,
            blocks: None,
            pan: DragPan::default(),
            zoom_step: DEFAULT_ZOOM_STEP,
            last_measured: None,
            flash_saved: HashMap::new(),
        }
    }

    // --- Lifecycle ---

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Begin a mount cycle: fresh viewport over `base` and the page
    /// background fill node.
    pub fn begin_mount(&mut self, base: Size) {
        self.phase = Phase::Initializing;
        self.viewport = Viewport::new(base);
        let mut node = Node::new(Layer::Background, NodeKind::Fill { color: PAGE_FILL.to_owned() });
        node.width = base.width;
        node.height = base.height;
        self.background = Some(self.scene.insert(node));
    }

    /// Record the layout block handles created by the layout renderer.
    pub fn set_layout_blocks(&mut self, blocks: LayoutBlocks) {
        self.blocks = Some(blocks);
        for id in [blocks.header, blocks.body, blocks.footer] {
            if let Some(node) = self.scene.get_mut(id) {
                node.interactive = false;
            }
        }
    }

    pub fn finish_mount(&mut self) {
        self.phase = Phase::Ready;
    }

    /// Tear down to the inert destroyed state. The scene, registry, and all
    /// interaction bookkeeping are cleared; a later `begin_mount` revives
    /// the core.
    pub fn reset(&mut self) {
        let base = self.viewport.base_size();
        self.scene = Scene::new();
        self.viewport = Viewport::new(base);
        self.objects.clear();
        self.interacted = false;
        self.locked = false;
        self.overlay = None;
        self.background = None;
        self.blocks = None;
        self.pan = DragPan::default();
        self.last_measured = None;
        self.flash_saved.clear();
        self.phase = Phase::Destroyed;
    }

    // --- Resize / fit ---

    /// Apply a container measurement. Sizes are deduplicated on integer
    /// pixels: an unchanged measurement only re-runs the fit-or-recenter
    /// pass. Returns whether the measured size changed.
    pub fn apply_resize(&mut self, width: f64, height: f64) -> bool {
        let measured = (to_int_px(width), to_int_px(height));
        if self.last_measured == Some(measured) {
            self.fit_or_recenter();
            return false;
        }
        self.last_measured = Some(measured);
        self.viewport
            .set_screen_size(Size::new(f64::from(measured.0), f64::from(measured.1)));
        self.fit_or_recenter();
        true
    }

    /// Recompute the default zoom for the current container and either
    /// auto-fit (while the user has not interacted) or merely re-clamp the
    /// center so underflow recenters.
    pub fn fit_or_recenter(&mut self) {
        let screen = self.viewport.screen_size();
        let fit = self.viewport.fit_scale(screen.width, screen.height);
        self.viewport.set_default_zoom(fit);
        if self.interacted {
            self.viewport.clamp_center();
        } else {
            self.viewport.apply_fit();
        }
    }

    /// Replace the base document size (page layout changed). The world is
    /// re-clamped, the background fill resized, and the fit reapplied.
    pub fn set_base_size(&mut self, base: Size) {
        self.viewport.set_base_size(base);
        if let Some(id) = self.background {
            if let Some(node) = self.scene.get_mut(id) {
                node.width = base.width;
                node.height = base.height;
            }
        }
        self.sync_overlay_extent();
        self.fit_or_recenter();
    }

    // --- World sizing ---

    /// Grow or shrink the pannable world; never below the base document
    /// size. Panning is re-clamped and the lock overlay resized.
    pub fn set_world_size(&mut self, size: Size) {
        self.viewport.set_world_size(size);
        self.sync_overlay_extent();
    }

    /// Shrink the world back to exactly the base document size.
    pub fn reset_world_size(&mut self) {
        self.viewport.reset_world_size();
        self.sync_overlay_extent();
    }

    fn sync_overlay_extent(&mut self) {
        let world = self.viewport.world_size();
        if let Some(id) = self.overlay {
            if let Some(node) = self.scene.get_mut(id) {
                node.width = world.width;
                node.height = world.height;
            }
        }
    }

    // --- Zoom ---

    /// Zoom to an absolute scale, clamped to the zoom bounds. Returns
    /// whether the scale changed.
    pub fn zoom_to(&mut self, scale: f64, options: &ZoomOptions) -> bool {
        let before = self.viewport.center();
        let changed = self.viewport.set_scale(scale);
        if let Some(target) = options.target_center {
            self.viewport.set_center(target);
        } else if options.keep_centered {
            self.viewport.set_center(before);
        }
        if changed && options.mark_interaction {
            self.interacted = true;
        }
        changed
    }

    /// Multiply the current scale. Non-finite or zero factors are ignored.
    pub fn zoom_by_factor(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor == 0.0 {
            return false;
        }
        self.zoom_to(self.viewport.scale() * factor, &ZoomOptions::default())
    }

    /// Zoom in by `step` (or the configured step).
    pub fn zoom_in(&mut self, step: Option<f64>) -> bool {
        self.zoom_by_factor(self.resolve_step(step))
    }

    /// Zoom out by `step` (or the configured step).
    pub fn zoom_out(&mut self, step: Option<f64>) -> bool {
        self.zoom_by_factor(1.0 / self.resolve_step(step))
    }

    fn resolve_step(&self, step: Option<f64>) -> f64 {
        match step {
            Some(step) if step.is_finite() && step > 0.0 => step,
            _ => self.zoom_step,
        }
    }

    /// Return to the default (fit) zoom, centered on the world, and clear
    /// the interaction flag so the next resize auto-fits again.
    pub fn reset_zoom(&mut self) -> bool {
        self.interacted = false;
        let target = self.viewport.world_center();
        self.zoom_to(
            self.viewport.default_zoom(),
            &ZoomOptions { keep_centered: true, mark_interaction: false, target_center: Some(target) },
        )
    }

    /// Configure the multiplicative zoom step. Ignored unless finite and
    /// positive.
    pub fn set_zoom_step(&mut self, step: f64) {
        if step.is_finite() && step > 0.0 {
            self.zoom_step = step;
        }
    }

    // --- Wheel input ---

    /// Ctrl/cmd + wheel: cursor-anchored zoom. Falls back to a plain
    /// center-anchored zoom when no anchor is available. Always counts as
    /// an interaction.
    pub fn wheel_zoom(&mut self, delta: &WheelDelta, anchor: Option<Point>) -> bool {
        self.interacted = true;
        let screen = self.viewport.screen_size();
        let factor = wheel_zoom_factor(delta.normalized_dy(screen.height));
        let target = self.viewport.scale() * factor;
        match anchor {
            Some(anchor) => self.viewport.anchored_zoom(target, anchor),
            None => self.viewport.set_scale(target),
        }
    }

    /// Plain wheel: vertical pan by the delta converted to world space.
    pub fn wheel_pan(&mut self, delta: &WheelDelta) -> bool {
        self.interacted = true;
        let screen = self.viewport.screen_size();
        let world_dy = delta.normalized_dy(screen.height) / self.viewport.scale();
        self.viewport.pan_by_world(0.0, world_dy);
        true
    }

    // --- Pointer pan (grab mode) ---

    pub fn pointer_down(&mut self, screen: Point) {
        if self.locked {
            return;
        }
        self.pan.begin(screen);
    }

    /// Advance a grab-pan drag. Returns whether the view moved.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        if self.locked {
            return false;
        }
        let Some((dx, dy)) = self.pan.advance(screen) else {
            return false;
        };
        self.interacted = true;
        let scale = self.viewport.scale();
        self.viewport.pan_by_world(-dx / scale, -dy / scale);
        true
    }

    pub fn pointer_up(&mut self) {
        self.pan.end();
    }

    /// Typed access to the drag-pan capability for grab-mode toggles.
    pub fn pan_control(&mut self) -> &mut dyn PanControl {
        &mut self.pan
    }

    #[must_use]
    pub fn is_grab_enabled(&self) -> bool {
        self.pan.is_enabled()
    }

    // --- Interaction lock ---

    /// Lock or unlock interaction. The overlay node is created on first use,
    /// sized to the world, at the top of the UI layer; locked it tints and
    /// intercepts, unlocked it is fully transparent and inert.
    pub fn set_interaction_locked(&mut self, locked: bool) {
        if self.overlay.is_none() {
            let world = self.viewport.world_size();
            let mut node = Node::new(Layer::Ui, NodeKind::Overlay);
            node.z_index = OVERLAY_Z;
            node.opacity = 0.0;
            node.width = world.width;
            node.height = world.height;
            self.overlay = Some(self.scene.insert(node));
        }
        self.locked = locked;
        if let Some(id) = self.overlay {
            if let Some(node) = self.scene.get_mut(id) {
                node.opacity = if locked { LOCK_OPACITY } else { 0.0 };
                node.interactive = locked;
            }
        }
        if locked {
            self.pan.end();
        }
    }

    #[must_use]
    pub fn is_interaction_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn overlay_node(&self) -> Option<NodeId> {
        self.overlay
    }

    // --- Registry ---

    /// Insert a text node and register it.
    pub fn add_text(&mut self, spec: &TextSpec) -> NodeId {
        let mut node = Node::new(
            spec.layer,
            NodeKind::Text {
                content: spec.content.clone(),
                color: spec.color.clone(),
                font_size: spec.font_size,
            },
        );
        node.x = spec.x;
        node.y = spec.y;
        // Rough extent for flash/debug bounds; text is drawn unclipped.
        node.width = spec.content.chars().count() as f64 * spec.font_size * 0.6;
        node.height = spec.font_size * 1.2;
        self.register(node)
    }

    /// Insert an already-decoded image node and register it.
    pub fn insert_image(&mut self, spec: &ImageSpec, natural: Size) -> NodeId {
        let mut node = Node::new(
            spec.layer,
            NodeKind::Image { natural_width: natural.width, natural_height: natural.height },
        );
        node.x = spec.x;
        node.y = spec.y;
        node.width = natural.width;
        node.height = natural.height;
        self.register(node)
    }

    /// Insert an audio/video placeholder tile and register it.
    pub fn add_placeholder(&mut self, media: MediaKind, x: f64, y: f64) -> NodeId {
        let (size, label) = match media {
            MediaKind::Audio => (AUDIO_PLACEHOLDER, "Audio"),
            MediaKind::Video => (VIDEO_PLACEHOLDER, "Video"),
        };
        let mut node =
            Node::new(Layer::Content, NodeKind::Placeholder { media, label: label.to_owned() });
        node.x = x;
        node.y = y;
        node.width = size.width;
        node.height = size.height;
        self.register(node)
    }

    /// Insert an arbitrary display node and register it.
    pub fn add_display_object(&mut self, node: Node) -> NodeId {
        self.register(node)
    }

    fn register(&mut self, node: Node) -> NodeId {
        let layer = node.layer;
        let id = self.scene.insert(node);
        self.objects.insert(id, CanvasObject { id, layer });
        id
    }

    /// Detach and forget an object. `false` for unknown ids.
    pub fn remove_object(&mut self, id: NodeId) -> bool {
        if self.objects.remove(&id).is_none() {
            return false;
        }
        self.scene.remove(id);
        self.flash_saved.remove(&id);
        true
    }

    /// Look up a registered object by id.
    #[must_use]
    pub fn object(&self, id: NodeId) -> Option<CanvasObject> {
        self.objects.get(&id).copied()
    }

    /// All registered objects, ordered by id.
    #[must_use]
    pub fn objects_snapshot(&self) -> Vec<CanvasObject> {
        self.objects.values().copied().collect()
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Dip the object's opacity for a flash. Returns `false` for unknown
    /// ids; re-flashing an already-flashing object keeps the original
    /// opacity saved.
    pub fn flash_begin(&mut self, id: NodeId) -> bool {
        if !self.objects.contains_key(&id) {
            return false;
        }
        let Some(node) = self.scene.get_mut(id) else {
            return false;
        };
        self.flash_saved.entry(id).or_insert(node.opacity);
        node.opacity = FLASH_OPACITY;
        true
    }

    /// Restore the opacity saved by [`Self::flash_begin`].
    pub fn flash_restore(&mut self, id: NodeId) {
        if let Some(opacity) = self.flash_saved.remove(&id) {
            if let Some(node) = self.scene.get_mut(id) {
                node.opacity = opacity;
            }
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    #[must_use]
    pub fn layout_blocks(&self) -> Option<LayoutBlocks> {
        self.blocks
    }

    #[must_use]
    pub fn background_node(&self) -> Option<NodeId> {
        self.background
    }

    #[must_use]
    pub fn zoom_step(&self) -> f64 {
        self.zoom_step
    }
}

fn to_int_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        // Container sizes are bounded by screen dimensions; no overflow risk.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            value.round() as u32
        }
    } else {
        0
    }
}

// =============================================================
// ViewportEngine (browser shell)
// =============================================================

type LayoutFactory = Box<dyn Fn(LayoutConfig) -> Box<dyn LayoutRenderer>>;

struct EngineInner {
    core: EngineCore,
    dimensions: DimensionManager,
    margins: MarginManager,
    layout_factory: LayoutFactory,
    layout: Option<Box<dyn LayoutRenderer>>,
    host: Option<HtmlElement>,
    canvas: Option<HtmlCanvasElement>,
    ctx: Option<CanvasRenderingContext2d>,
    dpr: f64,
    images: HashMap<NodeId, HtmlImageElement>,
    observer: Option<ResizeObserver>,
    observer_closure: Option<Closure<dyn FnMut(js_sys::Array)>>,
    frame: FrameGate,
    raf: RafSlot,
    resize_requested: bool,
    listeners: Vec<DomListener>,
    subscriptions: Vec<Subscription>,
    flash_timers: HashMap<NodeId, Timeout>,
    ready: bool,
    ready_callbacks: Vec<Box<dyn FnOnce()>>,
    zoom_listeners: Listeners<f64>,
}

impl EngineInner {
    fn apply_dimensions(&mut self, state: &DimensionState) {
        self.core.set_base_size(Size::new(state.width_px, state.height_px));
        if let Some(layout) = self.layout.as_mut() {
            layout.update_config(&mut self.core.scene, state.width_px, state.height_px);
        }
    }
}

/// The full engine: wraps [`EngineCore`] and owns the browser resources.
///
/// Cloning is cheap and every clone addresses the same engine — the host
/// constructs one, calls [`ViewportEngine::init`], and hands clones to
/// whatever UI controls need the capability surface.
#[derive(Clone)]
pub struct ViewportEngine {
    inner: Rc<RefCell<EngineInner>>,
}

impl ViewportEngine {
    /// Create an unmounted engine bound to the injected configuration
    /// managers.
    #[must_use]
    pub fn new(dimensions: &DimensionManager, margins: &MarginManager) -> Self {
        Self::with_layout_factory(
            dimensions,
            margins,
            Box::new(|config| Box::new(BandLayoutRenderer::new(config))),
        )
    }

    /// Create an engine using a custom layout renderer factory.
    #[must_use]
    pub fn with_layout_factory(
        dimensions: &DimensionManager,
        margins: &MarginManager,
        layout_factory: LayoutFactory,
    ) -> Self {
        let state = dimensions.state();
        Self {
            inner: Rc::new(RefCell::new(EngineInner {
                core: EngineCore::new(Size::new(state.width_px, state.height_px)),
                dimensions: dimensions.clone(),
                margins: margins.clone(),
                layout_factory,
                layout: None,
                host: None,
                canvas: None,
                ctx: None,
                dpr: 1.0,
                images: HashMap::new(),
                observer: None,
                observer_closure: None,
                frame: FrameGate::new(),
                raf: RafSlot::new(),
                resize_requested: false,
                listeners: Vec::new(),
                subscriptions: Vec::new(),
                flash_timers: HashMap::new(),
                ready: false,
                ready_callbacks: Vec::new(),
                zoom_listeners: Listeners::new(),
            })),
        }
    }

    fn from_weak(weak: &Weak<RefCell<EngineInner>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    // --- Lifecycle ---

    /// Mount under the host matched by `selector`.
    ///
    /// Silently does nothing outside a browser context or when the selector
    /// matches no element. Calling while already ready does not create a
    /// second render surface; it only schedules a resize pass.
    pub fn init(&self, selector: &str) {
        {
            let inner = self.inner.borrow();
            match inner.core.phase() {
                Phase::Ready => {
                    drop(inner);
                    self.request_resize();
                    return;
                }
                Phase::Initializing => return,
                Phase::Uninitialized | Phase::Destroyed => {}
            }
        }
        let Some(window) = dom::window() else {
            return;
        };
        let Some(document) = dom::document() else {
            return;
        };
        let host = match document.query_selector(selector) {
            Ok(Some(element)) => match element.dyn_into::<HtmlElement>() {
                Ok(host) => host,
                Err(_) => return,
            },
            Ok(None) => return,
            Err(err) => {
                log::warn!("invalid host selector {selector:?}: {err:?}");
                return;
            }
        };

        if let Err(err) = self.mount(&window, &document, host) {
            log::warn!("viewport mount failed: {err:?}");
            // Partial mounts must not leak: anything already attached
            // (canvas, listeners, observer, subscriptions) is released
            // here because destroy() won't run in the Destroyed phase.
            let mut inner = self.inner.borrow_mut();
            Self::release_resources(&mut inner);
            inner.core.reset();
            return;
        }

        let callbacks = {
            let mut inner = self.inner.borrow_mut();
            inner.core.finish_mount();
            inner.ready = true;
            std::mem::take(&mut inner.ready_callbacks)
        };
        for callback in callbacks {
            callback();
        }
        self.request_resize();
    }

    fn mount(
        &self,
        window: &Window,
        document: &web_sys::Document,
        host: HtmlElement,
    ) -> Result<(), JsValue> {
        let dimensions = self.inner.borrow().dimensions.clone();
        let state = dimensions.state();
        let base = Size::new(state.width_px, state.height_px);

        // Render surface at dpr >= 2 for crispness on 1x displays.
        let dpr = window.device_pixel_ratio().max(MIN_DPR);
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let style = canvas.style();
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;
        style.set_property("display", "block")?;
        style.set_property("touch-action", "none")?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        host.append_child(&canvas)?;

        {
            let mut inner = self.inner.borrow_mut();
            inner.core.begin_mount(base);
            inner.dpr = dpr;

            // Layout blocks from the (injected) renderer, pinned low and
            // input-transparent.
            let mut layout = (inner.layout_factory)(LayoutConfig {
                width: base.width,
                height: base.height,
                margins: inner.margins.margins(),
            });
            let blocks = layout.create_layout(&mut inner.core.scene);
            inner.core.set_layout_blocks(blocks);
            let current_margins = inner.margins.margins();
            layout.update_margins(&mut inner.core.scene, &current_margins);
            inner.layout = Some(layout);

            inner.host = Some(host.clone());
            inner.canvas = Some(canvas.clone());
            inner.ctx = Some(ctx);
        }

        self.wire_frame_callback();
        self.wire_listeners(window, &host, &canvas)?;
        self.wire_observer(&host)?;
        self.wire_manager_subscriptions(&dimensions);
        Ok(())
    }

    fn wire_frame_callback(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.borrow_mut().raf.set_callback(move || {
            if let Some(engine) = Self::from_weak(&weak) {
                engine.handle_frame();
            }
        });
    }

    fn wire_listeners(
        &self,
        window: &Window,
        host: &HtmlElement,
        canvas: &HtmlCanvasElement,
    ) -> Result<(), JsValue> {
        let mut listeners = Vec::new();

        // Wheel: ctrl/cmd zooms, plain pans. Non-passive so the page never
        // scrolls behind the canvas.
        let weak = Rc::downgrade(&self.inner);
        listeners.push(DomListener::attach(
            canvas,
            "wheel",
            ListenerOptions::active(),
            move |event: Event| {
                let (Some(engine), Ok(event)) =
                    (Self::from_weak(&weak), event.dyn_into::<WheelEvent>())
                else {
                    return;
                };
                engine.handle_wheel(&event);
            },
        )?);

        // Capture-phase interception of every pointer event while locked.
        for name in POINTER_EVENTS {
            let weak = Rc::downgrade(&self.inner);
            listeners.push(DomListener::attach(
                host,
                name,
                ListenerOptions::capture(),
                move |event: Event| {
                    let Some(engine) = Self::from_weak(&weak) else {
                        return;
                    };
                    if engine.inner.borrow().core.is_interaction_locked() {
                        event.stop_immediate_propagation();
                        event.prevent_default();
                    }
                },
            )?);
        }

        // Grab-mode drag pan.
        for (name, kind) in [
            ("pointerdown", PointerPhase::Down),
            ("pointermove", PointerPhase::Move),
            ("pointerup", PointerPhase::Up),
            ("pointercancel", PointerPhase::Up),
        ] {
            let weak = Rc::downgrade(&self.inner);
            listeners.push(DomListener::attach(
                canvas,
                name,
                ListenerOptions::default(),
                move |event: Event| {
                    let (Some(engine), Ok(event)) =
                        (Self::from_weak(&weak), event.dyn_into::<PointerEvent>())
                    else {
                        return;
                    };
                    engine.handle_pointer(kind, &event);
                },
            )?);
        }

        // Window resizes funnel into the same coalesced pass as the
        // observer's notifications.
        let weak = Rc::downgrade(&self.inner);
        listeners.push(DomListener::attach(
            window,
            "resize",
            ListenerOptions::default(),
            move |_event: Event| {
                if let Some(engine) = Self::from_weak(&weak) {
                    engine.request_resize();
                }
            },
        )?);

        self.inner.borrow_mut().listeners = listeners;
        Ok(())
    }

    fn wire_observer(&self, host: &HtmlElement) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.inner);
        // Entries are ignored; the host is remeasured at frame time so a
        // burst of notifications costs one layout read.
        let closure = Closure::wrap(Box::new(move |_entries: js_sys::Array| {
            if let Some(engine) = Self::from_weak(&weak) {
                engine.request_resize();
            }
        }) as Box<dyn FnMut(js_sys::Array)>);
        let observer = ResizeObserver::new(closure.as_ref().unchecked_ref())?;
        observer.observe(host);
        let mut inner = self.inner.borrow_mut();
        inner.observer = Some(observer);
        inner.observer_closure = Some(closure);
        Ok(())
    }

    fn wire_manager_subscriptions(&self, dimensions: &DimensionManager) {
        let mut subscriptions = Vec::new();

        let weak = Rc::downgrade(&self.inner);
        subscriptions.push(dimensions.on_change(move |state| {
            let Some(engine) = Self::from_weak(&weak) else {
                return;
            };
            let state = *state;
            engine.update(move |inner| {
                inner.apply_dimensions(&state);
                true
            });
        }));

        let margins = self.inner.borrow().margins.clone();
        let weak = Rc::downgrade(&self.inner);
        subscriptions.push(margins.on_change(move |margins| {
            let Some(engine) = Self::from_weak(&weak) else {
                return;
            };
            let margins = *margins;
            engine.update(move |inner| {
                if let Some(layout) = inner.layout.as_mut() {
                    layout.update_margins(&mut inner.core.scene, &margins);
                }
                true
            });
        }));

        self.inner.borrow_mut().subscriptions = subscriptions;
    }

    /// Tear down the mount. Idempotent; afterwards every public call is an
    /// inert no-op until the next [`Self::init`]. No callback registered
    /// before this call fires after it returns.
    pub fn destroy(&self) {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.core.phase(), Phase::Ready | Phase::Initializing) {
            return;
        }
        Self::release_resources(&mut inner);
        inner.zoom_listeners.clear();
        inner.core.reset();
    }

    /// Release every browser-side resource the mount acquired. Shared by
    /// `destroy()` and the failed-mount path in `init()`; safe on a
    /// partially mounted engine.
    fn release_resources(inner: &mut EngineInner) {
        if let Some(observer) = inner.observer.take() {
            observer.disconnect();
        }
        inner.observer_closure = None;
        if let Some(window) = dom::window() {
            inner.raf.teardown(&window);
        }
        inner.frame.cancel();
        inner.resize_requested = false;
        inner.flash_timers.clear();

        // Cleanup resources in reverse registration order.
        while let Some(listener) = inner.listeners.pop() {
            drop(listener);
        }
        while let Some(subscription) = inner.subscriptions.pop() {
            subscription.unsubscribe();
        }

        if let Some(mut layout) = inner.layout.take() {
            layout.destroy(&mut inner.core.scene);
        }
        if let Some(canvas) = inner.canvas.take() {
            canvas.remove();
        }
        inner.ctx = None;
        inner.host = None;
        inner.images.clear();
        inner.ready = false;
        inner.ready_callbacks.clear();
    }

    /// Whether the engine is mounted and ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().ready
    }

    /// Run `f` once the engine is ready; immediately when it already is.
    pub fn on_ready(&self, f: impl FnOnce() + 'static) {
        let mut slot = Some(Box::new(f) as Box<dyn FnOnce()>);
        {
            let mut inner = self.inner.borrow_mut();
            if !inner.ready {
                if let Some(callback) = slot.take() {
                    inner.ready_callbacks.push(callback);
                }
            }
        }
        if let Some(callback) = slot {
            callback();
        }
    }

    /// Subscribe to scale changes. The listener receives the new scale.
    pub fn on_zoom_change(&self, f: impl Fn(&f64) + 'static) -> Subscription {
        let id = self.inner.borrow_mut().zoom_listeners.add(Rc::new(f));
        Subscription::for_listeners(&self.inner, id, |inner: &mut EngineInner| {
            &mut inner.zoom_listeners
        })
    }

    // --- Core update plumbing ---

    /// Run a mutation against the inner state, then propagate side effects:
    /// zoom listeners fire outside the borrow, and a redraw is scheduled
    /// when `f` reports a visible change.
    fn update(&self, f: impl FnOnce(&mut EngineInner) -> bool) {
        let (render_needed, zoom_event) = {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return;
            }
            let before = inner.core.viewport.scale();
            let render_needed = f(&mut inner);
            let after = inner.core.viewport.scale();
            let zoom_event = ((after - before).abs() > ZOOM_EPSILON)
                .then(|| (after, inner.zoom_listeners.snapshot()));
            (render_needed, zoom_event)
        };
        if let Some((scale, listeners)) = zoom_event {
            for listener in listeners {
                listener(&scale);
            }
        }
        if render_needed {
            self.request_render();
        }
    }

    fn request_render(&self) {
        let Some(window) = dom::window() else {
            return;
        };
        let mut inner = self.inner.borrow_mut();
        if inner.core.phase() != Phase::Ready {
            return;
        }
        if inner.frame.arm() {
            inner.raf.request(&window);
        }
    }

    fn request_resize(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return;
            }
            inner.resize_requested = true;
        }
        self.request_render();
    }

    fn handle_frame(&self) {
        let zoom_event = {
            let mut inner = self.inner.borrow_mut();
            inner.raf.mark_fired();
            inner.frame.fire();
            if inner.core.phase() != Phase::Ready {
                return;
            }
            let before = inner.core.viewport.scale();
            if std::mem::take(&mut inner.resize_requested) {
                let (width, height) = match &inner.host {
                    Some(host) => {
                        (f64::from(host.client_width()), f64::from(host.client_height()))
                    }
                    None => (0.0, 0.0),
                };
                inner.core.apply_resize(width, height);
                // Resize the backing store only when its integer pixel
                // dimensions actually differ.
                let dpr = inner.dpr;
                if let Some(canvas) = &inner.canvas {
                    let target_w = to_int_px(width * dpr);
                    let target_h = to_int_px(height * dpr);
                    if canvas.width() != target_w {
                        canvas.set_width(target_w);
                    }
                    if canvas.height() != target_h {
                        canvas.set_height(target_h);
                    }
                }
            }
            let after = inner.core.viewport.scale();
            ((after - before).abs() > ZOOM_EPSILON)
                .then(|| (after, inner.zoom_listeners.snapshot()))
        };
        if let Some((scale, listeners)) = zoom_event {
            for listener in listeners {
                listener(&scale);
            }
        }
        self.render();
    }

    fn render(&self) {
        let inner = self.inner.borrow();
        if inner.core.phase() != Phase::Ready {
            return;
        }
        let Some(ctx) = &inner.ctx else {
            return;
        };
        if let Err(err) =
            render::draw(ctx, &inner.core.scene, &inner.core.viewport, &inner.images, inner.dpr)
        {
            log::warn!("render pass failed: {err:?}");
        }
    }

    // --- Event handlers ---

    fn handle_wheel(&self, event: &WheelEvent) {
        event.prevent_default();
        let modifiers = Modifiers {
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            shift: event.shift_key(),
            alt: event.alt_key(),
        };
        let delta = WheelDelta {
            dx: event.delta_x(),
            dy: event.delta_y(),
            mode: WheelMode::from_dom(event.delta_mode()),
        };
        let anchor = self.pointer_position(event.client_x(), event.client_y());
        self.update(move |inner| {
            if modifiers.zooms() {
                inner.core.wheel_zoom(&delta, anchor);
            } else {
                inner.core.wheel_pan(&delta);
            }
            true
        });
    }

    fn handle_pointer(&self, phase: PointerPhase, event: &PointerEvent) {
        let position = self.pointer_position(event.client_x(), event.client_y());
        self.update(move |inner| match phase {
            PointerPhase::Down => {
                if let Some(position) = position {
                    inner.core.pointer_down(position);
                }
                false
            }
            PointerPhase::Move => {
                position.is_some_and(|position| inner.core.pointer_move(position))
            }
            PointerPhase::Up => {
                inner.core.pointer_up();
                false
            }
        });
    }

    /// Pointer position relative to the host, when its bounding rectangle
    /// is available.
    fn pointer_position(&self, client_x: i32, client_y: i32) -> Option<Point> {
        let inner = self.inner.borrow();
        let host = inner.host.as_ref()?;
        let rect = host.get_bounding_client_rect();
        Some(Point::new(f64::from(client_x) - rect.left(), f64::from(client_y) - rect.top()))
    }

    // --- Public pan/zoom API ---

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.inner.borrow().core.viewport.scale()
    }

    #[must_use]
    pub fn default_zoom(&self) -> f64 {
        self.inner.borrow().core.viewport.default_zoom()
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.inner.borrow().core.viewport.center()
    }

    #[must_use]
    pub fn world_size(&self) -> Size {
        self.inner.borrow().core.viewport.world_size()
    }

    #[must_use]
    pub fn base_size(&self) -> Size {
        self.inner.borrow().core.viewport.base_size()
    }

    /// Current page dimension snapshot from the injected manager.
    #[must_use]
    pub fn dimension_state(&self) -> DimensionState {
        self.inner.borrow().dimensions.state()
    }

    pub fn zoom_to(&self, scale: f64, options: ZoomOptions) {
        self.update(move |inner| {
            let center = inner.core.viewport.center();
            let changed = inner.core.zoom_to(scale, &options);
            // A target_center move needs a redraw even at the same scale.
            changed || inner.core.viewport.center() != center
        });
    }

    pub fn zoom_by_factor(&self, factor: f64) {
        self.update(move |inner| inner.core.zoom_by_factor(factor));
    }

    pub fn zoom_in(&self, step: Option<f64>) {
        self.update(move |inner| inner.core.zoom_in(step));
    }

    pub fn zoom_out(&self, step: Option<f64>) {
        self.update(move |inner| inner.core.zoom_out(step));
    }

    pub fn reset_zoom(&self) {
        self.update(|inner| {
            inner.core.reset_zoom();
            true
        });
    }

    pub fn set_zoom_step(&self, step: f64) {
        self.update(move |inner| {
            inner.core.set_zoom_step(step);
            false
        });
    }

    /// Fit the document to the container now, without touching the
    /// interaction flag.
    pub fn fit_to_container(&self) {
        self.update(|inner| {
            inner.core.viewport.apply_fit();
            true
        });
    }

    /// Reset world size and zoom: back to the fitted, centered document.
    pub fn reset_view(&self) {
        self.update(|inner| {
            inner.core.reset_world_size();
            inner.core.reset_zoom();
            true
        });
    }

    pub fn set_world_size(&self, size: Size) {
        self.update(move |inner| {
            inner.core.set_world_size(size);
            true
        });
    }

    pub fn reset_world_size(&self) {
        self.update(|inner| {
            inner.core.reset_world_size();
            true
        });
    }

    pub fn set_interaction_locked(&self, locked: bool) {
        self.update(move |inner| {
            inner.core.set_interaction_locked(locked);
            true
        });
    }

    #[must_use]
    pub fn is_interaction_locked(&self) -> bool {
        self.inner.borrow().core.is_interaction_locked()
    }

    /// Toggle grab-mode (drag to pan) through the typed pan capability.
    pub fn set_grab_mode(&self, enabled: bool) {
        self.update(move |inner| {
            if enabled {
                inner.core.pan_control().enable();
            } else {
                inner.core.pan_control().disable();
            }
            false
        });
    }

    #[must_use]
    pub fn is_grab_enabled(&self) -> bool {
        self.inner.borrow().core.is_grab_enabled()
    }

    /// Margin entry point for outside controls; values are px.
    pub fn update_margins(&self, top: f64, right: f64, bottom: f64, left: f64) {
        if !self.is_ready() {
            return;
        }
        let margins = self.inner.borrow().margins.clone();
        margins.set_margins(&MarginInput { top, right, bottom, left, unit: Unit::Px });
    }

    // --- Object registry ---

    /// Add a text object. `None` when the engine is not ready.
    pub fn add_text(&self, spec: &TextSpec) -> Option<NodeId> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return None;
            }
            inner.core.add_text(spec)
        };
        self.request_render();
        Some(id)
    }

    /// Add an arbitrary display node. `None` when the engine is not ready.
    pub fn add_display_object(&self, node: Node) -> Option<NodeId> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return None;
            }
            inner.core.add_display_object(node)
        };
        self.request_render();
        Some(id)
    }

    /// Load, decode, and add an image. Resolves to `None` (after logging)
    /// on decode failure or when the engine is gone by decode time; never
    /// throws.
    pub async fn add_image(&self, url: &str, spec: ImageSpec) -> Option<NodeId> {
        if self.inner.borrow().core.phase() != Phase::Ready {
            return None;
        }
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                log::warn!("image element creation failed: {err:?}");
                return None;
            }
        };
        image.set_src(url);
        if let Err(err) = JsFuture::from(image.decode()).await {
            log::warn!("image decode failed for {url}: {err:?}");
            return None;
        }
        let id = {
            let mut inner = self.inner.borrow_mut();
            // The engine may have been destroyed while the decode was in
            // flight; the image is dropped rather than inserted.
            if inner.core.phase() != Phase::Ready {
                return None;
            }
            let natural =
                Size::new(f64::from(image.natural_width()), f64::from(image.natural_height()));
            let id = inner.core.insert_image(&spec, natural);
            inner.images.insert(id, image);
            id
        };
        self.request_render();
        Some(id)
    }

    /// Add an audio placeholder tile.
    pub fn add_audio_placeholder(&self, x: f64, y: f64) -> Option<NodeId> {
        self.add_media_placeholder(MediaKind::Audio, x, y)
    }

    /// Add a video placeholder tile.
    pub fn add_video_placeholder(&self, x: f64, y: f64) -> Option<NodeId> {
        self.add_media_placeholder(MediaKind::Video, x, y)
    }

    fn add_media_placeholder(&self, media: MediaKind, x: f64, y: f64) -> Option<NodeId> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return None;
            }
            inner.core.add_placeholder(media, x, y)
        };
        self.request_render();
        Some(id)
    }

    /// Remove an object by id. `false` for unknown ids (including after
    /// destroy).
    pub fn remove_object(&self, id: NodeId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if inner.core.phase() != Phase::Ready {
                return false;
            }
            inner.images.remove(&id);
            inner.flash_timers.remove(&id);
            inner.core.remove_object(id)
        };
        if removed {
            self.request_render();
        }
        removed
    }

    #[must_use]
    pub fn object(&self, id: NodeId) -> Option<CanvasObject> {
        self.inner.borrow().core.object(id)
    }

    #[must_use]
    pub fn objects_snapshot(&self) -> Vec<CanvasObject> {
        self.inner.borrow().core.objects_snapshot()
    }

    /// Briefly dip the object's opacity, then restore it. No-op for unknown
    /// ids.
    pub fn flash(&self, id: NodeId) {
        let begun = {
            let mut inner = self.inner.borrow_mut();
            inner.core.phase() == Phase::Ready && inner.core.flash_begin(id)
        };
        if !begun {
            return;
        }
        self.request_render();
        let weak = Rc::downgrade(&self.inner);
        let timeout = Timeout::new(FLASH_MS, move || {
            let Some(engine) = Self::from_weak(&weak) else {
                return;
            };
            {
                let mut inner = engine.inner.borrow_mut();
                inner.flash_timers.remove(&id);
                if inner.core.phase() != Phase::Ready {
                    return;
                }
                inner.core.flash_restore(id);
            }
            engine.request_render();
        });
        // Replacing an existing timer for the same id cancels it; the saved
        // opacity from the first flash survives.
        self.inner.borrow_mut().flash_timers.insert(id, timeout);
    }

    // --- Direct scene access ---

    /// The backing canvas element, while mounted.
    #[must_use]
    pub fn canvas(&self) -> Option<HtmlCanvasElement> {
        self.inner.borrow().canvas.clone()
    }

    /// The layout block node handles, while mounted.
    #[must_use]
    pub fn layout_blocks(&self) -> Option<LayoutBlocks> {
        self.inner.borrow().core.layout_blocks()
    }
}

#[derive(Debug, Clone, Copy)]
enum PointerPhase {
    Down,
    Move,
    Up,
}
