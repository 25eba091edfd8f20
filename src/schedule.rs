//! Animation-frame scheduling: a pure single-slot gate plus the
//! `requestAnimationFrame` shell that drives it.
//!
//! Redraw and resize work is coalesced to at most one pending frame: the
//! gate arms on the first request and swallows every further request until
//! the frame fires, so a burst of N resize signals produces exactly one
//! recomputation using the latest measurement.

#[cfg(test)]
#[path = "schedule_test.rs"]
mod schedule_test;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

/// Single-slot coalescer for frame-driven work.
#[derive(Debug, Default)]
pub(crate) struct FrameGate {
    armed: bool,
}

impl FrameGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arm the gate. Returns `true` only when no request was pending — the
    /// caller should schedule a frame exactly when this returns `true`.
    pub(crate) fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        true
    }

    /// Consume the armed state at frame time. Returns whether it was armed.
    pub(crate) fn fire(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }

    /// Drop any pending request without firing.
    pub(crate) fn cancel(&mut self) {
        self.armed = false;
    }

    #[must_use]
    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}

/// Owns the browser-side pending frame: the callback closure and the
/// `requestAnimationFrame` handle, cancellable synchronously.
pub(crate) struct RafSlot {
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl RafSlot {
    pub(crate) fn new() -> Self {
        Self { handle: None, closure: None }
    }

    /// Install the per-frame callback. Done once per mount; the closure is
    /// reused across frames so firing never drops it mid-invocation.
    pub(crate) fn set_callback(&mut self, f: impl FnMut() + 'static) {
        self.closure = Some(Closure::wrap(Box::new(f) as Box<dyn FnMut()>));
    }

    /// Request a frame. No-op when one is already pending or no callback is
    /// installed.
    pub(crate) fn request(&mut self, window: &Window) {
        if self.handle.is_some() {
            return;
        }
        let Some(closure) = &self.closure else {
            return;
        };
        if let Ok(handle) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            self.handle = Some(handle);
        }
    }

    /// Forget the pending handle; called from inside the fired callback.
    pub(crate) fn mark_fired(&mut self) {
        self.handle = None;
    }

    /// Synchronously cancel the pending frame, if any. Nothing scheduled
    /// before this call fires after it returns.
    pub(crate) fn cancel(&mut self, window: &Window) {
        if let Some(handle) = self.handle.take() {
            if window.cancel_animation_frame(handle).is_err() {
                log::debug!("cancel_animation_frame failed for handle {handle}");
            }
        }
    }

    /// Cancel and drop the callback closure.
    pub(crate) fn teardown(&mut self, window: &Window) {
        self.cancel(window);
        self.closure = None;
    }
}
