//! Small DOM helpers for the browser shell: window/document access and
//! event listeners as droppable resources.
//!
//! Every listener the engine attaches is held as a [`DomListener`] in its
//! cleanup list; dropping the value detaches the handler, so teardown is
//! structurally guaranteed rather than hand-maintained.

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Event, EventTarget, Window};

/// The global window, when running in a browser context.
pub(crate) fn window() -> Option<Window> {
    web_sys::window()
}

/// The global document, when running in a browser context.
pub(crate) fn document() -> Option<Document> {
    window()?.document()
}

/// Registration options for [`DomListener::attach`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ListenerOptions {
    /// Register in the capture phase.
    pub capture: bool,
    /// Explicit passive flag; `None` leaves the browser default.
    pub passive: Option<bool>,
}

impl ListenerOptions {
    pub(crate) fn capture() -> Self {
        Self { capture: true, passive: None }
    }

    pub(crate) fn active() -> Self {
        Self { capture: false, passive: Some(false) }
    }
}

/// A DOM event listener that detaches itself when dropped.
pub(crate) struct DomListener {
    target: EventTarget,
    name: &'static str,
    capture: bool,
    closure: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    /// Attach `f` to `target` for events named `name`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the underlying `addEventListener` call fails.
    pub(crate) fn attach(
        target: &EventTarget,
        name: &'static str,
        options: ListenerOptions,
        f: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        let opts = AddEventListenerOptions::new();
        opts.set_capture(options.capture);
        if let Some(passive) = options.passive {
            opts.set_passive(passive);
        }
        target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            &opts,
        )?;
        Ok(Self { target: target.clone(), name, capture: options.capture, closure })
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        if self
            .target
            .remove_event_listener_with_callback_and_bool(
                self.name,
                self.closure.as_ref().unchecked_ref(),
                self.capture,
            )
            .is_err()
        {
            log::debug!("failed to detach {} listener", self.name);
        }
    }
}
