//! Canonical page dimension state and its change notifications.
//!
//! [`DimensionManager`] owns the single source of truth for the document's
//! pixel and physical size. The state is an immutable snapshot replaced
//! wholesale on every accepted [`DimensionManager::apply_page_layout`] call —
//! never patched — so every subscriber sees a fully consistent
//! px/mm/`px_per_mm` triple.
//!
//! The manager is a cheap clonable handle over shared single-threaded state.
//! The host constructs it once and injects it into whatever needs it (the
//! margin manager, the viewport engine, outside UI controls); nothing here is
//! attached to a global namespace.

#[cfg(test)]
#[path = "dimension_test.rs"]
mod dimension_test;

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Orientation, PageSize, Unit};
use crate::notify::{Listeners, Subscription};

/// Immutable snapshot of the document's page dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionState {
    /// Page width in pixels.
    pub width_px: f64,
    /// Page height in pixels.
    pub height_px: f64,
    /// Page width in millimeters.
    pub width_mm: f64,
    /// Page height in millimeters.
    pub height_mm: f64,
    /// Conversion factor; always keeps the px and mm pairs consistent.
    pub px_per_mm: f64,
    /// The page size code this state was derived from.
    pub page_size: PageSize,
    /// The orientation this state was derived from.
    pub orientation: Orientation,
}

impl DimensionState {
    fn derive(page_size: PageSize, orientation: Orientation) -> Self {
        let dims = geometry::page_dimensions(page_size, orientation);
        Self {
            width_px: dims.width_px,
            height_px: dims.height_px,
            width_mm: dims.width_mm,
            height_mm: dims.height_mm,
            px_per_mm: dims.px_per_mm,
            page_size,
            orientation,
        }
    }
}

/// Margin block carried inside a [`PageLayout`]. Unit defaults to mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayoutMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// Page layout configuration as supplied by the host. Absent fields keep
/// their current values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<PageSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<PageLayoutMargins>,
}

struct DimensionInner {
    state: DimensionState,
    listeners: Listeners<DimensionState>,
}

/// Owner of the canonical page dimension state.
#[derive(Clone)]
pub struct DimensionManager {
    inner: Rc<RefCell<DimensionInner>>,
}

impl DimensionManager {
    /// Create a manager holding the default page size in portrait.
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(PageSize::default(), Orientation::default())
    }

    /// Create a manager starting from an explicit size and orientation.
    #[must_use]
    pub fn with_layout(page_size: PageSize, orientation: Orientation) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DimensionInner {
                state: DimensionState::derive(page_size, orientation),
                listeners: Listeners::new(),
            })),
        }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> DimensionState {
        self.inner.borrow().state
    }

    /// Subscribe to state changes. The listener fires once per accepted
    /// `apply_page_layout` call, synchronously, in subscription order.
    pub fn on_change(&self, f: impl Fn(&DimensionState) + 'static) -> Subscription {
        let id = self.inner.borrow_mut().listeners.add(Rc::new(f));
        Subscription::for_listeners(&self.inner, id, |inner: &mut DimensionInner| {
            &mut inner.listeners
        })
    }

    /// Apply a page layout. Absent fields resolve to the current values; if
    /// both the resolved size and orientation equal the current ones this is
    /// an exact no-op with no notification. Returns whether state changed.
    pub fn apply_page_layout(&self, layout: &PageLayout) -> bool {
        let (state, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let page_size = layout.page_size.unwrap_or(inner.state.page_size);
            let orientation = layout.orientation.unwrap_or(inner.state.orientation);
            if page_size == inner.state.page_size && orientation == inner.state.orientation {
                return false;
            }
            inner.state = DimensionState::derive(page_size, orientation);
            (inner.state, inner.listeners.snapshot())
        };
        for callback in callbacks {
            callback(&state);
        }
        true
    }

    /// Apply a page layout supplied by the host as JSON. Malformed input is
    /// logged and ignored. Returns whether state changed.
    pub fn apply_page_layout_json(&self, json: &str) -> bool {
        match serde_json::from_str::<PageLayout>(json) {
            Ok(layout) => self.apply_page_layout(&layout),
            Err(err) => {
                log::warn!("rejected page layout JSON: {err}");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl Default for DimensionManager {
    fn default() -> Self {
        Self::new()
    }
}
