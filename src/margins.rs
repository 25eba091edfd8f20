//! Current page margins in pixels, kept in sync with the page dimensions.
//!
//! [`MarginManager`] stores margins only in px. Setting margins in a physical
//! unit converts through millimeters using the current `px_per_mm`. Whenever
//! the page dimensions change, margins are fully recomputed from the fixed
//! default-margins-in-mm table — previously set custom margins are discarded,
//! matching the observed behavior of the system this engine replaces (see
//! DESIGN.md for the recorded decision).

#[cfg(test)]
#[path = "margins_test.rs"]
mod margins_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::dimension::{DimensionManager, PageLayout};
use crate::geometry::{self, DEFAULT_MARGINS_MM, Unit};
use crate::notify::{Listeners, Subscription};

/// Immutable margin snapshot. Values are always pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginState {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    /// Unit tag for the stored values; fixed to [`Unit::Px`].
    pub unit: Unit,
}

impl MarginState {
    fn from_mm(mm: [f64; 4], px_per_mm: f64) -> Self {
        Self {
            top: mm[0] * px_per_mm,
            right: mm[1] * px_per_mm,
            bottom: mm[2] * px_per_mm,
            left: mm[3] * px_per_mm,
            unit: Unit::Px,
        }
    }
}

/// Margin values with an explicit source unit, as supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginInput {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
    pub unit: Unit,
}

struct MarginInner {
    state: MarginState,
    listeners: Listeners<MarginState>,
}

impl MarginInner {
    fn defaults_for(px_per_mm: f64) -> MarginState {
        MarginState::from_mm(DEFAULT_MARGINS_MM, px_per_mm)
    }
}

/// Owner of the current margins, derived from and subscribed to a
/// [`DimensionManager`].
#[derive(Clone)]
pub struct MarginManager {
    inner: Rc<RefCell<MarginInner>>,
    dimensions: DimensionManager,
    // Held for the manager's lifetime; dropping it detaches from dimensions.
    _dimension_subscription: Rc<Subscription>,
}

impl MarginManager {
    /// Create a manager seeded from the current dimension snapshot.
    #[must_use]
    pub fn new(dimensions: &DimensionManager) -> Self {
        let px_per_mm = dimensions.state().px_per_mm;
        let inner = Rc::new(RefCell::new(MarginInner {
            state: MarginInner::defaults_for(px_per_mm),
            listeners: Listeners::new(),
        }));

        let weak: Weak<RefCell<MarginInner>> = Rc::downgrade(&inner);
        let subscription = dimensions.on_change(move |dims| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let (state, callbacks) = {
                let mut inner = inner.borrow_mut();
                inner.state = MarginInner::defaults_for(dims.px_per_mm);
                (inner.state, inner.listeners.snapshot())
            };
            for callback in callbacks {
                callback(&state);
            }
        });

        Self {
            inner,
            dimensions: dimensions.clone(),
            _dimension_subscription: Rc::new(subscription),
        }
    }

    /// Current margin snapshot in px.
    #[must_use]
    pub fn margins(&self) -> MarginState {
        self.inner.borrow().state
    }

    /// Set margins from values in any unit. Physical units convert through
    /// millimeters using the current `px_per_mm`; px stores directly. Always
    /// notifies subscribers.
    pub fn set_margins(&self, input: &MarginInput) {
        let px_per_mm = self.dimensions.state().px_per_mm;
        let (state, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = MarginState {
                top: geometry::to_px(input.top, input.unit, px_per_mm),
                right: geometry::to_px(input.right, input.unit, px_per_mm),
                bottom: geometry::to_px(input.bottom, input.unit, px_per_mm),
                left: geometry::to_px(input.left, input.unit, px_per_mm),
                unit: Unit::Px,
            };
            (inner.state, inner.listeners.snapshot())
        };
        for callback in callbacks {
            callback(&state);
        }
    }

    /// Adapter: extract the margins block from a page layout (default unit
    /// mm when unspecified) and delegate to [`Self::set_margins`]. A layout
    /// without a margins block is a no-op.
    pub fn set_margins_from_page_layout(&self, layout: &PageLayout) {
        let Some(block) = layout.margins else {
            return;
        };
        self.set_margins(&MarginInput {
            top: block.top,
            right: block.right,
            bottom: block.bottom,
            left: block.left,
            unit: block.unit.unwrap_or(Unit::Mm),
        });
    }

    /// Subscribe to margin changes; same contract as the dimension manager.
    pub fn on_change(&self, f: impl Fn(&MarginState) + 'static) -> Subscription {
        let id = self.inner.borrow_mut().listeners.add(Rc::new(f));
        Subscription::for_listeners(&self.inner, id, |inner: &mut MarginInner| {
            &mut inner.listeners
        })
    }
}
