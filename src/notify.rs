//! Change-notification primitives shared by the configuration managers and
//! the engine's zoom listeners.
//!
//! Every subscription is a resource: subscribing returns a [`Subscription`]
//! whose drop (or explicit [`Subscription::unsubscribe`]) removes the
//! listener. Teardown code collects these and drops them in reverse order,
//! so no listener can outlive the thing it observes.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// An ordered list of listeners keyed by insertion id.
///
/// `notify` snapshots the callback list before invoking, so a listener may
/// subscribe or unsubscribe reentrantly without aliasing the list borrow.
pub(crate) struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Rc<dyn Fn(&T)>)>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }

    /// Register a listener, returning its removal id.
    pub(crate) fn add(&mut self, f: Rc<dyn Fn(&T)>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, f));
        id
    }

    /// Remove a listener by id. Returns whether it was present.
    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Clone the current callbacks in subscription order.
    pub(crate) fn snapshot(&self) -> Vec<Rc<dyn Fn(&T)>> {
        self.entries.iter().map(|(_, f)| Rc::clone(f)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer handle for one registered listener.
///
/// Dropping it unsubscribes; dropping after the owning manager is gone is a
/// harmless no-op.
pub struct Subscription {
    disposer: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Build a subscription that removes listener `id` from the `Listeners`
    /// list inside `owner`, if the owner is still alive.
    pub(crate) fn for_listeners<S: 'static, T: 'static>(
        owner: &Rc<RefCell<S>>,
        id: u64,
        access: impl Fn(&mut S) -> &mut Listeners<T> + 'static,
    ) -> Self {
        let weak: Weak<RefCell<S>> = Rc::downgrade(owner);
        Self {
            disposer: Some(Box::new(move || {
                if let Some(owner) = weak.upgrade() {
                    access(&mut owner.borrow_mut()).remove(id);
                }
            })),
        }
    }

    /// Explicitly remove the listener now instead of at drop time.
    pub fn unsubscribe(mut self) {
        if let Some(dispose) = self.disposer.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(dispose) = self.disposer.take() {
            dispose();
        }
    }
}
