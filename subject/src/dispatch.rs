use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
};

use tracing::{debug, trace};

use crate::registry::{Registry, SubjectId, SubscriptionId};

/// Dispatch core shared by [`crate::Subject`] and [`crate::ObserverSet`].
///
/// Owns the registry and hands out ids. Removals requested while a notification pass is running
/// are queued and applied once the outermost pass has finished, so a listener can unsubscribe
/// itself (or anyone else) from inside its own callback.
///
/// Passes are counted rather than flagged: a listener that calls `notify` again on the same
/// subject starts a nested pass, and the queued removals wait until depth returns to zero.
pub(crate) struct Dispatcher<L> {
    next_id: Cell<SubscriptionId>,
    registry: RefCell<Registry<L>>,
    depth: Cell<usize>,
    pending: RefCell<BTreeSet<SubscriptionId>>,
}

/// Type-erased removal, so a [`crate::Subscription`] can cancel without knowing the payload type
pub(crate) trait Unsubscribe {
    fn unsubscribe(&self, id: SubscriptionId);
}

impl<L> Unsubscribe for Dispatcher<L> {
    fn unsubscribe(&self, id: SubscriptionId) { self.remove(id) }
}

impl<L> Dispatcher<L> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(SubscriptionId::first()),
            registry: RefCell::new(Registry::new()),
            depth: Cell::new(0),
            pending: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn id(&self) -> SubjectId { SubjectId::from_ptr(self as *const Self) }

    /// Register a listener under a fresh id. Takes effect immediately, but a pass that is already
    /// running works from its own snapshot and will not see it.
    pub fn insert(&self, listener: L) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id.next());
        self.registry.borrow_mut().insert(id, listener);
        trace!("{} inserted {}", self.id(), id);
        id
    }

    /// Remove an entry now, or after the current pass if one is running.
    /// Unknown or already removed ids are ignored.
    pub fn remove(&self, id: SubscriptionId) {
        if self.is_dispatching() {
            trace!("{} deferring removal of {}", self.id(), id);
            self.pending.borrow_mut().insert(id);
            return;
        }
        // The listener may own a Subscription to this same dispatcher, so it has to be dropped
        // after the registry borrow is released.
        let removed = self.registry.borrow_mut().remove(&id);
        if removed.is_some() {
            trace!("{} removed {}", self.id(), id);
        }
        drop(removed);
    }

    pub fn is_dispatching(&self) -> bool { self.depth.get() > 0 }

    pub fn is_pending(&self, id: &SubscriptionId) -> bool { self.pending.borrow().contains(id) }

    /// True if the id is registered and not waiting on a deferred removal
    pub fn contains(&self, id: &SubscriptionId) -> bool { self.registry.borrow().contains(id) && !self.is_pending(id) }

    pub fn len(&self) -> usize { self.registry.borrow().len() }

    pub fn is_empty(&self) -> bool { self.registry.borrow().is_empty() }

    /// Apply queued removals. Only called when no pass is running.
    fn reconcile(&self) {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        trace!("{} applying {} deferred removal(s)", self.id(), pending.len());
        let mut removed = Vec::with_capacity(pending.len());
        {
            let mut registry = self.registry.borrow_mut();
            for id in &pending {
                removed.extend(registry.remove(id));
            }
        }
        drop(removed);
    }
}

impl<L: Clone> Dispatcher<L> {
    /// Run one notification pass over a snapshot of the registry.
    ///
    /// The registry is not borrowed while `invoke` runs. If `invoke` panics the panic propagates
    /// to the caller, and the guard still closes the pass and applies deferred removals.
    pub fn dispatch(&self, mut invoke: impl FnMut(SubscriptionId, &L)) {
        let _guard = DispatchGuard::enter(self);
        let snapshot = self.registry.borrow().snapshot();
        debug!("{} notifying {} listener(s) at depth {}", self.id(), snapshot.len(), self.depth.get());
        for (id, listener) in &snapshot {
            invoke(*id, listener);
        }
    }
}

impl<L> Default for Dispatcher<L> {
    fn default() -> Self { Self::new() }
}

/// Marks a pass as running for as long as it is alive
struct DispatchGuard<'a, L> {
    dispatcher: &'a Dispatcher<L>,
}

impl<'a, L> DispatchGuard<'a, L> {
    fn enter(dispatcher: &'a Dispatcher<L>) -> Self {
        dispatcher.depth.set(dispatcher.depth.get() + 1);
        Self { dispatcher }
    }
}

impl<L> Drop for DispatchGuard<'_, L> {
    fn drop(&mut self) {
        let depth = self.dispatcher.depth.get() - 1;
        self.dispatcher.depth.set(depth);
        debug!("{} finished pass at depth {}", self.dispatcher.id(), depth + 1);
        if depth == 0 {
            self.dispatcher.reconcile();
        }
    }
}
