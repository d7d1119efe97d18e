use std::rc::Rc;

use tracing::trace;

use crate::{
    dispatch::Dispatcher,
    listener::{IntoListener, Listener},
    registry::{SubjectId, SubscriptionId},
    subscription::Subscription,
};

/// A synchronous notification hub. Listeners are called in registration order on the thread
/// that calls [`Subject::notify`], before it returns.
///
/// Cloning a `Subject` yields another handle to the same registry.
pub struct Subject<T: 'static = ()>(Rc<Dispatcher<Listener<T>>>);

impl<T: 'static> Clone for Subject<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: 'static> Default for Subject<T> {
    fn default() -> Self { Self::new() }
}

impl<T: 'static> Subject<T> {
    pub fn new() -> Self { Self(Rc::new(Dispatcher::new())) }

    /// Get the unique identifier for this subject
    pub fn id(&self) -> SubjectId { self.0.id() }

    /// Register a listener. The returned handle unsubscribes when dropped.
    ///
    /// A listener added from inside a notification is first called on the next `notify`.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where L: IntoListener<T> {
        let id = self.0.insert(listener.into_listener());
        trace!("{} subscribed {}", self.id(), id);
        Subscription::new(self.0.clone(), id)
    }

    /// Register a callback that ignores the payload
    pub fn subscribe_fn<F>(&self, callback: F) -> Subscription
    where F: Fn() + 'static {
        self.subscribe(Listener::<T>::NotifyOnly(Rc::new(callback)))
    }

    /// Call every registered listener with a borrow of `event`.
    ///
    /// Unsubscribes requested by listeners during the pass take effect once it completes; a
    /// listener scheduled later in this pass is still called. A panicking listener propagates
    /// to the caller and the subject remains usable.
    pub fn notify(&self, event: &T) { self.0.dispatch(|_, listener| listener.call(event)) }

    /// Like [`Subject::notify`], for callers that hold the event by value
    pub fn notify_owned(&self, event: T) { self.notify(&event) }

    /// Whether the registration is live, i.e. present and not awaiting a deferred removal
    pub fn contains(&self, id: SubscriptionId) -> bool { self.0.contains(&id) }

    /// Number of registrations, including any awaiting deferred removal
    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// True while a notification pass is running
    pub fn is_dispatching(&self) -> bool { self.0.is_dispatching() }
}

impl Subject<()> {
    /// Notify a payload-less subject
    pub fn trigger(&self) { self.notify(&()) }
}

impl<T: 'static> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject").field("id", &self.id()).field("listeners", &self.len()).finish()
    }
}
