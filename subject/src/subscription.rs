use std::rc::Rc;

use crate::{dispatch::Unsubscribe, registry::SubscriptionId};

/// A handle for one registration with a [`crate::Subject`].
///
/// Dropping the handle unsubscribes. The handle holds a strong reference to the subject's state,
/// so it stays actionable even after every `Subject` handle has been dropped.
#[derive(Default)]
pub struct Subscription {
    registration: Option<Registration>,
}

struct Registration {
    subject: Rc<dyn Unsubscribe>,
    id: SubscriptionId,
}

impl Subscription {
    pub(crate) fn new(subject: Rc<dyn Unsubscribe>, id: SubscriptionId) -> Self { Self { registration: Some(Registration { subject, id }) } }

    /// Cancel the registration. Calling this again, or dropping the handle afterwards, does nothing.
    /// When called from inside a notification the listener still finishes the current pass.
    pub fn unsubscribe(&mut self) {
        if let Some(Registration { subject, id }) = self.registration.take() {
            subject.unsubscribe(id);
        }
    }

    pub fn is_subscribed(&self) -> bool { self.registration.is_some() }

    /// The id of the registration, while it is still held
    pub fn id(&self) -> Option<SubscriptionId> { self.registration.as_ref().map(|r| r.id) }

    /// Move the registration into a new handle, leaving this one empty
    pub fn take(&mut self) -> Self { Self { registration: self.registration.take() } }

    /// Give up the handle without unsubscribing.
    /// The listener then stays registered for as long as the subject lives.
    pub fn detach(mut self) { self.registration = None; }
}

impl Drop for Subscription {
    fn drop(&mut self) { self.unsubscribe(); }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id() {
            Some(id) => f.debug_tuple("Subscription").field(&id).finish(),
            None => write!(f, "Subscription(unsubscribed)"),
        }
    }
}
