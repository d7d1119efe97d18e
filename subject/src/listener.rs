use std::rc::Rc;

/// A callback registered with a [`crate::Subject`].
/// Supports both payload listeners (borrow the event) and notify-only listeners (ignore it).
pub enum Listener<T = ()> {
    /// Receives a borrow of the event
    Payload(Rc<dyn Fn(&T)>),
    /// Only learns that a notification happened
    NotifyOnly(Rc<dyn Fn()>),
}

impl<T> Listener<T> {
    pub fn call(&self, event: &T) {
        match self {
            Listener::Payload(callback) => callback(event),
            Listener::NotifyOnly(callback) => callback(),
        }
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Listener::Payload(callback) => Listener::Payload(callback.clone()),
            Listener::NotifyOnly(callback) => Listener::NotifyOnly(callback.clone()),
        }
    }
}

impl<T> std::fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Listener::Payload(_) => write!(f, "Listener::Payload"),
            Listener::NotifyOnly(_) => write!(f, "Listener::NotifyOnly"),
        }
    }
}

/// Trait for types that can be converted into listeners.
pub trait IntoListener<T> {
    fn into_listener(self) -> Listener<T>;
}

impl<F, T> IntoListener<T> for F
where F: Fn(&T) + 'static
{
    fn into_listener(self) -> Listener<T> { Listener::Payload(Rc::new(self)) }
}

impl<T> IntoListener<T> for Listener<T> {
    fn into_listener(self) -> Listener<T> { self }
}

impl<T> IntoListener<T> for Rc<dyn Fn(&T)> {
    fn into_listener(self) -> Listener<T> { Listener::Payload(self) }
}

// Notify-only callbacks work with a subject of any payload type
impl<T> IntoListener<T> for Rc<dyn Fn()> {
    fn into_listener(self) -> Listener<T> { Listener::NotifyOnly(self) }
}

impl<T> IntoListener<T> for std::sync::mpsc::Sender<T>
where T: Clone + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::Payload(Rc::new(move |value: &T| {
            let _ = self.send(value.clone()); // receiver may be gone
        }))
    }
}

#[cfg(feature = "tokio")]
impl<T> IntoListener<T> for tokio::sync::mpsc::UnboundedSender<T>
where T: Clone + 'static
{
    fn into_listener(self) -> Listener<T> {
        Listener::Payload(Rc::new(move |value: &T| {
            let _ = self.send(value.clone());
        }))
    }
}
