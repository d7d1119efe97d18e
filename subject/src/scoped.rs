use std::{ops::Deref, rc::Rc};

use tracing::trace;

use crate::{
    error::Error,
    observer::{Observer, ObserverSet},
};

/// An observer whose membership in an [`ObserverSet`] follows its own lifetime.
///
/// Registers on construction and deregisters on drop. The wrapper holds a handle to the set,
/// so the set lives at least as long as the wrapper.
pub struct ScopedObserver<T: 'static, O: Observer<T> + 'static> {
    registration: Option<Registration<T, O>>,
}

struct Registration<T: 'static, O> {
    subject: ObserverSet<T>,
    observer: Rc<O>,
}

impl<T: 'static, O: Observer<T> + 'static> ScopedObserver<T, O> {
    pub fn new(subject: &ObserverSet<T>, observer: O) -> Self {
        let observer = Rc::new(observer);
        subject.add_observer(&observer);
        Self { registration: Some(Registration { subject: subject.clone(), observer }) }
    }

    /// Wrap an observer the caller already shares.
    ///
    /// The wrapper takes over the registration and removes it on drop, so the `Rc` must not be
    /// registered with `subject` already. Other owners can keep reading the observer.
    ///
    /// # Panics
    /// If `observer` is already registered with `subject`. See [`ScopedObserver::try_from_rc`].
    pub fn from_rc(subject: &ObserverSet<T>, observer: Rc<O>) -> Self {
        match Self::try_from_rc(subject, observer) {
            Ok(scoped) => scoped,
            Err(e) => panic!("ScopedObserver::from_rc: {e}"),
        }
    }

    pub fn try_from_rc(subject: &ObserverSet<T>, observer: Rc<O>) -> Result<Self, Error> {
        if subject.contains(&observer) {
            return Err(Error::AlreadyRegistered);
        }
        subject.add_observer(&observer);
        Ok(Self { registration: Some(Registration { subject: subject.clone(), observer }) })
    }

    /// Move the observer and its registration into a new wrapper. The source is deregistered
    /// and left empty, and the new wrapper is registered in its place.
    ///
    /// # Panics
    /// If this wrapper is already detached. See [`ScopedObserver::try_take`].
    pub fn take(&mut self) -> Self {
        match self.try_take() {
            Ok(taken) => taken,
            Err(e) => panic!("ScopedObserver::take: {e}"),
        }
    }

    pub fn try_take(&mut self) -> Result<Self, Error> {
        let registration = self.registration.take().ok_or(Error::Detached)?;
        trace!("{} re-homing scoped observer", registration.subject.id());
        registration.subject.remove_observer(&registration.observer);
        registration.subject.add_observer(&registration.observer);
        Ok(Self { registration: Some(registration) })
    }

    pub fn is_attached(&self) -> bool { self.registration.is_some() }

    /// The wrapped observer, or `None` once it has been taken
    pub fn observer(&self) -> Option<&Rc<O>> { self.registration.as_ref().map(|r| &r.observer) }
}

/// # Panics
/// Dereferencing a wrapper whose observer was moved out by [`ScopedObserver::take`].
impl<T: 'static, O: Observer<T> + 'static> Deref for ScopedObserver<T, O> {
    type Target = O;
    fn deref(&self) -> &O {
        match self.observer() {
            Some(observer) => observer.as_ref(),
            None => panic!("ScopedObserver: {}", Error::Detached),
        }
    }
}

impl<T: 'static, O: Observer<T> + 'static> Drop for ScopedObserver<T, O> {
    fn drop(&mut self) {
        if let Some(registration) = self.registration.take() {
            registration.subject.remove_observer(&registration.observer);
        }
    }
}

impl<T: 'static, O: Observer<T> + 'static> std::fmt::Debug for ScopedObserver<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedObserver").field("subject", &self.registration.as_ref().map(|r| r.subject.id())).finish()
    }
}
