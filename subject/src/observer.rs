use std::{
    cell::RefCell,
    collections::HashMap,
    rc::{Rc, Weak},
};

use tracing::trace;

use crate::{
    dispatch::Dispatcher,
    registry::{SubjectId, SubscriptionId},
};

/// Something that wants to hear about events of type `T`.
/// Use `T = ()` for payload-less notifications.
pub trait Observer<T> {
    fn update(&self, event: &T);
}

impl<T, F> Observer<T> for F
where F: Fn(&T)
{
    fn update(&self, event: &T) { self(event) }
}

/// Identity of a registered observer: the address of its allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ObserverKey(usize);

impl ObserverKey {
    fn of<O: ?Sized>(observer: &Rc<O>) -> Self { Self(Rc::as_ptr(observer) as *const () as usize) }
}

struct Entry<T> {
    key: ObserverKey,
    observer: Weak<dyn Observer<T>>,
}

impl<T> Clone for Entry<T> {
    fn clone(&self) -> Self { Self { key: self.key, observer: self.observer.clone() } }
}

struct Inner<T> {
    dispatcher: Dispatcher<Entry<T>>,
    /// Live registrations by identity. An observer whose removal is deferred is already gone
    /// from here, so it can be added again before the pass ends.
    index: RefCell<HashMap<ObserverKey, SubscriptionId>>,
}

/// A subject whose members are observers themselves, registered and removed by identity.
///
/// The set does not own its observers. Observers dropped without being removed are skipped
/// and pruned on the next notification; [`crate::ScopedObserver`] ties registration to the
/// observer's own lifetime instead.
pub struct ObserverSet<T: 'static = ()>(Rc<Inner<T>>);

impl<T: 'static> Clone for ObserverSet<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T: 'static> Default for ObserverSet<T> {
    fn default() -> Self { Self::new() }
}

impl<T: 'static> ObserverSet<T> {
    pub fn new() -> Self { Self(Rc::new(Inner { dispatcher: Dispatcher::new(), index: RefCell::new(HashMap::new()) })) }

    pub fn id(&self) -> SubjectId { self.0.dispatcher.id() }

    /// Register an observer. Adding one that is already registered does nothing.
    pub fn add_observer<O>(&self, observer: &Rc<O>)
    where O: Observer<T> + 'static {
        let key = ObserverKey::of(observer);
        if self.0.index.borrow().contains_key(&key) {
            return;
        }
        let weak = Rc::downgrade(observer);
        let weak: Weak<dyn Observer<T>> = weak;
        let id = self.0.dispatcher.insert(Entry { key, observer: weak });
        self.0.index.borrow_mut().insert(key, id);
        trace!("{} added observer {}", self.id(), id);
    }

    /// Deregister an observer. Removing one that is not registered does nothing.
    /// During a notification the removal is deferred until the pass completes.
    pub fn remove_observer<O>(&self, observer: &Rc<O>)
    where O: Observer<T> + ?Sized {
        let removed = self.0.index.borrow_mut().remove(&ObserverKey::of(observer));
        if let Some(id) = removed {
            self.0.dispatcher.remove(id);
        }
    }

    /// Whether the observer is registered and not waiting on a deferred removal
    pub fn contains<O>(&self, observer: &Rc<O>) -> bool
    where O: Observer<T> + ?Sized {
        self.0.index.borrow().contains_key(&ObserverKey::of(observer))
    }

    /// Call `update` on every registered observer, in registration order
    pub fn notify(&self, event: &T) {
        self.0.dispatcher.dispatch(|id, entry| match entry.observer.upgrade() {
            Some(observer) => observer.update(event),
            None => {
                trace!("{} pruning dropped observer {}", self.id(), id);
                self.forget(entry.key, id);
                self.0.dispatcher.remove(id);
            }
        })
    }

    /// Number of registrations, including any awaiting deferred removal
    pub fn len(&self) -> usize { self.0.dispatcher.len() }

    pub fn is_empty(&self) -> bool { self.0.dispatcher.is_empty() }

    pub fn is_dispatching(&self) -> bool { self.0.dispatcher.is_dispatching() }

    /// Drop the index entry for `key` if it still points at `id`
    fn forget(&self, key: ObserverKey, id: SubscriptionId) {
        let mut index = self.0.index.borrow_mut();
        if index.get(&key) == Some(&id) {
            index.remove(&key);
        }
    }
}

impl ObserverSet<()> {
    /// Notify a payload-less set
    pub fn trigger(&self) { self.notify(&()) }
}

impl<T: 'static> std::fmt::Debug for ObserverSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet").field("id", &self.id()).field("observers", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<i32>>);

    impl Observer<i32> for Recorder {
        fn update(&self, event: &i32) { self.0.borrow_mut().push(*event); }
    }

    #[test]
    fn test_add_is_idempotent() {
        let set = ObserverSet::<i32>::new();
        let recorder = Rc::new(Recorder::default());
        set.add_observer(&recorder);
        set.add_observer(&recorder);
        assert_eq!(set.len(), 1);

        set.notify(&4);
        assert_eq!(*recorder.0.borrow(), [4]);
    }

    #[test]
    fn test_remove_unregistered_is_noop() {
        let set = ObserverSet::<i32>::new();
        let registered = Rc::new(Recorder::default());
        let stranger = Rc::new(Recorder::default());
        set.add_observer(&registered);

        set.remove_observer(&stranger);
        assert!(set.contains(&registered));
        assert!(!set.contains(&stranger));

        set.remove_observer(&registered);
        set.remove_observer(&registered);
        assert!(set.is_empty());
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let set = ObserverSet::<i32>::new();
        let kept = Rc::new(Recorder::default());
        set.add_observer(&kept);
        {
            let dropped = Rc::new(Recorder::default());
            set.add_observer(&dropped);
        }
        assert_eq!(set.len(), 2);

        set.notify(&1);
        assert_eq!(*kept.0.borrow(), [1]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.0.index.borrow().len(), 1);
    }

    #[test]
    fn test_concrete_rc_registers_by_identity() {
        let set = ObserverSet::<i32>::new();
        let recorder: Rc<Recorder> = Rc::new(Recorder::default());
        let alias = recorder.clone();
        set.add_observer(&recorder);

        assert!(set.contains(&alias));
        let erased: Rc<dyn Observer<i32>> = alias;
        assert!(set.contains(&erased));

        set.notify(&9);
        assert_eq!(*recorder.0.borrow(), [9]);
    }

    #[test]
    fn test_many_observers_stay_indexed() {
        let set = ObserverSet::<i32>::new();
        let recorders: Vec<Rc<Recorder>> = (0..10_000).map(|_| Rc::new(Recorder::default())).collect();
        for recorder in &recorders {
            set.add_observer(recorder);
        }
        assert_eq!(set.len(), 10_000);
        assert_eq!(set.0.index.borrow().len(), 10_000);

        for recorder in recorders.iter().step_by(2) {
            set.remove_observer(recorder);
        }
        assert_eq!(set.len(), 5_000);
        assert!(recorders.iter().enumerate().all(|(n, r)| set.contains(r) == (n % 2 == 1)));

        set.notify(&1);
        assert_eq!(recorders.iter().filter(|r| !r.0.borrow().is_empty()).count(), 5_000);
    }

    #[test]
    fn test_readd_during_pass_gets_fresh_registration() {
        let set = ObserverSet::<i32>::new();
        let target = Rc::new(Recorder::default());
        let rehome = {
            let set = set.clone();
            let target = target.clone();
            Rc::new(move |event: &i32| {
                if *event == 1 {
                    set.remove_observer(&target);
                    assert!(!set.contains(&target));
                    set.add_observer(&target);
                    assert!(set.contains(&target));
                }
            })
        };
        set.add_observer(&rehome);
        set.add_observer(&target);

        // the old entry still fires in this pass, the new one waits for the next
        set.notify(&1);
        assert_eq!(*target.0.borrow(), [1]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&target));

        set.notify(&2);
        assert_eq!(*target.0.borrow(), [1, 2]);
        assert_eq!(set.0.index.borrow().len(), 2);
    }

    #[test]
    fn test_closure_observer() {
        let set = ObserverSet::<()>::new();
        let hits = Rc::new(RefCell::new(0));
        let observer = {
            let hits = hits.clone();
            Rc::new(move |_: &()| *hits.borrow_mut() += 1)
        };
        set.add_observer(&observer);
        set.trigger();
        set.trigger();
        assert_eq!(*hits.borrow(), 2);
    }
}
