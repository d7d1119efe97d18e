/*!
Synchronous, single-threaded observer primitives for ankurah

# Design requirements:
- Delivery is synchronous: `notify` calls every listener inline and returns when they are done
- Listeners may subscribe, unsubscribe or notify again from inside a notification
- Unsubscribing during a notification is deferred until the pass completes (removal is never retroactive)
- A subscription handle must stay usable after the subject itself has been dropped
- Two flavors: closure subscriptions that return a handle, and observer objects registered by identity

# Nomenclature:
- `Subject` - closure registry; `subscribe` returns a `Subscription` which unsubscribes on drop
- `ObserverSet` - registry of `Observer` objects, keyed by the identity of their `Rc`
- `ScopedObserver` - an observer whose membership in an `ObserverSet` lasts exactly as long as it does

# Basic usage

```rust
use ankurah_subject::*;
use std::{cell::RefCell, rc::Rc};

let subject = Subject::<i32>::new();
let log = Rc::new(RefCell::new(Vec::new()));

let subscription = {
    let log = log.clone();
    subject.subscribe(move |value: &i32| log.borrow_mut().push(*value))
};

subject.notify(&1);
drop(subscription);
subject.notify(&2);

assert_eq!(*log.borrow(), [1]);
```

# Observer usage

```rust
use ankurah_subject::*;
use std::{cell::RefCell, rc::Rc};

struct Recorder(RefCell<Vec<i32>>);
impl Observer<i32> for Recorder {
    fn update(&self, event: &i32) { self.0.borrow_mut().push(*event); }
}

let subject = ObserverSet::<i32>::new();
let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
let scoped = ScopedObserver::from_rc(&subject, recorder.clone());

subject.notify(&1);
subject.notify(&2);
drop(scoped);
subject.notify(&3);

assert_eq!(*recorder.0.borrow(), [1, 2]);
```

*/

mod dispatch;
mod error;
mod listener;
mod observer;
mod registry;
mod scoped;
mod subject;
mod subscription;

pub use error::*;
pub use listener::*;
pub use observer::*;
pub use registry::{SubjectId, SubscriptionId};
pub use scoped::*;
pub use subject::*;
pub use subscription::*;
