use std::{cell::RefCell, rc::Rc};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::TRACE).with_test_writer().init(); }

#[allow(unused)]
pub fn watcher<T: 'static>() -> (Rc<dyn Fn(T)>, Box<dyn Fn() -> Vec<T>>) {
    let changes = Rc::new(RefCell::new(Vec::new()));
    let accumulate: Rc<dyn Fn(T)> = {
        let changes = changes.clone();
        Rc::new(move |value: T| changes.borrow_mut().push(value))
    };

    let check: Box<dyn Fn() -> Vec<T>> = Box::new(move || {
        let changes: Vec<T> = changes.borrow_mut().drain(..).collect();
        changes
    });

    (accumulate, check)
}
