//! Observable - single-threaded publish/subscribe value cell
//!
//! Holds the current value behind an `Rc` so readers always get a complete,
//! immutable snapshot. Every `set`/`update` replaces the value wholesale and
//! notifies observers in subscription order before returning.
//!
//! Observers must not call `set`/`update`/`subscribe` on the same observable
//! from inside their callback.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Observable::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Box<dyn FnMut(&T)>;

struct Inner<T> {
    value: RefCell<Rc<T>>,
    observers: RefCell<Vec<(SubscriptionId, Observer<T>)>>,
    next_id: Cell<u64>,
}

/// Cheaply clonable handle; clones share the same value and observers
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field("observers", &self.observer_count())
            .finish()
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(Rc::new(value)),
                observers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Current snapshot
    pub fn get(&self) -> Rc<T> {
        Rc::clone(&self.inner.value.borrow())
    }

    /// Replace the value and notify observers
    pub fn set(&self, value: T) {
        let snapshot = Rc::new(value);
        *self.inner.value.borrow_mut() = Rc::clone(&snapshot);
        self.notify(&snapshot);
    }

    /// Derive a new value from the current one, then notify
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.get());
        self.set(next);
    }

    /// Register an observer; it is not called for the current value
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .observers
            .borrow_mut()
            .push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.inner.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    fn notify(&self, value: &T) {
        let mut observers = self.inner.observers.borrow_mut();
        for (_, observer) in observers.iter_mut() {
            observer(value);
        }
    }
}
