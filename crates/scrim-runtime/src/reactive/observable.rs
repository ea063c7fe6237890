#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use tracing::trace;

type Callback<T> = dyn Fn(&T);

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<Callback<T>>>,
}

/// Shared, version-tracked value.
///
/// Clones share state: a `set` through any clone is seen by every clone and
/// every subscriber.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Current value (cloned).
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Number of changes applied so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
            #[cfg(feature = "tracing")]
            trace!(version = inner.version, "observable changed");
        }
        self.notify();
    }

    /// Mutate in place; notifies only if the result differs.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register `callback`; it runs after every change until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _callback: Box::new(strong),
        }
    }

    /// Live subscriber count (dead entries are pruned first).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|w| w.strong_count() > 0);
        inner.subscribers.len()
    }

    fn notify(&self) {
        let (version, value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<Weak<Callback<T>>> = inner.subscribers.clone();
            (inner.version, inner.value.clone(), callbacks)
        };
        for weak in callbacks {
            // A nested `set` already delivered a newer value to everyone.
            if self.version() != version {
                break;
            }
            if let Some(callback) = weak.upgrade() {
                callback(&value);
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

/// RAII guard for an [`Observable::subscribe`] registration.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn set_notifies_and_bumps_version() {
        let open = Observable::new(false);
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        let _sub = open.subscribe(move |v| s.set(Some(*v)));

        open.set(true);
        assert_eq!(seen.get(), Some(true));
        assert_eq!(open.version(), 1);
    }

    #[test]
    fn equal_value_is_noop() {
        let open = Observable::new(false);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _sub = open.subscribe(move |_| c.set(c.get() + 1));

        open.set(false);
        assert_eq!(count.get(), 0);
        assert_eq!(open.version(), 0);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let open = Observable::new(false);
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let sub = open.subscribe(move |_| c.set(c.get() + 1));
        open.set(true);
        drop(sub);
        open.set(false);
        assert_eq!(count.get(), 1);
        assert_eq!(open.subscriber_count(), 0);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let value = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let _a = value.subscribe(move |_| l1.borrow_mut().push("a"));
        let l2 = Rc::clone(&log);
        let _b = value.subscribe(move |_| l2.borrow_mut().push("b"));
        value.set(1);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn reentrant_set_from_subscriber() {
        let open = Observable::new(false);
        let handle = open.clone();
        let _auto_close = open.subscribe(move |v| {
            if *v {
                handle.set(false);
            }
        });
        open.set(true);
        assert!(!open.get());
        assert_eq!(open.version(), 2);
    }

    #[test]
    fn nested_change_supersedes_stale_delivery() {
        let open = Observable::new(false);
        let handle = open.clone();
        let _veto = open.subscribe(move |v| {
            if *v {
                handle.set(false);
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _observer = open.subscribe(move |v| s.borrow_mut().push(*v));
        open.set(true);
        assert_eq!(*seen.borrow(), vec![false]);
    }

    #[test]
    fn update_in_place() {
        let count = Observable::new(1);
        count.update(|c| *c += 1);
        assert_eq!(count.get(), 2);
        assert_eq!(count.with(|c| *c * 10), 20);
    }
}
