//! Single-threaded observable state and event signals.
//!
//! A [`Signal`] broadcasts values to subscribers. An [`Observable`] is a value plus a signal that
//! fires whenever the value is replaced. Subscribing returns a [`Subscription`] guard; dropping
//! the guard (or calling [`Subscription::unsubscribe`]) removes the callback, after which it is
//! never invoked again.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

type Callback<T> = Box<dyn FnMut(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Rc<RefCell<Callback<T>>>)>,
}

/// A broadcast channel for values of type `T`.
pub struct Signal<T> {
    listeners: Rc<RefCell<Listeners<T>>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Registers a callback. The callback stays registered for as long as the returned guard
    /// lives.
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Box::new(callback);
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(RefCell::new(callback))));

        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(listeners) = weak.upgrade() {
                    listeners.borrow_mut().entries.retain(|(i, _)| *i != id);
                }
            })),
        }
    }

    /// Sends a value to every current subscriber, in subscription order.
    pub fn emit(&self, value: &T) {
        // Snapshot so callbacks may subscribe or unsubscribe while being notified.
        let snapshot: Vec<(u64, Rc<RefCell<Callback<T>>>)> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();
        for (id, callback) in snapshot {
            let still_registered = self
                .listeners
                .borrow()
                .entries
                .iter()
                .any(|(i, _)| *i == id);
            if still_registered {
                (*callback.borrow_mut())(value);
            }
        }
    }

    /// Returns the number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Guard returned by [`Signal::subscribe`]. Dropping it releases the subscription.
#[must_use = "dropping a subscription immediately unsubscribes it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Releases the subscription now.
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

/// A value that notifies subscribers whenever it is replaced.
///
/// Cloning an `Observable` yields another handle to the same value.
pub struct Observable<T> {
    value: Rc<RefCell<T>>,
    changed: Rc<Signal<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            changed: Rc::clone(&self.changed),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            changed: Rc::new(Signal::new()),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replaces the value and notifies subscribers with the new value.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value.clone();
        self.changed.emit(&value);
    }

    /// Applies `f` to a copy of the value and stores the result as one update.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        self.changed.subscribe(callback)
    }
}
