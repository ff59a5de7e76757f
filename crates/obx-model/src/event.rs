#![forbid(unsafe_code)]

//! Multi-subscriber change notification.
//!
//! # Design
//!
//! [`EventSource<T>`] holds its subscribers as `Weak` callbacks behind a
//! cheap-clone handle. [`subscribe`](EventSource::subscribe) hands back a
//! [`Subscription`] guard owning the only strong reference to the callback;
//! dropping the guard unsubscribes. Dead entries are pruned lazily during
//! [`emit`](EventSource::emit).
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. The subscriber list is not borrowed while callbacks run, so a callback
//!    may subscribe, emit, or drop guards without panicking.
//! 3. A dropped [`Subscription`] is never invoked by a later emit.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

/// A payload-carrying notification channel with weakly held subscribers.
///
/// Cloning an `EventSource` creates a new handle to the **same** subscriber
/// list.
pub struct EventSource<T> {
    subscribers: Rc<RefCell<Vec<Weak<Callback<T>>>>>,
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: 'static> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> EventSource<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register `callback`; it stays live while the returned guard is held.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong = Rc::new(callback);
        let as_callback: Rc<Callback<T>> = strong.clone();
        self.subscribers.borrow_mut().push(Rc::downgrade(&as_callback));
        Subscription { _callback: strong }
    }

    /// Invoke every live subscriber with `payload`.
    ///
    /// The subscriber list is snapshotted and the borrow released before any
    /// callback runs, so callbacks may re-enter this source.
    pub fn emit(&self, payload: &T) {
        let live: Vec<Rc<Callback<T>>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for callback in live {
            callback(payload);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

/// RAII guard for a single subscriber. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _callback: Rc<dyn Any>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription")
    }
}
