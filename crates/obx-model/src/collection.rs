#![forbid(unsafe_code)]

//! An observable list: a shared `Vec` with contents-changed notification.
//!
//! # Design
//!
//! [`ObservableList<T>`] is a cheap-clone handle over shared contents and a
//! shared [`EventSource`]. Every mutating operation emits one contents-changed
//! event after the interior borrow is released, so subscribers may read the
//! list from inside their callback. Accessors never notify.
//!
//! Identity and equality are both handle identity: two handles are "equal"
//! only when they share the same contents, which is what lets a property
//! store distinguish re-storing the same list from storing a fresh one.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::event::{EventSource, Subscription};
use crate::value::PropertyValue;

/// The collection-change capability: a subscribe/unsubscribe pair for a
/// payload-free "contents changed" event.
pub trait CollectionChanged {
    /// Subscribe to contents-changed notifications.
    fn subscribe_changed(&self, callback: Box<dyn Fn()>) -> Subscription;
}

/// A shared, observable list.
///
/// Cloning the handle shares contents and subscribers.
pub struct ObservableList<T> {
    items: Rc<RefCell<Vec<T>>>,
    changed: EventSource<()>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            changed: self.changed.clone(),
        }
    }
}

impl<T: 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

impl<T: 'static> ObservableList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
            changed: EventSource::new(),
        }
    }

    /// Append an item and notify.
    pub fn push(&self, item: T) {
        self.items.borrow_mut().push(item);
        self.changed.emit(&());
    }

    /// Insert an item at `index` and notify.
    ///
    /// # Panics
    ///
    /// Panics when `index > len`, like [`Vec::insert`].
    pub fn insert(&self, index: usize, item: T) {
        self.items.borrow_mut().insert(index, item);
        self.changed.emit(&());
    }

    /// Remove and return the item at `index`, notifying when one existed.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.items.borrow_mut();
            if index < items.len() {
                Some(items.remove(index))
            } else {
                None
            }
        };
        if removed.is_some() {
            self.changed.emit(&());
        }
        removed
    }

    /// Replace the item at `index`, returning the old one and notifying when
    /// one existed.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let replaced = {
            let mut items = self.items.borrow_mut();
            if index < items.len() {
                Some(std::mem::replace(&mut items[index], item))
            } else {
                None
            }
        };
        if replaced.is_some() {
            self.changed.emit(&());
        }
        replaced
    }

    /// Remove all items, notifying when the list was non-empty.
    pub fn clear(&self) {
        let was_empty = {
            let mut items = self.items.borrow_mut();
            let was_empty = items.is_empty();
            items.clear();
            was_empty
        };
        if !was_empty {
            self.changed.emit(&());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Clone out the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    /// Read the contents by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.items.borrow())
    }

    /// Snapshot the contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }

    /// Subscribe to contents-changed notifications.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_changed(&self, f: impl Fn() + 'static) -> Subscription {
        self.changed.subscribe(move |()| f())
    }
}

impl<T: 'static> CollectionChanged for ObservableList<T> {
    fn subscribe_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.changed.subscribe(move |()| callback())
    }
}

impl<T: 'static> PropertyValue for ObservableList<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyValue) -> bool {
        self.dyn_same(other)
    }

    fn dyn_same(&self, other: &dyn PropertyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| Rc::ptr_eq(&self.items, &other.items))
    }

    fn as_collection(&self) -> Option<&dyn CollectionChanged> {
        Some(self)
    }
}
