#![forbid(unsafe_code)]

//! The observable property store.
//!
//! # Design
//!
//! [`PropertyStore`] is a bag of named, dynamically-typed properties with
//! change detection and event bridging. A write distinguishes two kinds of
//! change: *value change* (new content by `dyn_eq`) drives the
//! property-changed notification, while *identity change* (new instance by
//! `dyn_same`) drives capability wiring. Wiring bridges a stored value's own
//! events into the store's channels: contents-changed and can-execute-changed
//! re-raise property-changed under the owning name, and a stored
//! [`RelayCommand`](crate::command::RelayCommand)'s lifecycle events re-raise
//! on the store's executing/executed channels.
//!
//! Reads are safe by policy: an unknown name or a type mismatch yields the
//! type's default, silently. Lazily computed defaults run through the store's
//! dispatch context and a failing factory is swallowed, so a plain property
//! read can never crash.
//!
//! # Invariants
//!
//! 1. A name is present in the bag iff it was set or successfully computed at
//!    least once, even when its value equals the type's default.
//! 2. Property-changed fires iff the write changed the value; wiring happens
//!    iff the write changed the identity.
//! 3. Nested-value subscriptions are created at most once per stored identity
//!    and are never removed (see the lifetime note below).
//! 4. `HasError` is true iff `LastError` holds an error, and is written only
//!    as the trailing half of [`PropertyStore::set_last_error`].
//!
//! # Lifetime note
//!
//! Wiring guards accumulate for the life of the store. Overwriting a property
//! does not detach the old value's bridge: a replaced collection or command
//! the application still holds keeps re-raising under the old name until it
//! is dropped. Callers owning disposable values call
//! [`PropertyStore::dispose_properties`] proactively.
//!
//! # Concurrency
//!
//! The store is a passive, single-threaded structure; all mutation happens on
//! whichever call flow reaches it. The only place a call may suspend is the
//! dispatch context used for default-value factories.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace, warn};

use obx_dispatch::{CallerContext, DispatchContext, try_invoke_value};

use crate::command::{CommandExecuted, CommandExecuting};
use crate::error::ModelError;
use crate::event::{EventSource, Subscription};
use crate::value::PropertyValue;

struct StoreInner {
    values: AHashMap<String, Rc<dyn PropertyValue>>,
    /// Bridges from stored values into the store's channels. Grow-only.
    wiring: Vec<Subscription>,
}

/// An observable bag of named, dynamically-typed properties.
///
/// Cloning a `PropertyStore` creates a new handle to the **same** bag,
/// channels, and wiring.
pub struct PropertyStore {
    inner: Rc<RefCell<StoreInner>>,
    context: Rc<dyn DispatchContext>,
    property_changed: EventSource<String>,
    executing: EventSource<CommandExecuting>,
    executed: EventSource<CommandExecuted>,
}

impl Clone for PropertyStore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            context: Rc::clone(&self.context),
            property_changed: self.property_changed.clone(),
            executing: self.executing.clone(),
            executed: self.executed.clone(),
        }
    }
}

impl Default for PropertyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("PropertyStore")
            .field("properties", &inner.values.len())
            .field("wiring", &inner.wiring.len())
            .finish()
    }
}

impl PropertyStore {
    /// Well-known name of the last-error property.
    pub const LAST_ERROR: &'static str = "LastError";
    /// Well-known name of the derived has-error property.
    pub const HAS_ERROR: &'static str = "HasError";

    /// An empty store whose default-value factories run in place.
    #[must_use]
    pub fn new() -> Self {
        Self::with_context(Rc::new(CallerContext))
    }

    /// An empty store whose default-value factories run on `context`.
    #[must_use]
    pub fn with_context(context: Rc<dyn DispatchContext>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values: AHashMap::new(),
                wiring: Vec::new(),
            })),
            context,
            property_changed: EventSource::new(),
            executing: EventSource::new(),
            executed: EventSource::new(),
        }
    }

    /// Stored value for `name`, or the type's default when the name is
    /// unknown or holds a different type. Never notifies.
    #[must_use]
    pub fn get<T>(&self, name: &str) -> T
    where
        T: PropertyValue + Clone + Default,
    {
        self.try_get(name).unwrap_or_default()
    }

    /// Stored, type-compatible value for `name`, if any.
    #[must_use]
    pub fn try_get<T>(&self, name: &str) -> Option<T>
    where
        T: PropertyValue + Clone,
    {
        self.inner
            .borrow()
            .values
            .get(name)
            .and_then(|value| value.as_any().downcast_ref::<T>())
            .cloned()
    }

    /// Stored value for `name`, computing and storing a default on first
    /// access.
    ///
    /// The factory runs through the store's dispatch context, so it can be
    /// marshalled onto a specific execution context. A factory that fails
    /// (dispatch error or panic) is swallowed: the call returns the type's
    /// default and stores nothing, and a later call evaluates again.
    pub fn get_or_else<T>(&self, name: &str, factory: impl FnOnce() -> T) -> T
    where
        T: PropertyValue + Clone + Default,
    {
        if let Some(value) = self.try_get::<T>(name) {
            return value;
        }
        match try_invoke_value(&*self.context, factory) {
            Some(value) => {
                self.set(name, value.clone());
                value
            }
            None => {
                warn!(property = name, "default factory failed; returning default");
                T::default()
            }
        }
    }

    /// Stored value for `name`, storing `default` on first access.
    pub fn get_or<T>(&self, name: &str, default: T) -> T
    where
        T: PropertyValue + Clone + Default,
    {
        self.get_or_else(name, move || default)
    }

    /// Write `value` under `name`.
    ///
    /// Raises property-changed when the value changed by value semantics.
    /// When the stored identity changed, bridges the new value's events into
    /// the store's channels. Writing an equal value is silent; writing an
    /// equal value with a new identity is silent but still wires.
    pub fn set<T: PropertyValue>(&self, name: impl Into<String>, value: T) {
        self.set_value(name.into(), Rc::new(value));
    }

    fn set_value(&self, name: String, value: Rc<dyn PropertyValue>) {
        let (changed, reference_changed) = {
            let mut inner = self.inner.borrow_mut();
            let flags = match inner.values.get(&name) {
                Some(old) => (!old.dyn_eq(&*value), !old.dyn_same(&*value)),
                None => (true, true),
            };
            inner.values.insert(name.clone(), Rc::clone(&value));
            flags
        };
        trace!(property = %name, changed, reference_changed, "set");

        if changed {
            self.property_changed.emit(&name);
        }
        if reference_changed {
            self.wire(&name, value.as_ref());
        }
    }

    /// Attach bridges for whatever capabilities `value` exposes.
    fn wire(&self, name: &str, value: &dyn PropertyValue) {
        let mut guards = Vec::new();

        if let Some(collection) = value.as_collection() {
            debug!(property = name, "bridging contents-changed");
            let event = self.property_changed.clone();
            let owner = name.to_owned();
            guards.push(collection.subscribe_changed(Box::new(move || event.emit(&owner))));
        }
        if let Some(command) = value.as_command() {
            debug!(property = name, "bridging can-execute-changed");
            let event = self.property_changed.clone();
            let owner = name.to_owned();
            guards.push(command.subscribe_can_execute_changed(Box::new(move || event.emit(&owner))));
        }
        if let Some(relay) = value.as_relay() {
            debug!(property = name, "bridging command lifecycle");
            let executing = self.executing.clone();
            guards.push(relay.on_executing(move |intent| executing.emit(intent)));
            let executed = self.executed.clone();
            guards.push(relay.on_executed(move |completion| executed.emit(completion)));
        }

        if !guards.is_empty() {
            self.inner.borrow_mut().wiring.append(&mut guards);
        }
    }

    /// Re-raise property-changed for `name` without writing it.
    pub fn notify(&self, name: &str) {
        self.property_changed.emit(&name.to_owned());
    }

    /// Snapshot of all populated property names. Later mutation does not
    /// affect the returned sequence.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.inner.borrow().values.keys().cloned().collect()
    }

    /// Dispose every stored value that opts into disposal, swallowing
    /// per-item failures. The bag and the wiring stay as they are.
    pub fn dispose_properties(&self) {
        let snapshot: Vec<(String, Rc<dyn PropertyValue>)> = {
            let inner = self.inner.borrow();
            inner
                .values
                .iter()
                .map(|(name, value)| (name.clone(), Rc::clone(value)))
                .collect()
        };
        for (name, value) in snapshot {
            if let Some(disposable) = value.as_disposable() {
                if let Err(err) = disposable.dispose() {
                    warn!(property = %name, error = %err, "disposal failed; continuing");
                }
            }
        }
    }

    /// The error recorded by the last failed operation, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<ModelError> {
        self.get(Self::LAST_ERROR)
    }

    /// Whether [`last_error`](Self::last_error) holds an error.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.get(Self::HAS_ERROR)
    }

    /// Record (or clear) the model's last error.
    ///
    /// Always writes `HasError` immediately after `LastError` as a second,
    /// separate set, so subscribers may observe two notifications in
    /// sequence.
    pub fn set_last_error(&self, error: Option<ModelError>) {
        let has_error = error.is_some();
        self.set(Self::LAST_ERROR, error);
        self.set(Self::HAS_ERROR, has_error);
    }

    /// Subscribe to property-changed notifications; the payload is the
    /// property name.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_property_changed(&self, f: impl Fn(&str) + 'static) -> Subscription {
        self.property_changed.subscribe(move |name: &String| f(name))
    }

    /// Subscribe to executing notifications aggregated from stored commands.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_executing(&self, f: impl Fn(&CommandExecuting) + 'static) -> Subscription {
        self.executing.subscribe(f)
    }

    /// Subscribe to executed notifications aggregated from stored commands.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_executed(&self, f: impl Fn(&CommandExecuted) + 'static) -> Subscription {
        self.executed.subscribe(f)
    }
}
