#![forbid(unsafe_code)]

//! Observable property models.
//!
//! This crate provides [`PropertyStore`], a dynamically-typed property bag
//! with change notification, lazily computed defaults, and automatic
//! bridging of nested observable events:
//!
//! - [`store::PropertyStore`]: named properties, change detection by value
//!   and by identity, and a unified property-changed channel.
//! - [`collection::ObservableList`]: a shared list whose contents-changed
//!   events re-raise under the owning property's name once stored.
//! - [`command::RelayCommand`]: a closure-backed command whose
//!   can-execute-changed and executing/executed events are bridged likewise.
//! - [`event::EventSource`] / [`event::Subscription`]: the subscriber
//!   machinery everything above shares.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use obx_model::PropertyStore;
//!
//! let store = PropertyStore::new();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let _sub = store.on_property_changed(move |name| sink.borrow_mut().push(name.to_owned()));
//!
//! store.set("Title", "untitled".to_string());
//! store.set("Title", "untitled".to_string()); // equal rewrite: silent
//!
//! assert_eq!(store.get::<String>("Title"), "untitled");
//! assert_eq!(seen.borrow().as_slice(), ["Title"]);
//! ```

pub mod collection;
pub mod command;
pub mod error;
pub mod event;
pub mod store;
pub mod value;

pub use collection::{CollectionChanged, ObservableList};
pub use command::{Command, CommandExecuted, CommandExecuting, CommandParameter, RelayCommand};
pub use error::ModelError;
pub use event::{EventSource, Subscription};
pub use store::PropertyStore;
pub use value::{Disposable, PropertyValue};
