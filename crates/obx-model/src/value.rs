#![forbid(unsafe_code)]

//! Dynamically-typed property values and the capability surface.
//!
//! # Design
//!
//! A property bag stores values as `Rc<dyn PropertyValue>`. The trait carries
//! type-erased equality and identity plus accessors for the closed set of
//! capabilities the store recognizes: contents-changed, command,
//! lifecycle-command, and disposal. Capability detection is an accessor call,
//! not type inheritance; everything defaults to "not supported".
//!
//! Plain data types opt in through [`plain_property!`], which wires equality
//! to `==` and leaves identity at its default: a plain value is never "the
//! same instance" as another, so every write of one counts as a reference
//! change. The crate's observable types implement the trait by hand and
//! override the accessors they support.
//!
//! # Invariants
//!
//! 1. `dyn_eq` across different concrete types is always `false`.
//! 2. `dyn_same(a, b)` implies the two values share observable state;
//!    notifying one is notifying the other.

use std::any::Any;

use crate::collection::CollectionChanged;
use crate::command::{Command, RelayCommand};
use crate::error::ModelError;

/// A value that can live in a property bag.
pub trait PropertyValue: Any {
    /// The value as `Any`, for typed reads.
    fn as_any(&self) -> &dyn Any;

    /// Value-semantics equality. Comparing across types is `false`.
    fn dyn_eq(&self, other: &dyn PropertyValue) -> bool;

    /// Identity: whether `other` is the same instance. Plain values are
    /// never the same instance as anything.
    fn dyn_same(&self, _other: &dyn PropertyValue) -> bool {
        false
    }

    /// The contents-changed capability, if this value exposes one.
    fn as_collection(&self) -> Option<&dyn CollectionChanged> {
        None
    }

    /// The command capability, if this value exposes one.
    fn as_command(&self) -> Option<&dyn Command> {
        None
    }

    /// The lifecycle-command capability. Recognized only for the crate's own
    /// [`RelayCommand`]; foreign command types bridge can-execute-changed
    /// but not executing/executed.
    fn as_relay(&self) -> Option<&RelayCommand> {
        None
    }

    /// The disposal capability, if this value exposes one.
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}

/// Opt-in release-resources capability.
pub trait Disposable {
    /// Release resources held by this value.
    ///
    /// # Errors
    ///
    /// Returns an error when cleanup fails.
    /// [`PropertyStore::dispose_properties`](crate::store::PropertyStore::dispose_properties)
    /// swallows the error per item and keeps going.
    fn dispose(&self) -> Result<(), ModelError>;
}

/// Implement [`PropertyValue`] for plain `PartialEq` data types.
///
/// Equality is `==`; identity stays at the "never the same instance"
/// default; no capabilities are exposed.
#[macro_export]
macro_rules! plain_property {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::value::PropertyValue for $ty {
            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn dyn_eq(&self, other: &dyn $crate::value::PropertyValue) -> bool {
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| other == self)
            }
        }
    )+};
}

plain_property!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: PartialEq + 'static> PropertyValue for Option<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other == self)
    }
}

impl<T: PartialEq + 'static> PropertyValue for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn PropertyValue) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|other| other == self)
    }
}
