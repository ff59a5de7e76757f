#![forbid(unsafe_code)]

//! Blocking dispatch-context marshalling for the obx model layer.
//!
//! A [`DispatchContext`] names "the right place to run this callback". The
//! helpers in [`invoke`] run a closure either in place, when the caller is
//! already on the context, or by marshalling it onto the context and blocking
//! until it has completed. The `try_` variants swallow failure and exist so
//! that a lazily computed default value can never crash a simple property
//! read.

pub mod context;
pub mod invoke;

pub use context::{CallerContext, DispatchContext, DispatchError};
pub use invoke::{invoke, invoke_value, try_invoke, try_invoke_value};
