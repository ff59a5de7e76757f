#![forbid(unsafe_code)]

//! Execute-now-or-marshal helpers over a [`DispatchContext`].
//!
//! # Design
//!
//! [`invoke`] and [`invoke_value`] run a closure in place when the caller is
//! already on the context, and otherwise marshal it onto the context and
//! block until it has run. A marshalled result travels back to the blocking
//! caller through a slot the caller still owns.
//!
//! The `try_` variants swallow every failure, both dispatch errors and panics
//! raised by the closure, and report success through the return shape alone.
//! Callers that need diagnostics use the surfacing variants.
//!
//! # Failure Modes
//!
//! - **Context rejects the task**: `invoke*` return the [`DispatchError`];
//!   `try_invoke*` report failure.
//! - **Context accepts but never runs the task**: `invoke_value` observes an
//!   empty result slot and reports [`DispatchError::Failed`].
//! - **Closure panics**: `invoke*` let the panic unwind to the caller;
//!   `try_invoke*` catch it and report failure.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::context::{DispatchContext, DispatchError};

/// Run `action` on `cx`, blocking until it has completed.
///
/// # Errors
///
/// Returns the underlying [`DispatchError`] when the context cannot run the
/// action.
pub fn invoke(cx: &dyn DispatchContext, action: impl FnOnce()) -> Result<(), DispatchError> {
    invoke_value(cx, action)
}

/// Run `f` on `cx`, blocking until it has completed, and return its result.
///
/// # Errors
///
/// Returns the underlying [`DispatchError`] when the context cannot run the
/// closure, or [`DispatchError::Failed`] when the context claims completion
/// without having run it.
pub fn invoke_value<T>(cx: &dyn DispatchContext, f: impl FnOnce() -> T) -> Result<T, DispatchError> {
    if cx.is_current() {
        return Ok(f());
    }

    let mut slot = None;
    let mut f = Some(f);
    let mut task = || {
        if let Some(f) = f.take() {
            slot = Some(f());
        }
    };
    cx.send(&mut task)?;
    slot.ok_or_else(|| DispatchError::Failed("marshalled task never ran".into()))
}

/// Swallowing variant of [`invoke`]: reports success as a plain `bool`.
#[must_use]
pub fn try_invoke(cx: &dyn DispatchContext, action: impl FnOnce()) -> bool {
    try_invoke_value(cx, action).is_some()
}

/// Swallowing variant of [`invoke_value`]: `None` on any failure, including a
/// panic inside `f`.
#[must_use]
pub fn try_invoke_value<T>(cx: &dyn DispatchContext, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(|| invoke_value(cx, f))) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            debug!(error = %err, "dispatch failed; result discarded");
            None
        }
        Err(_) => {
            debug!("marshalled task panicked; result discarded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallerContext;
    use std::cell::Cell;

    /// A context the caller is never on; `send` runs the task inline to
    /// simulate the marshalling hop.
    struct RemoteContext {
        sends: Cell<u32>,
    }

    impl RemoteContext {
        fn new() -> Self {
            Self {
                sends: Cell::new(0),
            }
        }
    }

    impl DispatchContext for RemoteContext {
        fn is_current(&self) -> bool {
            false
        }

        fn send(&self, task: &mut dyn FnMut()) -> Result<(), DispatchError> {
            self.sends.set(self.sends.get() + 1);
            task();
            Ok(())
        }
    }

    /// A context that rejects all work.
    struct DeadContext;

    impl DispatchContext for DeadContext {
        fn is_current(&self) -> bool {
            false
        }

        fn send(&self, _task: &mut dyn FnMut()) -> Result<(), DispatchError> {
            Err(DispatchError::Shutdown)
        }
    }

    /// A context that claims success without running the task.
    struct LossyContext;

    impl DispatchContext for LossyContext {
        fn is_current(&self) -> bool {
            false
        }

        fn send(&self, _task: &mut dyn FnMut()) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[test]
    fn invoke_runs_in_place_when_current() {
        let mut ran = false;
        invoke(&CallerContext, || ran = true).unwrap();
        assert!(ran);
    }

    #[test]
    fn invoke_value_marshals_and_returns_result() {
        let cx = RemoteContext::new();
        let result = invoke_value(&cx, || 6 * 7).unwrap();
        assert_eq!(result, 42);
        assert_eq!(cx.sends.get(), 1);
    }

    #[test]
    fn invoke_value_skips_marshalling_when_current() {
        let result = invoke_value(&CallerContext, || "here".to_string()).unwrap();
        assert_eq!(result, "here");
    }

    #[test]
    fn invoke_surfaces_dispatch_failure() {
        let err = invoke(&DeadContext, || {}).unwrap_err();
        assert_eq!(err, DispatchError::Shutdown);
    }

    #[test]
    fn invoke_value_detects_dropped_task() {
        let err = invoke_value(&LossyContext, || 1).unwrap_err();
        assert!(matches!(err, DispatchError::Failed(_)));
    }

    #[test]
    fn try_invoke_reports_success() {
        let count = Cell::new(0);
        assert!(try_invoke(&CallerContext, || count.set(count.get() + 1)));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn try_invoke_swallows_dispatch_failure() {
        assert!(!try_invoke(&DeadContext, || {}));
    }

    #[test]
    fn try_invoke_value_swallows_panic() {
        let result: Option<u32> = try_invoke_value(&CallerContext, || panic!("factory failed"));
        assert!(result.is_none());
        // Failure is not sticky: a later well-behaved closure succeeds.
        assert_eq!(try_invoke_value(&CallerContext, || 5), Some(5));
    }

    #[test]
    fn try_invoke_value_swallows_marshalled_panic() {
        let cx = RemoteContext::new();
        let result: Option<u32> = try_invoke_value(&cx, || panic!("remote factory failed"));
        assert!(result.is_none());
    }
}
