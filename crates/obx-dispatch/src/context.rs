#![forbid(unsafe_code)]

//! The dispatch-context boundary.
//!
//! # Design
//!
//! A context decides where a callback runs. The model layer needs exactly two
//! capabilities from it: an "already there" fast-path query and a blocking
//! send. Implementations that marshal across threads must bring their own
//! synchronization; the model layer itself is single-threaded, so tasks are
//! not required to be `Send`.

use std::fmt;

/// An execution context capable of running a callback in the right place.
pub trait DispatchContext {
    /// Whether the calling code is already associated with this context.
    fn is_current(&self) -> bool;

    /// Run `task` on the context, blocking until it has completed.
    ///
    /// # Errors
    ///
    /// Returns an error when the context cannot accept or complete the task.
    fn send(&self, task: &mut dyn FnMut()) -> Result<(), DispatchError>;
}

/// Error returned when a context cannot run a marshalled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The context is no longer accepting work.
    Shutdown,
    /// The task was accepted but did not complete.
    Failed(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "dispatch context is shut down"),
            Self::Failed(reason) => write!(f, "marshalled task failed: {}", reason),
        }
    }
}

impl std::error::Error for DispatchError {}

/// The trivial context: the caller is always "on" it, so every task runs
/// immediately in place.
///
/// This is the default context for stores that never leave one thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerContext;

impl DispatchContext for CallerContext {
    fn is_current(&self) -> bool {
        true
    }

    fn send(&self, task: &mut dyn FnMut()) -> Result<(), DispatchError> {
        task();
        Ok(())
    }
}
