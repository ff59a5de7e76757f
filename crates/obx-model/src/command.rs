#![forbid(unsafe_code)]

//! Command objects with can-execute and lifecycle notifications.
//!
//! # Design
//!
//! [`RelayCommand`] wraps an action closure and an optional can-execute
//! predicate behind a shared handle. Executing it announces intent first
//! (subscribers may cancel), then runs the action, then announces completion
//! with the outcome. A property store bridges all three event kinds when a
//! command is stored as a property.
//!
//! # Invariants
//!
//! 1. An executing event precedes every action run; a cancelled intent runs
//!    no action and emits no executed event.
//! 2. The executed event carries the same outcome the caller receives.
//! 3. Can-execute-changed is raised only explicitly, via
//!    [`RelayCommand::notify_can_execute_changed`].

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::ModelError;
use crate::event::{EventSource, Subscription};
use crate::value::PropertyValue;

/// Dynamic parameter passed to a command.
pub type CommandParameter = Rc<dyn Any>;

/// The command capability: execute, can-execute, and a can-execute-changed
/// subscribe/unsubscribe pair.
pub trait Command {
    /// Run the command.
    ///
    /// # Errors
    ///
    /// Returns the action's failure, if any.
    fn execute(&self, parameter: Option<CommandParameter>) -> Result<(), ModelError>;

    /// Whether the command can currently run.
    fn can_execute(&self, parameter: Option<&dyn Any>) -> bool;

    /// Subscribe to can-execute-changed notifications.
    fn subscribe_can_execute_changed(&self, callback: Box<dyn Fn()>) -> Subscription;
}

/// Intent signal raised before a command's action runs.
///
/// Any subscriber may [`cancel`](CommandExecuting::cancel) the run.
pub struct CommandExecuting {
    command: RelayCommand,
    parameter: Option<CommandParameter>,
    cancel: Cell<bool>,
}

impl CommandExecuting {
    #[must_use]
    pub fn command(&self) -> &RelayCommand {
        &self.command
    }

    #[must_use]
    pub fn parameter(&self) -> Option<&CommandParameter> {
        self.parameter.as_ref()
    }

    /// Ask the command not to run.
    pub fn cancel(&self) {
        self.cancel.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.get()
    }
}

impl fmt::Debug for CommandExecuting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecuting")
            .field("cancelled", &self.cancel.get())
            .finish_non_exhaustive()
    }
}

/// Completion signal raised after a command's action ran.
pub struct CommandExecuted {
    command: RelayCommand,
    parameter: Option<CommandParameter>,
    outcome: Result<(), ModelError>,
}

impl CommandExecuted {
    #[must_use]
    pub fn command(&self) -> &RelayCommand {
        &self.command
    }

    #[must_use]
    pub fn parameter(&self) -> Option<&CommandParameter> {
        self.parameter.as_ref()
    }

    /// The action's result.
    #[must_use]
    pub fn outcome(&self) -> &Result<(), ModelError> {
        &self.outcome
    }
}

impl fmt::Debug for CommandExecuted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandExecuted")
            .field("outcome", &self.outcome.as_ref().map_err(ModelError::to_string))
            .finish_non_exhaustive()
    }
}

type Action = Box<dyn Fn(Option<&dyn Any>) -> Result<(), ModelError>>;
type Predicate = Box<dyn Fn(Option<&dyn Any>) -> bool>;

struct CommandInner {
    action: Action,
    can_execute: Option<Predicate>,
}

/// A command built from closures, with lifecycle events.
///
/// Cloning shares the same action, predicate, and subscribers; a clone is
/// the same command for identity purposes.
pub struct RelayCommand {
    inner: Rc<CommandInner>,
    can_execute_changed: EventSource<()>,
    executing: EventSource<CommandExecuting>,
    executed: EventSource<CommandExecuted>,
}

impl Clone for RelayCommand {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            can_execute_changed: self.can_execute_changed.clone(),
            executing: self.executing.clone(),
            executed: self.executed.clone(),
        }
    }
}

impl fmt::Debug for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCommand")
            .field("can_execute", &self.can_execute(None))
            .finish_non_exhaustive()
    }
}

impl RelayCommand {
    /// A command that is always executable.
    #[must_use]
    pub fn new(action: impl Fn(Option<&dyn Any>) -> Result<(), ModelError> + 'static) -> Self {
        Self::with_parts(Box::new(action), None)
    }

    /// A command gated by a can-execute predicate.
    #[must_use]
    pub fn with_can_execute(
        action: impl Fn(Option<&dyn Any>) -> Result<(), ModelError> + 'static,
        can_execute: impl Fn(Option<&dyn Any>) -> bool + 'static,
    ) -> Self {
        Self::with_parts(Box::new(action), Some(Box::new(can_execute)))
    }

    fn with_parts(action: Action, can_execute: Option<Predicate>) -> Self {
        Self {
            inner: Rc::new(CommandInner {
                action,
                can_execute,
            }),
            can_execute_changed: EventSource::new(),
            executing: EventSource::new(),
            executed: EventSource::new(),
        }
    }

    /// Run the command: announce intent, honor cancellation, run the action,
    /// announce completion.
    ///
    /// # Errors
    ///
    /// Returns the action's failure. A cancelled run is `Ok` and emits no
    /// completion event.
    pub fn execute(&self, parameter: Option<CommandParameter>) -> Result<(), ModelError> {
        let intent = CommandExecuting {
            command: self.clone(),
            parameter: parameter.clone(),
            cancel: Cell::new(false),
        };
        self.executing.emit(&intent);
        if intent.is_cancelled() {
            trace!("command cancelled before running");
            return Ok(());
        }

        let outcome = (self.inner.action)(parameter.as_deref());
        let completion = CommandExecuted {
            command: self.clone(),
            parameter,
            outcome: outcome.clone(),
        };
        self.executed.emit(&completion);
        outcome
    }

    /// Whether the command can currently run. Absent a predicate, always
    /// true.
    #[must_use]
    pub fn can_execute(&self, parameter: Option<&dyn Any>) -> bool {
        match &self.inner.can_execute {
            Some(predicate) => predicate(parameter),
            None => true,
        }
    }

    /// Raise can-execute-changed. Call after the state feeding the predicate
    /// changes.
    pub fn notify_can_execute_changed(&self) {
        self.can_execute_changed.emit(&());
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_can_execute_changed(&self, f: impl Fn() + 'static) -> Subscription {
        self.can_execute_changed.subscribe(move |()| f())
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_executing(&self, f: impl Fn(&CommandExecuting) + 'static) -> Subscription {
        self.executing.subscribe(f)
    }

    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn on_executed(&self, f: impl Fn(&CommandExecuted) + 'static) -> Subscription {
        self.executed.subscribe(f)
    }

    /// Whether `other` is a handle to the same command.
    #[must_use]
    pub fn same_command(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for RelayCommand {
    /// An inert command: does nothing and reports not executable. This is
    /// the zero value a failed or missing property read falls back to.
    fn default() -> Self {
        Self::with_parts(Box::new(|_| Ok(())), Some(Box::new(|_| false)))
    }
}

impl Command for RelayCommand {
    fn execute(&self, parameter: Option<CommandParameter>) -> Result<(), ModelError> {
        RelayCommand::execute(self, parameter)
    }

    fn can_execute(&self, parameter: Option<&dyn Any>) -> bool {
        RelayCommand::can_execute(self, parameter)
    }

    fn subscribe_can_execute_changed(&self, callback: Box<dyn Fn()>) -> Subscription {
        self.can_execute_changed.subscribe(move |()| callback())
    }
}

impl PropertyValue for RelayCommand {
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
            .is_some_and(|other| self.same_command(other))
    }

    fn as_command(&self) -> Option<&dyn Command> {
        Some(self)
    }

    fn as_relay(&self) -> Option<&RelayCommand> {
        Some(self)
    }
}
