#![forbid(unsafe_code)]

//! Shareable error values stored in a model.

use std::error::Error;
use std::fmt;
use std::rc::Rc;

/// A cloneable, shareable error value.
///
/// Models store a `ModelError` as ordinary property state (the `LastError`
/// property) and commands carry one in their outcome. Equality is identity:
/// two handles compare equal only when they share the same underlying error,
/// so re-recording the same error instance is a silent write while recording
/// a fresh error always notifies.
#[derive(Clone)]
pub struct ModelError {
    inner: Rc<dyn Error>,
}

impl ModelError {
    /// Wrap an existing error.
    pub fn new(err: impl Error + 'static) -> Self {
        Self {
            inner: Rc::new(err),
        }
    }

    /// Build an error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelError").field(&self.inner).finish()
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.inner)
    }
}

impl PartialEq for ModelError {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ModelError {}

#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for MessageError {}
