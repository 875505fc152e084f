//! Non-local unwinding for stubbed calls.
//!
//! A call through the object model either produces a [`Value`] or unwinds.
//! Unwinding is an ordinary `Err` that callers propagate with `?` until a
//! [`catch`] with a matching tag turns it back into a value. A throw that is
//! never caught is fatal for the test: convert it with [`Unwind::into_error`]
//! and fail.

use crate::result::StubbaError;
use crate::value::Value;
use thiserror::Error;

/// Outcome of dispatching a call
pub type CallResult = Result<Value, Unwind>;

/// A pending throw travelling towards its catch-point
#[derive(Debug, Clone, PartialEq)]
pub struct Thrown {
    /// Tag naming the catch-point
    pub tag: String,
    /// Value handed to the catch-point, if any
    pub payload: Option<Value>,
}

impl Thrown {
    /// Create a throw without a payload
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            payload: None,
        }
    }

    /// Attach a payload
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Reason a call did not return normally
#[derive(Debug, Error)]
pub enum Unwind {
    /// Non-local jump to a catch-point
    #[error("uncaught throw :{}", .0.tag)]
    Throw(Thrown),

    /// Error raised by the call
    #[error(transparent)]
    Raise(#[from] StubbaError),
}

impl Unwind {
    /// Convert into a plain error once no catch-point is left
    #[must_use]
    pub fn into_error(self) -> StubbaError {
        match self {
            Self::Throw(thrown) => StubbaError::UncaughtThrow { tag: thrown.tag },
            Self::Raise(err) => err,
        }
    }

    /// The thrown tag, if this is a throw
    #[must_use]
    pub fn thrown_tag(&self) -> Option<&str> {
        match self {
            Self::Throw(thrown) => Some(&thrown.tag),
            Self::Raise(_) => None,
        }
    }
}

/// Run `body` as a catch-point named `tag`.
///
/// A throw carrying `tag` ends the body and becomes its value (`Nil` when the
/// throw had no payload). Other throws and raised errors pass through.
pub fn catch<F>(tag: &str, body: F) -> CallResult
where
    F: FnOnce() -> CallResult,
{
    match body() {
        Err(Unwind::Throw(thrown)) if thrown.tag == tag => {
            Ok(thrown.payload.unwrap_or(Value::Nil))
        }
        other => other,
    }
}
