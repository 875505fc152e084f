//! Return Strategies
//!
//! What a matched call evaluates to: a fixed value, a value computed from the
//! call's arguments, a throw to a catch-point, or a raised error. Each
//! `returns*` call on an expectation appends one strategy to its
//! [`ReturnValues`]; successive invocations walk the sequence and the last
//! strategy keeps answering once the others are used up.

use crate::result::{StubbaError, StubbaResult};
use crate::unwind::{CallResult, Thrown, Unwind};
use crate::value::Value;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Computes a return value from call arguments
pub type Callback = Rc<dyn Fn(&[Value]) -> Value>;

/// Behaviour evaluated when an expectation matches a call
#[derive(Clone)]
pub enum ReturnStrategy {
    /// Always the same value, whatever the arguments
    Static(Value),
    /// The callback applied to the arguments
    Callback(Callback),
    /// Unwind to the catch-point named `tag`
    Throw {
        /// Catch-point name
        tag: String,
        /// Value delivered to the catch-point
        payload: Option<Value>,
    },
    /// Fail the call with [`StubbaError::Raised`]
    Raise(String),
}

impl fmt::Debug for ReturnStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Throw { tag, payload } => f
                .debug_struct("Throw")
                .field("tag", tag)
                .field("payload", payload)
                .finish(),
            Self::Raise(message) => f.debug_tuple("Raise").field(message).finish(),
        }
    }
}

impl ReturnStrategy {
    /// Return `value`
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Static(value.into())
    }

    /// Return the callback's result
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self::Callback(Rc::new(f))
    }

    /// Build from a static value and an optional callback.
    ///
    /// A nil value with a callback is a plain callback strategy; a non-nil
    /// value with a callback is ambiguous and rejected.
    pub fn single(value: impl Into<Value>, callback: Option<Callback>) -> StubbaResult<Self> {
        let value = value.into();
        match callback {
            Some(_) if !value.is_nil() => Err(StubbaError::AmbiguousReturn),
            Some(callback) => Ok(Self::Callback(callback)),
            None => Ok(Self::Static(value)),
        }
    }

    /// Throw `tag` with no payload
    #[must_use]
    pub fn throw(tag: &str) -> Self {
        Self::Throw {
            tag: tag.to_string(),
            payload: None,
        }
    }

    /// Throw `tag` carrying `payload`
    #[must_use]
    pub fn throw_with(tag: &str, payload: impl Into<Value>) -> Self {
        Self::Throw {
            tag: tag.to_string(),
            payload: Some(payload.into()),
        }
    }

    /// Raise an error with `message`
    #[must_use]
    pub fn raise(message: &str) -> Self {
        Self::Raise(message.to_string())
    }

    /// Evaluate against a call's arguments
    pub fn evaluate(&self, args: &[Value]) -> CallResult {
        match self {
            Self::Static(value) => Ok(value.clone()),
            Self::Callback(f) => Ok(f(args)),
            Self::Throw { tag, payload } => Err(Unwind::Throw(Thrown {
                tag: tag.clone(),
                payload: payload.clone(),
            })),
            Self::Raise(message) => Err(StubbaError::raised(message.as_str()).into()),
        }
    }
}

/// Ordered return strategies of one expectation
#[derive(Debug, Clone, Default)]
pub struct ReturnValues {
    values: VecDeque<ReturnStrategy>,
}

impl ReturnValues {
    /// Create an empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy
    pub fn push(&mut self, strategy: ReturnStrategy) {
        self.values.push_back(strategy);
    }

    /// Number of strategies left
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no strategy is attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Strategy for the next invocation, consuming it unless it is the last
    pub fn next_strategy(&mut self) -> Option<ReturnStrategy> {
        match self.values.len() {
            0 => None,
            1 => self.values.front().cloned(),
            _ => self.values.pop_front(),
        }
    }

    /// Evaluate the next strategy; `Nil` when there is none
    pub fn next(&mut self, args: &[Value]) -> CallResult {
        self.next_strategy()
            .map_or(Ok(Value::Nil), |strategy| strategy.evaluate(args))
    }
}
