//! Result and error types for Stubba.

use thiserror::Error;

/// Result type for Stubba operations
pub type StubbaResult<T> = Result<T, StubbaError>;

/// Errors that can occur in Stubba
#[derive(Debug, Error)]
pub enum StubbaError {
    /// A static return value and a callback were both supplied
    #[error(
        "You set an expectation with a static return value and provided a callback, making the desired return value ambiguous.\n\
         If you want the return value to be dynamically generated from the arguments, use `returns_with(|args| ...)` on its own"
    )]
    AmbiguousReturn,

    /// No method of that name can be dispatched on the receiver
    #[error("undefined method `{method}' for {receiver}")]
    NoMethod {
        /// Inspected receiver
        receiver: String,
        /// Method name
        method: String,
    },

    /// A protected or private method was called with visibility checks on
    #[error("{visibility} method `{method}' called for {receiver}")]
    NonPublicMethod {
        /// Visibility of the method found
        visibility: String,
        /// Inspected receiver
        receiver: String,
        /// Method name
        method: String,
    },

    /// Method table lookup or removal of a name that is not defined there
    #[error("method `{method}' not defined in {owner}")]
    NameError {
        /// Table owner
        owner: String,
        /// Method name
        method: String,
    },

    /// A call reached a mock that had no expectation allowing it
    #[error("unexpected invocation: {invocation}")]
    UnexpectedInvocation {
        /// Description of the offending call
        invocation: String,
    },

    /// An expectation yields but the call carried no block
    #[error("no block given (yield) for {method}")]
    NoBlockGiven {
        /// Method name
        method: String,
    },

    /// Raised on purpose by an expectation
    #[error("{message}")]
    Raised {
        /// Error message
        message: String,
    },

    /// A throw reached the top of the test without a matching catch
    #[error("uncaught throw :{tag}")]
    UncaughtThrow {
        /// Tag that was thrown
        tag: String,
    },

    /// The configured stubbing policy rejected a stub
    #[error("Stubbing not allowed: {message}")]
    StubbingNotAllowed {
        /// Error message
        message: String,
    },

    /// `expects`/`stubs` was given an empty mapping
    #[error("nothing to stub: no method names were given")]
    NothingToStub,

    /// A method table was borrowed while a stub tried to modify it
    #[error("method table for `{method}' is in use")]
    MethodTableBusy {
        /// Method being modified
        method: String,
    },

    /// Verification found unmet or violated expectations
    #[error("not all expectations were satisfied\n{}", .failures.join("\n"))]
    ExpectationsNotSatisfied {
        /// One line per failure
        failures: Vec<String>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl StubbaError {
    /// Create a no-method error
    #[must_use]
    pub fn no_method(receiver: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NoMethod {
            receiver: receiver.into(),
            method: method.into(),
        }
    }

    /// Create a name error
    #[must_use]
    pub fn name_error(owner: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NameError {
            owner: owner.into(),
            method: method.into(),
        }
    }

    /// Create a raised error
    #[must_use]
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised {
            message: message.into(),
        }
    }
}
