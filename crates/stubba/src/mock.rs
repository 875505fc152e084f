//! Mocks
//!
//! A [`Mock`] owns the expectations set up for one stubbed target (or for
//! every instance of a class, or for a standalone test double) and resolves
//! incoming calls against them.
//!
//! ## Resolution
//!
//! Expectations are searched newest first. The first one whose method name
//! and arguments match and whose cardinality still allows a call is invoked.
//! If every match is exhausted, the newest match is invoked anyway so its
//! count records the overflow, and the call fails as unexpected unless that
//! invocation threw. A call with no match at all fails as unexpected and is
//! remembered for verification.

use crate::cardinality::Cardinality;
use crate::expectation::Expectation;
use crate::result::StubbaError;
use crate::runtime::Block;
use crate::unwind::{CallResult, Unwind};
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MockState {
    name: String,
    expectations: Vec<Expectation>,
    unexpected_invocations: Vec<String>,
}

/// Shared handle to a mock and its expectations
#[derive(Clone)]
pub struct Mock {
    state: Rc<RefCell<MockState>>,
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Mock")
            .field("name", &state.name)
            .field("expectations", &state.expectations.len())
            .field("unexpected_invocations", &state.unexpected_invocations.len())
            .finish()
    }
}

impl Mock {
    /// Create a mock named `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                name: name.to_string(),
                ..MockState::default()
            })),
        }
    }

    /// Name used in diagnostics
    #[must_use]
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Whether both handles refer to the same mock
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Add an expectation that `method` is called exactly once
    pub fn expects(&self, method: &str) -> Expectation {
        self.add_expectation(method, Cardinality::exactly(1))
    }

    /// Add an expectation that `method` may be called any number of times
    pub fn stubs(&self, method: &str) -> Expectation {
        self.add_expectation(method, Cardinality::any_number())
    }

    /// Add an expectation for `method` with `cardinality`
    pub fn add_expectation(&self, method: &str, cardinality: Cardinality) -> Expectation {
        let mut state = self.state.borrow_mut();
        let expectation = Expectation::new(&state.name, method, cardinality);
        state.expectations.push(expectation.clone());
        expectation
    }

    /// Call `method` on this mock directly
    pub fn call(&self, method: &str, args: &[Value]) -> CallResult {
        self.method_missing(method, args, None)
    }

    /// Call `method` on this mock directly, passing a block
    pub fn call_with_block(&self, method: &str, args: &[Value], block: &Block) -> CallResult {
        self.method_missing(method, args, Some(block))
    }

    /// Resolve a call against the expectations. Trampolines forward here.
    pub fn method_missing(&self, method: &str, args: &[Value], block: Option<&Block>) -> CallResult {
        let (allowing, exhausted) = self.resolve(method, args);

        if let Some(expectation) = allowing {
            tracing::trace!(mock = %self.name(), method, "matched expectation");
            return expectation.invoke(args, block);
        }

        // The overflowing call still runs so its count shows up in
        // verification. A throw escapes to its catch-point; any other outcome
        // gives way to the unexpected-invocation failure.
        if let Some(expectation) = exhausted {
            if let Err(Unwind::Throw(thrown)) = expectation.invoke(args, block) {
                return Err(Unwind::Throw(thrown));
            }
        }

        let invocation = self.describe_invocation(method, args);
        tracing::trace!(%invocation, "unexpected invocation");
        self.state
            .borrow_mut()
            .unexpected_invocations
            .push(invocation.clone());
        Err(StubbaError::UnexpectedInvocation { invocation }.into())
    }

    fn resolve(&self, method: &str, args: &[Value]) -> (Option<Expectation>, Option<Expectation>) {
        // matchers may run user predicates that call back into this mock
        let expectations = self.expectations();
        let mut exhausted = None;
        for expectation in expectations.iter().rev() {
            if !expectation.matches(method, args) {
                continue;
            }
            if expectation.invocations_allowed() {
                return (Some(expectation.clone()), None);
            }
            if exhausted.is_none() {
                exhausted = Some(expectation.clone());
            }
        }
        (None, exhausted)
    }

    fn describe_invocation(&self, method: &str, args: &[Value]) -> String {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        format!("{}.{}({})", self.name(), method, args.join(", "))
    }

    /// Whether any expectation exists for `method`
    #[must_use]
    pub fn responds_to(&self, method: &str) -> bool {
        self.state
            .borrow()
            .expectations
            .iter()
            .any(|e| e.method_name() == method)
    }

    /// Snapshot of the expectations, oldest first
    #[must_use]
    pub fn expectations(&self) -> Vec<Expectation> {
        self.state.borrow().expectations.clone()
    }

    /// Whether any expectation is left
    #[must_use]
    pub fn has_expectations(&self) -> bool {
        !self.state.borrow().expectations.is_empty()
    }

    /// Calls that matched no expectation
    #[must_use]
    pub fn unexpected_invocations(&self) -> Vec<String> {
        self.state.borrow().unexpected_invocations.clone()
    }

    /// Drop every expectation for `method`
    pub fn unstub(&self, method: &str) {
        self.state
            .borrow_mut()
            .expectations
            .retain(|e| e.method_name() != method);
    }

    /// Whether every expectation is within its cardinality and no unexpected
    /// call was made
    #[must_use]
    pub fn verified(&self) -> bool {
        self.failures().is_empty()
    }

    /// One line per unmet expectation or unexpected call
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        let state = self.state.borrow();
        let unmet = state
            .expectations
            .iter()
            .filter(|e| !e.verified())
            .map(Expectation::describe);
        let unexpected = state
            .unexpected_invocations
            .iter()
            .map(|invocation| format!("unexpected invocation: {invocation}"));
        unmet.chain(unexpected).collect()
    }
}
