//! Expectations
//!
//! An [`Expectation`] records how one method is expected to be called (name,
//! argument matcher, cardinality) and what the call does (its return
//! strategies and an optional yield). Handles are cheap clones of shared
//! state, so the expectation returned from `expects`/`stubs` can be refined
//! after the fact and still be the one the mock resolves calls against.
//!
//! ## Example
//!
//! ```ignore
//! product.expects(&mut mockery, "save")?
//!     .with([Value::from(1)])
//!     .twice()
//!     .returns(true);
//! ```

use crate::cardinality::{self, Cardinality};
use crate::parameter_matchers::{ArgumentsMatcher, ParameterMatcher};
use crate::result::StubbaError;
use crate::return_values::{ReturnStrategy, ReturnValues};
use crate::runtime::Block;
use crate::unwind::CallResult;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug)]
struct ExpectationState {
    mock_name: String,
    method_name: String,
    arguments: ArgumentsMatcher,
    cardinality: Cardinality,
    invocation_count: usize,
    return_values: ReturnValues,
    yield_parameters: Option<Vec<Value>>,
}

/// Shared handle to one expected invocation pattern
#[derive(Clone)]
pub struct Expectation {
    state: Rc<RefCell<ExpectationState>>,
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Expectation")
            .field("method_name", &state.method_name)
            .field("arguments", &state.arguments)
            .field("cardinality", &state.cardinality)
            .field("invocation_count", &state.invocation_count)
            .finish()
    }
}

impl Expectation {
    /// Create an expectation for `method_name` on the mock named `mock_name`
    #[must_use]
    pub fn new(mock_name: &str, method_name: &str, cardinality: Cardinality) -> Self {
        Self {
            state: Rc::new(RefCell::new(ExpectationState {
                mock_name: mock_name.to_string(),
                method_name: method_name.to_string(),
                arguments: ArgumentsMatcher::Any,
                cardinality,
                invocation_count: 0,
                return_values: ReturnValues::new(),
                yield_parameters: None,
            })),
        }
    }

    /// Whether both handles refer to the same expectation
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    fn update(self, f: impl FnOnce(&mut ExpectationState)) -> Self {
        f(&mut self.state.borrow_mut());
        self
    }

    // --- argument matching ---

    /// Only match calls whose arguments match `matchers`, in order
    pub fn with<I, M>(self, matchers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ParameterMatcher>,
    {
        let arguments = ArgumentsMatcher::exactly(matchers);
        self.update(|s| s.arguments = arguments)
    }

    /// Only match calls without arguments
    pub fn with_no_parameters(self) -> Self {
        self.update(|s| s.arguments = ArgumentsMatcher::Exactly(Vec::new()))
    }

    // --- cardinality ---

    /// Expect exactly `n` calls
    pub fn times(self, n: usize) -> Self {
        self.update(|s| s.cardinality = Cardinality::exactly(n))
    }

    /// Expect between `min` and `max` calls
    pub fn times_between(self, min: usize, max: usize) -> Self {
        self.update(|s| s.cardinality = Cardinality::between(min, max))
    }

    /// Expect exactly one call
    pub fn once(self) -> Self {
        self.times(1)
    }

    /// Expect exactly two calls
    pub fn twice(self) -> Self {
        self.times(2)
    }

    /// Expect no calls
    pub fn never(self) -> Self {
        self.update(|s| s.cardinality = Cardinality::never())
    }

    /// Expect `n` or more calls
    pub fn at_least(self, n: usize) -> Self {
        self.update(|s| s.cardinality = Cardinality::at_least(n))
    }

    /// Expect one or more calls
    pub fn at_least_once(self) -> Self {
        self.at_least(1)
    }

    /// Allow at most `n` calls
    pub fn at_most(self, n: usize) -> Self {
        self.update(|s| s.cardinality = Cardinality::at_most(n))
    }

    /// Allow at most one call
    pub fn at_most_once(self) -> Self {
        self.at_most(1)
    }

    // --- behaviour ---

    /// Append a return strategy
    pub fn will(self, strategy: ReturnStrategy) -> Self {
        self.update(|s| s.return_values.push(strategy))
    }

    /// Return `value`; chained calls build a sequence
    pub fn returns(self, value: impl Into<Value>) -> Self {
        self.will(ReturnStrategy::value(value))
    }

    /// Return the callback applied to the call's arguments
    pub fn returns_with<F>(self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.will(ReturnStrategy::callback(f))
    }

    /// Throw to the catch-point `tag`
    pub fn throws(self, tag: &str) -> Self {
        self.will(ReturnStrategy::throw(tag))
    }

    /// Throw to the catch-point `tag` carrying `payload`
    pub fn throws_with(self, tag: &str, payload: impl Into<Value>) -> Self {
        self.will(ReturnStrategy::throw_with(tag, payload))
    }

    /// Fail the call with [`StubbaError::Raised`]
    pub fn raises(self, message: &str) -> Self {
        self.will(ReturnStrategy::raise(message))
    }

    /// Call the block passed with each matched call, with `parameters`
    pub fn yields<I, V>(self, parameters: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let parameters: Vec<Value> = parameters.into_iter().map(Into::into).collect();
        self.update(|s| s.yield_parameters = Some(parameters))
    }

    // --- resolution ---

    /// Whether a call to `method_name` with `args` is meant for this expectation.
    ///
    /// Matchers run with the state released, so a `satisfies` predicate may
    /// refine this expectation.
    #[must_use]
    pub fn matches(&self, method_name: &str, args: &[Value]) -> bool {
        let arguments = {
            let state = self.state.borrow();
            if state.method_name != method_name {
                return false;
            }
            state.arguments.clone()
        };
        arguments.matches(args)
    }

    /// Whether another call still fits the cardinality
    #[must_use]
    pub fn invocations_allowed(&self) -> bool {
        let state = self.state.borrow();
        state.cardinality.invocations_allowed(state.invocation_count)
    }

    /// Count a call, yield if configured, then evaluate the next strategy.
    ///
    /// The state is released before the block or strategy runs, so either
    /// may call back into the same mock.
    pub fn invoke(&self, args: &[Value], block: Option<&Block>) -> CallResult {
        let (strategy, yield_parameters, method_name) = {
            let mut state = self.state.borrow_mut();
            state.invocation_count += 1;
            (
                state.return_values.next_strategy(),
                state.yield_parameters.clone(),
                state.method_name.clone(),
            )
        };

        if let Some(parameters) = yield_parameters {
            let block = block.ok_or(StubbaError::NoBlockGiven {
                method: method_name,
            })?;
            block(parameters.as_slice())?;
        }

        strategy.map_or(Ok(Value::Nil), |strategy| strategy.evaluate(args))
    }

    /// Whether the count is within the cardinality range
    #[must_use]
    pub fn verified(&self) -> bool {
        let state = self.state.borrow();
        state.cardinality.verified(state.invocation_count)
    }

    /// Whether the count has reached the minimum
    #[must_use]
    pub fn satisfied(&self) -> bool {
        let state = self.state.borrow();
        state.cardinality.satisfied(state.invocation_count)
    }

    /// Whether the expectation was invoked at least once
    #[must_use]
    pub fn used(&self) -> bool {
        self.state.borrow().invocation_count > 0
    }

    /// Calls counted so far
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.state.borrow().invocation_count
    }

    /// Expected method name
    #[must_use]
    pub fn method_name(&self) -> String {
        self.state.borrow().method_name.clone()
    }

    /// Current cardinality
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.state.borrow().cardinality
    }

    /// Call signature, e.g. `#<Product:0x1>.save(any_parameters)`
    #[must_use]
    pub fn method_signature(&self) -> String {
        let state = self.state.borrow();
        format!(
            "{}.{}{}",
            state.mock_name,
            state.method_name,
            state.arguments.describe()
        )
    }

    /// Verification line, e.g.
    /// `expected exactly once, invoked never: #<Product:0x1>.save(any_parameters)`
    #[must_use]
    pub fn describe(&self) -> String {
        let (cardinality, count) = {
            let state = self.state.borrow();
            (state.cardinality, state.invocation_count)
        };
        let invoked = if count == 0 {
            "never".to_string()
        } else {
            cardinality::times(count)
        };
        format!("{cardinality}, invoked {invoked}: {}", self.method_signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unwind::{catch, Unwind};

    fn expectation() -> Expectation {
        Expectation::new("#<Product:0x1>", "save", Cardinality::exactly(1))
    }

    #[test]
    fn test_matches_method_name_and_arguments() {
        let e = expectation().with([Value::from(1)]);
        assert!(e.matches("save", &[Value::from(1)]));
        assert!(!e.matches("save", &[Value::from(2)]));
        assert!(!e.matches("load", &[Value::from(1)]));
    }

    #[test]
    fn test_with_no_parameters() {
        let e = expectation().with_no_parameters();
        assert!(e.matches("save", &[]));
        assert!(!e.matches("save", &[Value::Nil]));
    }

    #[test]
    fn test_invoke_counts_and_returns() {
        let e = expectation().returns(true);
        assert!(e.invocations_allowed());
        assert!(!e.verified());

        assert_eq!(e.invoke(&[], None).unwrap(), Value::Bool(true));
        assert_eq!(e.invocation_count(), 1);
        assert!(!e.invocations_allowed());
        assert!(e.verified());
    }

    #[test]
    fn test_no_strategy_returns_nil() {
        let e = expectation();
        assert_eq!(e.invoke(&[Value::from(3)], None).unwrap(), Value::Nil);
    }

    #[test]
    fn test_returns_sequence() {
        let e = expectation().times(3).returns(1).returns(2);
        assert_eq!(e.invoke(&[], None).unwrap(), Value::Int(1));
        assert_eq!(e.invoke(&[], None).unwrap(), Value::Int(2));
        assert_eq!(e.invoke(&[], None).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_returns_with_sees_arguments() {
        let e = expectation().returns_with(|args| Value::from(args.len() as i64));
        assert_eq!(
            e.invoke(&[Value::Nil, Value::Nil], None).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_throws_inside_catch() {
        let e = expectation().throws_with("done", "payload");
        let result = catch("done", || e.invoke(&[], None));
        assert_eq!(result.unwrap(), Value::from("payload"));
        assert_eq!(e.invocation_count(), 1);
    }

    #[test]
    fn test_raises() {
        let e = expectation().raises("boom");
        let err = e.invoke(&[], None).unwrap_err();
        assert!(matches!(err, Unwind::Raise(StubbaError::Raised { .. })));
    }

    #[test]
    fn test_yields_to_block() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let block: Block = Rc::new(move |args: &[Value]| {
            sink.borrow_mut().extend_from_slice(args);
            Ok(Value::Nil)
        });

        let e = expectation().yields([1, 2]);
        e.invoke(&[], Some(&block)).unwrap();
        assert_eq!(*seen.borrow(), vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_yields_without_block_fails() {
        let e = expectation().yields([1]);
        let err = e.invoke(&[], None).unwrap_err();
        assert!(matches!(err, Unwind::Raise(StubbaError::NoBlockGiven { .. })));
    }

    #[test]
    fn test_cardinality_builders() {
        assert_eq!(expectation().twice().cardinality(), Cardinality::exactly(2));
        assert_eq!(expectation().never().cardinality(), Cardinality::never());
        assert_eq!(
            expectation().at_least_once().cardinality(),
            Cardinality::at_least(1)
        );
        assert_eq!(expectation().at_most(3).cardinality(), Cardinality::at_most(3));
        assert_eq!(
            expectation().times_between(1, 2).cardinality(),
            Cardinality::between(1, 2)
        );
    }

    #[test]
    fn test_clones_share_state() {
        let e = expectation();
        let refined = e.clone().returns(5);
        assert!(e.same_as(&refined));
        assert_eq!(e.invoke(&[], None).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_describe() {
        let e = expectation();
        assert_eq!(
            e.describe(),
            "expected exactly once, invoked never: #<Product:0x1>.save(any_parameters)"
        );
        e.invoke(&[], None).unwrap();
        e.invoke(&[], None).unwrap();
        assert_eq!(
            e.describe(),
            "expected exactly once, invoked twice: #<Product:0x1>.save(any_parameters)"
        );
    }
}
