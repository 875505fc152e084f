//! Parameter Matchers
//!
//! An expectation decides whether a call is meant for it by running its
//! matchers over the call's arguments. Each matcher takes what it needs from
//! the front of the remaining arguments; the list only matches when every
//! matcher succeeds and nothing is left over.
//!
//! Matching never fails loudly: a missing argument, or an argument that does
//! not support the query (e.g. inclusion on a number), is simply no match.

use crate::value::Value;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Predicate over a single argument
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// Matches one parameter (or, for `AnyParameters`, all remaining ones)
#[derive(Clone)]
pub enum ParameterMatcher {
    /// Any single parameter
    Anything,
    /// All remaining parameters, including none
    AnyParameters,
    /// A parameter equal to the value
    Equals(Value),
    /// A list with an element matching the inner matcher, or a string
    /// containing the inner string
    Includes(Box<ParameterMatcher>),
    /// A parameter accepted by the predicate
    Satisfies(String, Predicate),
}

impl fmt::Debug for ParameterMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl fmt::Display for ParameterMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<Value> for ParameterMatcher {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

impl From<&str> for ParameterMatcher {
    fn from(s: &str) -> Self {
        Self::Equals(Value::from(s))
    }
}

impl From<i64> for ParameterMatcher {
    fn from(n: i64) -> Self {
        Self::Equals(Value::from(n))
    }
}

impl From<i32> for ParameterMatcher {
    fn from(n: i32) -> Self {
        Self::Equals(Value::from(n))
    }
}

impl From<bool> for ParameterMatcher {
    fn from(b: bool) -> Self {
        Self::Equals(Value::from(b))
    }
}

impl ParameterMatcher {
    /// Consume parameters from the front of `available` and report a match
    pub fn matches(&self, available: &mut VecDeque<Value>) -> bool {
        if let Self::AnyParameters = self {
            available.clear();
            return true;
        }
        match available.pop_front() {
            Some(parameter) => self.matches_value(&parameter),
            None => false,
        }
    }

    /// Match a single value
    #[must_use]
    pub fn matches_value(&self, parameter: &Value) -> bool {
        match self {
            Self::Anything | Self::AnyParameters => true,
            Self::Equals(expected) => parameter == expected,
            Self::Includes(item) => parameter.supports_inclusion() && item.is_included_in(parameter),
            Self::Satisfies(_, predicate) => predicate(parameter),
        }
    }

    fn is_included_in(&self, parameter: &Value) -> bool {
        match parameter {
            Value::List(items) => items.iter().any(|element| self.matches_value(element)),
            Value::Str(haystack) => match self {
                Self::Equals(Value::Str(needle)) => haystack.contains(needle.as_str()),
                _ => false,
            },
            _ => false,
        }
    }

    /// Human-readable form, e.g. `includes(:x)`
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Anything => "anything".to_string(),
            Self::AnyParameters => "any_parameters".to_string(),
            Self::Equals(value) => value.to_string(),
            Self::Includes(item) => format!("includes({})", item.describe()),
            Self::Satisfies(description, _) => description.clone(),
        }
    }
}

/// Matches any single parameter
#[must_use]
pub fn anything() -> ParameterMatcher {
    ParameterMatcher::Anything
}

/// Matches all remaining parameters
#[must_use]
pub fn any_parameters() -> ParameterMatcher {
    ParameterMatcher::AnyParameters
}

/// Matches a parameter equal to `value`
#[must_use]
pub fn equals(value: impl Into<Value>) -> ParameterMatcher {
    ParameterMatcher::Equals(value.into())
}

/// Matches a parameter that includes `item`; `item` may itself be a matcher
#[must_use]
pub fn includes(item: impl Into<ParameterMatcher>) -> ParameterMatcher {
    ParameterMatcher::Includes(Box::new(item.into()))
}

/// Matches a parameter accepted by `predicate`
pub fn satisfies<F>(description: &str, predicate: F) -> ParameterMatcher
where
    F: Fn(&Value) -> bool + 'static,
{
    ParameterMatcher::Satisfies(description.to_string(), Rc::new(predicate))
}

/// Matcher for a whole argument list
#[derive(Debug, Clone, Default)]
pub enum ArgumentsMatcher {
    /// Any arguments at all
    #[default]
    Any,
    /// Exactly these parameters, in order
    Exactly(Vec<ParameterMatcher>),
}

impl ArgumentsMatcher {
    /// Build from a list of matchers
    pub fn exactly<I, M>(matchers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<ParameterMatcher>,
    {
        Self::Exactly(matchers.into_iter().map(Into::into).collect())
    }

    /// Whether `args` match
    #[must_use]
    pub fn matches(&self, args: &[Value]) -> bool {
        match self {
            Self::Any => true,
            Self::Exactly(matchers) => {
                let mut available: VecDeque<Value> = args.iter().cloned().collect();
                matchers.iter().all(|m| m.matches(&mut available)) && available.is_empty()
            }
        }
    }

    /// Human-readable form, e.g. `(1, anything)`
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Any => "(any_parameters)".to_string(),
            Self::Exactly(matchers) => {
                let parts: Vec<String> = matchers.iter().map(ParameterMatcher::describe).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Class;

    fn xyz() -> Value {
        Value::list([Value::sym("x"), Value::sym("y"), Value::sym("z")])
    }

    fn args(values: Vec<Value>) -> VecDeque<Value> {
        values.into_iter().collect()
    }

    #[test]
    fn test_should_match_object_including_value() {
        let matcher = includes(Value::sym("x"));
        assert!(matcher.matches(&mut args(vec![xyz()])));
    }

    #[test]
    fn test_should_not_match_object_that_does_not_include_value() {
        let matcher = includes(Value::sym("not_included"));
        assert!(!matcher.matches(&mut args(vec![xyz()])));
    }

    #[test]
    fn test_should_describe_matcher() {
        assert_eq!(includes(Value::sym("x")).describe(), "includes(:x)");
    }

    #[test]
    fn test_should_not_match_on_empty_arguments() {
        let matcher = includes(Value::sym("x"));
        assert!(!matcher.matches(&mut VecDeque::new()));
    }

    #[test]
    fn test_should_not_match_argument_without_inclusion() {
        let matcher = includes(Value::sym("x"));
        assert!(!matcher.matches(&mut args(vec![Value::sym("x")])));
    }

    #[test]
    fn test_should_match_on_object_matching_embedded_matcher() {
        let matcher = includes(includes(Value::sym("x")));
        let collection = Value::List(vec![
            Value::list([Value::sym("a"), Value::sym("b"), Value::sym("c")]),
            xyz(),
        ]);
        assert!(matcher.matches(&mut args(vec![collection])));
    }

    #[test]
    fn test_should_not_match_on_object_not_matching_embedded_matcher() {
        let matcher = includes(includes(Value::sym("x")));
        let collection = Value::List(vec![
            Value::list([Value::sym("a"), Value::sym("b"), Value::sym("c")]),
            Value::list([1, 2, 3]),
        ]);
        assert!(!matcher.matches(&mut args(vec![collection])));
    }

    #[test]
    fn test_should_not_match_plain_object_against_embedded_matcher() {
        let matcher = includes(includes(Value::sym("x")));
        let obj = Value::from(Class::new("Opaque").instantiate());
        assert!(!matcher.matches(&mut args(vec![obj])));
    }

    #[test]
    fn test_should_describe_matcher_with_embedded_matcher() {
        let matcher = includes(includes(Value::sym("x")));
        assert_eq!(matcher.describe(), "includes(includes(:x))");
    }

    #[test]
    fn test_includes_substring() {
        let matcher = includes("ell");
        assert!(matcher.matches_value(&Value::from("hello")));
        assert!(!matcher.matches_value(&Value::from("world")));
    }

    #[test]
    fn test_exact_arguments_reject_leftovers() {
        let matcher = ArgumentsMatcher::exactly([1, 2]);
        assert!(matcher.matches(&[Value::from(1), Value::from(2)]));
        assert!(!matcher.matches(&[Value::from(1)]));
        assert!(!matcher.matches(&[Value::from(1), Value::from(2), Value::from(3)]));
        assert_eq!(matcher.describe(), "(1, 2)");
    }

    #[test]
    fn test_any_parameters_swallows_the_rest() {
        let matcher = ArgumentsMatcher::Exactly(vec![equals(1), any_parameters()]);
        assert!(matcher.matches(&[Value::from(1)]));
        assert!(matcher.matches(&[Value::from(1), Value::from("x"), Value::Nil]));
        assert!(!matcher.matches(&[Value::from(2)]));
    }

    #[test]
    fn test_no_parameters() {
        let matcher = ArgumentsMatcher::Exactly(Vec::new());
        assert!(matcher.matches(&[]));
        assert!(!matcher.matches(&[Value::Nil]));
        assert_eq!(matcher.describe(), "()");
    }

    #[test]
    fn test_satisfies_uses_predicate() {
        let positive = satisfies("positive", |v| v.as_int().is_some_and(|n| n > 0));
        assert!(positive.matches_value(&Value::from(3)));
        assert!(!positive.matches_value(&Value::from(-3)));
        assert!(!positive.matches_value(&Value::from("3")));
        assert_eq!(positive.describe(), "positive");
    }

    #[test]
    fn test_anything_needs_one_parameter() {
        let matcher = ArgumentsMatcher::Exactly(vec![anything()]);
        assert!(matcher.matches(&[Value::Nil]));
        assert!(!matcher.matches(&[]));
        assert_eq!(ArgumentsMatcher::Any.describe(), "(any_parameters)");
    }
}
