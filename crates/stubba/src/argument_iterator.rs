//! Normalizes `expects`/`stubs` arguments into `(method name, value)` pairs.

use crate::value::Value;

/// What to stub: a single method name, or method names with return values
#[derive(Debug, Clone, PartialEq)]
pub enum StubArguments {
    /// One method, no return value
    Name(String),
    /// Methods and their return values, in order
    Map(Vec<(String, Value)>),
}

impl StubArguments {
    /// Iterate the `(method name, value)` pairs
    #[must_use]
    pub fn iter(&self) -> ArgumentIterator<'_> {
        ArgumentIterator {
            arguments: self,
            position: 0,
        }
    }

    /// Whether nothing would be stubbed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Map(entries) if entries.is_empty())
    }
}

impl From<&str> for StubArguments {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for StubArguments {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<V: Into<Value>> From<Vec<(&str, V)>> for StubArguments {
    fn from(entries: Vec<(&str, V)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.into()))
                .collect(),
        )
    }
}

impl<V: Into<Value>, const N: usize> From<[(&str, V); N]> for StubArguments {
    fn from(entries: [(&str, V); N]) -> Self {
        Self::from(Vec::from(entries))
    }
}

/// Lazy, restartable walk over [`StubArguments`].
///
/// A single name yields one pair with no value; a map yields its entries in
/// insertion order.
#[derive(Debug, Clone)]
pub struct ArgumentIterator<'a> {
    arguments: &'a StubArguments,
    position: usize,
}

impl Iterator for ArgumentIterator<'_> {
    type Item = (String, Option<Value>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.arguments {
            StubArguments::Name(name) if self.position == 0 => Some((name.clone(), None)),
            StubArguments::Name(_) => None,
            StubArguments::Map(entries) => entries
                .get(self.position)
                .map(|(name, value)| (name.clone(), Some(value.clone()))),
        };
        if item.is_some() {
            self.position += 1;
        }
        item
    }
}

impl<'a> IntoIterator for &'a StubArguments {
    type Item = (String, Option<Value>);
    type IntoIter = ArgumentIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
