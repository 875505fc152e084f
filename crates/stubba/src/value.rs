//! Dynamic values passed to and returned from dispatched calls.

use crate::runtime::{ClassRef, ObjectRef};
use std::fmt;
use std::rc::Rc;

/// A dynamically typed value.
///
/// Objects and classes compare by identity; everything else by value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(String),
    /// Interned-style name
    Symbol(String),
    /// Ordered collection
    List(Vec<Value>),
    /// Object instance
    Object(ObjectRef),
    /// Class or module
    Class(ClassRef),
}

impl Value {
    /// Create a symbol
    #[must_use]
    pub fn sym(name: &str) -> Self {
        Self::Symbol(name.to_string())
    }

    /// Create a list
    #[must_use]
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Check for `Nil`
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Whether the value supports inclusion testing
    #[must_use]
    pub const fn supports_inclusion(&self) -> bool {
        matches!(self, Self::List(_) | Self::Str(_))
    }

    /// Borrow as a list
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as a string slice
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as a boolean
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow as an object
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) | (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Symbol(name) => write!(f, ":{name}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Object(obj) => write!(f, "{}", obj.inspect()),
            Self::Class(class) => write!(f, "{}", class.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl From<ClassRef> for Value {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Nil
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Class;

    #[test]
    fn test_display_inspects_values() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::sym("x").to_string(), ":x");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::list([1, 2, 3]).to_string(), "[1, 2, 3]");
        assert_eq!(
            Value::list([Value::sym("a"), Value::from(1.5)]).to_string(),
            "[:a, 1.5]"
        );
    }

    #[test]
    fn test_symbol_and_string_are_distinct() {
        assert_ne!(Value::sym("x"), Value::from("x"));
    }

    #[test]
    fn test_objects_compare_by_identity() {
        let class = Class::new("Widget");
        let a = class.instantiate();
        let b = class.instantiate();
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::from(b), Value::from(class.instantiate()));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Nil);
        assert_eq!(Value::from(Some(3)), Value::Int(3));
    }

    #[test]
    fn test_supports_inclusion() {
        assert!(Value::list([1]).supports_inclusion());
        assert!(Value::from("abc").supports_inclusion());
        assert!(!Value::sym("x").supports_inclusion());
        assert!(!Value::Nil.supports_inclusion());
    }
}
