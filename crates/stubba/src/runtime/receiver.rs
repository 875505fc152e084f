//! Call dispatch through the object model.

use super::class::ClassRef;
use super::method::{Block, Method};
use super::object::ObjectRef;
use crate::result::StubbaError;
use crate::unwind::CallResult;
use crate::value::Value;
use std::rc::Rc;

/// Anything methods can be called on
#[derive(Debug, Clone)]
pub enum Receiver {
    /// An object: singleton methods, then its class chain
    Object(ObjectRef),
    /// A class or module: its class-level methods
    Class(ClassRef),
}

impl PartialEq for Receiver {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Receiver {
    /// Diagnostic representation
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Self::Object(obj) => obj.inspect(),
            Self::Class(class) => class.name().to_string(),
        }
    }

    /// The object, if this receiver is one
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(obj) => Some(obj),
            Self::Class(_) => None,
        }
    }

    /// Find the method a call to `name` would run
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Method> {
        match self {
            Self::Object(obj) => obj.find_method(name),
            Self::Class(class) => class.find_class_method(name),
        }
    }

    /// Call a public method
    pub fn call(&self, name: &str, args: &[Value]) -> CallResult {
        self.dispatch(name, args, None, true)
    }

    /// Call a method regardless of its visibility
    pub fn send(&self, name: &str, args: &[Value]) -> CallResult {
        self.dispatch(name, args, None, false)
    }

    /// Look up and run `name`.
    ///
    /// The method is cloned out of its table before it runs, so the body is
    /// free to stub or unstub methods on the same receiver.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[Value],
        block: Option<&Block>,
        check_visibility: bool,
    ) -> CallResult {
        let method = self
            .find_method(name)
            .ok_or_else(|| StubbaError::no_method(self.inspect(), name))?;

        if check_visibility && !method.visibility().is_public() {
            return Err(StubbaError::NonPublicMethod {
                visibility: method.visibility().to_string(),
                receiver: self.inspect(),
                method: name.to_string(),
            }
            .into());
        }

        method.invoke(self, args, block)
    }
}

impl From<ObjectRef> for Receiver {
    fn from(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }
}

impl From<ClassRef> for Receiver {
    fn from(class: ClassRef) -> Self {
        Self::Class(class)
    }
}
