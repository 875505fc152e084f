//! Methods, visibility and per-owner method tables.

use super::receiver::Receiver;
use crate::result::{StubbaError, StubbaResult};
use crate::unwind::CallResult;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Block (continuation) passed alongside a call
pub type Block = Rc<dyn Fn(&[Value]) -> CallResult>;

/// Shared method implementation
pub type MethodBody = Rc<dyn Fn(&Receiver, &[Value], Option<&Block>) -> CallResult>;

/// Shared, mutable method table
pub type MethodTableRef = Rc<RefCell<MethodTable>>;

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Callable from anywhere
    #[default]
    Public,
    /// Callable from within the class hierarchy
    Protected,
    /// Callable only on the implicit receiver
    Private,
}

impl Visibility {
    /// Name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }

    /// Check for public visibility
    #[must_use]
    pub const fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named method body with its visibility
#[derive(Clone)]
pub struct Method {
    name: String,
    body: MethodBody,
    visibility: Visibility,
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .finish()
    }
}

impl Method {
    /// Create a public method
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        Self::from_body(name, Rc::new(body))
    }

    /// Create a public method from an existing shared body
    #[must_use]
    pub fn from_body(name: &str, body: MethodBody) -> Self {
        Self {
            name: name.to_string(),
            body,
            visibility: Visibility::Public,
        }
    }

    /// Method name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Method visibility
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Copy of this method with another visibility
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether two handles share the same body
    #[must_use]
    pub fn same_body(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.body, &other.body)
    }

    /// Run the body
    pub fn invoke(&self, receiver: &Receiver, args: &[Value], block: Option<&Block>) -> CallResult {
        (self.body)(receiver, args, block)
    }
}

/// Methods defined directly on one owner (a class, module or single object)
#[derive(Debug, Default)]
pub struct MethodTable {
    owner: String,
    entries: HashMap<String, Method>,
}

impl MethodTable {
    /// Create an empty table labelled with its owner
    #[must_use]
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: HashMap::new(),
        }
    }

    /// Create a shared empty table
    #[must_use]
    pub fn shared(owner: impl Into<String>) -> MethodTableRef {
        Rc::new(RefCell::new(Self::new(owner)))
    }

    /// Owner label used in diagnostics
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Install a method under its own name. Installation is always public.
    pub fn define(&mut self, method: Method) {
        let method = method.with_visibility(Visibility::Public);
        self.entries.insert(method.name.clone(), method);
    }

    /// Change the visibility of a defined method
    pub fn set_visibility(&mut self, name: &str, visibility: Visibility) -> StubbaResult<()> {
        let method = self
            .entries
            .get_mut(name)
            .ok_or_else(|| StubbaError::name_error(&self.owner, name))?;
        method.visibility = visibility;
        Ok(())
    }

    /// Remove a method, failing when it is not defined here
    pub fn remove(&mut self, name: &str) -> StubbaResult<Method> {
        self.entries
            .remove(name)
            .ok_or_else(|| StubbaError::name_error(&self.owner, name))
    }

    /// Fetch a method defined here, failing when it is absent
    pub fn instance_method(&self, name: &str) -> StubbaResult<Method> {
        self.get(name)
            .cloned()
            .ok_or_else(|| StubbaError::name_error(&self.owner, name))
    }

    /// Fetch a method defined here
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Method> {
        self.entries.get(name)
    }

    /// Whether `name` is defined here with any visibility
    #[must_use]
    pub fn method_defined(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Visibility of a method defined here
    #[must_use]
    pub fn visibility_of(&self, name: &str) -> Option<Visibility> {
        self.entries.get(name).map(Method::visibility)
    }

    /// Names of public methods, sorted
    #[must_use]
    pub fn public_methods(&self) -> Vec<String> {
        self.names_with(Visibility::Public)
    }

    /// Names of protected methods, sorted
    #[must_use]
    pub fn protected_methods(&self) -> Vec<String> {
        self.names_with(Visibility::Protected)
    }

    /// Names of private methods, sorted
    #[must_use]
    pub fn private_methods(&self) -> Vec<String> {
        self.names_with(Visibility::Private)
    }

    /// Number of methods defined here
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no methods are defined here
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn names_with(&self, visibility: Visibility) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .values()
            .filter(|m| m.visibility == visibility)
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    }
}
