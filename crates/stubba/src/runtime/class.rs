//! Classes and modules.

use super::method::{Block, Method, MethodTable, MethodTableRef, Visibility};
use super::object::{Object, ObjectRef};
use super::receiver::Receiver;
use crate::any_instance::AnyInstance;
use crate::mock::Mock;
use crate::unwind::CallResult;
use crate::value::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a class or module
pub type ClassRef = Rc<Class>;

/// Whether a [`Class`] can be instantiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Instantiable class with an optional superclass
    Class,
    /// Namespace of module-level functions
    Module,
}

/// A class or module: instance methods, class-level (singleton) methods and
/// the mocks that impersonate it while stubbed.
pub struct Class {
    id: u64,
    name: String,
    kind: ClassKind,
    superclass: Option<ClassRef>,
    instance_methods: MethodTableRef,
    singleton_methods: MethodTableRef,
    mock: RefCell<Option<Mock>>,
    any_instance_mock: RefCell<Option<Mock>>,
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("superclass", &self.superclass.as_ref().map(|c| c.name.clone()))
            .field("instance_methods", &self.instance_methods.borrow().len())
            .field("singleton_methods", &self.singleton_methods.borrow().len())
            .finish()
    }
}

impl Class {
    fn build(name: &str, kind: ClassKind, superclass: Option<ClassRef>) -> ClassRef {
        Rc::new(Self {
            id: super::next_id(),
            name: name.to_string(),
            kind,
            superclass,
            instance_methods: MethodTable::shared(name),
            singleton_methods: MethodTable::shared(format!("#<Class:{name}>")),
            mock: RefCell::new(None),
            any_instance_mock: RefCell::new(None),
        })
    }

    /// Create a root class
    #[must_use]
    pub fn new(name: &str) -> ClassRef {
        Self::build(name, ClassKind::Class, None)
    }

    /// Create a class inheriting from `superclass`
    #[must_use]
    pub fn subclass(name: &str, superclass: &ClassRef) -> ClassRef {
        Self::build(name, ClassKind::Class, Some(Rc::clone(superclass)))
    }

    /// Create a module
    #[must_use]
    pub fn module(name: &str) -> ClassRef {
        Self::build(name, ClassKind::Module, None)
    }

    /// Unique identity
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Class name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class or module
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// Check for a module
    #[must_use]
    pub fn is_module(&self) -> bool {
        self.kind == ClassKind::Module
    }

    /// Direct superclass
    #[must_use]
    pub fn superclass(&self) -> Option<&ClassRef> {
        self.superclass.as_ref()
    }

    /// Table of instance methods defined directly on this class
    #[must_use]
    pub fn instance_methods(&self) -> &MethodTableRef {
        &self.instance_methods
    }

    /// Table of class-level methods defined directly on this class
    #[must_use]
    pub fn singleton_methods(&self) -> &MethodTableRef {
        &self.singleton_methods
    }

    /// Define a public instance method
    pub fn define_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.instance_methods, Method::new(name, body), Visibility::Public);
    }

    /// Define a protected instance method
    pub fn define_protected_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.instance_methods, Method::new(name, body), Visibility::Protected);
    }

    /// Define a private instance method
    pub fn define_private_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.instance_methods, Method::new(name, body), Visibility::Private);
    }

    /// Define a public class-level method (a module function for modules)
    pub fn define_class_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.singleton_methods, Method::new(name, body), Visibility::Public);
    }

    /// Define a private class-level method
    pub fn define_private_class_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.singleton_methods, Method::new(name, body), Visibility::Private);
    }

    /// Create an instance.
    ///
    /// Modules can be instantiated too; their instances only answer singleton
    /// methods.
    #[must_use]
    pub fn instantiate(self: &Rc<Self>) -> ObjectRef {
        Object::new(self)
    }

    /// This class followed by its superclasses
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |c| c.superclass.as_deref())
    }

    /// Find an instance method on this class or an ancestor
    #[must_use]
    pub fn find_instance_method(&self, name: &str) -> Option<Method> {
        self.ancestors()
            .find_map(|c| c.instance_methods.borrow().get(name).cloned())
    }

    /// Find a class-level method; modules do not inherit them
    #[must_use]
    pub fn find_class_method(&self, name: &str) -> Option<Method> {
        if self.is_module() {
            return self.singleton_methods.borrow().get(name).cloned();
        }
        self.ancestors()
            .find_map(|c| c.singleton_methods.borrow().get(name).cloned())
    }

    /// Whether instances respond to `name`, including inherited methods.
    ///
    /// With `include_public` false only protected and private methods count.
    #[must_use]
    pub fn instance_method_exists(&self, name: &str, include_public: bool) -> bool {
        self.find_instance_method(name)
            .is_some_and(|m| include_public || !m.visibility().is_public())
    }

    /// Whether the class responds to the class-level method `name`
    #[must_use]
    pub fn class_method_exists(&self, name: &str, include_public: bool) -> bool {
        self.find_class_method(name)
            .is_some_and(|m| include_public || !m.visibility().is_public())
    }

    /// Proxy for stubbing every instance of this class
    #[must_use]
    pub fn any_instance(self: &Rc<Self>) -> AnyInstance {
        AnyInstance::new(self)
    }

    /// Mock impersonating this class, created on first use
    #[must_use]
    pub fn mocha(&self) -> Mock {
        memoized(&self.mock, || Mock::new(&self.name))
    }

    /// Mock impersonating this class, if one exists
    #[must_use]
    pub fn cached_mocha(&self) -> Option<Mock> {
        self.mock.borrow().clone()
    }

    /// Forget the impersonating mock
    pub fn reset_mocha(&self) {
        self.mock.borrow_mut().take();
    }

    /// Mock shared by every instance while stubbed through [`AnyInstance`]
    #[must_use]
    pub fn any_instance_mocha(&self) -> Mock {
        memoized(&self.any_instance_mock, || {
            Mock::new(&format!("#<AnyInstance:{}>", self.name))
        })
    }

    /// Shared any-instance mock, if one exists
    #[must_use]
    pub fn cached_any_instance_mocha(&self) -> Option<Mock> {
        self.any_instance_mock.borrow().clone()
    }

    /// Forget the shared any-instance mock
    pub fn reset_any_instance_mocha(&self) {
        self.any_instance_mock.borrow_mut().take();
    }

    /// Call a public class-level method
    pub fn call(self: &Rc<Self>, name: &str, args: &[Value]) -> CallResult {
        Receiver::Class(Rc::clone(self)).call(name, args)
    }

    /// Call a class-level method regardless of its visibility
    pub fn send(self: &Rc<Self>, name: &str, args: &[Value]) -> CallResult {
        Receiver::Class(Rc::clone(self)).send(name, args)
    }
}

pub(super) fn define_in(table: &MethodTableRef, method: Method, visibility: Visibility) {
    let name = method.name().to_string();
    let mut table = table.borrow_mut();
    table.define(method);
    if !visibility.is_public() {
        let _ = table.set_visibility(&name, visibility);
    }
}

pub(super) fn memoized(slot: &RefCell<Option<Mock>>, create: impl FnOnce() -> Mock) -> Mock {
    slot.borrow_mut().get_or_insert_with(create).clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_methods_are_inherited() {
        let base = Class::new("Base");
        base.define_method("greet", |_, _, _| Ok(Value::from("hello")));
        let derived = Class::subclass("Derived", &base);

        assert!(derived.find_instance_method("greet").is_some());
        assert!(derived.instance_methods().borrow().is_empty());
        assert_eq!(derived.ancestors().count(), 2);
    }

    #[test]
    fn test_class_methods_are_inherited_but_module_functions_are_not() {
        let base = Class::new("Base");
        base.define_class_method("build", |_, _, _| Ok(Value::Nil));
        let derived = Class::subclass("Derived", &base);
        assert!(derived.find_class_method("build").is_some());

        let module = Class::module("Helpers");
        module.define_class_method("slugify", |_, _, _| Ok(Value::Nil));
        assert!(module.is_module());
        assert!(module.find_class_method("slugify").is_some());
        assert!(module.find_class_method("build").is_none());
    }

    #[test]
    fn test_method_exists_respects_include_public() {
        let class = Class::new("Account");
        class.define_method("balance", |_, _, _| Ok(Value::from(0)));
        class.define_private_method("ledger", |_, _, _| Ok(Value::Nil));

        assert!(class.instance_method_exists("balance", true));
        assert!(!class.instance_method_exists("balance", false));
        assert!(class.instance_method_exists("ledger", true));
        assert!(class.instance_method_exists("ledger", false));
        assert!(!class.instance_method_exists("missing", true));
    }

    #[test]
    fn test_private_definition_sets_visibility() {
        let class = Class::new("Account");
        class.define_protected_method("peer", |_, _, _| Ok(Value::Nil));
        assert_eq!(
            class.instance_methods().borrow().visibility_of("peer"),
            Some(Visibility::Protected)
        );
    }

    #[test]
    fn test_mocks_are_memoized_until_reset() {
        let class = Class::new("Product");
        let first = class.mocha();
        assert!(first.same_as(&class.mocha()));
        class.reset_mocha();
        assert!(class.cached_mocha().is_none());
        assert!(!first.same_as(&class.mocha()));

        let shared = class.any_instance_mocha();
        assert_eq!(shared.name(), "#<AnyInstance:Product>");
        class.reset_any_instance_mocha();
        assert!(class.cached_any_instance_mocha().is_none());
    }
}
