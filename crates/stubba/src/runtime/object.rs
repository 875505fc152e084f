//! Object instances.

use super::class::{define_in, memoized, ClassRef};
use super::method::{Block, Method, MethodTable, MethodTableRef, Visibility};
use super::receiver::Receiver;
use crate::mock::Mock;
use crate::unwind::CallResult;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an object
pub type ObjectRef = Rc<Object>;

/// An instance of a [`Class`](super::Class).
///
/// Besides its class's methods an object may carry singleton methods of its
/// own; stubbing a single object installs its trampoline there.
pub struct Object {
    id: u64,
    class: ClassRef,
    singleton_methods: MethodTableRef,
    ivars: RefCell<HashMap<String, Value>>,
    mock: RefCell<Option<Mock>>,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .field("singleton_methods", &self.singleton_methods.borrow().len())
            .field("ivars", &self.ivars.borrow().len())
            .finish()
    }
}

impl Object {
    pub(super) fn new(class: &ClassRef) -> ObjectRef {
        let id = super::next_id();
        Rc::new(Self {
            id,
            class: Rc::clone(class),
            singleton_methods: MethodTable::shared(format!("#<Class:#<{}:{id:#x}>>", class.name())),
            ivars: RefCell::new(HashMap::new()),
            mock: RefCell::new(None),
        })
    }

    /// Unique identity
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The object's class
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Diagnostic representation, e.g. `#<Product:0x2a>`
    #[must_use]
    pub fn inspect(&self) -> String {
        format!("#<{}:{:#x}>", self.class.name(), self.id)
    }

    /// Table of methods defined on this object only
    #[must_use]
    pub fn singleton_methods(&self) -> &MethodTableRef {
        &self.singleton_methods
    }

    /// Define a public method on this object only
    pub fn define_singleton_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.singleton_methods, Method::new(name, body), Visibility::Public);
    }

    /// Define a private method on this object only
    pub fn define_private_singleton_method<F>(&self, name: &str, body: F)
    where
        F: Fn(&Receiver, &[Value], Option<&Block>) -> CallResult + 'static,
    {
        define_in(&self.singleton_methods, Method::new(name, body), Visibility::Private);
    }

    /// Look a method up: singleton methods first, then the class chain
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<Method> {
        let singleton = self.singleton_methods.borrow().get(name).cloned();
        singleton.or_else(|| self.class.find_instance_method(name))
    }

    /// Whether the object has method `name` anywhere in its lookup path.
    ///
    /// With `include_public` false only protected and private methods count.
    #[must_use]
    pub fn method_exists(&self, name: &str, include_public: bool) -> bool {
        self.find_method(name)
            .is_some_and(|m| include_public || !m.visibility().is_public())
    }

    /// Whether a public call to `name` would be dispatched
    #[must_use]
    pub fn responds_to(&self, name: &str) -> bool {
        self.find_method(name)
            .is_some_and(|m| m.visibility().is_public())
    }

    /// Read an instance variable
    #[must_use]
    pub fn ivar(&self, name: &str) -> Value {
        self.ivars.borrow().get(name).cloned().unwrap_or_default()
    }

    /// Write an instance variable
    pub fn set_ivar(&self, name: &str, value: impl Into<Value>) {
        self.ivars.borrow_mut().insert(name.to_string(), value.into());
    }

    /// Mock impersonating this object, created on first use
    #[must_use]
    pub fn mocha(&self) -> Mock {
        memoized(&self.mock, || Mock::new(&self.inspect()))
    }

    /// Mock impersonating this object, if one exists
    #[must_use]
    pub fn cached_mocha(&self) -> Option<Mock> {
        self.mock.borrow().clone()
    }

    /// Forget the impersonating mock
    pub fn reset_mocha(&self) {
        self.mock.borrow_mut().take();
    }

    /// Call a public method
    pub fn call(self: &Rc<Self>, name: &str, args: &[Value]) -> CallResult {
        Receiver::Object(Rc::clone(self)).call(name, args)
    }

    /// Call a public method, passing a block
    pub fn call_with_block(self: &Rc<Self>, name: &str, args: &[Value], block: &Block) -> CallResult {
        Receiver::Object(Rc::clone(self)).dispatch(name, args, Some(block), true)
    }

    /// Call a method regardless of its visibility
    pub fn send(self: &Rc<Self>, name: &str, args: &[Value]) -> CallResult {
        Receiver::Object(Rc::clone(self)).send(name, args)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Class;
    use super::*;

    #[test]
    fn test_singleton_method_shadows_class_method() {
        let class = Class::new("Lamp");
        class.define_method("state", |_, _, _| Ok(Value::sym("off")));
        let lamp = class.instantiate();
        let other = class.instantiate();

        lamp.define_singleton_method("state", |_, _, _| Ok(Value::sym("on")));

        assert_eq!(lamp.call("state", &[]).unwrap(), Value::sym("on"));
        assert_eq!(other.call("state", &[]).unwrap(), Value::sym("off"));
    }

    #[test]
    fn test_ivars_default_to_nil() {
        let obj = Class::new("Bag").instantiate();
        assert_eq!(obj.ivar("count"), Value::Nil);
        obj.set_ivar("count", 3);
        assert_eq!(obj.ivar("count"), Value::Int(3));
    }

    #[test]
    fn test_inspect_uses_class_name_and_id() {
        let obj = Class::new("Bag").instantiate();
        assert_eq!(obj.inspect(), format!("#<Bag:{:#x}>", obj.id()));
    }

    #[test]
    fn test_responds_to_ignores_private_methods() {
        let class = Class::new("Vault");
        class.define_private_method("combination", |_, _, _| Ok(Value::from(1234)));
        let vault = class.instantiate();

        assert!(!vault.responds_to("combination"));
        assert!(vault.method_exists("combination", false));
        assert!(vault.method_exists("combination", true));
    }
}
