//! Proxy for stubbing every instance of a class.

use crate::mock::Mock;
use crate::runtime::ClassRef;
use std::rc::Rc;

/// Stands for "any instance of `class`" when stubbing.
///
/// The shared mock lives on the class itself, so proxies are cheap and any
/// number of them for the same class see the same expectations.
#[derive(Debug, Clone)]
pub struct AnyInstance {
    class: ClassRef,
}

impl AnyInstance {
    /// Proxy for instances of `class`
    #[must_use]
    pub fn new(class: &ClassRef) -> Self {
        Self {
            class: Rc::clone(class),
        }
    }

    /// The proxied class
    #[must_use]
    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Mock shared by all instances, created on first use
    #[must_use]
    pub fn mocha(&self) -> Mock {
        self.class.any_instance_mocha()
    }

    /// Whether instances have `name`, looking at the class tables since
    /// there may be no instance yet
    #[must_use]
    pub fn method_exists(&self, name: &str, include_public: bool) -> bool {
        self.class.instance_method_exists(name, include_public)
    }
}
