use super::{MethodSwap, StubTarget, Stubbee};
use crate::mock::Mock;
use crate::result::StubbaError;
use crate::runtime::{Block, ClassRef, MethodBody, Receiver};
use crate::unwind::CallResult;
use crate::value::Value;
use std::rc::Rc;

/// Stubs a class-level method.
///
/// The trampoline lives in the class's singleton table; subclasses that
/// inherit the method see the stub too, and it routes to this class's mock.
#[derive(Debug)]
pub struct ClassMethod {
    class: ClassRef,
    swap: MethodSwap,
}

impl ClassMethod {
    /// Target the class-level method `method_name` of `class`
    #[must_use]
    pub fn new(class: &ClassRef, method_name: &str) -> Self {
        Self {
            class: Rc::clone(class),
            swap: MethodSwap::new(Rc::clone(class.singleton_methods()), method_name),
        }
    }
}

impl StubTarget for ClassMethod {
    fn stubbee(&self) -> Stubbee {
        Stubbee::Class(Rc::clone(&self.class))
    }

    fn swap(&self) -> &MethodSwap {
        &self.swap
    }

    fn swap_mut(&mut self) -> &mut MethodSwap {
        &mut self.swap
    }

    fn trampoline(&self) -> MethodBody {
        class_trampoline(&self.class, self.swap.method_name())
    }

    fn cached_mock(&self) -> Option<Mock> {
        self.class.cached_mocha()
    }

    fn forget_mock(&self) {
        self.class.reset_mocha();
    }
}

/// Trampoline forwarding to the class's own mock
pub(super) fn class_trampoline(class: &ClassRef, method_name: &str) -> MethodBody {
    let class = Rc::downgrade(class);
    let method = method_name.to_string();
    Rc::new(move |_: &Receiver, args: &[Value], block: Option<&Block>| -> CallResult {
        let class = class
            .upgrade()
            .ok_or_else(|| StubbaError::no_method("a dropped class", method.as_str()))?;
        class.mocha().method_missing(&method, args, block)
    })
}
