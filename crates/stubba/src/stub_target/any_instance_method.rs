use super::{MethodSwap, StubTarget, Stubbee};
use crate::mock::Mock;
use crate::result::StubbaError;
use crate::runtime::{Block, ClassRef, MethodBody, Receiver};
use crate::unwind::CallResult;
use crate::value::Value;
use std::rc::Rc;

/// Stubs an instance method for every instance of a class.
///
/// The trampoline replaces the method in the class's instance table, so
/// existing instances and ones created later all reach it, and every one of
/// them forwards to the class's single any-instance mock. Per-object
/// singleton methods still take precedence.
#[derive(Debug)]
pub struct AnyInstanceMethod {
    class: ClassRef,
    swap: MethodSwap,
}

impl AnyInstanceMethod {
    /// Target the instance method `method_name` of `class`
    #[must_use]
    pub fn new(class: &ClassRef, method_name: &str) -> Self {
        Self {
            class: Rc::clone(class),
            swap: MethodSwap::new(Rc::clone(class.instance_methods()), method_name),
        }
    }
}

impl StubTarget for AnyInstanceMethod {
    fn stubbee(&self) -> Stubbee {
        Stubbee::AnyInstance(Rc::clone(&self.class))
    }

    fn swap(&self) -> &MethodSwap {
        &self.swap
    }

    fn swap_mut(&mut self) -> &mut MethodSwap {
        &mut self.swap
    }

    fn trampoline(&self) -> MethodBody {
        let class = Rc::downgrade(&self.class);
        let method = self.swap.method_name().to_string();
        Rc::new(move |_: &Receiver, args: &[Value], block: Option<&Block>| -> CallResult {
            let class = class
                .upgrade()
                .ok_or_else(|| StubbaError::no_method("a dropped class", method.as_str()))?;
            class.any_instance_mocha().method_missing(&method, args, block)
        })
    }

    fn cached_mock(&self) -> Option<Mock> {
        self.class.cached_any_instance_mocha()
    }

    fn forget_mock(&self) {
        self.class.reset_any_instance_mocha();
    }
}
