use super::class_method::class_trampoline;
use super::{MethodSwap, StubTarget, Stubbee};
use crate::mock::Mock;
use crate::runtime::{ClassRef, MethodBody};
use std::rc::Rc;

/// Stubs a module function.
///
/// Works like [`ClassMethod`](super::ClassMethod) on the module's own
/// singleton table; modules have no superclass to inherit from.
#[derive(Debug)]
pub struct ModuleMethod {
    module: ClassRef,
    swap: MethodSwap,
}

impl ModuleMethod {
    /// Target the module function `method_name` of `module`
    #[must_use]
    pub fn new(module: &ClassRef, method_name: &str) -> Self {
        Self {
            module: Rc::clone(module),
            swap: MethodSwap::new(Rc::clone(module.singleton_methods()), method_name),
        }
    }
}

impl StubTarget for ModuleMethod {
    fn stubbee(&self) -> Stubbee {
        Stubbee::Class(Rc::clone(&self.module))
    }

    fn swap(&self) -> &MethodSwap {
        &self.swap
    }

    fn swap_mut(&mut self) -> &mut MethodSwap {
        &mut self.swap
    }

    fn trampoline(&self) -> MethodBody {
        class_trampoline(&self.module, self.swap.method_name())
    }

    fn cached_mock(&self) -> Option<Mock> {
        self.module.cached_mocha()
    }

    fn forget_mock(&self) {
        self.module.reset_mocha();
    }
}
