use super::{MethodSwap, StubTarget, Stubbee};
use crate::mock::Mock;
use crate::result::StubbaError;
use crate::runtime::{Block, MethodBody, ObjectRef, Receiver};
use crate::unwind::CallResult;
use crate::value::Value;
use std::rc::{Rc, Weak};

/// Stubs a method on a single object.
///
/// The trampoline lives in the object's singleton table, so it shadows the
/// class's method for this object only.
#[derive(Debug)]
pub struct InstanceMethod {
    object: ObjectRef,
    swap: MethodSwap,
}

impl InstanceMethod {
    /// Target `method_name` on `object`
    #[must_use]
    pub fn new(object: &ObjectRef, method_name: &str) -> Self {
        Self {
            object: Rc::clone(object),
            swap: MethodSwap::new(Rc::clone(object.singleton_methods()), method_name),
        }
    }
}

impl StubTarget for InstanceMethod {
    fn stubbee(&self) -> Stubbee {
        Stubbee::Object(Rc::clone(&self.object))
    }

    fn swap(&self) -> &MethodSwap {
        &self.swap
    }

    fn swap_mut(&mut self) -> &mut MethodSwap {
        &mut self.swap
    }

    fn trampoline(&self) -> MethodBody {
        let object: Weak<_> = Rc::downgrade(&self.object);
        let method = self.swap.method_name().to_string();
        Rc::new(move |_: &Receiver, args: &[Value], block: Option<&Block>| -> CallResult {
            let object = object
                .upgrade()
                .ok_or_else(|| StubbaError::no_method("a dropped object", method.as_str()))?;
            object.mocha().method_missing(&method, args, block)
        })
    }

    fn cached_mock(&self) -> Option<Mock> {
        self.object.cached_mocha()
    }

    fn forget_mock(&self) {
        self.object.reset_mocha();
    }
}
