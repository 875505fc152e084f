//! Stub Targets
//!
//! A stub target replaces one method of one stubbee with a trampoline that
//! forwards calls to the stubbee's [`Mock`], and puts the original back
//! afterwards. The variants differ in which method table they modify and
//! which mock the trampoline reaches:
//!
//! | Variant | Table | Mock |
//! |---------|-------|------|
//! | [`InstanceMethod`] | the object's singleton table | the object's mock |
//! | [`ClassMethod`] | the class's singleton table | the class's mock |
//! | [`ModuleMethod`] | the module's singleton table | the module's mock |
//! | [`AnyInstanceMethod`] | the class's instance table | the class's shared any-instance mock |
//!
//! Trampolines hold only weak references to their stubbee, so a stub never
//! keeps the object it modifies alive.

mod any_instance_method;
mod class_method;
mod instance_method;
mod module_method;
mod swap;

pub use any_instance_method::AnyInstanceMethod;
pub use class_method::ClassMethod;
pub use instance_method::InstanceMethod;
pub use module_method::ModuleMethod;
pub use swap::MethodSwap;

use crate::mock::Mock;
use crate::result::StubbaResult;
use crate::runtime::{ClassRef, MethodBody, ObjectRef};
use std::fmt;
use std::rc::Rc;

/// Lifecycle of a stub target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubState {
    /// Created, nothing touched yet
    Pending,
    /// Original captured and removed
    Hidden,
    /// Trampoline in place
    Installed,
    /// Trampoline removed
    Removed,
    /// Original back in place
    Restored,
}

/// The thing a stub modifies. Equality is identity.
#[derive(Debug, Clone)]
pub enum Stubbee {
    /// A single object
    Object(ObjectRef),
    /// A class or module itself
    Class(ClassRef),
    /// Every instance of a class
    AnyInstance(ClassRef),
}

impl PartialEq for Stubbee {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            (Self::Class(a), Self::Class(b)) | (Self::AnyInstance(a), Self::AnyInstance(b)) => {
                Rc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Stubbee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(obj) => f.write_str(&obj.inspect()),
            Self::Class(class) => f.write_str(class.name()),
            Self::AnyInstance(class) => write!(f, "any instance of {}", class.name()),
        }
    }
}

/// One stubbed method of one stubbee
pub trait StubTarget: fmt::Debug {
    /// What is being modified
    fn stubbee(&self) -> Stubbee;

    /// The swap doing the table work
    fn swap(&self) -> &MethodSwap;

    /// Mutable access to the swap
    fn swap_mut(&mut self) -> &mut MethodSwap;

    /// Body installed in place of the original
    fn trampoline(&self) -> MethodBody;

    /// The mock calls are forwarded to, if it has been created
    fn cached_mock(&self) -> Option<Mock>;

    /// Drop the memoized mock so the next stub starts fresh
    fn forget_mock(&self);

    /// Stubbed method name
    fn method_name(&self) -> &str {
        self.swap().method_name()
    }

    /// Lifecycle state
    fn state(&self) -> StubState {
        self.swap().state()
    }

    /// Whether the trampoline is in place
    fn is_installed(&self) -> bool {
        self.state() == StubState::Installed
    }

    /// Capture and remove the original, recording its absence if there is none
    fn hide_original_method(&mut self) -> StubbaResult<()> {
        self.swap_mut().hide()
    }

    /// Install the trampoline
    fn define_new_method(&mut self) -> StubbaResult<()> {
        let body = self.trampoline();
        self.swap_mut().install(body)
    }

    /// Remove the trampoline; already gone is fine
    fn remove_new_method(&mut self) -> StubbaResult<()> {
        self.swap_mut().remove()
    }

    /// Reinstall the original with its visibility
    fn restore_original_method(&mut self) -> StubbaResult<()> {
        self.swap_mut().restore()
    }

    /// Hide the original, then install the trampoline
    fn stub(&mut self) -> StubbaResult<()> {
        self.hide_original_method()?;
        self.define_new_method()?;
        tracing::debug!(stubbee = %self.stubbee(), method = self.method_name(), "stubbed");
        Ok(())
    }

    /// Remove the trampoline, restore the original and release the mock's
    /// expectations for this method.
    ///
    /// Every step runs even if an earlier one fails; the first error is
    /// returned.
    fn unstub(&mut self) -> StubbaResult<()> {
        let removed = self.remove_new_method();
        let restored = self.restore_original_method();
        self.reset_mocha();
        tracing::debug!(stubbee = %self.stubbee(), method = self.method_name(), "unstubbed");
        removed.and(restored)
    }

    /// Drop this method's expectations, and the mock once it has none left
    fn reset_mocha(&self) {
        if let Some(mock) = self.cached_mock() {
            mock.unstub(self.method_name());
            if !mock.has_expectations() {
                self.forget_mock();
            }
        }
    }

    /// Whether both stub the same method of the same stubbee
    fn matches(&self, other: &dyn StubTarget) -> bool {
        self.method_name() == other.method_name() && self.stubbee() == other.stubbee()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Class;

    #[test]
    fn test_stubbee_equality_is_identity() {
        let class = Class::new("Product");
        let a = class.instantiate();
        let b = class.instantiate();

        assert_eq!(Stubbee::Object(Rc::clone(&a)), Stubbee::Object(a));
        assert_ne!(Stubbee::Object(b), Stubbee::Class(Rc::clone(&class)));
        assert_ne!(
            Stubbee::Class(Rc::clone(&class)),
            Stubbee::AnyInstance(Rc::clone(&class))
        );
        assert_eq!(
            Stubbee::AnyInstance(Rc::clone(&class)),
            Stubbee::AnyInstance(class)
        );
    }

    #[test]
    fn test_targets_match_on_stubbee_and_name() {
        let obj = Class::new("Product").instantiate();
        let save = InstanceMethod::new(&obj, "save");
        let save_again = InstanceMethod::new(&obj, "save");
        let destroy = InstanceMethod::new(&obj, "destroy");
        let other = InstanceMethod::new(&Class::new("Product").instantiate(), "save");

        assert!(save.matches(&save_again));
        assert!(!save.matches(&destroy));
        assert!(!save.matches(&other));
    }
}
