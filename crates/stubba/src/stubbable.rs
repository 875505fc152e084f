//! Stubbing entry points for objects, classes, modules and any-instance
//! proxies.
//!
//! ```ignore
//! let mut mockery = Mockery::new();
//! let product = product_class.instantiate();
//!
//! product.expects(&mut mockery, "save")?.returns(true);
//! product_class.any_instance().stubs(&mut mockery, [("valid", true), ("reload", false)])?;
//! ```

use crate::any_instance::AnyInstance;
use crate::argument_iterator::StubArguments;
use crate::cardinality::Cardinality;
use crate::expectation::Expectation;
use crate::mock::Mock;
use crate::mockery::Mockery;
use crate::result::{StubbaError, StubbaResult};
use crate::runtime::{Class, ClassRef, Object, ObjectRef};
use crate::stub_target::{
    AnyInstanceMethod, ClassMethod, InstanceMethod, ModuleMethod, StubTarget, Stubbee,
};
use std::rc::Rc;

/// Something whose methods can be stubbed
pub trait Stubbable {
    /// Stub target for `method_name` on this stubbee
    fn stubba_method(&self, method_name: &str) -> Box<dyn StubTarget>;

    /// Identity of the stubbee
    fn stubba_object(&self) -> Stubbee;

    /// Mock impersonating this stubbee, created on first use
    fn mocha(&self) -> Mock;

    /// Whether `method_name` exists; with `include_public` false only
    /// protected and private methods count
    fn method_exists(&self, method_name: &str, include_public: bool) -> bool;

    /// Diagnostic representation
    fn inspect(&self) -> String {
        self.stubba_object().to_string()
    }

    /// Expect each named method to be called exactly once.
    ///
    /// With a map, each entry also sets the return value. Returns the
    /// expectation of the last entry.
    fn expects(
        &self,
        mockery: &mut Mockery,
        arguments: impl Into<StubArguments>,
    ) -> StubbaResult<Expectation>
    where
        Self: Sized,
    {
        add_expectations(self, mockery, &arguments.into(), Cardinality::exactly(1))
    }

    /// Allow each named method to be called any number of times.
    ///
    /// With a map, each entry also sets the return value. Returns the
    /// expectation of the last entry.
    fn stubs(
        &self,
        mockery: &mut Mockery,
        arguments: impl Into<StubArguments>,
    ) -> StubbaResult<Expectation>
    where
        Self: Sized,
    {
        add_expectations(self, mockery, &arguments.into(), Cardinality::any_number())
    }

    /// Restore the original behaviour of each named method
    fn unstub(&self, mockery: &mut Mockery, method_names: &[&str]) -> StubbaResult<()> {
        for method_name in method_names {
            mockery.unstub(self.stubba_method(method_name).as_ref())?;
        }
        Ok(())
    }
}

fn add_expectations<T: Stubbable>(
    target: &T,
    mockery: &mut Mockery,
    arguments: &StubArguments,
    cardinality: Cardinality,
) -> StubbaResult<Expectation> {
    let mut last = None;
    for (method_name, value) in arguments {
        mockery.on_stubbing(target, &method_name)?;
        mockery.stub(target.stubba_method(&method_name))?;
        let expectation = mockery
            .register_mock(target.mocha())
            .add_expectation(&method_name, cardinality);
        last = Some(match value {
            Some(value) => expectation.returns(value),
            None => expectation,
        });
    }
    last.ok_or(StubbaError::NothingToStub)
}

impl Stubbable for ObjectRef {
    fn stubba_method(&self, method_name: &str) -> Box<dyn StubTarget> {
        Box::new(InstanceMethod::new(self, method_name))
    }

    fn stubba_object(&self) -> Stubbee {
        Stubbee::Object(Rc::clone(self))
    }

    fn mocha(&self) -> Mock {
        Object::mocha(self)
    }

    fn method_exists(&self, method_name: &str, include_public: bool) -> bool {
        Object::method_exists(self, method_name, include_public)
    }
}

impl Stubbable for ClassRef {
    fn stubba_method(&self, method_name: &str) -> Box<dyn StubTarget> {
        if self.is_module() {
            Box::new(ModuleMethod::new(self, method_name))
        } else {
            Box::new(ClassMethod::new(self, method_name))
        }
    }

    fn stubba_object(&self) -> Stubbee {
        Stubbee::Class(Rc::clone(self))
    }

    fn mocha(&self) -> Mock {
        Class::mocha(self)
    }

    fn method_exists(&self, method_name: &str, include_public: bool) -> bool {
        self.class_method_exists(method_name, include_public)
    }
}

impl Stubbable for AnyInstance {
    fn stubba_method(&self, method_name: &str) -> Box<dyn StubTarget> {
        Box::new(AnyInstanceMethod::new(self.class(), method_name))
    }

    fn stubba_object(&self) -> Stubbee {
        Stubbee::AnyInstance(Rc::clone(self.class()))
    }

    fn mocha(&self) -> Mock {
        AnyInstance::mocha(self)
    }

    fn method_exists(&self, method_name: &str, include_public: bool) -> bool {
        AnyInstance::method_exists(self, method_name, include_public)
    }
}
