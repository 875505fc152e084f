//! Stubba: Method Stubbing and Expectations for a Dynamic Object Model
//!
//! Stubba temporarily replaces methods on an object, a class, a module or on
//! every instance of a class with a trampoline routed to a mock, records how
//! the replaced methods are expected to be called, and puts the originals
//! back (visibility included) when the test is over.
//!
//! Code under test dispatches through the [`runtime`] object model, which is
//! the seam stubs are installed into.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       STUBBA Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   expects / stubs                                                 │
//! │        │                                                          │
//! │        ▼                                                          │
//! │   ┌────────────┐   ┌────────────┐   ┌─────────────────────────┐   │
//! │   │ Argument   │──►│ Mockery    │──►│ Stub Target             │   │
//! │   │ Iterator   │   │ (Central)  │   │ hide / install / restore│   │
//! │   └────────────┘   └────────────┘   └───────────┬─────────────┘   │
//! │                                                 │ trampoline      │
//! │                                                 ▼                 │
//! │                    ┌────────────┐   ┌─────────────────────────┐   │
//! │                    │ Return     │◄──│ Mock / Expectations     │   │
//! │                    │ Strategy   │   │ newest-first resolution │   │
//! │                    └────────────┘   └─────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use stubba::prelude::*;
//!
//! let product_class = Class::new("Product");
//! product_class.define_method("save", |_, _, _| Ok(Value::Bool(false)));
//! let product = product_class.instantiate();
//!
//! let mut mockery = Mockery::new();
//! let expectation = product.expects(&mut mockery, "save").unwrap().returns(true);
//!
//! assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(true));
//! assert_eq!(expectation.invocation_count(), 1);
//! mockery.verify().unwrap();
//!
//! mockery.teardown().unwrap();
//! assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(false));
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod any_instance;
mod argument_iterator;
mod cardinality;
mod central;
mod config;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod expectation;
mod mock;
#[allow(clippy::missing_errors_doc, clippy::missing_const_for_fn)]
mod mockery;
mod parameter_matchers;
mod result;
mod return_values;
/// Dynamic object model: classes, objects, method tables and dispatch
pub mod runtime;
/// Stub targets: the per-method hide, install and restore mechanics
#[allow(clippy::missing_errors_doc)]
pub mod stub_target;
mod stubbable;
mod unwind;
mod value;

pub use any_instance::AnyInstance;
pub use argument_iterator::{ArgumentIterator, StubArguments};
pub use cardinality::{times, Cardinality};
pub use central::Central;
pub use config::{Configuration, StubbingCheck, StubbingPolicy};
pub use expectation::Expectation;
pub use mock::Mock;
pub use mockery::Mockery;
pub use parameter_matchers::{
    any_parameters, anything, equals, includes, satisfies, ArgumentsMatcher, ParameterMatcher,
    Predicate,
};
pub use result::{StubbaError, StubbaResult};
pub use return_values::{Callback, ReturnStrategy, ReturnValues};
pub use stubbable::Stubbable;
pub use unwind::{catch, CallResult, Thrown, Unwind};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use super::any_instance::*;
    pub use super::argument_iterator::*;
    pub use super::cardinality::*;
    pub use super::config::*;
    pub use super::expectation::*;
    pub use super::mock::*;
    pub use super::mockery::*;
    pub use super::parameter_matchers::*;
    pub use super::result::*;
    pub use super::return_values::*;
    pub use super::runtime::{Block, Class, ClassRef, Object, ObjectRef, Receiver, Visibility};
    pub use super::stub_target::{StubTarget, Stubbee};
    pub use super::stubbable::*;
    pub use super::unwind::*;
    pub use super::value::*;
}
