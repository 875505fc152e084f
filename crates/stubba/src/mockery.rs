//! Mockery
//!
//! One [`Mockery`] per test: it installs and tracks every stub, owns the
//! mocks created along the way, verifies their expectations and restores
//! every stubbed method on teardown.
//!
//! Teardown runs when [`Mockery::teardown`] is called and again, best
//! effort, when the mockery is dropped, so a test that panics halfway still
//! leaves every class and object as it found them.
//!
//! ## Example
//!
//! ```ignore
//! Mockery::run(Configuration::default(), |mockery| {
//!     let product = product_class.instantiate();
//!     product.expects(mockery, "save")?.returns(true);
//!     assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(true));
//!     Ok(())
//! })?;
//! ```

use crate::central::Central;
use crate::config::{Configuration, StubbingCheck, StubbingPolicy};
use crate::mock::Mock;
use crate::result::{StubbaError, StubbaResult};
use crate::runtime::{ClassRef, ObjectRef};
use crate::stub_target::StubTarget;
use crate::stubbable::Stubbable;

/// Registry of stubs and mocks for one test
#[derive(Debug, Default)]
pub struct Mockery {
    config: Configuration,
    central: Central,
    mocks: Vec<Mock>,
    warnings: Vec<String>,
    next_mock_id: usize,
}

impl Mockery {
    /// Create a mockery that allows every kind of stubbing
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mockery with `config`
    #[must_use]
    pub fn with_config(config: Configuration) -> Self {
        Self {
            config,
            central: Central::new(),
            mocks: Vec::new(),
            warnings: Vec::new(),
            next_mock_id: 0,
        }
    }

    /// Run `body` with a fresh mockery, verify, then tear down.
    ///
    /// Verification is skipped when the body fails; teardown always runs.
    /// The body's own error wins over verification and teardown errors.
    pub fn run<F, T>(config: Configuration, body: F) -> StubbaResult<T>
    where
        F: FnOnce(&mut Self) -> StubbaResult<T>,
    {
        let mut mockery = Self::with_config(config);
        let outcome = body(&mut mockery);
        let verified = if outcome.is_ok() {
            mockery.verify()
        } else {
            Ok(())
        };
        let torn_down = mockery.teardown();

        let value = outcome?;
        verified?;
        torn_down?;
        Ok(value)
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Installed stubs
    #[must_use]
    pub fn central(&self) -> &Central {
        &self.central
    }

    /// Mocks tracked for verification
    #[must_use]
    pub fn mocks(&self) -> &[Mock] {
        &self.mocks
    }

    /// Warnings recorded under [`StubbingPolicy::Warn`]
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Check the stubbing policies before stubbing `method_name` on `target`
    pub fn on_stubbing<T>(&mut self, target: &T, method_name: &str) -> StubbaResult<()>
    where
        T: Stubbable + ?Sized,
    {
        if !self.config.stubbing_non_existent_method.is_allow()
            && !target.method_exists(method_name, true)
        {
            self.check(StubbingCheck::NonExistentMethod, &target.inspect(), method_name)?;
        }
        if !self.config.stubbing_non_public_method.is_allow()
            && target.method_exists(method_name, false)
        {
            self.check(StubbingCheck::NonPublicMethod, &target.inspect(), method_name)?;
        }
        Ok(())
    }

    fn check(&mut self, check: StubbingCheck, receiver: &str, method: &str) -> StubbaResult<()> {
        let message = format!("{check}: {receiver}.{method}");
        match self.config.policy_for(check) {
            StubbingPolicy::Allow => Ok(()),
            StubbingPolicy::Warn => {
                tracing::warn!("{message}");
                self.warnings.push(message);
                Ok(())
            }
            StubbingPolicy::Prevent => Err(StubbaError::StubbingNotAllowed { message }),
        }
    }

    /// Install a stub target, reusing an installed equivalent
    pub fn stub(&mut self, method: Box<dyn StubTarget>) -> StubbaResult<()> {
        self.central.stub(method)
    }

    /// Remove an installed stub target equivalent to `method`
    pub fn unstub(&mut self, method: &dyn StubTarget) -> StubbaResult<()> {
        self.central.unstub(method)
    }

    /// Track `mock` for verification and hand it back
    pub fn register_mock(&mut self, mock: Mock) -> Mock {
        if !self.mocks.iter().any(|m| m.same_as(&mock)) {
            self.mocks.push(mock.clone());
        }
        mock
    }

    /// Tracked mock impersonating `object`
    pub fn mock_impersonating(&mut self, object: &ObjectRef) -> Mock {
        self.register_mock(object.mocha())
    }

    /// Tracked mock shared by every instance of `class`
    pub fn mock_impersonating_any_instance_of(&mut self, class: &ClassRef) -> Mock {
        self.register_mock(class.any_instance_mocha())
    }

    /// New standalone mock named `name`
    pub fn named_mock(&mut self, name: &str) -> Mock {
        self.register_mock(Mock::new(name))
    }

    /// New standalone mock with a generated name
    pub fn unnamed_mock(&mut self) -> Mock {
        self.next_mock_id += 1;
        let name = format!("#<Mock:{}>", self.next_mock_id);
        self.register_mock(Mock::new(&name))
    }

    /// Check every tracked mock.
    ///
    /// Unmet expectations and unexpected calls fail with
    /// [`StubbaError::ExpectationsNotSatisfied`]. Stubs never invoked are then
    /// handled by the unnecessary-stubbing policy.
    pub fn verify(&mut self) -> StubbaResult<()> {
        let failures: Vec<String> = self.mocks.iter().flat_map(Mock::failures).collect();
        if !failures.is_empty() {
            tracing::debug!(failures = failures.len(), "verification failed");
            return Err(StubbaError::ExpectationsNotSatisfied { failures });
        }

        if self.config.stubbing_method_unnecessarily.is_allow() {
            return Ok(());
        }
        let unused: Vec<String> = self
            .mocks
            .iter()
            .flat_map(Mock::expectations)
            .filter(|e| !e.used() && !e.cardinality().is_never())
            .map(|e| e.method_signature())
            .collect();
        for signature in unused {
            let message = format!("{}: {signature}", StubbingCheck::MethodUnnecessarily);
            match self.config.stubbing_method_unnecessarily {
                StubbingPolicy::Allow => {}
                StubbingPolicy::Warn => {
                    tracing::warn!("{message}");
                    self.warnings.push(message);
                }
                StubbingPolicy::Prevent => return Err(StubbaError::StubbingNotAllowed { message }),
            }
        }
        Ok(())
    }

    /// Restore every stubbed method and forget every mock.
    ///
    /// Safe to call more than once; every restore is attempted and the first
    /// failure is returned.
    pub fn teardown(&mut self) -> StubbaResult<()> {
        tracing::debug!(
            stubs = self.central.len(),
            mocks = self.mocks.len(),
            "tearing down"
        );
        let result = self.central.unstub_all();
        self.mocks.clear();
        result
    }
}

impl Drop for Mockery {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            tracing::warn!(error = %e, "teardown on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Class;
    use crate::value::Value;

    #[test]
    fn test_register_mock_deduplicates() {
        let mut mockery = Mockery::new();
        let product = Class::new("Product").instantiate();
        let first = mockery.mock_impersonating(&product);
        let second = mockery.mock_impersonating(&product);
        assert!(first.same_as(&second));
        assert_eq!(mockery.mocks().len(), 1);
    }

    #[test]
    fn test_unnamed_mocks_get_distinct_names() {
        let mut mockery = Mockery::new();
        let a = mockery.unnamed_mock();
        let b = mockery.unnamed_mock();
        assert_ne!(a.name(), b.name());
        assert!(a.name().starts_with("#<Mock:"));
    }

    #[test]
    fn test_verify_reports_unmet_expectations() {
        let mut mockery = Mockery::new();
        let mailer = mockery.named_mock("mailer");
        mailer.expects("deliver");

        let err = mockery.verify().unwrap_err();
        match err {
            StubbaError::ExpectationsNotSatisfied { failures } => {
                assert_eq!(
                    failures,
                    vec!["expected exactly once, invoked never: mailer.deliver(any_parameters)"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }

        mailer.call("deliver", &[]).unwrap();
        mockery.verify().unwrap();
    }

    #[test]
    fn test_verify_reports_unexpected_invocations() {
        let mut mockery = Mockery::new();
        let mailer = mockery.named_mock("mailer");
        assert!(mailer.call("deliver", &[Value::from("hi")]).is_err());

        let err = mockery.verify().unwrap_err();
        assert!(err.to_string().contains("unexpected invocation: mailer.deliver(\"hi\")"));
    }

    #[test]
    fn test_prevent_non_existent_method() {
        let config =
            Configuration::new().with_stubbing_non_existent_method(StubbingPolicy::Prevent);
        let mut mockery = Mockery::with_config(config);
        let product = Class::new("Product").instantiate();

        let err = product.stubs(&mut mockery, "missing").unwrap_err();
        assert!(matches!(
            err,
            StubbaError::StubbingNotAllowed { ref message } if message.starts_with("stubbing non-existent method: #<Product:")
        ));
        assert!(mockery.central().is_empty());
    }

    #[test]
    fn test_warn_non_public_method() {
        let config = Configuration::new().with_stubbing_non_public_method(StubbingPolicy::Warn);
        let mut mockery = Mockery::with_config(config);
        let class = Class::new("Vault");
        class.define_private_method("combination", |_, _, _| Ok(Value::from(1234)));
        let vault = class.instantiate();

        vault.stubs(&mut mockery, "combination").unwrap().returns(0);
        assert_eq!(mockery.warnings().len(), 1);
        assert!(mockery.warnings()[0].contains("stubbing non-public method"));
        assert_eq!(vault.call("combination", &[]).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_unnecessary_stubbing_policy() {
        let config =
            Configuration::new().with_stubbing_method_unnecessarily(StubbingPolicy::Prevent);
        let mut mockery = Mockery::with_config(config);
        let product = Class::new("Product").instantiate();
        product.stubs(&mut mockery, "save").unwrap();
        product.stubs(&mut mockery, "destroy").unwrap().never();
        product.call("save", &[]).unwrap();
        mockery.verify().unwrap();

        product.stubs(&mut mockery, "reload").unwrap();
        let err = mockery.verify().unwrap_err();
        assert!(err.to_string().contains("stubbing method unnecessarily"));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let class = Class::new("Product");
        class.define_method("save", |_, _, _| Ok(Value::Bool(false)));
        let product = class.instantiate();
        let mut mockery = Mockery::new();
        product.stubs(&mut mockery, "save").unwrap().returns(true);

        mockery.teardown().unwrap();
        mockery.teardown().unwrap();
        assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(false));
        assert!(mockery.mocks().is_empty());
    }

    #[test]
    fn test_drop_restores_methods() {
        let class = Class::new("Product");
        class.define_method("save", |_, _, _| Ok(Value::Bool(false)));
        let product = class.instantiate();
        {
            let mut mockery = Mockery::new();
            product.stubs(&mut mockery, "save").unwrap().returns(true);
            assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(true));
        }
        assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_run_verifies_then_tears_down() {
        let class = Class::new("Product");
        class.define_method("save", |_, _, _| Ok(Value::Bool(false)));
        let product = class.instantiate();

        let err = Mockery::run(Configuration::default(), |mockery| {
            product.expects(mockery, "save")?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, StubbaError::ExpectationsNotSatisfied { .. }));
        assert_eq!(product.call("save", &[]).unwrap(), Value::Bool(false));

        let value = Mockery::run(Configuration::default(), |mockery| {
            product.expects(mockery, "save")?.returns(true);
            product.call("save", &[]).map_err(|e| e.into_error())
        })
        .unwrap();
        assert_eq!(value, Value::Bool(true));
    }
}
