//! Registry of installed stub targets.

use crate::result::StubbaResult;
use crate::stub_target::StubTarget;

/// Tracks every stub target currently installed.
///
/// At most one target is installed per method of a stubbee; stubbing the
/// same method again reuses the installed target.
#[derive(Debug, Default)]
pub struct Central {
    stubba_methods: Vec<Box<dyn StubTarget>>,
}

impl Central {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `method` unless an equivalent target is already installed
    pub fn stub(&mut self, mut method: Box<dyn StubTarget>) -> StubbaResult<()> {
        if self.is_stubbed(method.as_ref()) {
            return Ok(());
        }
        method.stub()?;
        self.stubba_methods.push(method);
        Ok(())
    }

    /// Unstub and forget the installed target equivalent to `method`, if any.
    ///
    /// A target that fails to unstub stays registered so a later teardown
    /// retries it.
    pub fn unstub(&mut self, method: &dyn StubTarget) -> StubbaResult<()> {
        let Some(index) = self.stubba_methods.iter().position(|m| m.matches(method)) else {
            return Ok(());
        };
        self.stubba_methods[index].unstub()?;
        self.stubba_methods.remove(index);
        Ok(())
    }

    /// Unstub every target, most recently installed first.
    ///
    /// Every target is attempted even when some fail; the first error is
    /// returned. Targets that failed keep their captured original and stay
    /// registered, so calling this again retries them.
    pub fn unstub_all(&mut self) -> StubbaResult<()> {
        let mut first_error = None;
        let mut failed = Vec::new();
        for mut method in self.stubba_methods.drain(..).rev() {
            if let Err(e) = method.unstub() {
                tracing::warn!(
                    stubbee = %method.stubbee(),
                    method = method.method_name(),
                    error = %e,
                    "failed to restore stubbed method"
                );
                first_error.get_or_insert(e);
                failed.push(method);
            }
        }
        failed.reverse();
        self.stubba_methods = failed;
        first_error.map_or(Ok(()), Err)
    }

    /// Whether a target equivalent to `method` is installed
    #[must_use]
    pub fn is_stubbed(&self, method: &dyn StubTarget) -> bool {
        self.stubba_methods.iter().any(|m| m.matches(method))
    }

    /// Installed targets, in installation order
    #[must_use]
    pub fn stubba_methods(&self) -> &[Box<dyn StubTarget>] {
        &self.stubba_methods
    }

    /// Number of installed targets
    #[must_use]
    pub fn len(&self) -> usize {
        self.stubba_methods.len()
    }

    /// Whether nothing is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stubba_methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::StubbaError;
    use crate::runtime::Class;
    use crate::stub_target::{InstanceMethod, StubState, Stubbee};
    use crate::value::Value;

    #[test]
    fn test_stubbing_twice_reuses_target() {
        let product = Class::new("Product").instantiate();
        let mut central = Central::new();

        central.stub(Box::new(InstanceMethod::new(&product, "save"))).unwrap();
        central.stub(Box::new(InstanceMethod::new(&product, "save"))).unwrap();
        assert_eq!(central.len(), 1);
        assert_eq!(central.stubba_methods()[0].state(), StubState::Installed);
    }

    #[test]
    fn test_unstub_removes_only_the_matching_target() {
        let product = Class::new("Product").instantiate();
        let mut central = Central::new();
        central.stub(Box::new(InstanceMethod::new(&product, "save"))).unwrap();
        central.stub(Box::new(InstanceMethod::new(&product, "reload"))).unwrap();

        central.unstub(&InstanceMethod::new(&product, "save")).unwrap();
        assert_eq!(central.len(), 1);
        assert_eq!(central.stubba_methods()[0].method_name(), "reload");

        central.unstub(&InstanceMethod::new(&product, "never_stubbed")).unwrap();
        assert_eq!(central.len(), 1);
    }

    #[test]
    fn test_unstub_all_restores_everything() {
        let class = Class::new("Product");
        class.define_method("save", |_, _, _| Ok(Value::Bool(false)));
        let a = class.instantiate();
        let b = class.instantiate();
        let mut central = Central::new();
        central.stub(Box::new(InstanceMethod::new(&a, "save"))).unwrap();
        central.stub(Box::new(InstanceMethod::new(&b, "save"))).unwrap();

        central.unstub_all().unwrap();
        assert!(central.is_empty());
        assert_eq!(a.call("save", &[]).unwrap(), Value::Bool(false));
        assert_eq!(b.call("save", &[]).unwrap(), Value::Bool(false));
        central.unstub_all().unwrap();
    }

    #[test]
    fn test_unstub_all_continues_past_failures() {
        let class = Class::new("Product");
        let busy = class.instantiate();
        let fine = class.instantiate();
        fine.define_singleton_method("save", |_, _, _| Ok(Value::from("original")));

        let mut central = Central::new();
        central.stub(Box::new(InstanceMethod::new(&busy, "save"))).unwrap();
        central.stub(Box::new(InstanceMethod::new(&fine, "save"))).unwrap();

        let guard = busy.singleton_methods().borrow();
        let err = central.unstub_all().unwrap_err();
        drop(guard);

        assert!(matches!(err, StubbaError::MethodTableBusy { .. }));
        assert_eq!(central.len(), 1);
        assert_eq!(central.stubba_methods()[0].stubbee(), Stubbee::Object(busy));
        assert_eq!(fine.call("save", &[]).unwrap(), Value::from("original"));
    }

    #[test]
    fn test_unstub_all_retries_failed_restores() {
        let product = Class::new("Product").instantiate();
        product.define_singleton_method("save", |_, _, _| Ok(Value::from("original")));
        let mut central = Central::new();
        central.stub(Box::new(InstanceMethod::new(&product, "save"))).unwrap();

        let guard = product.singleton_methods().borrow();
        assert!(central.unstub_all().is_err());
        drop(guard);
        assert!(product.call("save", &[]).is_err());

        central.unstub_all().unwrap();
        assert!(central.is_empty());
        assert_eq!(product.call("save", &[]).unwrap(), Value::from("original"));
    }

    #[test]
    fn test_failed_unstub_keeps_target_registered() {
        let product = Class::new("Product").instantiate();
        product.define_singleton_method("save", |_, _, _| Ok(Value::from("original")));
        let mut central = Central::new();
        central.stub(Box::new(InstanceMethod::new(&product, "save"))).unwrap();

        let guard = product.singleton_methods().borrow();
        let err = central.unstub(&InstanceMethod::new(&product, "save")).unwrap_err();
        drop(guard);
        assert!(matches!(err, StubbaError::MethodTableBusy { .. }));
        assert!(central.is_stubbed(&InstanceMethod::new(&product, "save")));

        central.unstub(&InstanceMethod::new(&product, "save")).unwrap();
        assert!(central.is_empty());
        assert_eq!(product.call("save", &[]).unwrap(), Value::from("original"));
    }
}
