//! Stubbing configuration
//!
//! Each [`StubbingCheck`] can be allowed, reported as a warning, or refused.
//! Configurations are usually built in code, but can also be loaded from a
//! YAML file so a whole suite shares one policy:
//!
//! ```yaml
//! stubbing_non_existent_method: prevent
//! stubbing_non_public_method: warn
//! stubbing_method_unnecessarily: allow
//! ```

use crate::result::{StubbaError, StubbaResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// What to do when a check trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StubbingPolicy {
    /// Say nothing
    #[default]
    Allow,
    /// Log a warning and record it on the mockery
    Warn,
    /// Fail with [`StubbaError::StubbingNotAllowed`]
    Prevent,
}

impl StubbingPolicy {
    /// Check for allow
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Situations a policy can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubbingCheck {
    /// Stubbing a method the target does not have
    NonExistentMethod,
    /// Stubbing a protected or private method
    NonPublicMethod,
    /// A stub that was never invoked by the end of the test
    MethodUnnecessarily,
}

impl fmt::Display for StubbingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NonExistentMethod => "stubbing non-existent method",
            Self::NonPublicMethod => "stubbing non-public method",
            Self::MethodUnnecessarily => "stubbing method unnecessarily",
        })
    }
}

/// Stubbing policies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Policy for stubbing methods that do not exist
    pub stubbing_non_existent_method: StubbingPolicy,
    /// Policy for stubbing protected and private methods
    pub stubbing_non_public_method: StubbingPolicy,
    /// Policy for stubs that are never invoked
    pub stubbing_method_unnecessarily: StubbingPolicy,
}

impl Configuration {
    /// Create a configuration that allows everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the non-existent method policy
    #[must_use]
    pub const fn with_stubbing_non_existent_method(mut self, policy: StubbingPolicy) -> Self {
        self.stubbing_non_existent_method = policy;
        self
    }

    /// Set the non-public method policy
    #[must_use]
    pub const fn with_stubbing_non_public_method(mut self, policy: StubbingPolicy) -> Self {
        self.stubbing_non_public_method = policy;
        self
    }

    /// Set the unnecessary stub policy
    #[must_use]
    pub const fn with_stubbing_method_unnecessarily(mut self, policy: StubbingPolicy) -> Self {
        self.stubbing_method_unnecessarily = policy;
        self
    }

    /// Policy for `check`
    #[must_use]
    pub const fn policy_for(&self, check: StubbingCheck) -> StubbingPolicy {
        match check {
            StubbingCheck::NonExistentMethod => self.stubbing_non_existent_method,
            StubbingCheck::NonPublicMethod => self.stubbing_non_public_method,
            StubbingCheck::MethodUnnecessarily => self.stubbing_method_unnecessarily,
        }
    }

    /// Parse from YAML; missing keys default to allow
    pub fn from_yaml_str(yaml: &str) -> StubbaResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| StubbaError::Config {
            message: format!("Failed to parse configuration: {e}"),
        })?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: &Path) -> StubbaResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> StubbaResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_allows_everything() {
        let config = Configuration::new();
        assert!(config.policy_for(StubbingCheck::NonExistentMethod).is_allow());
        assert!(config.policy_for(StubbingCheck::NonPublicMethod).is_allow());
        assert!(config.policy_for(StubbingCheck::MethodUnnecessarily).is_allow());
    }

    #[test]
    fn test_builder() {
        let config = Configuration::new()
            .with_stubbing_non_existent_method(StubbingPolicy::Prevent)
            .with_stubbing_non_public_method(StubbingPolicy::Warn)
            .with_stubbing_method_unnecessarily(StubbingPolicy::Warn);

        assert_eq!(
            config.policy_for(StubbingCheck::NonExistentMethod),
            StubbingPolicy::Prevent
        );
        assert_eq!(
            config.policy_for(StubbingCheck::NonPublicMethod),
            StubbingPolicy::Warn
        );
        assert_eq!(
            config.policy_for(StubbingCheck::MethodUnnecessarily),
            StubbingPolicy::Warn
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Configuration::from_yaml_str("stubbing_non_public_method: prevent\n").unwrap();
        assert_eq!(config.stubbing_non_public_method, StubbingPolicy::Prevent);
        assert_eq!(config.stubbing_non_existent_method, StubbingPolicy::Allow);
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err = Configuration::from_yaml_str("stubbing_non_public_method: sometimes\n").unwrap_err();
        assert!(matches!(err, StubbaError::Config { .. }));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Configuration::new().with_stubbing_method_unnecessarily(StubbingPolicy::Warn);
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("stubbing_method_unnecessarily: warn"));
        assert_eq!(Configuration::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stubbing_non_existent_method: warn").unwrap();

        let config = Configuration::from_file(file.path()).unwrap();
        assert_eq!(config.stubbing_non_existent_method, StubbingPolicy::Warn);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Configuration::from_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, StubbaError::Io(_)));
    }

    #[test]
    fn test_check_display() {
        assert_eq!(
            StubbingCheck::NonExistentMethod.to_string(),
            "stubbing non-existent method"
        );
    }
}
