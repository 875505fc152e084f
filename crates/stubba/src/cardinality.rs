//! Allowed invocation counts for an expectation.

use std::fmt;

/// Range of invocation counts an expectation accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    required: usize,
    maximum: Option<usize>,
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::exactly(1)
    }
}

impl Cardinality {
    /// Exactly `n` invocations
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self {
            required: n,
            maximum: Some(n),
        }
    }

    /// `n` or more invocations
    #[must_use]
    pub const fn at_least(n: usize) -> Self {
        Self {
            required: n,
            maximum: None,
        }
    }

    /// At most `n` invocations
    #[must_use]
    pub const fn at_most(n: usize) -> Self {
        Self {
            required: 0,
            maximum: Some(n),
        }
    }

    /// Between `min` and `max` invocations inclusive
    #[must_use]
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            required: min,
            maximum: Some(max),
        }
    }

    /// Zero or more invocations
    #[must_use]
    pub const fn any_number() -> Self {
        Self::at_least(0)
    }

    /// No invocations at all
    #[must_use]
    pub const fn never() -> Self {
        Self::exactly(0)
    }

    /// Minimum invocation count
    #[must_use]
    pub const fn required(&self) -> usize {
        self.required
    }

    /// Maximum invocation count, `None` when unbounded
    #[must_use]
    pub const fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    /// Whether another invocation fits after `count` so far
    #[must_use]
    pub fn invocations_allowed(&self, count: usize) -> bool {
        self.maximum.map_or(true, |max| count < max)
    }

    /// Whether `count` reaches the minimum
    #[must_use]
    pub const fn satisfied(&self, count: usize) -> bool {
        count >= self.required
    }

    /// Whether `count` lies inside the range
    #[must_use]
    pub fn verified(&self, count: usize) -> bool {
        self.satisfied(count) && self.maximum.map_or(true, |max| count <= max)
    }

    /// Whether any count is acceptable
    #[must_use]
    pub const fn allowed_any_number_of_times(&self) -> bool {
        self.required == 0 && self.maximum.is_none()
    }

    /// Whether no invocation is acceptable
    #[must_use]
    pub fn is_never(&self) -> bool {
        self.maximum == Some(0)
    }
}

/// "once", "twice" or "N times"
#[must_use]
pub fn times(count: usize) -> String {
    match count {
        1 => "once".to_string(),
        2 => "twice".to_string(),
        n => format!("{n} times"),
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.required, self.maximum) {
            (0, None) => write!(f, "allowed any number of times"),
            (0, Some(0)) => write!(f, "expected never"),
            (min, Some(max)) if min == max => write!(f, "expected exactly {}", times(min)),
            (min, None) => write!(f, "expected at least {}", times(min)),
            (0, Some(max)) => write!(f, "expected at most {}", times(max)),
            (min, Some(max)) => write!(f, "expected between {min} and {}", times(max)),
        }
    }
}
