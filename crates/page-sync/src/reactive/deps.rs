//! Dependency tuples and change detection.
//!
//! A [`Deps`] is an ordered list of comparable values. A [`Trigger`] remembers
//! the last tuple it saw and reports whether a new one differs (element-wise,
//! shallow equality), which is what decides whether a side effect re-runs.

use serde::Serialize;
use serde_json::Value;

use crate::error::SyncError;

/// Ordered list of dependency values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deps(Vec<Value>);

impl Deps {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one value.
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    /// Build from any serializable value.
    ///
    /// Arrays (tuples, `Vec`s) are spread into separate elements so that each
    /// argument compares independently; any other value becomes one element.
    /// `()` contributes nothing.
    pub fn from_serialize<A: Serialize + ?Sized>(args: &A) -> Result<Self, SyncError> {
        Ok(match serde_json::to_value(args)? {
            Value::Null => Self::new(),
            Value::Array(items) => Self(items),
            other => Self(vec![other]),
        })
    }

    /// Append every element of `other`.
    pub fn extend(mut self, other: Deps) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Value> for Deps {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Value>> for Deps {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// Change detector over successive dependency tuples.
#[derive(Debug, Default)]
pub struct Trigger {
    last: Option<Deps>,
    runs: u64,
}

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `deps`; returns `true` on the first call and whenever `deps`
    /// differs from the previous tuple.
    pub fn observe(&mut self, deps: &Deps) -> bool {
        if self.last.as_ref() == Some(deps) {
            return false;
        }
        self.last = Some(deps.clone());
        self.runs += 1;
        true
    }

    /// How many times `observe` reported a change.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Forget the last tuple so the next `observe` fires unconditionally.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
