/*!
# Source Text and Identifiers

Value types threaded through the pipeline: the program text being patched,
the build-specific identifiers discovered in it, and the named bindings that
carry identifiers from one rule to the next.
*/

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Result, SpliceError};

/// Binding name reserved for the hook namespace expression
pub const NAMESPACE_BINDING: &str = "ns";

/// The whole program being patched
///
/// Each rule consumes one `SourceText` and hands back the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token discovered in the source at patch time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named identifiers resolved so far, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Bindings {
    values: IndexMap<String, Identifier>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings seeded with the hook namespace expression
    pub fn seeded(namespace: &str) -> Self {
        let mut bindings = Self::new();
        bindings.bind(NAMESPACE_BINDING, namespace);
        bindings
    }

    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), Identifier::new(value));
    }

    /// Builder-style bind, used for per-site local values
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bind(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Identifier> {
        self.values.get(name)
    }

    /// Look up an identifier a rule depends on
    pub fn require(&self, rule: &str, name: &str) -> Result<&Identifier> {
        self.values
            .get(name)
            .ok_or_else(|| SpliceError::UnresolvedDependency {
                rule: rule.to_string(),
                identifier: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Identifier)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}
