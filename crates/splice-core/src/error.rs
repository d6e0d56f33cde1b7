use thiserror::Error;

/// Errors raised while locating, decomposing or rewriting source fragments.
///
/// Every variant is fatal to a pipeline run: the engine never hands back a
/// partially patched program.
#[derive(Error, Debug)]
pub enum SpliceError {
    /// A locator pattern matched zero fragments (upstream format changed)
    #[error("Pattern not found in rule '{rule}': {pattern}")]
    PatternNotFound { rule: String, pattern: String },

    /// A fragment decomposed into the wrong number of tokens
    #[error("Unexpected shape in rule '{rule}': expected {expected} {what}, found {actual}")]
    UnexpectedShape {
        rule: String,
        what: String,
        expected: usize,
        actual: usize,
    },

    /// A fragment had the right cardinality but the wrong kind of token
    #[error("Malformed fragment in rule '{rule}': {reason}")]
    MalformedFragment { rule: String, reason: String },

    /// A template referenced an identifier that was never resolved
    #[error("Template references unresolved identifier '{identifier}': {template}")]
    TemplateError { template: String, identifier: String },

    /// A template contains a broken placeholder
    #[error("Malformed template ({reason}): {template}")]
    TemplateSyntax { template: String, reason: String },

    /// A rendered pattern failed to compile
    #[error("Invalid pattern in rule '{rule}': {pattern}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule requires an identifier no earlier rule produces
    #[error("Rule '{rule}' requires identifier '{identifier}' which no earlier rule produces")]
    UnresolvedDependency { rule: String, identifier: String },

    /// The input already carries injected hooks
    #[error("Source already patched: found '{marker}'")]
    AlreadyPatched { marker: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpliceError {
    /// Create a pattern-not-found error for a rule
    pub fn not_found(rule: &str, pattern: &str) -> Self {
        Self::PatternNotFound {
            rule: rule.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Create a cardinality error for a rule
    pub fn shape(rule: &str, what: &str, expected: usize, actual: usize) -> Self {
        Self::UnexpectedShape {
            rule: rule.to_string(),
            what: what.to_string(),
            expected,
            actual,
        }
    }

    /// Create a malformed-fragment error for a rule
    pub fn malformed(rule: &str, reason: impl Into<String>) -> Self {
        Self::MalformedFragment {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error points at drift in the upstream source rather than
    /// a defect in the rule definitions or configuration
    pub fn is_format_drift(&self) -> bool {
        matches!(
            self,
            Self::PatternNotFound { .. } | Self::UnexpectedShape { .. } | Self::MalformedFragment { .. }
        )
    }
}

/// Result type for splice operations
pub type Result<T> = std::result::Result<T, SpliceError>;
