/*!
# Patch Rules

Core trait and bookkeeping for defining patch rules.
*/

use serde::Serialize;

use crate::error::Result;
use crate::source::{Bindings, SourceText};
use crate::template::Template;

/// Result of applying one rule
#[derive(Debug)]
pub struct RuleOutcome {
    pub source: SourceText,
    /// Number of fragments rewritten
    pub sites: usize,
}

impl RuleOutcome {
    pub fn new(source: SourceText, sites: usize) -> Self {
        Self { source, sites }
    }
}

/// One locate → extract → rewrite step
///
/// Rules declare the identifiers they consume and produce so the pipeline
/// can check ordering before touching any text.
pub trait PatchRule: Send + Sync {
    /// Short stable name, used in errors and logs
    fn name(&self) -> &'static str;

    /// What the rule hooks and why
    fn description(&self) -> &'static str;

    /// Identifiers that must be bound by earlier rules
    fn requires(&self) -> Vec<String> {
        Vec::new()
    }

    /// Identifiers this rule binds
    fn produces(&self) -> Vec<String> {
        Vec::new()
    }

    /// Names bound per match inside the rule (e.g. the matched fragment)
    fn locals(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Every pattern and replacement template the rule renders
    fn templates(&self) -> Vec<&Template> {
        Vec::new()
    }

    /// Apply the rule, binding whatever it discovers
    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome>;
}

/// Rule execution statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct RuleStats {
    pub rule_name: String,
    pub applications: u64,
    pub sites: u64,
    pub errors: u64,
    pub total_time_us: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            ..Self::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            (self.applications - self.errors) as f64 / self.applications as f64
        }
    }

    pub fn average_time_us(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            self.total_time_us as f64 / self.applications as f64
        }
    }
}
