/*!
# Locator

Finds fragments of the source by pattern. Patterns are `PatternSpec`
templates whose placeholders are filled with escaped identifiers resolved by
earlier rules.

A singular anchor takes the first match in document order; when more than
one candidate exists the earliest one is authoritative. Rules that must
touch every site use [`Locator::locate_all`], and rules that must not guess
between candidates use [`Locator::locate_unique`].
*/

use std::ops::Range;

use regex::{Captures, Regex, RegexBuilder};

use crate::error::{Result, SpliceError};
use crate::source::Bindings;
use crate::template::{Embed, Template};

/// A locating pattern, possibly parameterized by earlier identifiers
#[derive(Debug, Clone)]
pub struct PatternSpec {
    template: Template,
    multiline: bool,
}

impl PatternSpec {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            template: Template::parse(pattern)?,
            multiline: false,
        })
    }

    /// Let `.` match line breaks
    pub fn multiline(mut self, enabled: bool) -> Self {
        self.multiline = enabled;
        self
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Render with escaped identifiers and compile
    pub fn compile(&self, rule: &str, bindings: &Bindings) -> Result<Regex> {
        let pattern = self.template.render(bindings, Embed::Escaped)?;
        RegexBuilder::new(&pattern)
            .dot_matches_new_line(self.multiline)
            .build()
            .map_err(|source| SpliceError::InvalidPattern {
                rule: rule.to_string(),
                pattern,
                source,
            })
    }
}

/// A located fragment and its positional captures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub fragment: String,
    pub span: Range<usize>,
    pub captures: Vec<Option<String>>,
    capture_spans: Vec<Option<Range<usize>>>,
}

impl MatchResult {
    pub fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let whole = caps.get(0)?;
        let groups: Vec<_> = caps.iter().skip(1).collect();
        Some(Self {
            fragment: whole.as_str().to_string(),
            span: whole.range(),
            captures: groups
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
            capture_spans: groups.iter().map(|group| group.map(|m| m.range())).collect(),
        })
    }

    /// Captured group `index` (1-based, as in the pattern)
    pub fn capture(&self, rule: &str, index: usize) -> Result<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.captures.get(i))
            .and_then(|group| group.as_deref())
            .ok_or_else(|| missing_group(rule, index))
    }

    /// Byte range of captured group `index` within the whole source
    pub fn capture_span(&self, rule: &str, index: usize) -> Result<Range<usize>> {
        index
            .checked_sub(1)
            .and_then(|i| self.capture_spans.get(i))
            .and_then(|group| group.clone())
            .ok_or_else(|| missing_group(rule, index))
    }
}

fn missing_group(rule: &str, index: usize) -> SpliceError {
    SpliceError::malformed(rule, format!("capture group {index} did not participate"))
}

/// Pattern search on behalf of one rule
pub struct Locator<'a> {
    rule: &'a str,
    bindings: &'a Bindings,
}

impl<'a> Locator<'a> {
    pub fn new(rule: &'a str, bindings: &'a Bindings) -> Self {
        Self { rule, bindings }
    }

    /// First match in document order
    pub fn locate(&self, text: &str, spec: &PatternSpec) -> Result<MatchResult> {
        let re = spec.compile(self.rule, self.bindings)?;
        re.captures(text)
            .and_then(|caps| MatchResult::from_captures(&caps))
            .ok_or_else(|| SpliceError::not_found(self.rule, re.as_str()))
    }

    /// Every non-overlapping match; at least one is required
    pub fn locate_all(&self, text: &str, spec: &PatternSpec) -> Result<Vec<MatchResult>> {
        let re = spec.compile(self.rule, self.bindings)?;
        let found: Vec<MatchResult> = re
            .captures_iter(text)
            .filter_map(|caps| MatchResult::from_captures(&caps))
            .collect();
        if found.is_empty() {
            return Err(SpliceError::not_found(self.rule, re.as_str()));
        }
        Ok(found)
    }

    /// The single match accepted by `accept`; zero is not-found, more than
    /// one is a shape error
    pub fn locate_unique<F>(&self, text: &str, spec: &PatternSpec, accept: F) -> Result<MatchResult>
    where
        F: Fn(&MatchResult) -> bool,
    {
        let re = spec.compile(self.rule, self.bindings)?;
        let mut candidates: Vec<MatchResult> = re
            .captures_iter(text)
            .filter_map(|caps| MatchResult::from_captures(&caps))
            .filter(|m| accept(m))
            .collect();
        match candidates.len() {
            0 => Err(SpliceError::not_found(self.rule, re.as_str())),
            1 => Ok(candidates.remove(0)),
            n => Err(SpliceError::shape(self.rule, "candidate fragments", 1, n)),
        }
    }
}
