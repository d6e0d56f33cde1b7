/*!
# Templates

Named-parameter templates shared by pattern specs and replacement specs.
A placeholder is written `%{name}`; names may contain letters, digits, `_`
and `.`. Each template exposes the parameters it consumes so the pipeline
can check coverage before anything runs.
*/

use crate::error::{Result, SpliceError};
use crate::escape::escape;
use crate::source::Bindings;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// How substituted values are embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Embed {
    /// Insert the identifier text as-is (replacement code)
    Raw,
    /// Escape pattern metacharacters first (locator patterns)
    Escaped,
}

/// A parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    params: Vec<String>,
}

impl Template {
    /// Parse a template, rejecting unterminated or empty placeholders
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut params: Vec<String> = Vec::new();
        let mut rest = source.as_str();

        while let Some(start) = rest.find("%{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| SpliceError::TemplateSyntax {
                template: source.clone(),
                reason: "unterminated placeholder".to_string(),
            })?;
            let name = &after[..end];
            if !is_param_name(name) {
                return Err(SpliceError::TemplateSyntax {
                    template: source.clone(),
                    reason: format!("invalid placeholder name '{name}'"),
                });
            }
            if !params.iter().any(|p| p == name) {
                params.push(name.to_string());
            }
            segments.push(Segment::Param(name.to_string()));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source,
            segments,
            params,
        })
    }

    /// Parameters consumed by this template, in first-use order
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute every placeholder from `bindings`
    pub fn render(&self, bindings: &Bindings, embed: Embed) -> Result<String> {
        let mut out = String::with_capacity(self.source.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Param(name) => {
                    let value = bindings.get(name).ok_or_else(|| SpliceError::TemplateError {
                        template: self.source.clone(),
                        identifier: name.clone(),
                    })?;
                    match embed {
                        Embed::Raw => out.push_str(value.as_str()),
                        Embed::Escaped => out.push_str(&escape(value.as_str())),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn is_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
