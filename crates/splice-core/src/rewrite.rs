/*!
# Rewriter

Text substitution primitives. Every mode keeps the original fragment's side
effects and adds instrumentation around it; the one exception is
[`remove_fragment`], which deletes a deliberately narrow match.
*/

use std::ops::Range;

use regex::{Captures, Regex};

use crate::error::Result;
use crate::locate::MatchResult;
use crate::source::{Bindings, SourceText};
use crate::template::{Embed, Template};

/// Wrapper installed around each update routine
pub const UPDATE_WRAPPER: &str = "let %{routine}OLD=%{routine};%{routine}=function(){%{routine}OLD(...arguments);\
if(%{ns}.afterUpdate%{capability})%{ns}.afterUpdate%{capability}(...arguments);};\
%{ns}.update%{capability}=%{routine};";

/// Accessor pair exposing each selection slot
pub const SELECTION_ACCESSORS: &str = "%{ns}.getCurrent%{capability}=function(){return %{slot};};\
%{ns}.setCurrent%{capability}=function(v){return %{slot}=v;};";

/// Replace exactly the located span with `replacement`
pub fn replace_fragment(source: SourceText, found: &MatchResult, replacement: &str) -> SourceText {
    replace_span(source, found.span.clone(), replacement)
}

/// Replace a byte range of the source
pub fn replace_span(source: SourceText, span: Range<usize>, replacement: &str) -> SourceText {
    let text = source.into_string();
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..span.start]);
    out.push_str(replacement);
    out.push_str(&text[span.end..]);
    SourceText::new(out)
}

/// Replace every match of `pattern`; returns the new text and the site count
pub fn replace_all<F>(source: SourceText, pattern: &Regex, mut render: F) -> Result<(SourceText, usize)>
where
    F: FnMut(&Captures<'_>) -> Result<String>,
{
    let text = source.as_str();
    let mut out = String::with_capacity(text.len() + 256);
    let mut last = 0;
    let mut sites = 0;
    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        out.push_str(&render(&caps)?);
        last = whole.end();
        sites += 1;
    }
    out.push_str(&text[last..]);
    Ok((SourceText::new(out), sites))
}

/// Delete a located fragment, keeping its leading context group
///
/// `keep_group` stands in for a look-behind: it is matched so the removal
/// stays narrow, then written back untouched.
pub fn remove_fragment(source: SourceText, found: &MatchResult, rule: &str, keep_group: usize) -> Result<SourceText> {
    let keep = found.capture(rule, keep_group)?.to_string();
    Ok(replace_fragment(source, found, &keep))
}

/// Generates the wrapper and accessor code spliced after the reset routine
#[derive(Debug, Clone)]
pub struct HookInjector {
    update_wrapper: Template,
    selection_accessors: Template,
}

impl HookInjector {
    /// Names bound per generated snippet rather than by a rule
    pub const LOCALS: &'static [&'static str] = &["routine", "slot", "capability"];

    pub fn new() -> Result<Self> {
        Ok(Self {
            update_wrapper: Template::parse(UPDATE_WRAPPER)?,
            selection_accessors: Template::parse(SELECTION_ACCESSORS)?,
        })
    }

    pub fn templates(&self) -> Vec<&Template> {
        vec![&self.update_wrapper, &self.selection_accessors]
    }

    /// Renamed-original plus thin wrapper for one update routine
    ///
    /// Callers keep invoking the original name; the wrapper runs the saved
    /// original with the same arguments, then the optional after-hook.
    pub fn wrap_update_routine(&self, bindings: &Bindings, routine: &str, capability: &str) -> Result<String> {
        let local = bindings
            .clone()
            .with("routine", routine)
            .with("capability", capability);
        self.update_wrapper.render(&local, Embed::Raw)
    }

    /// Getter/setter pair for one selection slot
    pub fn selection_accessors(&self, bindings: &Bindings, slot: &str, capability: &str) -> Result<String> {
        let local = bindings
            .clone()
            .with("slot", slot)
            .with("capability", capability);
        self.selection_accessors.render(&local, Embed::Raw)
    }
}
