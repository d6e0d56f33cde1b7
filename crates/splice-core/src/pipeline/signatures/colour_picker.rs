/*!
# Colour Picker

The picker is a four-argument method that converts its first argument to
hue/brightness/saturation through a helper defined later on the same line
(`return {hue`). Its body is rewritten to remember the call arguments and
to preload the colour input. A setter that re-invokes the picker with a new
colour and the remembered arguments is declared after it.
*/

use tracing::debug;

use crate::error::Result;
use crate::locate::{Locator, MatchResult, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::replace_span;
use crate::source::{Bindings, SourceText};
use crate::template::{Embed, Template};

use super::ids;

/// Group 1 is the method head, group 2 the method key, group 3 the body
/// through the closing `};`.
const PICKER: &str = r"(this\[(.{10,25})\]=function\(.{3,4},.{3,4},.{3,4},.{3,4}\)\{)(.{50,250}(?:.{3,4}\[.{0,25}\]=.{3,4}\[.{0,30}\];){3}.{0,75}.{3,4}\(false\).{0,75};\};)";

/// The hue helper must start within this many characters of the picker
const HUE_WINDOW: usize = 20_000;

const HUE_HELPER: &str = "return {hue";

const COLOUR_INPUT: &str = "colour_input";

const BODY: &str = "%{ns}.showColourPickerArguments=[...arguments];\n\
document.getElementById(\"%{colour_input}\").value=\"#\"+arguments[0].toString(16).padStart(6,\"0\");\
%{fragment};let Kscpa=this[%{colour_picker_key}];\
%{ns}.setColourPickerColour=function(c){Kscpa(c,...%{ns}.showColourPickerArguments.slice(1));};\n";

pub struct ColourPickerRule {
    picker: PatternSpec,
    body: Template,
    colour_input_id: String,
}

impl ColourPickerRule {
    pub fn new(colour_input_id: &str) -> Result<Self> {
        Ok(Self {
            picker: PatternSpec::new(PICKER)?,
            body: Template::parse(BODY)?,
            colour_input_id: colour_input_id.to_string(),
        })
    }
}

/// Whether the hue helper appears later on the line the match ends on
fn hue_helper_follows(text: &str, found: &MatchResult) -> bool {
    let rest = &text[found.span.end..];
    let line = rest.split(['\n', '\r']).next().unwrap_or_default();
    line.find(HUE_HELPER)
        .is_some_and(|at| line[..at].chars().count() <= HUE_WINDOW)
}

impl PatchRule for ColourPickerRule {
    fn name(&self) -> &'static str {
        "colour-picker"
    }

    fn description(&self) -> &'static str {
        "Records colour picker arguments and exposes a setter that reopens it with a new colour"
    }

    fn produces(&self) -> Vec<String> {
        vec![ids::COLOUR_PICKER_KEY.to_string()]
    }

    fn locals(&self) -> Vec<&'static str> {
        vec![ids::FRAGMENT, COLOUR_INPUT]
    }

    fn templates(&self) -> Vec<&Template> {
        vec![self.picker.template(), &self.body]
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let text = source.as_str();
        let found = Locator::new(self.name(), bindings)
            .locate_unique(text, &self.picker, |m| hue_helper_follows(text, m))?;
        let key = found.capture(self.name(), 2)?.to_string();
        let body = found.capture(self.name(), 3)?.to_string();
        let body_span = found.capture_span(self.name(), 3)?;
        debug!(key = %key, at = found.span.start, "located colour picker");
        bindings.bind(ids::COLOUR_PICKER_KEY, key);

        let local = bindings
            .clone()
            .with(ids::FRAGMENT, body)
            .with(COLOUR_INPUT, self.colour_input_id.as_str());
        let replacement = self.body.render(&local, Embed::Raw)?;
        Ok(RuleOutcome::new(replace_span(source, body_span, &replacement), 1))
    }
}
