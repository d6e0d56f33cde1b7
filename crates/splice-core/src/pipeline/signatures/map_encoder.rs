/*!
# Map Encoder

The map object is built by calling the encoder through an obfuscated member
lookup (`abc[12]=Q[T[1]]();`). The single-character constructor name is
lifted from that call, and every empty definition of it gets a registration
appended.
*/

use crate::error::{Result, SpliceError};
use crate::locate::{Locator, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::replace_all;
use crate::source::{Bindings, SourceText};
use crate::template::{Embed, Template};

use super::ids;

const CONSTRUCTION: &str = r"%{map_object}=(.)\[.{1,25}\]\(\);";

const DEFINITION: &str = r"function %{map_encoder}\(\)\{\}";

const REGISTRATION: &str = "function %{map_encoder}(){};%{ns}.mapEncoder=%{map_encoder};";

pub struct MapEncoderRule {
    construction: PatternSpec,
    definition: PatternSpec,
    registration: Template,
}

impl MapEncoderRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            construction: PatternSpec::new(CONSTRUCTION)?,
            definition: PatternSpec::new(DEFINITION)?,
            registration: Template::parse(REGISTRATION)?,
        })
    }
}

impl PatchRule for MapEncoderRule {
    fn name(&self) -> &'static str {
        "map-encoder"
    }

    fn description(&self) -> &'static str {
        "Registers the map encoder constructor in the namespace at its definition"
    }

    fn requires(&self) -> Vec<String> {
        vec![ids::MAP_OBJECT.to_string()]
    }

    fn produces(&self) -> Vec<String> {
        vec![ids::MAP_ENCODER.to_string()]
    }

    fn templates(&self) -> Vec<&Template> {
        vec![
            self.construction.template(),
            self.definition.template(),
            &self.registration,
        ]
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let found = Locator::new(self.name(), bindings).locate(source.as_str(), &self.construction)?;
        let encoder = found.capture(self.name(), 1)?.to_string();
        bindings.bind(ids::MAP_ENCODER, encoder);

        let definition = self.definition.compile(self.name(), bindings)?;
        let registration = self.registration.render(bindings, Embed::Raw)?;
        let (source, sites) = replace_all(source, &definition, |_| Ok(registration.clone()))?;
        if sites == 0 {
            return Err(SpliceError::not_found(self.name(), definition.as_str()));
        }
        Ok(RuleOutcome::new(source, sites))
    }
}
