/*!
# Map Object

Finds the slot holding the live map (`rxid:abc[12]` names it inside a
descriptor table) and mirrors the map into the hook namespace after every
assignment to that slot.
*/

use crate::error::{Result, SpliceError};
use crate::escape::escape;
use crate::extract::split_map_anchor;
use crate::locate::{Locator, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::replace_all;
use crate::source::{Bindings, SourceText};
use crate::template::{Embed, Template};

use super::ids;

const ASSIGNMENT: &str = r"(%{map_object}=[^;]+;)";

const MIRROR: &str = "%{fragment}%{ns}.mapObject=%{map_object};\
if(%{ns}.afterNewMapObject)%{ns}.afterNewMapObject();";

pub struct MapObjectRule {
    anchor: PatternSpec,
    assignment: PatternSpec,
    mirror: Template,
}

impl MapObjectRule {
    pub fn new(anchor_key: &str) -> Result<Self> {
        Ok(Self {
            anchor: PatternSpec::new(&format!(r"{}:[a-zA-Z0-9]{{3}}\[\d+\]", escape(anchor_key)))?,
            assignment: PatternSpec::new(ASSIGNMENT)?,
            mirror: Template::parse(MIRROR)?,
        })
    }
}

impl PatchRule for MapObjectRule {
    fn name(&self) -> &'static str {
        "map-object"
    }

    fn description(&self) -> &'static str {
        "Mirrors the active map into the namespace whenever a new one is assigned"
    }

    fn produces(&self) -> Vec<String> {
        vec![ids::MAP_OBJECT.to_string(), ids::MAP_CONTAINER.to_string()]
    }

    fn locals(&self) -> Vec<&'static str> {
        vec![ids::FRAGMENT]
    }

    fn templates(&self) -> Vec<&Template> {
        vec![self.anchor.template(), self.assignment.template(), &self.mirror]
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let found = Locator::new(self.name(), bindings).locate(source.as_str(), &self.anchor)?;
        let anchor = split_map_anchor(self.name(), &found.fragment)?;
        bindings.bind(ids::MAP_OBJECT, anchor.object);
        bindings.bind(ids::MAP_CONTAINER, anchor.container);

        let assignment = self.assignment.compile(self.name(), bindings)?;
        let scope: &Bindings = bindings;
        let (source, sites) = replace_all(source, &assignment, |caps| {
            let local = scope.clone().with(ids::FRAGMENT, &caps[1]);
            self.mirror.render(&local, Embed::Raw)
        })?;
        if sites == 0 {
            return Err(SpliceError::not_found(self.name(), assignment.as_str()));
        }
        Ok(RuleOutcome::new(source, sites))
    }
}
