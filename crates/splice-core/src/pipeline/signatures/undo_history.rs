/*!
# Undo History

The snapshot routine trims the history stack when it is full
(`abc[5]--;}`), then stores the serialized map object
(`abc[7][...]=Z[3](JSON[...](abc[12]))`). Its name is registered in the
namespace ahead of the definition, which is hoisted.
*/

use crate::error::Result;
use crate::extract::routine_name;
use crate::locate::{Locator, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::replace_fragment;
use crate::source::{Bindings, SourceText};
use crate::template::{Embed, Template};

use super::ids;

const SAVE_ROUTINE: &str = r"function ...\(\)\{.{1,150}%{map_container}\[\d{1,3}\]--;\}%{map_container}\[\d{1,3}\].{1,40}\]\(JSON\[.{1,40}\]\(%{map_object}\)";

const REGISTRATION: &str = "%{ns}.saveToUndoHistory=%{undo_routine};%{fragment}";

pub struct UndoHistoryRule {
    routine: PatternSpec,
    registration: Template,
}

impl UndoHistoryRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            routine: PatternSpec::new(SAVE_ROUTINE)?,
            registration: Template::parse(REGISTRATION)?,
        })
    }
}

impl PatchRule for UndoHistoryRule {
    fn name(&self) -> &'static str {
        "undo-history"
    }

    fn description(&self) -> &'static str {
        "Exposes the routine that pushes a serialized map snapshot onto the undo stack"
    }

    fn requires(&self) -> Vec<String> {
        vec![ids::MAP_CONTAINER.to_string(), ids::MAP_OBJECT.to_string()]
    }

    fn produces(&self) -> Vec<String> {
        vec![ids::UNDO_ROUTINE.to_string()]
    }

    fn locals(&self) -> Vec<&'static str> {
        vec![ids::FRAGMENT]
    }

    fn templates(&self) -> Vec<&Template> {
        vec![self.routine.template(), &self.registration]
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let found = Locator::new(self.name(), bindings).locate(source.as_str(), &self.routine)?;
        let name = routine_name(self.name(), &found.fragment)?;
        bindings.bind(ids::UNDO_ROUTINE, name);

        let local = bindings.clone().with(ids::FRAGMENT, found.fragment.as_str());
        let replacement = self.registration.render(&local, Embed::Raw)?;
        Ok(RuleOutcome::new(replace_fragment(source, &found, &replacement), 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpliceError;

    const SAVE: &str = "function k3Z(){if(abc[5]>=20){abc[7].shift();abc[5]--;}abc[7][abc[5]]=Z[3](JSON[T[4]](abc[12]));abc[5]++;}";

    fn bindings() -> Bindings {
        Bindings::seeded("window.kklee")
            .with("map_object", "abc[12]")
            .with("map_container", "abc")
    }

    #[test]
    fn test_registers_save_routine() {
        let mut bindings = bindings();
        let outcome = UndoHistoryRule::new()
            .unwrap()
            .apply(SourceText::from(SAVE), &mut bindings)
            .unwrap();
        assert_eq!(bindings.get("undo_routine").unwrap().as_str(), "k3Z");
        assert_eq!(
            outcome.source.as_str(),
            format!("window.kklee.saveToUndoHistory=k3Z;{SAVE}")
        );
    }

    #[test]
    fn test_different_map_object_does_not_match() {
        let mut bindings = Bindings::seeded("ns")
            .with("map_object", "abc[13]")
            .with("map_container", "abc");
        let err = UndoHistoryRule::new()
            .unwrap()
            .apply(SourceText::from(SAVE), &mut bindings)
            .unwrap_err();
        assert!(matches!(err, SpliceError::PatternNotFound { ref rule, .. } if rule == "undo-history"));
    }
}
