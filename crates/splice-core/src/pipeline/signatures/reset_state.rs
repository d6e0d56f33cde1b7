/*!
# Reset State

The editor's reset routine clears the three "currently selected" slots and
then calls every panel update routine:

```text
function j0Z(){
    z5i[977]=-1;   // selected body
    z5i[450]=-1;   // selected spawn
    z5i[462]=-1;   // selected capzone
    p4Z();         // left box
    v4Z();         // right box
    n4V.a1V();     // obfuscation helper, ignored
    B4Z(true);     // renderer
    M4Z();         // warnings
    y0Z();         // undo/redo buttons
    I6s();         // mode dropdown
}
```

Each update routine is wrapped with an after-hook and each slot gets an
accessor pair. The generated block is appended right after the routine.
*/

use tracing::debug;

use crate::error::{Result, SpliceError};
use crate::extract::{decompose_reset, routine_name, RESET_SELECTION_SLOTS, RESET_UPDATE_ROUTINES};
use crate::locate::{Locator, PatternSpec};
use crate::pipeline::rules::{PatchRule, RuleOutcome};
use crate::rewrite::{replace_fragment, HookInjector};
use crate::source::{Bindings, SourceText};
use crate::template::Template;

use super::ids;

const RESET_ROUTINE: &str = r"function ...\(\)\{.{0,40}(...\[\d+\]=-1;){2}.{0,40}(...\(true\);).{0,40}(...\(\);){2}[^}]+\}";

pub struct ResetStateRule {
    routine: PatternSpec,
    injector: HookInjector,
    selection_capabilities: Vec<String>,
    update_capabilities: Vec<String>,
}

impl ResetStateRule {
    /// Capabilities are paired with slots and update calls in order, so the
    /// counts must match the routine exactly
    pub fn new(selection_capabilities: Vec<String>, update_capabilities: Vec<String>) -> Result<Self> {
        if selection_capabilities.len() != RESET_SELECTION_SLOTS {
            return Err(SpliceError::Config(format!(
                "reset-state needs {RESET_SELECTION_SLOTS} selection capabilities, got {}",
                selection_capabilities.len()
            )));
        }
        if update_capabilities.len() != RESET_UPDATE_ROUTINES {
            return Err(SpliceError::Config(format!(
                "reset-state needs {RESET_UPDATE_ROUTINES} update capabilities, got {}",
                update_capabilities.len()
            )));
        }
        Ok(Self {
            routine: PatternSpec::new(RESET_ROUTINE)?,
            injector: HookInjector::new()?,
            selection_capabilities,
            update_capabilities,
        })
    }
}

impl PatchRule for ResetStateRule {
    fn name(&self) -> &'static str {
        "reset-state"
    }

    fn description(&self) -> &'static str {
        "Wraps the panel update routines and exposes the selection slots cleared by the reset routine"
    }

    fn produces(&self) -> Vec<String> {
        let mut produced = vec![ids::RESET_ROUTINE.to_string()];
        produced.extend(self.selection_capabilities.iter().map(|c| ids::selection_slot(c)));
        produced.extend(self.update_capabilities.iter().map(|c| ids::update_routine(c)));
        produced
    }

    fn locals(&self) -> Vec<&'static str> {
        HookInjector::LOCALS.to_vec()
    }

    fn templates(&self) -> Vec<&Template> {
        let mut templates = vec![self.routine.template()];
        templates.extend(self.injector.templates());
        templates
    }

    fn apply(&self, source: SourceText, bindings: &mut Bindings) -> Result<RuleOutcome> {
        let found = Locator::new(self.name(), bindings).locate(source.as_str(), &self.routine)?;
        let name = routine_name(self.name(), &found.fragment)?;
        let shape = decompose_reset(self.name(), &found.fragment)?;
        debug!(
            routine = name,
            slots = ?shape.selection_slots,
            updates = ?shape.update_routines,
            "decomposed reset routine"
        );
        bindings.bind(ids::RESET_ROUTINE, name);

        let mut injected = String::new();
        for (routine, capability) in shape.update_routines.iter().zip(&self.update_capabilities) {
            bindings.bind(ids::update_routine(capability), routine.as_str());
            injected.push_str(&self.injector.wrap_update_routine(bindings, routine, capability)?);
        }
        for (slot, capability) in shape.selection_slots.iter().zip(&self.selection_capabilities) {
            bindings.bind(ids::selection_slot(capability), slot.as_str());
            injected.push_str(&self.injector.selection_accessors(bindings, slot, capability)?);
        }

        let replacement = format!("{};{{{}}};", found.fragment, injected);
        Ok(RuleOutcome::new(replace_fragment(source, &found, &replacement), 1))
    }
}
